#![warn(missing_docs)]

//! Workpiece surface representation for abrasive-process simulation.
//!
//! The workpiece is a regular 2D height field over an immutable grid.
//! Material removal subtracts depth from individual cells; heights only
//! ever move down, and every mutation is validated and accounted for as
//! removed volume.
//!
//! # Example
//!
//! ```
//! use abrasim_surface::{RemovalCell, SurfaceDomain, WorkpieceSurface};
//!
//! let domain = SurfaceDomain::centered(10.0, 10.0, 0.5).unwrap();
//! let mut surface = WorkpieceSurface::flat(domain);
//!
//! let center = surface.domain().index(10, 10);
//! let removed = surface
//!     .apply_removal(&[RemovalCell { index: center, depth: 0.01 }])
//!     .unwrap();
//! assert!(removed > 0.0);
//! ```

mod domain;
mod surface;

pub use domain::{GridWindow, SurfaceDomain};
pub use surface::{RemovalCell, WorkpieceSurface};
