#![warn(missing_docs)]

//! Tool geometry for abrasive-process simulation.
//!
//! A tool is a planar cross-section (round or rectangular) pressed
//! face-down onto the workpiece. This crate computes the tool's
//! [`ContactFootprint`]: the set of surface grid cells under the face at
//! a given pose, with antialiased edge coverage and the per-cell
//! clearance (`gap`) between the tool face and the surface.
//!
//! # Features
//!
//! - Signed-distance cross-sections with analytic section properties
//! - Crowned (curved) tool faces for elastic contact models
//! - Antialiased edge coverage with a configurable ramp width
//! - Parallel footprint scan over grid rows
//!
//! # Example
//!
//! ```
//! use abrasim_motion::ToolPose;
//! use abrasim_surface::{SurfaceDomain, WorkpieceSurface};
//! use abrasim_tool::{Round, ToolShape};
//!
//! let domain = SurfaceDomain::centered(20.0, 20.0, 0.5).unwrap();
//! let surface = WorkpieceSurface::flat(domain);
//! let tool = Round::new(3.0).unwrap();
//!
//! let footprint = tool.footprint(&ToolPose::new(0.0, 0.0), &surface).unwrap();
//! assert!(!footprint.is_empty());
//! assert!(footprint.covered_area() > 0.0);
//! ```

mod footprint;
mod shape;

pub use footprint::{ContactFootprint, FootprintCell};
pub use shape::{Crown, Rectangular, Round, SectionProperties, ToolShape};
