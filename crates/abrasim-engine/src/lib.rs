#![warn(missing_docs)]

//! Material-removal process simulation.
//!
//! This crate drives the abrasim stack. A [`SimulationEngine`] owns a
//! workpiece surface and a set of process components, and marches the
//! process through time: each step samples the tool trajectory, scans
//! the contact footprint, solves the contact pressure, evaluates the
//! removal law and subtracts the removed material from the surface.
//!
//! # Features
//!
//! - Pluggable removal laws: [`Preston`], [`ThresholdPreston`] and
//!   [`PowerLaw`], all behind the [`RemovalModel`] trait.
//! - Load schedules over the run via [`LoadProfile`].
//! - Fixed or depth-capped adaptive time stepping via [`StepPolicy`].
//! - Bounded per-step diagnostics in a [`TraceBuffer`].
//! - A latching run lifecycle: a failed step preserves the last valid
//!   surface and reports why the run stopped.
//!
//! # Example
//!
//! ```
//! use abrasim_contact::Uniform;
//! use abrasim_engine::{
//!     Material, Preston, Process, SimSettings, SimulationEngine, SimulationSetup,
//! };
//! use abrasim_motion::LinearPath;
//! use abrasim_surface::{SurfaceDomain, WorkpieceSurface};
//! use abrasim_tool::Round;
//!
//! let domain = SurfaceDomain::centered(10.0, 10.0, 0.5)?;
//! let surface = WorkpieceSurface::flat(domain);
//! let setup = SimulationSetup {
//!     shape: Box::new(Round::new(2.0)?),
//!     pressure: Box::new(Uniform),
//!     model: Box::new(Preston),
//!     trajectory: Box::new(LinearPath::new([-2.0, 0.0], [2.0, 0.0], 1.0)?),
//!     process: Process::constant(10.0, Material::new(1e-4)),
//!     settings: SimSettings::new(1.0, 0.1),
//! };
//! let mut engine = SimulationEngine::new(surface, setup)?;
//! let summary = engine.run()?;
//! assert!(summary.cumulative_volume > 0.0);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod engine;
mod error;
mod model;
mod process;
mod trace;

pub use engine::{
    RunStatus, RunSummary, SimSettings, SimulationEngine, SimulationSetup, SimulationState,
    StepPolicy, Steps,
};
pub use error::{Result, SimulationError};
pub use model::{
    Material, PowerLaw, Preston, RemovalModel, RemovalRateField, ThresholdPreston, VelocityField,
    DEFAULT_RATE_FLOOR,
};
pub use process::{LoadProfile, Process};
pub use trace::{StepTrace, TraceBuffer};
