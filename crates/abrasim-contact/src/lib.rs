#![warn(missing_docs)]

//! Contact pressure models for abrasive-process simulation.
//!
//! A [`PressureDistribution`] turns a contact footprint and an applied
//! normal load into a per-cell [`PressureField`]. Every model keeps the
//! same contract: finite, non-negative pressure whose coverage-weighted
//! integral over the footprint equals the applied load within the force
//! tolerance.
//!
//! Three models are provided:
//!
//! - [`Uniform`]: even sharing over the contact area
//! - [`RigidPad`]: rigid flat pad under load plus tilting torques
//! - [`ElasticFoundation`]: elastic layer over the face-surface gaps
//!
//! # Example
//!
//! ```
//! use abrasim_contact::{PressureDistribution, Uniform};
//! use abrasim_motion::ToolPose;
//! use abrasim_surface::{SurfaceDomain, WorkpieceSurface};
//! use abrasim_tool::{Round, ToolShape};
//!
//! let domain = SurfaceDomain::centered(20.0, 20.0, 0.5).unwrap();
//! let surface = WorkpieceSurface::flat(domain);
//! let footprint = Round::new(3.0)
//!     .unwrap()
//!     .footprint(&ToolPose::new(0.0, 0.0), &surface)
//!     .unwrap();
//!
//! let field = Uniform.pressure(&footprint, 12.0).unwrap();
//! assert!((field.integrate(&footprint) - 12.0).abs() < 1e-6);
//! ```

use abrasim_tool::ContactFootprint;

mod distribution;
mod elastic;
mod error;

pub use distribution::{RigidPad, Uniform};
pub use elastic::ElasticFoundation;
pub use error::ContactError;

/// Per-cell contact pressure over a footprint.
///
/// Values parallel the footprint's cells and are valid only for the
/// step that produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct PressureField {
    values: Vec<f64>,
}

impl PressureField {
    /// Wrap per-cell pressure values.
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    /// Per-cell pressures, parallel to the footprint cells.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the field has no samples.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Largest pressure sample (zero for an empty field).
    pub fn peak(&self) -> f64 {
        self.values.iter().copied().fold(0.0, f64::max)
    }

    /// Coverage-weighted integral over the footprint's contact area.
    pub fn integrate(&self, footprint: &ContactFootprint) -> f64 {
        footprint.integrate(&self.values)
    }
}

/// A model distributing an applied normal load over a contact footprint.
///
/// Implementations guarantee finite, non-negative fields whose discrete
/// integral matches the load; the engine re-checks both each step.
pub trait PressureDistribution: Send + Sync + std::fmt::Debug {
    /// Pressure over `footprint` carrying `normal_load`.
    ///
    /// An empty footprint with a positive load is a [`ContactError`]:
    /// nothing can carry the load. A zero load yields a zero field.
    fn pressure(
        &self,
        footprint: &ContactFootprint,
        normal_load: f64,
    ) -> Result<PressureField, ContactError>;

    /// Clone into a boxed trait object.
    fn clone_box(&self) -> Box<dyn PressureDistribution>;
}

impl Clone for Box<dyn PressureDistribution> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Shared input checks for all distributions.
pub(crate) fn validate_inputs(
    footprint: &ContactFootprint,
    normal_load: f64,
) -> Result<(), ContactError> {
    if !(normal_load.is_finite() && normal_load >= 0.0) {
        return Err(ContactError::InvalidLoad(normal_load));
    }
    if footprint.is_empty() && normal_load > 0.0 {
        return Err(ContactError::NoContact { load: normal_load });
    }
    Ok(())
}
