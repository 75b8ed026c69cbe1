//! Error types for contact pressure models.

use thiserror::Error;

/// Errors from physically inconsistent contact situations.
#[derive(Debug, Clone, Error)]
pub enum ContactError {
    /// Applied normal load is negative or non-finite.
    #[error("normal load {0} must be non-negative and finite")]
    InvalidLoad(f64),

    /// A positive load was applied with no contact to carry it.
    #[error("load {load} cannot be carried by an empty contact footprint")]
    NoContact {
        /// The unsupported load.
        load: f64,
    },

    /// Pad tilt drives contact pressure negative: the pad has lifted
    /// off the surface.
    #[error("pad lift-off: tilt drives contact pressure to {min_pressure:e}")]
    LiftOff {
        /// The most negative pressure before clamping.
        min_pressure: f64,
    },

    /// Elastic foundation stiffness is not a positive finite value.
    #[error("foundation stiffness {0} must be positive and finite")]
    InvalidStiffness(f64),

    /// The contact solve failed to reach the applied load.
    #[error("contact solve did not converge after {iterations} iterations")]
    NoConvergence {
        /// Iterations attempted.
        iterations: usize,
    },
}
