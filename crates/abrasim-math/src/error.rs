//! Error taxonomy shared by the abrasim kernel crates.

use thiserror::Error;

/// Errors from structurally invalid geometric or configuration inputs.
#[derive(Debug, Clone, Error)]
pub enum GeometryError {
    /// Invalid surface domain (bad sample counts or bounds).
    #[error("invalid domain: {0}")]
    InvalidDomain(String),

    /// Invalid tool cross-section parameters.
    #[error("invalid tool shape: {0}")]
    InvalidShape(String),

    /// Tool pose has non-finite coordinates.
    #[error("invalid tool pose: {0}")]
    InvalidPose(String),

    /// Invalid scalar parameter (speed, duration, coefficient).
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Numerical invariant violations, fatal to a simulation run.
#[derive(Debug, Clone, Error)]
pub enum NumericalError {
    /// A non-finite value appeared where a finite one is required.
    #[error("non-finite {quantity} ({detail})")]
    NonFinite {
        /// Which quantity went non-finite.
        quantity: &'static str,
        /// Where it was observed.
        detail: String,
    },

    /// A pressure sample went negative beyond numerical noise.
    #[error("negative pressure {value:e} at footprint cell {index}")]
    NegativePressure {
        /// The offending pressure value.
        value: f64,
        /// Footprint cell index of the sample.
        index: usize,
    },

    /// A removal rate or depth went negative.
    #[error("negative removal {amount:e} at cell ({ix}, {iy})")]
    NegativeRemoval {
        /// The offending rate or depth.
        amount: f64,
        /// Grid column of the cell.
        ix: usize,
        /// Grid row of the cell.
        iy: usize,
    },

    /// Integrated contact pressure does not match the applied load.
    #[error("pressure integrates to {integrated} but applied load is {applied}")]
    ForceImbalance {
        /// Discrete integral of the pressure field.
        integrated: f64,
        /// Load the distribution was asked to support.
        applied: f64,
    },

    /// Cumulative removed volume decreased between steps.
    #[error("cumulative removed volume decreased from {previous} to {current}")]
    VolumeRegression {
        /// Cumulative volume before the step.
        previous: f64,
        /// Cumulative volume after the step.
        current: f64,
    },
}
