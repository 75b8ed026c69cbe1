//! Error type for simulation runs.

use abrasim_contact::ContactError;
use abrasim_math::{GeometryError, NumericalError};
use abrasim_motion::RangeError;
use thiserror::Error;

/// Any failure that stops a simulation run.
///
/// Each variant wraps the error type of the subsystem that raised it, so
/// callers can match on the layer that failed without losing the detail.
#[derive(Debug, Clone, Error)]
pub enum SimulationError {
    /// Invalid geometry or configuration input.
    #[error("geometry: {0}")]
    Geometry(#[from] GeometryError),

    /// The pressure solve failed or the contact state is unusable.
    #[error("contact: {0}")]
    Contact(#[from] ContactError),

    /// The trajectory was queried outside its time span.
    #[error("trajectory: {0}")]
    Range(#[from] RangeError),

    /// A numerical invariant was violated mid-run.
    #[error("numerical: {0}")]
    Numerical(#[from] NumericalError),
}

/// Result type returned by engine operations.
pub type Result<T> = std::result::Result<T, SimulationError>;
