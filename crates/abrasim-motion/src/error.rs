//! Error types for trajectory evaluation.

use thiserror::Error;

/// Errors from querying a trajectory outside its time domain.
#[derive(Debug, Clone, Error)]
pub enum RangeError {
    /// Query time lies outside the trajectory's span.
    #[error("time {t} outside trajectory span [{start}, {end}]")]
    OutOfRange {
        /// The offending query time.
        t: f64,
        /// Start of the trajectory span.
        start: f64,
        /// End of the trajectory span.
        end: f64,
    },

    /// The trajectory does not cover the requested run interval.
    #[error("trajectory span [{start}, {end}] does not cover [0, {required}]")]
    SpanTooShort {
        /// Start of the trajectory span.
        start: f64,
        /// End of the trajectory span.
        end: f64,
        /// Run duration that must be covered.
        required: f64,
    },
}
