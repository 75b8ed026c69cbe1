#![warn(missing_docs)]

//! Math types for the abrasim material-removal kernel.
//!
//! Thin wrappers around nalgebra providing domain-specific types for
//! planar abrasive-process simulation: points, vectors, tolerance
//! constants, and the error taxonomy shared across the kernel crates.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

mod error;

pub use error::{GeometryError, NumericalError};

/// A point on the workpiece plane.
pub type Point2 = nalgebra::Point2<f64>;

/// A vector in the workpiece plane.
pub type Vec2 = Vector2<f64>;

/// Tolerance constants for simulation numerics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerance {
    /// Relative tolerance on the contact force balance.
    pub force_rel: f64,
    /// Absolute tolerance on simulated-time comparisons in seconds.
    pub time_eps: f64,
}

impl Tolerance {
    /// Default simulation tolerances (1e-3 relative force, 1e-9 s time).
    pub const DEFAULT: Self = Self {
        force_rel: 1e-3,
        time_eps: 1e-9,
    };

    /// Check that an integrated contact force matches the applied load.
    ///
    /// Relative comparison with a small absolute floor so that a zero
    /// applied load accepts only a (numerically) zero integral.
    pub fn force_balanced(&self, integrated: f64, applied: f64) -> bool {
        (integrated - applied).abs() <= self.force_rel * applied.abs() + 1e-12
    }

    /// Check whether simulated time `t` has reached the end time `end`.
    pub fn time_reached(&self, t: f64, end: f64) -> bool {
        t >= end - self.time_eps
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}
