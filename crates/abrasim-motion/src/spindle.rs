//! Tool-head drive kinematics.

use abrasim_math::GeometryError;
use serde::{Deserialize, Serialize};

/// Spin of the abrasive tool head about its own axis.
///
/// The spindle contributes tangential sliding speed on top of the path
/// motion. Contributions are expressed squared so that
/// [`SlidingVelocity`](crate::SlidingVelocity) can compose them in
/// quadrature without intermediate square roots.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Spindle {
    /// Tool head does not spin; sliding comes from path motion alone.
    Idle,
    /// Pad spinning about the tool axis.
    Rotary {
        /// Angular speed in rad/s.
        angular_speed: f64,
    },
    /// Random-orbit head: an eccentric link orbiting plus the pad's own
    /// rotation.
    Orbital {
        /// Orbit radius of the eccentric link.
        eccentricity: f64,
        /// Angular speed of the eccentric link in rad/s.
        orbital_speed: f64,
        /// Angular speed of the pad about its own axis in rad/s.
        pad_speed: f64,
    },
    /// Abrasive belt running under the head at constant surface speed.
    Belt {
        /// Belt surface speed.
        surface_speed: f64,
    },
}

impl Spindle {
    /// Squared tangential speed at tool-frame coordinates `(lx, ly)`.
    pub fn tangential_speed_squared(&self, lx: f64, ly: f64) -> f64 {
        match *self {
            Spindle::Idle => 0.0,
            Spindle::Rotary { angular_speed } => {
                (lx * lx + ly * ly) * angular_speed * angular_speed
            }
            Spindle::Orbital {
                eccentricity,
                orbital_speed,
                pad_speed,
            } => {
                let orbit = eccentricity * orbital_speed;
                orbit * orbit + (lx * lx + ly * ly) * pad_speed * pad_speed
            }
            Spindle::Belt { surface_speed } => surface_speed * surface_speed,
        }
    }

    /// Check the drive parameters are physically meaningful.
    pub fn validate(&self) -> Result<(), GeometryError> {
        match *self {
            Spindle::Idle => Ok(()),
            Spindle::Rotary { angular_speed } => {
                if !angular_speed.is_finite() {
                    return Err(GeometryError::InvalidParameter(format!(
                        "rotary angular speed {angular_speed} is not finite"
                    )));
                }
                Ok(())
            }
            Spindle::Orbital {
                eccentricity,
                orbital_speed,
                pad_speed,
            } => {
                if !(eccentricity.is_finite() && eccentricity >= 0.0) {
                    return Err(GeometryError::InvalidParameter(format!(
                        "orbital eccentricity {eccentricity} must be finite and non-negative"
                    )));
                }
                if !orbital_speed.is_finite() || !pad_speed.is_finite() {
                    return Err(GeometryError::InvalidParameter(format!(
                        "orbital speeds ({orbital_speed}, {pad_speed}) must be finite"
                    )));
                }
                Ok(())
            }
            Spindle::Belt { surface_speed } => {
                if !surface_speed.is_finite() {
                    return Err(GeometryError::InvalidParameter(format!(
                        "belt surface speed {surface_speed} is not finite"
                    )));
                }
                Ok(())
            }
        }
    }
}

impl Default for Spindle {
    fn default() -> Self {
        Spindle::Idle
    }
}
