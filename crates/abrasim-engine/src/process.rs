//! Process inputs: the load schedule and the material it acts on.

use abrasim_math::GeometryError;
use serde::{Deserialize, Serialize};

use crate::model::Material;

/// Normal load applied through the tool over the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LoadProfile {
    /// The same load for the whole run.
    Constant {
        /// Applied normal load.
        newtons: f64,
    },
    /// Linear ramp from `start` at t = 0 to `end` at the run duration.
    Ramp {
        /// Load at the start of the run.
        start: f64,
        /// Load at the end of the run.
        end: f64,
    },
    /// Piecewise-linear `[time, load]` breakpoints.
    ///
    /// Times before the first breakpoint take the first load, times after
    /// the last take the last.
    Table {
        /// Breakpoints ordered by strictly increasing time.
        points: Vec<[f64; 2]>,
    },
}

impl LoadProfile {
    /// Constant load profile.
    pub fn constant(newtons: f64) -> Self {
        Self::Constant { newtons }
    }

    /// Load at time `t` for a run of the given duration.
    pub fn at(&self, t: f64, duration: f64) -> f64 {
        match self {
            Self::Constant { newtons } => *newtons,
            Self::Ramp { start, end } => {
                let u = (t / duration).clamp(0.0, 1.0);
                start + (end - start) * u
            }
            Self::Table { points } => {
                let (first, last) = match (points.first(), points.last()) {
                    (Some(first), Some(last)) => (first, last),
                    _ => return 0.0,
                };
                if t <= first[0] {
                    return first[1];
                }
                if t >= last[0] {
                    return last[1];
                }
                for pair in points.windows(2) {
                    let [t0, f0] = pair[0];
                    let [t1, f1] = pair[1];
                    if t <= t1 {
                        let u = (t - t0) / (t1 - t0);
                        return f0 + (f1 - f0) * u;
                    }
                }
                last[1]
            }
        }
    }

    /// Checks that every load value is finite and non-negative, and that
    /// table breakpoints are strictly ordered in time.
    pub fn validate(&self) -> Result<(), GeometryError> {
        let check = |load: f64| {
            if load.is_finite() && load >= 0.0 {
                Ok(())
            } else {
                Err(GeometryError::InvalidParameter(format!(
                    "load must be finite and non-negative, got {load}"
                )))
            }
        };
        match self {
            Self::Constant { newtons } => check(*newtons),
            Self::Ramp { start, end } => {
                check(*start)?;
                check(*end)
            }
            Self::Table { points } => {
                if points.is_empty() {
                    return Err(GeometryError::InvalidParameter(
                        "load table must have at least one breakpoint".into(),
                    ));
                }
                for pair in points.windows(2) {
                    if !(pair[0][0] < pair[1][0]) {
                        return Err(GeometryError::InvalidParameter(format!(
                            "load table times must strictly increase, got {} then {}",
                            pair[0][0], pair[1][0]
                        )));
                    }
                }
                for point in points {
                    if !point[0].is_finite() {
                        return Err(GeometryError::InvalidParameter(format!(
                            "load table time must be finite, got {}",
                            point[0]
                        )));
                    }
                    check(point[1])?;
                }
                Ok(())
            }
        }
    }
}

/// Per-run process inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Process {
    /// Normal load schedule.
    pub load: LoadProfile,
    /// Workpiece material response.
    pub material: Material,
}

impl Process {
    /// Process with the given load schedule and material.
    pub fn new(load: LoadProfile, material: Material) -> Self {
        Self { load, material }
    }

    /// Process holding a constant load.
    pub fn constant(newtons: f64, material: Material) -> Self {
        Self::new(LoadProfile::constant(newtons), material)
    }

    /// Validates the load schedule and material coefficients.
    pub fn validate(&self) -> Result<(), GeometryError> {
        self.load.validate()?;
        self.material.validate()
    }
}
