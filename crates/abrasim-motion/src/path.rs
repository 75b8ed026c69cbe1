//! Concrete tool paths.

use std::f64::consts::TAU;

use abrasim_math::{GeometryError, Vec2};
use serde::{Deserialize, Serialize};

use crate::{check_span, RangeError, SlidingVelocity, Spindle, ToolPose, Trajectory};

// =============================================================================
// LinearPath
// =============================================================================

/// Constant-velocity straight pass, defined on `[0, duration]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearPath {
    start: [f64; 2],
    velocity: [f64; 2],
    duration: f64,
    orientation: f64,
    spindle: Spindle,
}

impl LinearPath {
    /// Create a pass starting at `start` moving at `velocity` for
    /// `duration` seconds.
    pub fn new(start: [f64; 2], velocity: [f64; 2], duration: f64) -> Result<Self, GeometryError> {
        if !start.iter().chain(velocity.iter()).all(|v| v.is_finite()) {
            return Err(GeometryError::InvalidParameter(format!(
                "linear path start {start:?} / velocity {velocity:?} must be finite"
            )));
        }
        if !(duration.is_finite() && duration > 0.0) {
            return Err(GeometryError::InvalidParameter(format!(
                "path duration {duration} must be positive and finite"
            )));
        }
        Ok(Self {
            start,
            velocity,
            duration,
            orientation: 0.0,
            spindle: Spindle::Idle,
        })
    }

    /// Fix the tool orientation for the whole pass.
    pub fn with_orientation(mut self, orientation: f64) -> Self {
        self.orientation = orientation;
        self
    }

    /// Attach a spinning tool head.
    pub fn with_spindle(mut self, spindle: Spindle) -> Result<Self, GeometryError> {
        spindle.validate()?;
        self.spindle = spindle;
        Ok(self)
    }
}

impl Trajectory for LinearPath {
    fn time_span(&self) -> (f64, f64) {
        (0.0, self.duration)
    }

    fn pose_at(&self, t: f64) -> Result<ToolPose, RangeError> {
        check_span(t, self.time_span())?;
        Ok(ToolPose::with_orientation(
            self.start[0] + self.velocity[0] * t,
            self.start[1] + self.velocity[1] * t,
            self.orientation,
        ))
    }

    fn velocity_at(&self, t: f64) -> Result<SlidingVelocity, RangeError> {
        check_span(t, self.time_span())?;
        Ok(SlidingVelocity {
            linear: Vec2::new(self.velocity[0], self.velocity[1]),
            spindle: self.spindle,
        })
    }

    fn clone_box(&self) -> Box<dyn Trajectory> {
        Box::new(self.clone())
    }
}

// =============================================================================
// OscillatingPath
// =============================================================================

/// Sinusoidal dither about a center point, defined on `[0, duration]`.
///
/// Pose is `center + amplitude * cos(2*pi*t / period)` per axis, with the
/// analytic derivative as linear velocity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OscillatingPath {
    center: [f64; 2],
    amplitude: [f64; 2],
    period: f64,
    duration: f64,
    orientation: f64,
    spindle: Spindle,
}

impl OscillatingPath {
    /// Create a dither of the given per-axis `amplitude` and `period`
    /// around `center`, lasting `duration` seconds.
    pub fn new(
        center: [f64; 2],
        amplitude: [f64; 2],
        period: f64,
        duration: f64,
    ) -> Result<Self, GeometryError> {
        if !center.iter().chain(amplitude.iter()).all(|v| v.is_finite()) {
            return Err(GeometryError::InvalidParameter(format!(
                "oscillation center {center:?} / amplitude {amplitude:?} must be finite"
            )));
        }
        if !(period.is_finite() && period > 0.0) {
            return Err(GeometryError::InvalidParameter(format!(
                "oscillation period {period} must be positive and finite"
            )));
        }
        if !(duration.is_finite() && duration > 0.0) {
            return Err(GeometryError::InvalidParameter(format!(
                "path duration {duration} must be positive and finite"
            )));
        }
        Ok(Self {
            center,
            amplitude,
            period,
            duration,
            orientation: 0.0,
            spindle: Spindle::Idle,
        })
    }

    /// Fix the tool orientation for the whole pass.
    pub fn with_orientation(mut self, orientation: f64) -> Self {
        self.orientation = orientation;
        self
    }

    /// Attach a spinning tool head.
    pub fn with_spindle(mut self, spindle: Spindle) -> Result<Self, GeometryError> {
        spindle.validate()?;
        self.spindle = spindle;
        Ok(self)
    }
}

impl Trajectory for OscillatingPath {
    fn time_span(&self) -> (f64, f64) {
        (0.0, self.duration)
    }

    fn pose_at(&self, t: f64) -> Result<ToolPose, RangeError> {
        check_span(t, self.time_span())?;
        let phase = (TAU * t / self.period).cos();
        Ok(ToolPose::with_orientation(
            self.center[0] + self.amplitude[0] * phase,
            self.center[1] + self.amplitude[1] * phase,
            self.orientation,
        ))
    }

    fn velocity_at(&self, t: f64) -> Result<SlidingVelocity, RangeError> {
        check_span(t, self.time_span())?;
        let rate = TAU / self.period;
        let slope = -(rate * t).sin() * rate;
        Ok(SlidingVelocity {
            linear: Vec2::new(self.amplitude[0] * slope, self.amplitude[1] * slope),
            spindle: self.spindle,
        })
    }

    fn clone_box(&self) -> Box<dyn Trajectory> {
        Box::new(self.clone())
    }
}

// =============================================================================
// WaypointPath
// =============================================================================

/// Piecewise-linear path through timed waypoints.
///
/// Position interpolates linearly within each segment; velocity is the
/// segment slope. At a waypoint the following segment's slope applies
/// (the final waypoint uses the last segment).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaypointPath {
    times: Vec<f64>,
    points: Vec<[f64; 2]>,
    orientation: f64,
    spindle: Spindle,
}

impl WaypointPath {
    /// Create a path through `(time, position)` waypoints.
    ///
    /// Requires at least two waypoints with strictly increasing, finite
    /// times.
    pub fn new(waypoints: &[(f64, [f64; 2])]) -> Result<Self, GeometryError> {
        if waypoints.len() < 2 {
            return Err(GeometryError::InvalidParameter(format!(
                "waypoint path needs at least 2 waypoints, got {}",
                waypoints.len()
            )));
        }
        for (t, p) in waypoints {
            if !t.is_finite() || !p.iter().all(|v| v.is_finite()) {
                return Err(GeometryError::InvalidParameter(format!(
                    "waypoint ({t}, {p:?}) must be finite"
                )));
            }
        }
        for pair in waypoints.windows(2) {
            if pair[1].0 <= pair[0].0 {
                return Err(GeometryError::InvalidParameter(format!(
                    "waypoint times must strictly increase, got {} then {}",
                    pair[0].0, pair[1].0
                )));
            }
        }
        Ok(Self {
            times: waypoints.iter().map(|(t, _)| *t).collect(),
            points: waypoints.iter().map(|(_, p)| *p).collect(),
            orientation: 0.0,
            spindle: Spindle::Idle,
        })
    }

    /// Fix the tool orientation for the whole path.
    pub fn with_orientation(mut self, orientation: f64) -> Self {
        self.orientation = orientation;
        self
    }

    /// Attach a spinning tool head.
    pub fn with_spindle(mut self, spindle: Spindle) -> Result<Self, GeometryError> {
        spindle.validate()?;
        self.spindle = spindle;
        Ok(self)
    }

    /// Segment index `i` such that `[times[i], times[i+1]]` contains `t`.
    fn segment(&self, t: f64) -> usize {
        let after = self.times.partition_point(|&wt| wt <= t);
        after.clamp(1, self.times.len() - 1) - 1
    }
}

impl Trajectory for WaypointPath {
    fn time_span(&self) -> (f64, f64) {
        (self.times[0], self.times[self.times.len() - 1])
    }

    fn pose_at(&self, t: f64) -> Result<ToolPose, RangeError> {
        check_span(t, self.time_span())?;
        let i = self.segment(t);
        let (t0, t1) = (self.times[i], self.times[i + 1]);
        let (p0, p1) = (self.points[i], self.points[i + 1]);
        let u = ((t - t0) / (t1 - t0)).clamp(0.0, 1.0);
        Ok(ToolPose::with_orientation(
            p0[0] + (p1[0] - p0[0]) * u,
            p0[1] + (p1[1] - p0[1]) * u,
            self.orientation,
        ))
    }

    fn velocity_at(&self, t: f64) -> Result<SlidingVelocity, RangeError> {
        check_span(t, self.time_span())?;
        let i = self.segment(t);
        let dt = self.times[i + 1] - self.times[i];
        let (p0, p1) = (self.points[i], self.points[i + 1]);
        Ok(SlidingVelocity {
            linear: Vec2::new((p1[0] - p0[0]) / dt, (p1[1] - p0[1]) / dt),
            spindle: self.spindle,
        })
    }

    fn clone_box(&self) -> Box<dyn Trajectory> {
        Box::new(self.clone())
    }
}
