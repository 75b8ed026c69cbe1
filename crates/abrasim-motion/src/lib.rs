#![warn(missing_docs)]

//! Tool motion for abrasive-process simulation.
//!
//! A [`Trajectory`] maps simulated time to the tool's pose over the
//! workpiece and its sliding velocity. Sliding has two parts: the linear
//! motion of the tool center along its path, and the spin of the tool
//! head itself ([`Spindle`]), composed in quadrature per surface point.
//!
//! # Example
//!
//! ```
//! use abrasim_motion::{LinearPath, Spindle, Trajectory};
//!
//! let path = LinearPath::new([-5.0, 0.0], [2.0, 0.0], 5.0)
//!     .unwrap()
//!     .with_spindle(Spindle::Rotary { angular_speed: 30.0 })
//!     .unwrap();
//!
//! let pose = path.pose_at(2.5).unwrap();
//! assert!((pose.x - 0.0).abs() < 1e-12);
//! ```

use abrasim_math::{Tolerance, Vec2};
use serde::{Deserialize, Serialize};

mod error;
mod path;
mod spindle;

pub use error::RangeError;
pub use path::{LinearPath, OscillatingPath, WaypointPath};
pub use spindle::Spindle;

/// Position and orientation of the tool over the workpiece at one instant.
///
/// `orientation` is the rotation of the tool frame about the tool axis in
/// radians; it matters only for shapes without radial symmetry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToolPose {
    /// Tool center X in workpiece coordinates.
    pub x: f64,
    /// Tool center Y in workpiece coordinates.
    pub y: f64,
    /// Rotation of the tool frame in radians.
    pub orientation: f64,
}

impl ToolPose {
    /// Pose at `(x, y)` with zero orientation.
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            orientation: 0.0,
        }
    }

    /// Pose at `(x, y)` rotated by `orientation` radians.
    pub fn with_orientation(x: f64, y: f64, orientation: f64) -> Self {
        Self { x, y, orientation }
    }

    /// Map a workpiece-frame point into the tool frame.
    pub fn local(&self, x: f64, y: f64) -> (f64, f64) {
        let (dx, dy) = (x - self.x, y - self.y);
        let (s, c) = self.orientation.sin_cos();
        (c * dx + s * dy, -s * dx + c * dy)
    }

    /// Whether all pose components are finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.orientation.is_finite()
    }
}

/// Relative tool-workpiece sliding motion at one instant.
///
/// Evaluated lazily per surface point: the linear path speed is uniform
/// over the contact, the spindle contribution varies with tool-frame
/// radius for rotary and orbital drives.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlidingVelocity {
    /// Linear velocity of the tool center over the surface.
    pub linear: Vec2,
    /// Spin of the tool head.
    pub spindle: Spindle,
}

impl SlidingVelocity {
    /// Pure path motion with an idle tool head.
    pub fn linear_only(vx: f64, vy: f64) -> Self {
        Self {
            linear: Vec2::new(vx, vy),
            spindle: Spindle::Idle,
        }
    }

    /// Sliding speed magnitude at tool-frame coordinates `(lx, ly)`.
    ///
    /// Linear and spindle contributions compose in quadrature.
    pub fn speed_at(&self, lx: f64, ly: f64) -> f64 {
        (self.linear.norm_squared() + self.spindle.tangential_speed_squared(lx, ly)).sqrt()
    }
}

/// A tool path over the workpiece, parameterized by simulated time.
///
/// Implementations are pure: queries at the same time always return the
/// same pose and velocity. Queries outside [`time_span`](Self::time_span)
/// fail with [`RangeError`], with a small absolute tolerance at the
/// endpoints.
pub trait Trajectory: Send + Sync + std::fmt::Debug {
    /// Closed time interval `[start, end]` on which the path is defined.
    fn time_span(&self) -> (f64, f64);

    /// Tool pose at time `t`.
    fn pose_at(&self, t: f64) -> Result<ToolPose, RangeError>;

    /// Sliding velocity at time `t`.
    fn velocity_at(&self, t: f64) -> Result<SlidingVelocity, RangeError>;

    /// Clone into a boxed trait object.
    fn clone_box(&self) -> Box<dyn Trajectory>;
}

impl Clone for Box<dyn Trajectory> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Reject times outside the span, tolerating endpoint rounding.
pub(crate) fn check_span(t: f64, span: (f64, f64)) -> Result<(), RangeError> {
    let eps = Tolerance::DEFAULT.time_eps;
    if t < span.0 - eps || t > span.1 + eps || !t.is_finite() {
        return Err(RangeError::OutOfRange {
            t,
            start: span.0,
            end: span.1,
        });
    }
    Ok(())
}
