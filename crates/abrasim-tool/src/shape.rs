//! Tool cross-sections and face geometry.

use std::f64::consts::PI;

use abrasim_math::GeometryError;
use abrasim_motion::ToolPose;
use abrasim_surface::WorkpieceSurface;
use serde::{Deserialize, Serialize};

use crate::ContactFootprint;

/// Analytic properties of a tool cross-section.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectionProperties {
    /// Cross-section area.
    pub area: f64,
    /// Second moment of area about the tool-frame X axis (often `Ix`).
    pub second_moment_x: f64,
    /// Second moment of area about the tool-frame Y axis (often `Iy`).
    pub second_moment_y: f64,
}

/// Curvature of the tool face, as a paraboloid rise from the face center.
///
/// The face sits `rise(lx, ly) = (kx*lx^2 + ky*ly^2) / 2` above its
/// lowest point; a flat face has both curvatures zero. Crowned faces only
/// matter to gap-sensitive pressure distributions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Crown {
    /// Curvature along the tool-frame X axis (1/length).
    pub kx: f64,
    /// Curvature along the tool-frame Y axis (1/length).
    pub ky: f64,
}

impl Crown {
    /// A perfectly flat face.
    pub const FLAT: Self = Self { kx: 0.0, ky: 0.0 };

    /// Create a crown, rejecting non-finite curvatures.
    pub fn new(kx: f64, ky: f64) -> Result<Self, GeometryError> {
        if !(kx.is_finite() && ky.is_finite()) {
            return Err(GeometryError::InvalidShape(format!(
                "crown curvatures ({kx}, {ky}) must be finite"
            )));
        }
        Ok(Self { kx, ky })
    }

    /// Whether the face is flat.
    pub fn is_flat(&self) -> bool {
        self.kx == 0.0 && self.ky == 0.0
    }

    /// Face height above its lowest point at tool-frame `(lx, ly)`.
    pub fn rise(&self, lx: f64, ly: f64) -> f64 {
        (self.kx * lx * lx + self.ky * ly * ly) / 2.0
    }
}

/// A tool cross-section pressed face-down onto the workpiece.
///
/// Implementations describe the section through a signed boundary
/// distance in the tool frame plus analytic section properties; the
/// footprint computation is shared.
pub trait ToolShape: Send + Sync + std::fmt::Debug {
    /// Analytic area and second moments of the full cross-section.
    fn section(&self) -> SectionProperties;

    /// Radius of the smallest circle about the tool axis containing the
    /// cross-section.
    fn bounding_radius(&self) -> f64;

    /// Signed distance from tool-frame `(lx, ly)` to the section
    /// boundary: negative inside, positive outside.
    fn boundary_distance(&self, lx: f64, ly: f64) -> f64;

    /// Face curvature. Flat unless overridden.
    fn crown(&self) -> Crown {
        Crown::FLAT
    }

    /// Edge-coverage ramp width. `None` selects the grid diagonal
    /// `hypot(dx, dy)`; `Some(0.0)` disables antialiasing.
    fn antialias_width(&self) -> Option<f64> {
        None
    }

    /// Cells of `surface` under the tool face at `pose`, clipped to the
    /// surface domain. An empty footprint is a valid result; only a
    /// non-finite pose is an error.
    fn footprint(
        &self,
        pose: &ToolPose,
        surface: &WorkpieceSurface,
    ) -> Result<ContactFootprint, GeometryError> {
        crate::footprint::scan(self, pose, surface)
    }

    /// Clone into a boxed trait object.
    fn clone_box(&self) -> Box<dyn ToolShape>;
}

impl Clone for Box<dyn ToolShape> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

// =============================================================================
// Round
// =============================================================================

/// A round pad or disc tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Round {
    radius: f64,
    crown: Crown,
    antialias: Option<f64>,
}

impl Round {
    /// Create a round tool of the given radius.
    pub fn new(radius: f64) -> Result<Self, GeometryError> {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(GeometryError::InvalidShape(format!(
                "round tool radius {radius} must be positive and finite"
            )));
        }
        Ok(Self {
            radius,
            crown: Crown::FLAT,
            antialias: None,
        })
    }

    /// Give the face a paraboloid crown.
    pub fn with_crown(mut self, kx: f64, ky: f64) -> Result<Self, GeometryError> {
        self.crown = Crown::new(kx, ky)?;
        Ok(self)
    }

    /// Override the edge-coverage ramp width (`0.0` disables).
    pub fn with_antialias(mut self, width: f64) -> Result<Self, GeometryError> {
        if !(width.is_finite() && width >= 0.0) {
            return Err(GeometryError::InvalidShape(format!(
                "antialias width {width} must be non-negative and finite"
            )));
        }
        self.antialias = Some(width);
        Ok(self)
    }

    /// Tool radius.
    pub fn radius(&self) -> f64 {
        self.radius
    }
}

impl ToolShape for Round {
    fn section(&self) -> SectionProperties {
        let r2 = self.radius * self.radius;
        let moment = PI * r2 * r2 / 4.0;
        SectionProperties {
            area: PI * r2,
            second_moment_x: moment,
            second_moment_y: moment,
        }
    }

    fn bounding_radius(&self) -> f64 {
        self.radius
    }

    fn boundary_distance(&self, lx: f64, ly: f64) -> f64 {
        lx.hypot(ly) - self.radius
    }

    fn crown(&self) -> Crown {
        self.crown
    }

    fn antialias_width(&self) -> Option<f64> {
        self.antialias
    }

    fn clone_box(&self) -> Box<dyn ToolShape> {
        Box::new(self.clone())
    }
}

// =============================================================================
// Rectangular
// =============================================================================

/// A rectangular pad tool, axis-aligned in the tool frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rectangular {
    width: f64,
    height: f64,
    crown: Crown,
    antialias: Option<f64>,
}

impl Rectangular {
    /// Create a rectangular tool, `width` along tool-frame X and
    /// `height` along tool-frame Y.
    pub fn new(width: f64, height: f64) -> Result<Self, GeometryError> {
        if !(width.is_finite() && width > 0.0 && height.is_finite() && height > 0.0) {
            return Err(GeometryError::InvalidShape(format!(
                "rectangular tool {width} by {height} must have positive finite sides"
            )));
        }
        Ok(Self {
            width,
            height,
            crown: Crown::FLAT,
            antialias: None,
        })
    }

    /// Create a square tool with the given side length.
    pub fn square(width: f64) -> Result<Self, GeometryError> {
        Self::new(width, width)
    }

    /// Give the face a paraboloid crown.
    pub fn with_crown(mut self, kx: f64, ky: f64) -> Result<Self, GeometryError> {
        self.crown = Crown::new(kx, ky)?;
        Ok(self)
    }

    /// Override the edge-coverage ramp width (`0.0` disables).
    pub fn with_antialias(mut self, width: f64) -> Result<Self, GeometryError> {
        if !(width.is_finite() && width >= 0.0) {
            return Err(GeometryError::InvalidShape(format!(
                "antialias width {width} must be non-negative and finite"
            )));
        }
        self.antialias = Some(width);
        Ok(self)
    }

    /// Side length along tool-frame X.
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Side length along tool-frame Y.
    pub fn height(&self) -> f64 {
        self.height
    }
}

impl ToolShape for Rectangular {
    fn section(&self) -> SectionProperties {
        let (w, h) = (self.width, self.height);
        SectionProperties {
            area: w * h,
            second_moment_x: w * h * h * h / 12.0,
            second_moment_y: w * w * w * h / 12.0,
        }
    }

    fn bounding_radius(&self) -> f64 {
        self.width.hypot(self.height) / 2.0
    }

    fn boundary_distance(&self, lx: f64, ly: f64) -> f64 {
        // Box SDF: exact outside the corners, exact inside.
        let dx = lx.abs() - self.width / 2.0;
        let dy = ly.abs() - self.height / 2.0;
        let outside = (dx.max(0.0).powi(2) + dy.max(0.0).powi(2)).sqrt();
        let inside = dx.max(dy).min(0.0);
        outside + inside
    }

    fn crown(&self) -> Crown {
        self.crown
    }

    fn antialias_width(&self) -> Option<f64> {
        self.antialias
    }

    fn clone_box(&self) -> Box<dyn ToolShape> {
        Box::new(self.clone())
    }
}
