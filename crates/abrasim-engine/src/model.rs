//! Removal-rate laws.
//!
//! A [`RemovalModel`] converts a pressure field and the sliding speeds at
//! the same cells into a field of removal rates (depth per unit time).
//! The reference law is [`Preston`]'s equation `rate = kp * p * v`; the
//! other models modulate it for processes that deviate from linear wear.

use abrasim_contact::PressureField;
use abrasim_math::GeometryError;
use serde::{Deserialize, Serialize};

/// Default removal-rate floor in length units per unit time.
///
/// Rates below the floor are treated as numerical noise and clamped to
/// zero so that far-field antialiasing fringes do not accumulate material
/// loss over long runs.
pub const DEFAULT_RATE_FLOOR: f64 = 1e-12;

/// Workpiece material response under abrasive contact.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Preston coefficient `kp`: removed depth per unit pressure, per
    /// unit sliding distance.
    pub preston_coefficient: f64,
    /// Removal rates below this value clamp to zero.
    pub rate_floor: f64,
}

impl Material {
    /// Material with the given Preston coefficient and the default
    /// rate floor.
    pub fn new(preston_coefficient: f64) -> Self {
        Self {
            preston_coefficient,
            rate_floor: DEFAULT_RATE_FLOOR,
        }
    }

    /// Replaces the rate floor.
    pub fn with_rate_floor(mut self, rate_floor: f64) -> Self {
        self.rate_floor = rate_floor;
        self
    }

    /// Checks that the coefficients are finite and non-negative.
    pub fn validate(&self) -> Result<(), GeometryError> {
        if !(self.preston_coefficient.is_finite() && self.preston_coefficient >= 0.0) {
            return Err(GeometryError::InvalidParameter(format!(
                "preston coefficient must be finite and non-negative, got {}",
                self.preston_coefficient
            )));
        }
        if !(self.rate_floor.is_finite() && self.rate_floor >= 0.0) {
            return Err(GeometryError::InvalidParameter(format!(
                "rate floor must be finite and non-negative, got {}",
                self.rate_floor
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Per-cell fields
// ============================================================================

/// Sliding speeds at the cells of a footprint, in footprint order.
#[derive(Debug, Clone, PartialEq)]
pub struct VelocityField {
    values: Vec<f64>,
}

impl VelocityField {
    /// Wraps per-cell speed magnitudes.
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    /// Speed samples in footprint cell order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when the field has no samples.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Removal rates at the cells of a footprint, in footprint order.
#[derive(Debug, Clone, PartialEq)]
pub struct RemovalRateField {
    values: Vec<f64>,
}

impl RemovalRateField {
    /// Wraps per-cell removal rates.
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    /// Rate samples in footprint cell order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when the field has no samples.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// ============================================================================
// Removal models
// ============================================================================

/// Pluggable removal physics.
///
/// Implementations map pressure and sliding speed to a removal rate for
/// each contact cell. The returned field must be parallel to the inputs,
/// and rates must be non-negative and finite; the engine rejects fields
/// that are not.
pub trait RemovalModel: Send + Sync + std::fmt::Debug {
    /// Removal rate at every cell of the footprint.
    fn removal_rate(
        &self,
        pressure: &PressureField,
        velocity: &VelocityField,
        material: &Material,
    ) -> RemovalRateField;

    /// Clones the model into a box.
    fn clone_box(&self) -> Box<dyn RemovalModel>;
}

impl Clone for Box<dyn RemovalModel> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Clamps sub-floor rates to zero, passing non-finite values through for
/// the engine's own checks to report.
fn clamp_floor(rate: f64, floor: f64) -> f64 {
    if rate.is_finite() && rate < floor {
        0.0
    } else {
        rate
    }
}

/// Preston's linear wear law: `rate = kp * p * v`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Preston;

impl RemovalModel for Preston {
    fn removal_rate(
        &self,
        pressure: &PressureField,
        velocity: &VelocityField,
        material: &Material,
    ) -> RemovalRateField {
        debug_assert_eq!(pressure.len(), velocity.len());
        let kp = material.preston_coefficient;
        RemovalRateField::new(
            pressure
                .values()
                .iter()
                .zip(velocity.values())
                .map(|(p, v)| clamp_floor(kp * p * v, material.rate_floor))
                .collect(),
        )
    }

    fn clone_box(&self) -> Box<dyn RemovalModel> {
        Box::new(*self)
    }
}

/// Preston law with a pressure threshold below which no material yields.
///
/// Models brittle or coated workpieces where light contact burnishes
/// without removing stock.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdPreston {
    threshold: f64,
}

impl ThresholdPreston {
    /// Threshold model with the given cutoff pressure.
    pub fn new(threshold: f64) -> Result<Self, GeometryError> {
        if !(threshold.is_finite() && threshold >= 0.0) {
            return Err(GeometryError::InvalidParameter(format!(
                "pressure threshold must be finite and non-negative, got {threshold}"
            )));
        }
        Ok(Self { threshold })
    }

    /// Cutoff pressure below which the rate is zero.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

impl RemovalModel for ThresholdPreston {
    fn removal_rate(
        &self,
        pressure: &PressureField,
        velocity: &VelocityField,
        material: &Material,
    ) -> RemovalRateField {
        debug_assert_eq!(pressure.len(), velocity.len());
        let kp = material.preston_coefficient;
        RemovalRateField::new(
            pressure
                .values()
                .iter()
                .zip(velocity.values())
                .map(|(p, v)| {
                    if *p < self.threshold {
                        0.0
                    } else {
                        clamp_floor(kp * p * v, material.rate_floor)
                    }
                })
                .collect(),
        )
    }

    fn clone_box(&self) -> Box<dyn RemovalModel> {
        Box::new(*self)
    }
}

/// Power-law wear: `rate = kp * p^a * v^b`.
///
/// Exponents of 1 recover [`Preston`]. Sub-linear pressure exponents fit
/// pad-conditioning regimes where doubling the load does not double the
/// cut.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerLaw {
    pressure_exponent: f64,
    speed_exponent: f64,
}

impl PowerLaw {
    /// Power-law model with the given exponents, both strictly positive.
    pub fn new(pressure_exponent: f64, speed_exponent: f64) -> Result<Self, GeometryError> {
        if !(pressure_exponent.is_finite() && pressure_exponent > 0.0) {
            return Err(GeometryError::InvalidParameter(format!(
                "pressure exponent must be finite and positive, got {pressure_exponent}"
            )));
        }
        if !(speed_exponent.is_finite() && speed_exponent > 0.0) {
            return Err(GeometryError::InvalidParameter(format!(
                "speed exponent must be finite and positive, got {speed_exponent}"
            )));
        }
        Ok(Self {
            pressure_exponent,
            speed_exponent,
        })
    }

    /// Exponent applied to pressure.
    pub fn pressure_exponent(&self) -> f64 {
        self.pressure_exponent
    }

    /// Exponent applied to sliding speed.
    pub fn speed_exponent(&self) -> f64 {
        self.speed_exponent
    }
}

impl RemovalModel for PowerLaw {
    fn removal_rate(
        &self,
        pressure: &PressureField,
        velocity: &VelocityField,
        material: &Material,
    ) -> RemovalRateField {
        debug_assert_eq!(pressure.len(), velocity.len());
        let kp = material.preston_coefficient;
        RemovalRateField::new(
            pressure
                .values()
                .iter()
                .zip(velocity.values())
                .map(|(p, v)| {
                    let rate = kp * p.powf(self.pressure_exponent) * v.powf(self.speed_exponent);
                    clamp_floor(rate, material.rate_floor)
                })
                .collect(),
        )
    }

    fn clone_box(&self) -> Box<dyn RemovalModel> {
        Box::new(*self)
    }
}
