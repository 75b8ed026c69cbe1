//! Rigid-pad pressure distributions.

use abrasim_tool::ContactFootprint;
use serde::{Deserialize, Serialize};

use crate::{validate_inputs, ContactError, PressureDistribution, PressureField};

/// Tilt below this fraction of the mean pressure counts as rounding, not
/// lift-off.
const LIFT_OFF_REL_TOL: f64 = 1e-9;

// =============================================================================
// Uniform
// =============================================================================

/// Even load sharing over the discrete contact area.
///
/// `p = load / covered_area` on every cell, so the coverage-weighted
/// integral matches the load exactly on any grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Uniform;

impl PressureDistribution for Uniform {
    fn pressure(
        &self,
        footprint: &ContactFootprint,
        normal_load: f64,
    ) -> Result<PressureField, ContactError> {
        validate_inputs(footprint, normal_load)?;
        if footprint.is_empty() || normal_load == 0.0 {
            return Ok(PressureField::new(vec![0.0; footprint.len()]));
        }
        let p = normal_load / footprint.covered_area();
        Ok(PressureField::new(vec![p; footprint.len()]))
    }

    fn clone_box(&self) -> Box<dyn PressureDistribution> {
        Box::new(*self)
    }
}

// =============================================================================
// RigidPad
// =============================================================================

/// Rigid flat pad under a normal load and optional tilting torques.
///
/// The load spreads evenly; torques about the tool-frame axes tilt the
/// pressure plane using the section's analytic second moments:
/// `p = load/A + lx*Ty/Iy - ly*Tx/Ix`. The discrete residual of the tilt
/// terms is corrected additively so the integral stays exact. Tilt strong
/// enough to demand negative pressure means the pad lifts off, which is
/// a [`ContactError::LiftOff`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RigidPad {
    /// Torque about the tool-frame X axis.
    pub torque_x: f64,
    /// Torque about the tool-frame Y axis.
    pub torque_y: f64,
}

impl RigidPad {
    /// Pad with no applied torque.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pad tilted by torques about the tool-frame X and Y axes.
    pub fn with_torque(torque_x: f64, torque_y: f64) -> Self {
        Self { torque_x, torque_y }
    }
}

impl PressureDistribution for RigidPad {
    fn pressure(
        &self,
        footprint: &ContactFootprint,
        normal_load: f64,
    ) -> Result<PressureField, ContactError> {
        validate_inputs(footprint, normal_load)?;
        if footprint.is_empty() || normal_load == 0.0 {
            return Ok(PressureField::new(vec![0.0; footprint.len()]));
        }

        let section = footprint.section();
        let base = normal_load / footprint.covered_area();
        let mut values: Vec<f64> = footprint
            .cells()
            .iter()
            .map(|c| {
                base + c.lx * self.torque_y / section.second_moment_y
                    - c.ly * self.torque_x / section.second_moment_x
            })
            .collect();

        // The tilt terms integrate to zero over the analytic section but
        // not over the clipped, discretized footprint.
        let residual = (normal_load - footprint.integrate(&values)) / footprint.covered_area();
        for v in &mut values {
            *v += residual;
        }

        let min_pressure = values.iter().copied().fold(f64::INFINITY, f64::min);
        if min_pressure < -LIFT_OFF_REL_TOL * base {
            return Err(ContactError::LiftOff { min_pressure });
        }
        for v in &mut values {
            if *v < 0.0 {
                *v = 0.0;
            }
        }
        Ok(PressureField::new(values))
    }

    fn clone_box(&self) -> Box<dyn PressureDistribution> {
        Box::new(*self)
    }
}
