//! Elastic-foundation contact.

use abrasim_tool::ContactFootprint;
use serde::{Deserialize, Serialize};

use crate::{validate_inputs, ContactError, PressureDistribution, PressureField};

const MAX_ITERATIONS: usize = 128;

/// Elastic layer ("mattress") between a possibly crowned tool face and
/// the surface.
///
/// Each cell acts as an independent spring: `p = k * max(0, delta - gap)`
/// where `delta` is the tool's approach toward the surface. The approach
/// is solved by bisection on the monotone total-force function until the
/// field carries the applied load; cells whose gap exceeds the approach
/// carry nothing, so the pressure support can be smaller than the
/// footprint. A flat face on a flat surface reduces to the uniform
/// distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElasticFoundation {
    stiffness: f64,
}

impl ElasticFoundation {
    /// Create a foundation with the given stiffness (pressure per unit
    /// penetration).
    pub fn new(stiffness: f64) -> Result<Self, ContactError> {
        if !(stiffness.is_finite() && stiffness > 0.0) {
            return Err(ContactError::InvalidStiffness(stiffness));
        }
        Ok(Self { stiffness })
    }

    /// Foundation stiffness.
    pub fn stiffness(&self) -> f64 {
        self.stiffness
    }

    /// Total carried force at approach `delta`.
    fn force_at(&self, footprint: &ContactFootprint, delta: f64) -> f64 {
        self.stiffness
            * footprint
                .cells()
                .iter()
                .map(|c| (delta - c.gap).max(0.0) * c.coverage)
                .sum::<f64>()
            * footprint.cell_area()
    }
}

impl PressureDistribution for ElasticFoundation {
    fn pressure(
        &self,
        footprint: &ContactFootprint,
        normal_load: f64,
    ) -> Result<PressureField, ContactError> {
        validate_inputs(footprint, normal_load)?;
        if footprint.is_empty() || normal_load == 0.0 {
            return Ok(PressureField::new(vec![0.0; footprint.len()]));
        }

        // At hi the approach exceeds every gap, so the carried force is
        // at least k * covered_area * (hi - max_gap) = load: a bracket.
        let mut lo = 0.0_f64;
        let mut hi = footprint.max_gap() + normal_load / (self.stiffness * footprint.covered_area());
        for _ in 0..MAX_ITERATIONS {
            if hi - lo <= f64::EPSILON * hi.max(1.0) {
                break;
            }
            let mid = 0.5 * (lo + hi);
            if self.force_at(footprint, mid) < normal_load {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        let delta = 0.5 * (lo + hi);

        let mut values: Vec<f64> = footprint
            .cells()
            .iter()
            .map(|c| self.stiffness * (delta - c.gap).max(0.0))
            .collect();

        // Scale multiplicatively to exact balance; keeps the support and
        // the pressure shape.
        let integrated = footprint.integrate(&values);
        if !(integrated.is_finite() && integrated > 0.0) {
            return Err(ContactError::NoConvergence {
                iterations: MAX_ITERATIONS,
            });
        }
        let scale = normal_load / integrated;
        for v in &mut values {
            *v *= scale;
        }
        Ok(PressureField::new(values))
    }

    fn clone_box(&self) -> Box<dyn PressureDistribution> {
        Box::new(*self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Uniform;
    use abrasim_math::Tolerance;
    use abrasim_motion::ToolPose;
    use abrasim_surface::{SurfaceDomain, WorkpieceSurface};
    use abrasim_tool::{Round, ToolShape};
    use approx::assert_relative_eq;

    #[test]
    fn test_invalid_stiffness_rejected() {
        assert!(matches!(
            ElasticFoundation::new(0.0),
            Err(ContactError::InvalidStiffness(_))
        ));
        assert!(ElasticFoundation::new(-5.0).is_err());
        assert!(ElasticFoundation::new(f64::NAN).is_err());
        assert!(ElasticFoundation::new(1e7).is_ok());
    }

    #[test]
    fn test_flat_face_reduces_to_uniform() {
        let domain = SurfaceDomain::centered(20.0, 20.0, 0.25).unwrap();
        let surface = WorkpieceSurface::flat(domain);
        let fp = Round::new(3.0)
            .unwrap()
            .footprint(&ToolPose::new(0.0, 0.0), &surface)
            .unwrap();

        let elastic = ElasticFoundation::new(1e6)
            .unwrap()
            .pressure(&fp, 15.0)
            .unwrap();
        let uniform = Uniform.pressure(&fp, 15.0).unwrap();
        for (a, b) in elastic.values().iter().zip(uniform.values()) {
            assert_relative_eq!(*a, *b, max_relative = 1e-6);
        }
    }

    #[test]
    fn test_crowned_face_balances_at_multiple_loads() {
        // Crowned lapping pad on a fine grid, in the original process
        // scale: 0.2 x 0.2 domain, curvatures (0.2, 0.4), stiffness 1e7.
        let domain = SurfaceDomain::centered(0.2, 0.2, 0.002).unwrap();
        let surface = WorkpieceSurface::flat(domain);
        let fp = Round::new(0.08)
            .unwrap()
            .with_crown(0.2, 0.4)
            .unwrap()
            .footprint(&ToolPose::new(0.0, 0.0), &surface)
            .unwrap();
        let model = ElasticFoundation::new(1e7).unwrap();

        for load in [5.0, 20.0, 60.0] {
            let field = model.pressure(&fp, load).unwrap();
            assert!(Tolerance::DEFAULT.force_balanced(field.integrate(&fp), load));
            assert!(field.values().iter().all(|p| *p >= 0.0));
        }
    }

    #[test]
    fn test_light_load_contact_patch_is_smaller_than_footprint() {
        let domain = SurfaceDomain::centered(0.2, 0.2, 0.002).unwrap();
        let surface = WorkpieceSurface::flat(domain);
        let fp = Round::new(0.08)
            .unwrap()
            .with_crown(0.2, 0.4)
            .unwrap()
            .footprint(&ToolPose::new(0.0, 0.0), &surface)
            .unwrap();
        let field = ElasticFoundation::new(1e7)
            .unwrap()
            .pressure(&fp, 5.0)
            .unwrap();

        let loaded = field.values().iter().filter(|p| **p > 0.0).count();
        assert!(loaded > 0);
        assert!(loaded < fp.len() / 2);
        // Pressure concentrates where the crown sits lowest.
        let center_idx = fp
            .cells()
            .iter()
            .position(|c| c.lx.abs() < 1e-9 && c.ly.abs() < 1e-9)
            .unwrap();
        assert_relative_eq!(field.values()[center_idx], field.peak(), max_relative = 1e-9);
    }

    #[test]
    fn test_deeper_approach_under_heavier_load() {
        let domain = SurfaceDomain::centered(0.2, 0.2, 0.002).unwrap();
        let surface = WorkpieceSurface::flat(domain);
        let fp = Round::new(0.08)
            .unwrap()
            .with_crown(0.2, 0.4)
            .unwrap()
            .footprint(&ToolPose::new(0.0, 0.0), &surface)
            .unwrap();
        let model = ElasticFoundation::new(1e7).unwrap();

        let light = model.pressure(&fp, 5.0).unwrap();
        let heavy = model.pressure(&fp, 60.0).unwrap();
        let light_loaded = light.values().iter().filter(|p| **p > 0.0).count();
        let heavy_loaded = heavy.values().iter().filter(|p| **p > 0.0).count();
        assert!(heavy_loaded > light_loaded);
        assert!(heavy.peak() > light.peak());
    }
}
