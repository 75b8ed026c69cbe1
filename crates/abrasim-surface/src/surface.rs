//! Mutable workpiece height field.

use abrasim_math::{GeometryError, NumericalError};
use serde::{Deserialize, Serialize};

use crate::SurfaceDomain;

/// Material removal for one grid cell in one step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RemovalCell {
    /// Flat grid index of the cell.
    pub index: usize,
    /// Depth of material to remove (non-negative).
    pub depth: f64,
}

/// The workpiece surface: a height field that only ever moves down.
///
/// Heights stay finite at all times. The single mutating operation is
/// [`apply_removal`](Self::apply_removal), which validates every depth
/// before touching the field, so a failed call leaves the surface
/// unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkpieceSurface {
    domain: SurfaceDomain,
    heights: Vec<f64>,
}

impl WorkpieceSurface {
    /// Create a surface at a constant initial height.
    pub fn new(domain: SurfaceDomain, initial_height: f64) -> Result<Self, GeometryError> {
        if !initial_height.is_finite() {
            return Err(GeometryError::InvalidDomain(format!(
                "initial height {initial_height} is not finite"
            )));
        }
        let heights = vec![initial_height; domain.sample_count()];
        Ok(Self { domain, heights })
    }

    /// Create a surface at height zero.
    pub fn flat(domain: SurfaceDomain) -> Self {
        let heights = vec![0.0; domain.sample_count()];
        Self { domain, heights }
    }

    /// The grid this surface lives on.
    pub fn domain(&self) -> &SurfaceDomain {
        &self.domain
    }

    /// Height at a grid index.
    pub fn height_at(&self, ix: usize, iy: usize) -> f64 {
        self.heights[self.domain.index(ix, iy)]
    }

    /// All heights, row-major (Y outer, X inner).
    pub fn heights(&self) -> &[f64] {
        &self.heights
    }

    /// Lowest height on the surface.
    pub fn min_height(&self) -> f64 {
        self.heights.iter().copied().fold(f64::INFINITY, f64::min)
    }

    /// Highest height on the surface.
    pub fn max_height(&self) -> f64 {
        self.heights
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Bilinear height at an arbitrary position, `None` outside the bounds.
    pub fn interpolate(&self, x: f64, y: f64) -> Option<f64> {
        if !self.domain.contains(x, y) {
            return None;
        }

        let bounds = self.domain.bounds();
        let (nx, ny) = (self.domain.nx(), self.domain.ny());
        let fx = (x - bounds[0]) / self.domain.dx();
        let fy = (y - bounds[1]) / self.domain.dy();

        let ix0 = (fx.floor() as usize).min(nx - 1);
        let iy0 = (fy.floor() as usize).min(ny - 1);
        let ix1 = (ix0 + 1).min(nx - 1);
        let iy1 = (iy0 + 1).min(ny - 1);

        let tx = fx - ix0 as f64;
        let ty = fy - iy0 as f64;

        let z00 = self.height_at(ix0, iy0);
        let z10 = self.height_at(ix1, iy0);
        let z01 = self.height_at(ix0, iy1);
        let z11 = self.height_at(ix1, iy1);

        let z0 = z00 * (1.0 - tx) + z10 * tx;
        let z1 = z01 * (1.0 - tx) + z11 * tx;
        Some(z0 * (1.0 - ty) + z1 * ty)
    }

    /// Remove material from the listed cells.
    ///
    /// Every depth must be finite and non-negative; all cells are
    /// validated before any height changes. Returns the volume removed
    /// by this call (`sum of depth * cell_area`).
    pub fn apply_removal(&mut self, cells: &[RemovalCell]) -> Result<f64, NumericalError> {
        let nx = self.domain.nx();
        for cell in cells {
            let (ix, iy) = (cell.index % nx, cell.index / nx);
            if !cell.depth.is_finite() {
                return Err(NumericalError::NonFinite {
                    quantity: "removal depth",
                    detail: format!("cell ({ix}, {iy})"),
                });
            }
            if cell.depth < 0.0 {
                return Err(NumericalError::NegativeRemoval {
                    amount: cell.depth,
                    ix,
                    iy,
                });
            }
        }

        let mut depth_sum = 0.0;
        for cell in cells {
            self.heights[cell.index] -= cell.depth;
            depth_sum += cell.depth;
        }
        Ok(depth_sum * self.domain.cell_area())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_surface() -> WorkpieceSurface {
        let domain = SurfaceDomain::new(11, 11, [0.0, 0.0, 10.0, 10.0]).unwrap();
        WorkpieceSurface::flat(domain)
    }

    #[test]
    fn test_new_rejects_non_finite_height() {
        let domain = SurfaceDomain::new(4, 4, [0.0, 0.0, 1.0, 1.0]).unwrap();
        assert!(WorkpieceSurface::new(domain, f64::INFINITY).is_err());
    }

    #[test]
    fn test_apply_removal_lowers_and_accounts() {
        let mut surface = test_surface();
        let idx = surface.domain().index(5, 5);
        let volume = surface
            .apply_removal(&[RemovalCell {
                index: idx,
                depth: 0.25,
            }])
            .unwrap();
        assert!((surface.height_at(5, 5) + 0.25).abs() < 1e-12);
        // cell_area = 1.0 for this grid
        assert!((volume - 0.25).abs() < 1e-12);
        assert!((surface.height_at(0, 0)).abs() < 1e-12);
    }

    #[test]
    fn test_apply_removal_rejects_negative_depth() {
        let mut surface = test_surface();
        let idx = surface.domain().index(2, 3);
        let err = surface
            .apply_removal(&[RemovalCell {
                index: idx,
                depth: -0.1,
            }])
            .unwrap_err();
        assert!(matches!(
            err,
            NumericalError::NegativeRemoval { ix: 2, iy: 3, .. }
        ));
    }

    #[test]
    fn test_failed_removal_leaves_surface_unchanged() {
        let mut surface = test_surface();
        let good = RemovalCell {
            index: surface.domain().index(1, 1),
            depth: 0.5,
        };
        let bad = RemovalCell {
            index: surface.domain().index(2, 2),
            depth: f64::NAN,
        };
        assert!(surface.apply_removal(&[good, bad]).is_err());
        assert!((surface.height_at(1, 1)).abs() < 1e-12);
    }

    #[test]
    fn test_heights_never_increase() {
        let mut surface = test_surface();
        let cells: Vec<RemovalCell> = (0..surface.domain().sample_count())
            .map(|index| RemovalCell {
                index,
                depth: 0.01 * (index % 7) as f64,
            })
            .collect();
        let before = surface.heights().to_vec();
        surface.apply_removal(&cells).unwrap();
        for (b, a) in before.iter().zip(surface.heights()) {
            assert!(a <= b);
        }
    }

    #[test]
    fn test_interpolate_on_ramp() {
        let domain = SurfaceDomain::new(11, 11, [0.0, 0.0, 10.0, 10.0]).unwrap();
        let mut surface = WorkpieceSurface::flat(domain);
        // Build a unit-slope ramp in x by removing more on the left.
        let cells: Vec<RemovalCell> = (0..surface.domain().sample_count())
            .map(|index| {
                let ix = index % 11;
                RemovalCell {
                    index,
                    depth: 10.0 - ix as f64,
                }
            })
            .collect();
        surface.apply_removal(&cells).unwrap();
        let z = surface.interpolate(2.5, 5.0).unwrap();
        assert!((z - (-7.5)).abs() < 1e-12);
        assert!(surface.interpolate(-1.0, 5.0).is_none());
    }

    #[test]
    fn test_serde_round_trip() {
        let mut surface = test_surface();
        surface
            .apply_removal(&[RemovalCell {
                index: 17,
                depth: 0.125,
            }])
            .unwrap();
        let json = serde_json::to_string(&surface).unwrap();
        let back: WorkpieceSurface = serde_json::from_str(&json).unwrap();
        assert_eq!(back.heights(), surface.heights());
        assert_eq!(back.domain(), surface.domain());
    }
}
