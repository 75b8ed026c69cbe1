//! Immutable grid description for workpiece surfaces.

use abrasim_math::GeometryError;
use serde::{Deserialize, Serialize};

/// An inclusive index window into a surface grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridWindow {
    /// First column.
    pub ix0: usize,
    /// Last column (inclusive).
    pub ix1: usize,
    /// First row.
    pub iy0: usize,
    /// Last row (inclusive).
    pub iy1: usize,
}

/// Immutable description of a workpiece surface grid.
///
/// Sample counts and bounds are fixed at construction. Samples are
/// node-based: `nx` samples span `[min_x, max_x]` inclusive, so the
/// spacing is `(max_x - min_x) / (nx - 1)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceDomain {
    nx: usize,
    ny: usize,
    bounds: [f64; 4],
}

impl SurfaceDomain {
    /// Create a grid with `nx` by `ny` samples over
    /// `bounds = [min_x, min_y, max_x, max_y]`.
    pub fn new(nx: usize, ny: usize, bounds: [f64; 4]) -> Result<Self, GeometryError> {
        if nx < 2 || ny < 2 {
            return Err(GeometryError::InvalidDomain(format!(
                "need at least 2 samples per axis, got {nx}x{ny}"
            )));
        }
        if !bounds.iter().all(|b| b.is_finite()) {
            return Err(GeometryError::InvalidDomain(format!(
                "non-finite bounds {bounds:?}"
            )));
        }
        if bounds[2] <= bounds[0] || bounds[3] <= bounds[1] {
            return Err(GeometryError::InvalidDomain(format!(
                "empty or inverted bounds {bounds:?}"
            )));
        }
        Ok(Self { nx, ny, bounds })
    }

    /// Create a grid centered on the origin with side lengths
    /// `size_x` by `size_y` and sample spacing close to `resolution`.
    pub fn centered(size_x: f64, size_y: f64, resolution: f64) -> Result<Self, GeometryError> {
        if !(size_x.is_finite() && size_x > 0.0 && size_y.is_finite() && size_y > 0.0) {
            return Err(GeometryError::InvalidDomain(format!(
                "side lengths must be positive and finite, got {size_x} by {size_y}"
            )));
        }
        if !(resolution.is_finite() && resolution > 0.0) {
            return Err(GeometryError::InvalidDomain(format!(
                "resolution must be positive and finite, got {resolution}"
            )));
        }
        let nx = ((size_x / resolution).round() as usize + 1).max(2);
        let ny = ((size_y / resolution).round() as usize + 1).max(2);
        Self::new(
            nx,
            ny,
            [-size_x / 2.0, -size_y / 2.0, size_x / 2.0, size_y / 2.0],
        )
    }

    /// Number of samples in X.
    pub fn nx(&self) -> usize {
        self.nx
    }

    /// Number of samples in Y.
    pub fn ny(&self) -> usize {
        self.ny
    }

    /// Total number of samples.
    pub fn sample_count(&self) -> usize {
        self.nx * self.ny
    }

    /// Bounding box `[min_x, min_y, max_x, max_y]`.
    pub fn bounds(&self) -> [f64; 4] {
        self.bounds
    }

    /// Sample spacing in X.
    pub fn dx(&self) -> f64 {
        (self.bounds[2] - self.bounds[0]) / (self.nx - 1) as f64
    }

    /// Sample spacing in Y.
    pub fn dy(&self) -> f64 {
        (self.bounds[3] - self.bounds[1]) / (self.ny - 1) as f64
    }

    /// Area represented by one grid sample.
    pub fn cell_area(&self) -> f64 {
        self.dx() * self.dy()
    }

    /// The (x, y) coordinates of a grid index.
    pub fn xy_at(&self, ix: usize, iy: usize) -> (f64, f64) {
        let x = self.bounds[0] + ix as f64 * self.dx();
        let y = self.bounds[1] + iy as f64 * self.dy();
        (x, y)
    }

    /// Flat index for `(ix, iy)` (row-major, Y outer, X inner).
    pub fn index(&self, ix: usize, iy: usize) -> usize {
        iy * self.nx + ix
    }

    /// Whether a point lies within the bounds.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.bounds[0] && x <= self.bounds[2] && y >= self.bounds[1] && y <= self.bounds[3]
    }

    /// Index window covering an axis-aligned rectangle, clamped to the
    /// grid. Returns `None` when the rectangle misses the domain.
    pub fn window(&self, min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Option<GridWindow> {
        if max_x < self.bounds[0]
            || min_x > self.bounds[2]
            || max_y < self.bounds[1]
            || min_y > self.bounds[3]
        {
            return None;
        }
        let ix0 = ((min_x - self.bounds[0]) / self.dx()).floor().max(0.0) as usize;
        let iy0 = ((min_y - self.bounds[1]) / self.dy()).floor().max(0.0) as usize;
        let ix1 = (((max_x - self.bounds[0]) / self.dx()).ceil() as usize).min(self.nx - 1);
        let iy1 = (((max_y - self.bounds[1]) / self.dy()).ceil() as usize).min(self.ny - 1);
        Some(GridWindow { ix0, ix1, iy0, iy1 })
    }
}
