//! Contact footprint computation.

use abrasim_math::GeometryError;
use abrasim_motion::ToolPose;
use abrasim_surface::WorkpieceSurface;
use rayon::prelude::*;

use crate::{SectionProperties, ToolShape};

/// One surface grid cell under the tool face.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FootprintCell {
    /// Grid column.
    pub ix: usize,
    /// Grid row.
    pub iy: usize,
    /// Flat grid index (`iy * nx + ix`).
    pub index: usize,
    /// Tool-frame X of the cell center.
    pub lx: f64,
    /// Tool-frame Y of the cell center.
    pub ly: f64,
    /// Fraction of the cell covered by the section, in `[0, 1]`.
    pub coverage: f64,
    /// Clearance between tool face and surface, zero at the highest
    /// contact point.
    pub gap: f64,
}

/// The tool-workpiece contact region for a single pose.
///
/// A value for one step only: once the surface mutates, gaps are stale.
/// Footprints are normally produced by
/// [`ToolShape::footprint`](crate::ToolShape::footprint).
#[derive(Debug, Clone)]
pub struct ContactFootprint {
    cells: Vec<FootprintCell>,
    cell_area: f64,
    covered_area: f64,
    section: SectionProperties,
}

impl ContactFootprint {
    /// Assemble a footprint from scanned cells.
    pub fn new(cells: Vec<FootprintCell>, cell_area: f64, section: SectionProperties) -> Self {
        let covered_area = cells.iter().map(|c| c.coverage).sum::<f64>() * cell_area;
        Self {
            cells,
            cell_area,
            covered_area,
            section,
        }
    }

    /// The covered cells, ordered by row then column.
    pub fn cells(&self) -> &[FootprintCell] {
        &self.cells
    }

    /// Number of covered cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether no cell is covered.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Area represented by one grid cell.
    pub fn cell_area(&self) -> f64 {
        self.cell_area
    }

    /// Discrete contact area: coverage-weighted sum of cell areas.
    pub fn covered_area(&self) -> f64 {
        self.covered_area
    }

    /// Analytic section properties of the tool that produced this
    /// footprint.
    pub fn section(&self) -> SectionProperties {
        self.section
    }

    /// Largest face-surface clearance over the footprint.
    pub fn max_gap(&self) -> f64 {
        self.cells.iter().map(|c| c.gap).fold(0.0, f64::max)
    }

    /// Coverage-weighted discrete integral of per-cell `values` over the
    /// contact area. `values` must parallel [`cells`](Self::cells).
    pub fn integrate(&self, values: &[f64]) -> f64 {
        debug_assert_eq!(values.len(), self.cells.len());
        self.cells
            .iter()
            .zip(values)
            .map(|(c, v)| v * c.coverage)
            .sum::<f64>()
            * self.cell_area
    }
}

/// Scan the surface grid for cells under the tool face.
pub(crate) fn scan<S: ToolShape + ?Sized>(
    shape: &S,
    pose: &ToolPose,
    surface: &WorkpieceSurface,
) -> Result<ContactFootprint, GeometryError> {
    if !pose.is_finite() {
        return Err(GeometryError::InvalidPose(format!(
            "pose ({}, {}, {}) has non-finite components",
            pose.x, pose.y, pose.orientation
        )));
    }

    let section = shape.section();
    let domain = surface.domain();
    let cell_area = domain.cell_area();
    let aa = shape
        .antialias_width()
        .unwrap_or_else(|| domain.dx().hypot(domain.dy()));

    // Pad the scan window by the ramp width so boundary cells keep their
    // partial coverage.
    let reach = shape.bounding_radius() + aa;
    let window = match domain.window(
        pose.x - reach,
        pose.y - reach,
        pose.x + reach,
        pose.y + reach,
    ) {
        Some(w) => w,
        None => return Ok(ContactFootprint::new(Vec::new(), cell_area, section)),
    };

    let crown = shape.crown();
    let mut cells: Vec<FootprintCell> = (window.iy0..=window.iy1)
        .into_par_iter()
        .flat_map_iter(|iy| {
            let mut row = Vec::new();
            for ix in window.ix0..=window.ix1 {
                let (x, y) = domain.xy_at(ix, iy);
                let (lx, ly) = pose.local(x, y);
                let d = shape.boundary_distance(lx, ly);
                let coverage = if aa > 0.0 {
                    ((aa - d) / (2.0 * aa)).clamp(0.0, 1.0)
                } else if d < 0.0 {
                    1.0
                } else {
                    0.0
                };
                if coverage > 0.0 {
                    row.push(FootprintCell {
                        ix,
                        iy,
                        index: domain.index(ix, iy),
                        lx,
                        ly,
                        coverage,
                        gap: crown.rise(lx, ly) - surface.height_at(ix, iy),
                    });
                }
            }
            row
        })
        .collect();

    // The rigid tool rests on the highest contact point: shift gaps so
    // the footprint minimum is exactly zero.
    let min_gap = cells.iter().map(|c| c.gap).fold(f64::INFINITY, f64::min);
    if min_gap.is_finite() {
        for cell in &mut cells {
            cell.gap -= min_gap;
        }
    }

    Ok(ContactFootprint::new(cells, cell_area, section))
}
