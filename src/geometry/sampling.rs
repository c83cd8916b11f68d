//! Grid-sampled containment and overlap.

use crate::engine::deadline::{Deadline, DeadlineExceeded};
use crate::geometry::distance::{self, NearestPoint};
use crate::geometry::polygon::{point_in_polygons, BoundingBox};
use crate::model::{GeometryGrid, Structure};

/// Sample strides derived from the grid size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplingStride {
    /// Column and row stride
    pub xy: u32,
    /// Slice stride
    pub z: u32,
}

impl SamplingStride {
    pub fn for_grid(grid: &GeometryGrid) -> Self {
        SamplingStride {
            xy: (grid.size.x / 120).max(1),
            z: (grid.size.z / 60).max(1),
        }
    }

    pub fn samples_slice(&self, slice: u32) -> bool {
        slice % self.z == 0
    }
}

/// Sampled voxel indices covering `[lo, hi]` (fractional indices), clamped to
/// `[0, limit)` and aligned to multiples of `step`.
fn sampled_indices(lo: f64, hi: f64, limit: u32, step: u32) -> impl Iterator<Item = u32> {
    let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
    let empty = limit == 0 || !lo.is_finite() || !hi.is_finite() || hi < 0.0;
    let first = lo.ceil().max(0.0).min(f64::from(u32::MAX)) as u32;
    let first = first.div_ceil(step).saturating_mul(step);
    let last = if empty {
        0
    } else {
        (hi.floor().min(f64::from(limit - 1))) as u32
    };
    let (first, last) = if empty || first > last { (1, 0) } else { (first, last) };
    (first..=last).step_by(step as usize)
}

/// Sampling-based geometry over one image grid.
#[derive(Debug, Clone, Copy)]
pub struct SpatialEngine<'a> {
    grid: &'a GeometryGrid,
    stride: SamplingStride,
    deadline: Deadline,
    index_threshold: usize,
}

impl<'a> SpatialEngine<'a> {
    pub fn new(grid: &'a GeometryGrid) -> Self {
        SpatialEngine {
            grid,
            stride: SamplingStride::for_grid(grid),
            deadline: Deadline::none(),
            index_threshold: usize::MAX,
        }
    }

    pub fn with_deadline(mut self, deadline: Deadline) -> Self {
        self.deadline = deadline;
        self
    }

    /// Vertex-pair count above which `min_distance` uses an R-tree.
    pub fn with_index_threshold(mut self, threshold: usize) -> Self {
        self.index_threshold = threshold;
        self
    }

    pub fn grid(&self) -> &GeometryGrid {
        self.grid
    }

    pub fn stride(&self) -> SamplingStride {
        self.stride
    }

    /// Sampled slices of `structure` that lie inside the grid.
    fn sampled_slices<'s>(&self, structure: &'s Structure) -> impl Iterator<Item = u32> + 's {
        let stride = self.stride;
        let grid = *self.grid;
        structure
            .contours_by_slice
            .keys()
            .copied()
            .filter(move |&slice| {
                if !grid.contains_slice(slice) {
                    tracing::trace!(slice, depth = grid.size.z, "contour slice outside image grid");
                    return false;
                }
                stride.samples_slice(slice)
            })
    }

    /// Visit sampled grid points inside `bbox`; stops at the first point for
    /// which `hit` returns true.
    fn any_sample(&self, bbox: &BoundingBox, mut hit: impl FnMut(f64, f64) -> bool) -> bool {
        let grid = self.grid;
        let step = self.stride.xy;
        let cols = sampled_indices(
            grid.column_of(bbox.min_x),
            grid.column_of(bbox.max_x),
            grid.size.x,
            step,
        );
        for i in cols {
            let x = grid.x_at(i);
            let rows = sampled_indices(
                grid.row_of(bbox.min_y),
                grid.row_of(bbox.max_y),
                grid.size.y,
                step,
            );
            for j in rows {
                if hit(x, grid.y_at(j)) {
                    return true;
                }
            }
        }
        false
    }

    /// Whether every sampled point of `inner` lies inside `outer`.
    ///
    /// Vacuously true when either structure is empty or lacks a segment model.
    pub fn is_contained(
        &self,
        inner: &Structure,
        outer: &Structure,
    ) -> Result<bool, DeadlineExceeded> {
        if !inner.has_segment || !outer.has_segment || inner.is_empty() || outer.is_empty() {
            return Ok(true);
        }

        let mut visited = 0usize;
        for slice in self.sampled_slices(inner) {
            self.deadline.check()?;
            let inner_polys = inner.contours_on(slice);
            let Some(bbox) = BoundingBox::of(inner_polys) else {
                continue;
            };
            let outer_polys = outer.contours_on(slice);
            let violated = self.any_sample(&bbox, |x, y| {
                visited += 1;
                point_in_polygons(inner_polys, x, y) && !point_in_polygons(outer_polys, x, y)
            });
            if violated {
                tracing::trace!(
                    inner = %inner.id,
                    outer = %outer.id,
                    slice,
                    "containment violated"
                );
                return Ok(false);
            }
        }
        tracing::trace!(inner = %inner.id, outer = %outer.id, visited, "containment sampled");
        Ok(true)
    }

    /// Whether any sampled point lies inside both structures.
    ///
    /// False when either structure lacks a segment model.
    pub fn overlaps(&self, a: &Structure, b: &Structure) -> Result<bool, DeadlineExceeded> {
        if !a.has_segment || !b.has_segment {
            return Ok(false);
        }

        for slice in self.sampled_slices(a) {
            self.deadline.check()?;
            let a_polys = a.contours_on(slice);
            let b_polys = b.contours_on(slice);
            let bbox = match (BoundingBox::of(a_polys), BoundingBox::of(b_polys)) {
                (Some(ab), Some(bb)) => ab.intersection(&bb),
                _ => None,
            };
            let Some(bbox) = bbox else {
                continue;
            };
            let hit = self.any_sample(&bbox, |x, y| {
                point_in_polygons(a_polys, x, y) && point_in_polygons(b_polys, x, y)
            });
            if hit {
                tracing::trace!(a = %a.id, b = %b.id, slice, "overlap found");
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Minimum vertex distance between two structures on shared slices.
    pub fn min_distance(
        &self,
        a: &Structure,
        b: &Structure,
    ) -> Result<Option<NearestPoint>, DeadlineExceeded> {
        distance::min_distance(a, b, self.index_threshold, &self.deadline)
    }
}
