//! Nearest-vertex distance between two contoured structures.

use crate::engine::deadline::{Deadline, DeadlineExceeded};
use crate::model::{Point3, Structure};
use rstar::RTree;

/// Closest approach between two structures.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestPoint {
    pub distance_mm: f64,
    /// Vertex of the first structure where the minimum was found
    pub location_on_a: Point3,
    pub slice: u32,
}

fn vertices(structure: &Structure, slice: u32) -> Vec<Point3> {
    structure
        .contours_on(slice)
        .iter()
        .flat_map(|p| p.iter().copied())
        .collect()
}

fn consider(best: &mut Option<NearestPoint>, distance_mm: f64, location_on_a: Point3, slice: u32) {
    if best.map_or(true, |b| distance_mm < b.distance_mm) {
        *best = Some(NearestPoint {
            distance_mm,
            location_on_a,
            slice,
        });
    }
}

fn brute_force(a: &[Point3], b: &[Point3], slice: u32, best: &mut Option<NearestPoint>) {
    for pa in a {
        for pb in b {
            consider(best, pa.distance_to(pb), *pa, slice);
        }
    }
}

fn indexed(a: &[Point3], b: &[Point3], slice: u32, best: &mut Option<NearestPoint>) {
    let tree = RTree::bulk_load(b.iter().map(|p| [p.x, p.y, p.z]).collect::<Vec<_>>());
    for pa in a {
        if let Some(nearest) = tree.nearest_neighbor(&[pa.x, pa.y, pa.z]) {
            let pb = Point3::new(nearest[0], nearest[1], nearest[2]);
            consider(best, pa.distance_to(&pb), *pa, slice);
        }
    }
}

/// Minimum Euclidean distance between any vertex of `a` and any vertex of
/// `b` lying on the same slice.
///
/// Returns `None` when the structures share no contoured slice. Slices whose
/// vertex-pair count exceeds `index_threshold` are searched with an R-tree;
/// the distance is recomputed with the same formula, so the result does not
/// depend on which path ran.
pub fn min_distance(
    a: &Structure,
    b: &Structure,
    index_threshold: usize,
    deadline: &Deadline,
) -> Result<Option<NearestPoint>, DeadlineExceeded> {
    let mut best = None;
    for &slice in a.contours_by_slice.keys() {
        if !b.contours_by_slice.contains_key(&slice) {
            continue;
        }
        deadline.check()?;
        let va = vertices(a, slice);
        let vb = vertices(b, slice);
        if va.is_empty() || vb.is_empty() {
            continue;
        }
        if va.len().saturating_mul(vb.len()) > index_threshold {
            indexed(&va, &vb, slice, &mut best);
        } else {
            brute_force(&va, &vb, slice, &mut best);
        }
    }
    Ok(best)
}
