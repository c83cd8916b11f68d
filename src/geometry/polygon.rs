//! Planar polygon tests on a single slice.

use crate::model::{Contour, Point3};

/// Axis-aligned extent of a set of polygons in the slice plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Extent of all points of all polygons, `None` when there are none.
    pub fn of(polygons: &[Contour]) -> Option<Self> {
        let mut points = polygons.iter().flat_map(|p| p.iter());
        let first = points.next()?;
        let mut bbox = BoundingBox {
            min_x: first.x,
            max_x: first.x,
            min_y: first.y,
            max_y: first.y,
        };
        for p in points {
            bbox.min_x = bbox.min_x.min(p.x);
            bbox.max_x = bbox.max_x.max(p.x);
            bbox.min_y = bbox.min_y.min(p.y);
            bbox.max_y = bbox.max_y.max(p.y);
        }
        Some(bbox)
    }

    pub fn intersection(&self, other: &BoundingBox) -> Option<BoundingBox> {
        let bbox = BoundingBox {
            min_x: self.min_x.max(other.min_x),
            max_x: self.max_x.min(other.max_x),
            min_y: self.min_y.max(other.min_y),
            max_y: self.max_y.min(other.max_y),
        };
        if bbox.min_x <= bbox.max_x && bbox.min_y <= bbox.max_y {
            Some(bbox)
        } else {
            None
        }
    }
}

/// Even-odd point-in-polygon test over all polygons of a slice.
///
/// Nested polygons act as holes. Polygons with fewer than three vertices are
/// ignored. Only x and y are considered.
pub fn point_in_polygons(polygons: &[Contour], x: f64, y: f64) -> bool {
    let mut inside = false;
    for polygon in polygons {
        if polygon.len() < 3 {
            continue;
        }
        let mut j = polygon.len() - 1;
        for i in 0..polygon.len() {
            let (pi, pj): (&Point3, &Point3) = (&polygon[i], &polygon[j]);
            if (pi.y > y) != (pj.y > y) {
                let x_cross = (pj.x - pi.x) * (y - pi.y) / (pj.y - pi.y) + pi.x;
                if x < x_cross {
                    inside = !inside;
                }
            }
            j = i;
        }
    }
    inside
}
