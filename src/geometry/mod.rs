//! Spatial geometry primitives.
//!
//! Containment and overlap are approximate: they sample the image grid on a
//! stride derived from its size (every `size.x / 120`-th column and row,
//! every `size.z / 60`-th slice) and test sample points against the contour
//! polygons. Violations smaller than the stride can be missed. This is not
//! exact boolean geometry.
//!
//! Structures without a segment model degrade conservatively, and the two
//! primitives deliberately use opposite defaults:
//! - `is_contained` returns true ("cannot check, assume OK")
//! - `overlaps` returns false
//!
//! `min_distance` compares contour vertices on shared slices. Brute force is
//! `O(vertices_a * vertices_b)` per slice; above a configurable size the
//! search switches to an R-tree with identical results.

pub mod distance;
pub mod polygon;
pub mod sampling;

pub use distance::{min_distance, NearestPoint};
pub use polygon::{point_in_polygons, BoundingBox};
pub use sampling::{SamplingStride, SpatialEngine};
