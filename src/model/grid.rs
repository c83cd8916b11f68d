//! Regularly sampled 3-D image grid.

use serde::{Deserialize, Serialize};

/// A point in patient coordinates (mm).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Point3 { x, y, z }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: &Point3) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// Per-axis voxel spacing (mm/voxel).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Vector3 { x, y, z }
    }
}

/// Voxel counts along each axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSize {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl GridSize {
    pub const fn new(x: u32, y: u32, z: u32) -> Self {
        GridSize { x, y, z }
    }
}

/// Read-only view of the planning image volume.
///
/// Only used for coordinate mapping and for deriving sampling strides; it
/// carries no voxel data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeometryGrid {
    pub origin: Point3,
    pub resolution: Vector3,
    pub size: GridSize,
}

impl GeometryGrid {
    pub fn new(origin: Point3, resolution: Vector3, size: GridSize) -> Self {
        GeometryGrid {
            origin,
            resolution,
            size,
        }
    }

    /// World x coordinate of voxel column `i`.
    pub fn x_at(&self, i: u32) -> f64 {
        self.origin.x + f64::from(i) * self.resolution.x
    }

    /// World y coordinate of voxel row `j`.
    pub fn y_at(&self, j: u32) -> f64 {
        self.origin.y + f64::from(j) * self.resolution.y
    }

    /// Fractional column index for a world x coordinate.
    pub fn column_of(&self, x: f64) -> f64 {
        if self.resolution.x == 0.0 {
            return 0.0;
        }
        (x - self.origin.x) / self.resolution.x
    }

    /// Fractional row index for a world y coordinate.
    pub fn row_of(&self, y: f64) -> f64 {
        if self.resolution.y == 0.0 {
            return 0.0;
        }
        (y - self.origin.y) / self.resolution.y
    }

    /// Whether a slice index lies inside the volume.
    pub fn contains_slice(&self, slice: u32) -> bool {
        slice < self.size.z
    }
}
