//! 3D point type for survey-grade coordinates
//!
//! Every coordinate in the system carries an explicit Z component, including
//! exact 0.0. Dropping Z — even for flat geometry — is a correctness bug,
//! so there is deliberately no 2D point type in this crate.

use std::fmt;
use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

/// A 3D coordinate with explicit elevation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    /// Create a new 3D point
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Point3 { x, y, z }
    }

    /// Origin
    pub const ZERO: Point3 = Point3::new(0.0, 0.0, 0.0);

    /// Create a point at elevation 0.0
    ///
    /// The result is still a 3D point; Z is exactly 0.0, not absent.
    pub const fn flat(x: f64, y: f64) -> Self {
        Point3 { x, y, z: 0.0 }
    }

    /// Euclidean distance to another point (all three axes)
    pub fn distance(&self, other: &Point3) -> f64 {
        (*self - *other).length()
    }

    /// Planimetric (XY-only) distance to another point
    pub fn distance_2d(&self, other: &Point3) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Vector length when the point is treated as a displacement
    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Componentwise comparison within a linear tolerance
    pub fn approx_eq(&self, other: &Point3, tolerance: f64) -> bool {
        (self.x - other.x).abs() <= tolerance
            && (self.y - other.y).abs() <= tolerance
            && (self.z - other.z).abs() <= tolerance
    }
}

impl Default for Point3 {
    fn default() -> Self {
        Point3::ZERO
    }
}

impl Add for Point3 {
    type Output = Point3;
    fn add(self, other: Point3) -> Point3 {
        Point3::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl Sub for Point3 {
    type Output = Point3;
    fn sub(self, other: Point3) -> Point3 {
        Point3::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl fmt::Display for Point3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}
