//! Pose and point types for 2D localization.

use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};

use crate::core::math::wrap_bearing;

/// A 2D point or vector in meters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2D {
    /// X coordinate in meters
    pub x: f32,
    /// Y coordinate in meters
    pub y: f32,
}

impl Point2D {
    /// Create a new point.
    #[inline]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Origin.
    #[inline]
    pub fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    /// Squared distance to another point (avoids sqrt).
    #[inline]
    pub fn distance_squared(&self, other: &Point2D) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Distance to another point.
    #[inline]
    pub fn distance(&self, other: &Point2D) -> f32 {
        self.distance_squared(other).sqrt()
    }

    /// Euclidean length of the vector.
    #[inline]
    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Rotate the vector counter-clockwise by `angle` radians.
    #[inline]
    pub fn rotated(&self, angle: f32) -> Point2D {
        let (sin_a, cos_a) = angle.sin_cos();
        Point2D::new(self.x * cos_a - self.y * sin_a, self.x * sin_a + self.y * cos_a)
    }
}

impl Add for Point2D {
    type Output = Point2D;

    #[inline]
    fn add(self, rhs: Point2D) -> Point2D {
        Point2D::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point2D {
    type Output = Point2D;

    #[inline]
    fn sub(self, rhs: Point2D) -> Point2D {
        Point2D::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Point2D {
    type Output = Point2D;

    #[inline]
    fn mul(self, rhs: f32) -> Point2D {
        Point2D::new(self.x * rhs, self.y * rhs)
    }
}

/// Robot pose in 2D space.
///
/// Represents position (x, y) in meters and bearing (theta) in radians.
/// Theta is canonicalized to [0, 2π).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose2D {
    /// X position in meters
    pub x: f32,
    /// Y position in meters
    pub y: f32,
    /// Bearing in radians, canonicalized to [0, 2π)
    pub theta: f32,
}

impl Pose2D {
    /// Create a new pose with theta wrapped to [0, 2π).
    #[inline]
    pub fn new(x: f32, y: f32, theta: f32) -> Self {
        Self {
            x,
            y,
            theta: wrap_bearing(theta),
        }
    }

    /// Create a pose from a position and a bearing.
    #[inline]
    pub fn from_position(position: Point2D, theta: f32) -> Self {
        Self::new(position.x, position.y, theta)
    }

    /// Identity pose at origin with zero heading.
    #[inline]
    pub fn identity() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            theta: 0.0,
        }
    }

    /// Position part of the pose.
    #[inline]
    pub fn position(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }

    /// Transform a point from local frame to global frame.
    ///
    /// ```text
    /// p' = R(θ) · p + t
    /// ```
    #[inline]
    pub fn transform_point(&self, point: &Point2D) -> Point2D {
        self.position() + point.rotated(self.theta)
    }

    /// Compose two poses: self ⊕ other
    ///
    /// Applies `other` transform relative to `self` frame.
    #[inline]
    pub fn compose(&self, other: &Pose2D) -> Pose2D {
        Pose2D::from_position(self.transform_point(&other.position()), self.theta + other.theta)
    }
}

impl Default for Pose2D {
    fn default() -> Self {
        Self::identity()
    }
}
