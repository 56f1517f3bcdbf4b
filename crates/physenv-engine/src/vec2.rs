//! Two-dimensional vector.

use core::fmt;
use core::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

/// A 2D vector of `f64`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2 {
    /// Horizontal component.
    pub x: f64,
    /// Vertical component, positive up.
    pub y: f64,
}

impl Vec2 {
    /// The zero vector.
    pub const ZERO: Self = Self::new(0.0, 0.0);

    /// Creates a vector.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean length.
    #[must_use]
    pub fn mag(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Unit vector in the same direction. Not finite for the zero vector.
    #[must_use]
    pub fn norm(self) -> Self {
        self / self.mag()
    }

    /// Dot product.
    #[must_use]
    pub fn dot(self, rhs: Self) -> f64 {
        self.x * rhs.x + self.y * rhs.y
    }

    /// z component of the 3D cross product.
    #[must_use]
    pub fn cross(self, rhs: Self) -> f64 {
        self.x * rhs.y - self.y * rhs.x
    }

    /// Distance from `self` to the segment `a`-`b`.
    #[must_use]
    pub fn dist_to_segment(self, a: Self, b: Self) -> f64 {
        let line = b - a;
        let from_a = self - a;
        if from_a.dot(line) <= 0.0 {
            return from_a.mag();
        }
        let from_b = self - b;
        if from_b.dot(line) >= 0.0 {
            return from_b.mag();
        }
        line.cross(from_a).abs() / line.mag()
    }
}

impl fmt::Display for Vec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl Add for Vec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Vec2 {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Self;

    fn mul(self, scale: f64) -> Self {
        Self::new(self.x * scale, self.y * scale)
    }
}

impl Mul<Vec2> for f64 {
    type Output = Vec2;

    fn mul(self, v: Vec2) -> Vec2 {
        v * self
    }
}

impl Div<f64> for Vec2 {
    type Output = Self;

    fn div(self, scale: f64) -> Self {
        Self::new(self.x / scale, self.y / scale)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for Vec2 {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::approx_eq;

    use super::*;

    #[test]
    fn products() {
        let a = Vec2::new(3.0, 4.0);
        let b = Vec2::new(-4.0, 3.0);
        assert!(approx_eq!(f64, a.mag(), 5.0));
        assert!(approx_eq!(f64, a.dot(b), 0.0));
        assert!(approx_eq!(f64, a.cross(b), 25.0));
        assert!(approx_eq!(f64, a.norm().mag(), 1.0));
        assert_eq!(2.0 * a, a + a);
        assert_eq!(-a, Vec2::ZERO - a);
    }

    #[test]
    fn segment_distance_regions() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(10.0, 0.0);
        // Before a, beside the segment, past b.
        assert!(approx_eq!(f64, Vec2::new(-3.0, 4.0).dist_to_segment(a, b), 5.0));
        assert!(approx_eq!(f64, Vec2::new(5.0, -2.0).dist_to_segment(a, b), 2.0));
        assert!(approx_eq!(f64, Vec2::new(13.0, 4.0).dist_to_segment(a, b), 5.0));
    }
}
