//! Damped springs between two points.

use crate::{Point, PointRef, Vec2};

/// Below this separation a spring exerts no force; the direction is
/// undefined and the sim would explode.
const MIN_LENGTH: f64 = 1e-30;

/// A damped Hooke spring connecting two points by handle.
#[derive(Clone, Debug, PartialEq)]
pub struct Spring {
    /// Stiffness `k`.
    pub spring_const: f64,
    /// Damping factor applied to the relative velocity along the spring.
    pub damping: f64,
    /// Rest length.
    pub natural_length: f64,
    /// First endpoint.
    pub p1: PointRef,
    /// Second endpoint.
    pub p2: PointRef,
}

impl Spring {
    /// Creates a spring.
    #[must_use]
    pub const fn new(
        spring_const: f64,
        damping: f64,
        natural_length: f64,
        p1: PointRef,
        p2: PointRef,
    ) -> Self {
        Self {
            spring_const,
            damping,
            natural_length,
            p1,
            p2,
        }
    }

    /// Whether `point` is one of the endpoints.
    #[must_use]
    pub fn connects(&self, point: PointRef) -> bool {
        self.p1 == point || self.p2 == point
    }

    /// Force the spring applies to `first`; `second` receives the opposite.
    #[must_use]
    pub fn force(&self, first: &Point, second: &Point) -> Vec2 {
        let diff = first.pos - second.pos;
        let len = diff.mag();
        if len < MIN_LENGTH {
            return Vec2::ZERO;
        }
        let unit = diff / len;
        let hooke = -self.spring_const * (len - self.natural_length);
        let damp = unit.dot(second.vel - first.vel) * self.damping;
        (hooke + damp) * unit
    }

    /// Elastic potential energy at the current separation.
    #[must_use]
    pub fn potential_energy(&self, first: &Point, second: &Point) -> f64 {
        let ext = (first.pos - second.pos).mag() - self.natural_length;
        0.5 * self.spring_const * ext * ext
    }
}
