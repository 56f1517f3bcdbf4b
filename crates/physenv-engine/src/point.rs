//! Point masses.

use crate::Vec2;

/// A point mass.
#[derive(Clone, Debug, PartialEq)]
pub struct Point {
    /// Position.
    pub pos: Vec2,
    /// Velocity.
    pub vel: Vec2,
    /// Force accumulated during the current step.
    pub force: Vec2,
    /// Mass; must be positive for a point that is not fixed.
    pub mass: f64,
    /// Fixed points never move.
    pub fixed: bool,
}

impl Point {
    /// A point at rest.
    #[must_use]
    pub const fn new(pos: Vec2, mass: f64, fixed: bool) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            force: Vec2::ZERO,
            mass,
            fixed,
        }
    }

    /// Advances the point by `dt` with explicit Euler integration and clears
    /// the accumulated force.
    pub fn update(&mut self, dt: f64, gravity: f64) {
        if !self.fixed {
            let accel = self.force / self.mass + Vec2::new(0.0, -gravity);
            self.vel += accel * dt;
            self.pos += self.vel * dt;
        }
        self.force = Vec2::ZERO;
    }

    /// Kinetic energy.
    #[must_use]
    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.mass * self.vel.dot(self.vel)
    }
}

impl Default for Point {
    fn default() -> Self {
        Self::new(Vec2::ZERO, 1.0, false)
    }
}
