//! Caller-supplied engine settings.
//!
//! Nothing here touches the filesystem or the environment; an engine is
//! configured entirely by the values passed in.

use crate::{EngineError, Vec2};

/// Global simulation settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EngineConfig {
    /// Downward acceleration applied to every free point.
    pub gravity: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { gravity: 0.0 }
    }
}

impl EngineConfig {
    /// Sets the gravity.
    #[must_use]
    pub const fn with_gravity(mut self, gravity: f64) -> Self {
        self.gravity = gravity;
        self
    }

    /// Checks that every value is usable.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidConfig`] if gravity is not finite.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.gravity.is_finite() {
            Ok(())
        } else {
            Err(EngineError::InvalidConfig(format!(
                "gravity must be finite, got {}",
                self.gravity
            )))
        }
    }
}

/// Layout of a rectangular soft body: a grid of unit-mass points tied
/// together by horizontal, vertical and diagonal springs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SoftBodyConfig {
    /// Points along x.
    pub columns: usize,
    /// Points along y.
    pub rows: usize,
    /// Position of the point in the first column and row.
    pub origin: Vec2,
    /// Gravity of the engine that is created.
    pub gravity: f64,
    /// Distance between neighbouring points.
    pub gap: f64,
    /// Stiffness of every spring.
    pub spring_const: f64,
    /// Damping of every spring.
    pub damping: f64,
}

impl Default for SoftBodyConfig {
    fn default() -> Self {
        Self {
            columns: 5,
            rows: 5,
            origin: Vec2::ZERO,
            gravity: 10.0,
            gap: 10.0,
            spring_const: 10.0,
            damping: 1.0,
        }
    }
}

impl SoftBodyConfig {
    /// Checks that the grid is non-empty and the physical values are usable.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidConfig`] describing the first bad value.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.columns == 0 || self.rows == 0 {
            return Err(EngineError::InvalidConfig(format!(
                "soft body grid must be non-empty, got {}x{}",
                self.columns, self.rows
            )));
        }
        if !(self.gap.is_finite() && self.gap > 0.0) {
            return Err(EngineError::InvalidConfig(format!(
                "gap must be positive, got {}",
                self.gap
            )));
        }
        let physical = [self.spring_const, self.damping, self.origin.x, self.origin.y];
        if physical.iter().any(|v| !v.is_finite()) {
            return Err(EngineError::InvalidConfig(
                "spring constant, damping and origin must be finite".to_owned(),
            ));
        }
        self.engine().validate()
    }

    /// Engine settings implied by this layout.
    #[must_use]
    pub const fn engine(&self) -> EngineConfig {
        EngineConfig {
            gravity: self.gravity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(EngineConfig::default().validate().is_ok());
        assert!(SoftBodyConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_bad_values() {
        assert!(EngineConfig::default().with_gravity(f64::NAN).validate().is_err());

        let empty = SoftBodyConfig {
            rows: 0,
            ..SoftBodyConfig::default()
        };
        assert!(matches!(empty.validate(), Err(EngineError::InvalidConfig(_))));

        let flat = SoftBodyConfig {
            gap: 0.0,
            ..SoftBodyConfig::default()
        };
        assert!(flat.validate().is_err());

        let wild = SoftBodyConfig {
            damping: f64::INFINITY,
            ..SoftBodyConfig::default()
        };
        assert!(wild.validate().is_err());
    }
}
