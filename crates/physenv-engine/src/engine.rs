//! The simulation: points, springs and polygons held by handle.

use core::f64::consts::SQRT_2;

use physenv_core::{CompactMap, Error, Handle};
use tracing::{debug, trace};

use crate::{EngineConfig, EngineError, Point, Polygon, SoftBodyConfig, Spring, Vec2};

/// Handle naming a [`Point`] of an [`Engine`].
pub type PointRef = Handle<Point>;
/// Handle naming a [`Spring`] of an [`Engine`].
pub type SpringRef = Handle<Spring>;
/// Handle naming a [`Polygon`] of an [`Engine`].
pub type PolygonRef = Handle<Polygon>;

/// Mass-spring world with static polygon obstacles.
///
/// Springs refer to points by handle. The engine keeps those references
/// honest: a spring can only be added between live points, and removing a
/// point removes every spring attached to it.
#[derive(Clone, Debug, Default)]
pub struct Engine {
    config: EngineConfig,
    points: CompactMap<Point>,
    springs: CompactMap<Spring>,
    polygons: CompactMap<Polygon>,
}

impl Engine {
    /// Creates an empty engine.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidConfig`] if `config` does not validate.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::default()
        })
    }

    /// Builds a `columns x rows` soft body resting above two tilted floor
    /// slabs.
    ///
    /// Each point is tied to its right and lower neighbours and to both
    /// lower diagonals, so a 5x5 grid has 25 points and 72 springs.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidConfig`] if `layout` does not validate.
    pub fn soft_body(layout: &SoftBodyConfig) -> Result<Self, EngineError> {
        layout.validate()?;
        let mut engine = Self::new(layout.engine())?;
        let (columns, rows) = (layout.columns, layout.rows);

        engine.polygons.reserve(2);
        engine.add_polygon(Polygon::square(Vec2::new(1.0, 0.0), -0.75));
        engine.add_polygon(Polygon::square(Vec2::new(9.0, 0.0), 0.75));

        engine.points.reserve(columns * rows);
        let mut first = None;
        for y in 0..rows {
            for x in 0..columns {
                let offset = Vec2::new(x as f64, y as f64) * layout.gap;
                let h = engine.add_point(Point::new(layout.origin + offset, 1.0, false));
                if first.is_none() {
                    first = Some(h);
                }
            }
        }
        let Some(first) = first else {
            return Ok(engine);
        };
        // A fresh map issues consecutive ids, so the grid is a handle range.
        let at = |x: usize, y: usize| first + (y * columns + x);

        let diagonal = SQRT_2 * layout.gap;
        let spring = |len: f64, a: PointRef, b: PointRef| {
            Spring::new(layout.spring_const, layout.damping, len, a, b)
        };
        for y in 0..rows {
            for x in 0..columns {
                let p = at(x, y);
                let (right, down) = (x + 1 < columns, y + 1 < rows);
                if right && down {
                    engine.add_spring(spring(diagonal, p, at(x + 1, y + 1)))?;
                }
                if right {
                    engine.add_spring(spring(layout.gap, p, at(x + 1, y)))?;
                }
                if down && x > 0 {
                    engine.add_spring(spring(diagonal, p, at(x - 1, y + 1)))?;
                }
                if down {
                    engine.add_spring(spring(layout.gap, p, at(x, y + 1)))?;
                }
            }
        }

        debug!(
            points = engine.points.len(),
            springs = engine.springs.len(),
            polygons = engine.polygons.len(),
            "built soft body"
        );
        Ok(engine)
    }

    /// Settings the engine runs with.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// All points.
    #[must_use]
    pub const fn points(&self) -> &CompactMap<Point> {
        &self.points
    }

    /// All springs.
    #[must_use]
    pub const fn springs(&self) -> &CompactMap<Spring> {
        &self.springs
    }

    /// All polygons.
    #[must_use]
    pub const fn polygons(&self) -> &CompactMap<Polygon> {
        &self.polygons
    }

    /// Mutable access to one point, e.g. to drag it.
    pub fn point_mut(&mut self, point: PointRef) -> Option<&mut Point> {
        self.points.get_mut(point)
    }

    /// Mutable access to one spring's parameters.
    ///
    /// Endpoints changed through this reference are not checked.
    pub fn spring_mut(&mut self, spring: SpringRef) -> Option<&mut Spring> {
        self.springs.get_mut(spring)
    }

    /// Adds a point.
    pub fn add_point(&mut self, point: Point) -> PointRef {
        self.points.insert(point)
    }

    /// Adds a spring between two live points.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidHandle`] if either endpoint is not a live point.
    pub fn add_spring(&mut self, spring: Spring) -> Result<SpringRef, EngineError> {
        for end in [spring.p1, spring.p2] {
            if !self.points.contains(end) {
                return Err(Error::InvalidHandle { id: end.id() }.into());
            }
        }
        Ok(self.springs.insert(spring))
    }

    /// Adds a polygon.
    pub fn add_polygon(&mut self, polygon: Polygon) -> PolygonRef {
        self.polygons.insert(polygon)
    }

    /// Removes a point along with every spring attached to it.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidHandle`] if `point` is not live; nothing is removed.
    pub fn remove_point(&mut self, point: PointRef) -> Result<Point, EngineError> {
        let removed = self.points.erase(point)?;
        let attached: Vec<SpringRef> = self
            .springs
            .iter()
            .filter(|(_, s)| s.connects(point))
            .map(|(h, _)| h)
            .collect();
        debug!(point = point.id(), springs = attached.len(), "removing point");
        self.springs.erase_batch(attached)?;
        Ok(removed)
    }

    /// Removes a spring.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidHandle`] if `spring` is not live.
    pub fn remove_spring(&mut self, spring: SpringRef) -> Result<Spring, EngineError> {
        Ok(self.springs.erase(spring)?)
    }

    /// Removes a polygon.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidHandle`] if `polygon` is not live.
    pub fn remove_polygon(&mut self, polygon: PolygonRef) -> Result<Polygon, EngineError> {
        Ok(self.polygons.erase(polygon)?)
    }

    /// Removes everything. Old handles stay stale.
    pub fn clear(&mut self) {
        self.points.clear();
        self.springs.clear();
        self.polygons.clear();
    }

    /// Advances the simulation by `dt`: spring forces, integration, then
    /// polygon collisions.
    pub fn step(&mut self, dt: f64) {
        for (_, spring) in &self.springs {
            let (Some(a), Some(b)) = (self.points.get(spring.p1), self.points.get(spring.p2))
            else {
                continue;
            };
            let force = spring.force(a, b);
            if let Some(a) = self.points.get_mut(spring.p1) {
                a.force += force;
            }
            if let Some(b) = self.points.get_mut(spring.p2) {
                b.force -= force;
            }
        }

        let gravity = self.config.gravity;
        for point in self.points.values_mut() {
            point.update(dt, gravity);
        }

        for polygon in self.polygons.values() {
            for point in self.points.values_mut() {
                if polygon.is_bounded(point.pos) && polygon.is_contained(point.pos) {
                    polygon.resolve_collision(point);
                }
            }
        }
        trace!(dt, points = self.points.len(), "stepped");
    }

    /// Point nearest to `pos` and its distance.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyContainer`] if there are no points.
    pub fn closest_point(&self, pos: Vec2) -> Result<(PointRef, f64), EngineError> {
        self.points
            .iter()
            .map(|(h, p)| (h, (pos - p.pos).mag()))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .ok_or_else(|| Error::EmptyContainer.into())
    }

    /// Spring nearest to `pos` and its distance, measured to the segment
    /// between its endpoints.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyContainer`] if there are no springs.
    pub fn closest_spring(&self, pos: Vec2) -> Result<(SpringRef, f64), EngineError> {
        let mut best: Option<(SpringRef, f64)> = None;
        for (h, s) in &self.springs {
            let (Some(a), Some(b)) = (self.points.get(s.p1), self.points.get(s.p2)) else {
                continue;
            };
            let dist = pos.dist_to_segment(a.pos, b.pos);
            if best.is_none_or(|(_, d)| dist < d) {
                best = Some((h, dist));
            }
        }
        best.ok_or_else(|| Error::EmptyContainer.into())
    }

    /// Kinetic energy of all points plus elastic energy of all springs.
    #[must_use]
    pub fn energy(&self) -> f64 {
        let kinetic: f64 = self.points.values().map(Point::kinetic_energy).sum();
        let elastic: f64 = self
            .springs
            .values()
            .filter_map(|s| {
                let a = self.points.get(s.p1)?;
                let b = self.points.get(s.p2)?;
                Some(s.potential_energy(a, b))
            })
            .sum();
        kinetic + elastic
    }
}
