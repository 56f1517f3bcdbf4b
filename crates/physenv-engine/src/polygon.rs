//! Static polygons that points collide with.

use crate::{EngineError, Point, Vec2};

/// Directed edge of a polygon.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Edge {
    /// Start vertex.
    pub p1: Vec2,
    /// End vertex.
    pub p2: Vec2,
}

impl Edge {
    /// Vector from `p1` to `p2`.
    #[must_use]
    pub fn diff(&self) -> Vec2 {
        self.p2 - self.p1
    }

    /// Unit normal on the right-hand side of the edge direction.
    ///
    /// That is the outward side for a counter-clockwise polygon.
    #[must_use]
    pub fn normal(&self) -> Vec2 {
        let d = self.diff();
        Vec2::new(d.y, -d.x).norm()
    }

    /// Whether a ray from `pos` towards +x crosses this edge.
    #[must_use]
    pub fn ray_cast(&self, pos: Vec2) -> bool {
        let (a, b) = (self.p1, self.p2);
        if (a.y > pos.y) == (b.y > pos.y) {
            return false;
        }
        let x_at = a.x + (pos.y - a.y) * (b.x - a.x) / (b.y - a.y);
        pos.x < x_at
    }

    /// Distance from `pos` to the edge segment.
    #[must_use]
    pub fn dist_to_point(&self, pos: Vec2) -> f64 {
        pos.dist_to_segment(self.p1, self.p2)
    }
}

/// A closed polygon.
#[derive(Clone, Debug, PartialEq)]
pub struct Polygon {
    edges: Vec<Edge>,
    min_bounds: Vec2,
    max_bounds: Vec2,
    /// `1.0` for counter-clockwise winding, `-1.0` for clockwise.
    winding: f64,
}

impl Polygon {
    /// Builds a polygon from its vertices in order.
    ///
    /// # Errors
    ///
    /// [`EngineError::DegeneratePolygon`] for fewer than three vertices,
    /// [`EngineError::FlatPolygon`] if the vertices enclose no area or an
    /// edge has zero length.
    pub fn new(vertices: &[Vec2]) -> Result<Self, EngineError> {
        if vertices.len() < 3 {
            return Err(EngineError::DegeneratePolygon {
                vertices: vertices.len(),
            });
        }
        let polygon = Self::build(vertices);
        let area2: f64 = polygon.edges.iter().map(|e| e.p1.cross(e.p2)).sum();
        // Collisions need a finite outward normal on every edge.
        if area2 == 0.0 || polygon.edges.iter().any(|e| e.diff() == Vec2::ZERO) {
            return Err(EngineError::FlatPolygon);
        }
        Ok(polygon)
    }

    /// `vertices` must hold at least three points.
    fn build(vertices: &[Vec2]) -> Self {
        let edges: Vec<Edge> = vertices
            .iter()
            .zip(vertices.iter().cycle().skip(1))
            .map(|(&p1, &p2)| Edge { p1, p2 })
            .collect();

        let mut min_bounds = vertices[0];
        let mut max_bounds = vertices[0];
        for v in &vertices[1..] {
            min_bounds = Vec2::new(min_bounds.x.min(v.x), min_bounds.y.min(v.y));
            max_bounds = Vec2::new(max_bounds.x.max(v.x), max_bounds.y.max(v.y));
        }

        // Shoelace sum: positive for counter-clockwise.
        let area2: f64 = edges.iter().map(|e| e.p1.cross(e.p2)).sum();
        let winding = if area2 < 0.0 { -1.0 } else { 1.0 };

        Self {
            edges,
            min_bounds,
            max_bounds,
            winding,
        }
    }

    /// Axis-aligned floor slab, `10` wide, with its right side raised or
    /// lowered by `tilt`.
    #[must_use]
    pub fn square(pos: Vec2, tilt: f64) -> Self {
        Self::build(&[
            pos,
            pos + Vec2::new(10.0, 0.0),
            pos + Vec2::new(10.0, 1.0 + tilt),
            pos + Vec2::new(0.0, 1.0 - tilt),
        ])
    }

    /// Small triangle centred on `pos`.
    #[must_use]
    pub fn triangle(pos: Vec2) -> Self {
        Self::build(&[
            pos + Vec2::new(1.0, 1.0),
            pos + Vec2::new(-1.0, 1.0),
            pos + Vec2::new(0.0, -1.0),
        ])
    }

    /// Edges in vertex order; the last one closes the loop.
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Vertices in order.
    pub fn vertices(&self) -> impl ExactSizeIterator<Item = Vec2> + '_ {
        self.edges.iter().map(|e| e.p1)
    }

    /// Whether `pos` lies in the bounding box.
    #[must_use]
    pub fn is_bounded(&self, pos: Vec2) -> bool {
        pos.x >= self.min_bounds.x
            && pos.y >= self.min_bounds.y
            && pos.x <= self.max_bounds.x
            && pos.y <= self.max_bounds.y
    }

    /// Whether `pos` lies inside the polygon (even-odd rule).
    #[must_use]
    pub fn is_contained(&self, pos: Vec2) -> bool {
        self.edges.iter().filter(|e| e.ray_cast(pos)).count() % 2 == 1
    }

    /// Whether every turn between consecutive edges goes the same way.
    /// Collinear vertices do not break convexity.
    #[must_use]
    pub fn is_convex(&self) -> bool {
        let turns = self
            .edges
            .iter()
            .zip(self.edges.iter().cycle().skip(1))
            .map(|(a, b)| a.diff().cross(b.diff()));

        let (mut left, mut right) = (false, false);
        for turn in turns {
            left |= turn > 0.0;
            right |= turn < 0.0;
        }
        !(left && right)
    }

    /// Pushes a point that has entered the polygon out through the nearest
    /// edge and reflects its velocity about that edge's normal.
    pub fn resolve_collision(&self, point: &mut Point) {
        let nearest = self.edges.iter().min_by(|a, b| {
            a.dist_to_point(point.pos)
                .total_cmp(&b.dist_to_point(point.pos))
        });
        let Some(edge) = nearest else { return };

        let normal = edge.normal() * self.winding;
        let dist = edge.dist_to_point(point.pos);
        point.pos += normal * dist;
        point.vel -= 2.0 * normal.dot(point.vel) * normal;
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::approx_eq;

    use super::*;

    fn unit_square() -> Polygon {
        Polygon::new(&[
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ])
        .expect("square")
    }

    #[test]
    fn needs_three_vertices() {
        let err = Polygon::new(&[Vec2::ZERO, Vec2::new(1.0, 0.0)]);
        assert_eq!(err, Err(EngineError::DegeneratePolygon { vertices: 2 }));
    }

    #[test]
    fn rejects_flat_polygons() {
        let line = [Vec2::ZERO, Vec2::new(1.0, 0.0), Vec2::new(2.0, 0.0)];
        assert_eq!(Polygon::new(&line), Err(EngineError::FlatPolygon));

        let repeated = [
            Vec2::ZERO,
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, 1.0),
        ];
        assert_eq!(Polygon::new(&repeated), Err(EngineError::FlatPolygon));
    }

    #[test]
    fn containment_and_bounds() {
        let sq = unit_square();
        assert_eq!(sq.edges().len(), 4);
        assert!(sq.is_bounded(Vec2::new(0.5, 0.5)));
        assert!(sq.is_contained(Vec2::new(0.5, 0.5)));
        assert!(!sq.is_contained(Vec2::new(1.5, 0.5)));
        assert!(!sq.is_bounded(Vec2::new(-0.1, 0.5)));
    }

    #[test]
    fn convexity() {
        assert!(unit_square().is_convex());
        assert!(Polygon::square(Vec2::ZERO, -0.75).is_convex());
        assert!(Polygon::triangle(Vec2::ZERO).is_convex());

        let dart = Polygon::new(&[
            Vec2::new(0.0, 0.0),
            Vec2::new(2.0, 1.0),
            Vec2::new(0.0, 2.0),
            Vec2::new(0.5, 1.0),
        ])
        .expect("dart");
        assert!(!dart.is_convex());
    }

    #[test]
    fn collision_pushes_out_and_reflects() {
        let sq = unit_square();
        let mut p = Point::new(Vec2::new(0.5, 0.9), 1.0, false);
        p.vel = Vec2::new(1.0, -2.0);
        sq.resolve_collision(&mut p);

        assert!(approx_eq!(f64, p.pos.x, 0.5));
        assert!(approx_eq!(f64, p.pos.y, 1.0, epsilon = 1e-12));
        assert!(approx_eq!(f64, p.vel.x, 1.0));
        assert!(approx_eq!(f64, p.vel.y, 2.0));
    }

    #[test]
    fn clockwise_polygon_still_pushes_outwards() {
        let cw = Polygon::new(&[
            Vec2::new(0.0, 0.0),
            Vec2::new(0.0, 1.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(1.0, 0.0),
        ])
        .expect("square");
        let mut p = Point::new(Vec2::new(0.1, 0.5), 1.0, false);
        cw.resolve_collision(&mut p);
        assert!(approx_eq!(f64, p.pos.x, 0.0, epsilon = 1e-12));
    }
}
