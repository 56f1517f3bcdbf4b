use std::io;

use physenv_engine::{Engine, Point, Polygon, Spring};
use tracing::{debug, warn};

use crate::{POINT_HEADER, POLYGON_HEADER, SPRING_HEADER, Sections};

/// Renders `engine` in the text format.
///
/// Points are numbered by their position in the point container, and
/// spring endpoints are written as those row numbers.
#[must_use]
pub fn encode(engine: &Engine, sections: Sections) -> String {
    let mut out = String::new();

    out.push_str(POINT_HEADER);
    out.push('\n');
    if sections.points {
        for (row, point) in engine.points().values().enumerate() {
            push_point(&mut out, row, point);
        }
    }

    out.push_str(SPRING_HEADER);
    out.push('\n');
    if sections.springs && sections.points {
        let mut row = 0;
        for (handle, spring) in engine.springs() {
            let points = engine.points();
            let (Some(p1), Some(p2)) = (points.position(spring.p1), points.position(spring.p2))
            else {
                warn!(spring = handle.id(), "skipping spring with a dead endpoint");
                continue;
            };
            push_spring(&mut out, row, spring, p1, p2);
            row += 1;
        }
    }

    out.push_str(POLYGON_HEADER);
    out.push('\n');
    if sections.polygons {
        for polygon in engine.polygons().values() {
            push_polygon(&mut out, polygon);
        }
    }

    debug!(bytes = out.len(), "encoded engine");
    out
}

/// Writes [`encode`]'s output to `out`.
///
/// # Errors
///
/// Any error from the writer.
pub fn write_to<W: io::Write>(engine: &Engine, sections: Sections, mut out: W) -> io::Result<()> {
    out.write_all(encode(engine, sections).as_bytes())?;
    out.flush()
}

fn push_point(out: &mut String, row: usize, p: &Point) {
    out.push_str(&format!(
        "{row} {} {} {} {} {} {}\n",
        u8::from(p.fixed),
        p.pos.x,
        p.pos.y,
        p.vel.x,
        p.vel.y,
        p.mass
    ));
}

fn push_spring(out: &mut String, row: usize, s: &Spring, p1: usize, p2: usize) {
    out.push_str(&format!(
        "{row} {} {} {} {p1} {p2}\n",
        s.spring_const, s.natural_length, s.damping
    ));
}

fn push_polygon(out: &mut String, polygon: &Polygon) {
    let coords: Vec<String> = polygon.vertices().map(|v| format!("{} {}", v.x, v.y)).collect();
    out.push_str(&coords.join(" "));
    out.push('\n');
}
