use std::{
    io,
    str::{FromStr, SplitWhitespace},
};

use physenv_engine::{Engine, EngineError, Point, PointRef, Polygon, Spring, Vec2};
use tracing::{debug, warn};

use crate::{
    LoadMode, LoadReport, POINT_HEADER, POLYGON_HEADER, PersistError, SPRING_HEADER, Sections,
    error::malformed,
};

/// Loads the text format into `engine`.
///
/// The whole input is checked before the engine is touched, so on error
/// the engine is left exactly as it was, even with [`LoadMode::Replace`].
///
/// # Errors
///
/// [`PersistError::MalformedRecord`] naming the first offending line.
pub fn decode_into(
    engine: &mut Engine,
    text: &str,
    sections: Sections,
    mode: LoadMode,
) -> Result<LoadReport, PersistError> {
    let staged = parse(text, sections).inspect_err(|err| warn!(%err, "rejected saved engine"))?;
    let report = staged.apply(engine, mode)?;
    debug!(?report, ?mode, "decoded engine");
    Ok(report)
}

/// Reads all of `input` and loads it with [`decode_into`].
///
/// # Errors
///
/// [`PersistError::Stream`] if reading fails, otherwise as [`decode_into`].
pub fn read_from<R: io::Read>(
    engine: &mut Engine,
    mut input: R,
    sections: Sections,
    mode: LoadMode,
) -> Result<LoadReport, PersistError> {
    let mut text = String::new();
    input.read_to_string(&mut text)?;
    decode_into(engine, &text, sections, mode)
}

#[derive(Clone, Copy)]
enum Section {
    Points,
    Springs,
    Polygons,
}

struct StagedSpring {
    spring_const: f64,
    natural_length: f64,
    damping: f64,
    p1: usize,
    p2: usize,
}

#[derive(Default)]
struct Staged {
    points: Vec<Point>,
    springs: Vec<StagedSpring>,
    polygons: Vec<Polygon>,
}

impl Staged {
    fn apply(self, engine: &mut Engine, mode: LoadMode) -> Result<LoadReport, EngineError> {
        if mode == LoadMode::Replace {
            engine.clear();
        }
        let report = LoadReport {
            points: self.points.len(),
            springs: self.springs.len(),
            polygons: self.polygons.len(),
        };

        let handles: Vec<PointRef> = self.points.into_iter().map(|p| engine.add_point(p)).collect();
        for s in self.springs {
            // Endpoint rows were checked against the point count while parsing.
            let (p1, p2) = (handles[s.p1], handles[s.p2]);
            engine.add_spring(Spring::new(s.spring_const, s.damping, s.natural_length, p1, p2))?;
        }
        for polygon in self.polygons {
            engine.add_polygon(polygon);
        }
        Ok(report)
    }
}

fn parse(text: &str, sections: Sections) -> Result<Staged, PersistError> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line))
        .filter(|(_, line)| !line.trim().is_empty());

    match lines.next() {
        Some((_, POINT_HEADER)) => {}
        Some((n, other)) => {
            return Err(malformed(n, format!("expected point header, found `{other}`")));
        }
        None => return Err(malformed(1, "missing point header")),
    }

    let mut staged = Staged::default();
    let mut section = Section::Points;
    for (n, line) in lines {
        match (section, line) {
            (Section::Points, SPRING_HEADER) => section = Section::Springs,
            (Section::Springs, POLYGON_HEADER) => section = Section::Polygons,
            (Section::Points, _) if sections.points => {
                let point = parse_point(Row::new(n, line), staged.points.len())?;
                staged.points.push(point);
            }
            (Section::Springs, _) if sections.springs => {
                let spring = parse_spring(Row::new(n, line), staged.springs.len())?;
                for end in [spring.p1, spring.p2] {
                    if end >= staged.points.len() {
                        return Err(malformed(n, format!("point row {end} was not loaded")));
                    }
                }
                staged.springs.push(spring);
            }
            (Section::Polygons, _) if sections.polygons => {
                staged.polygons.push(parse_polygon(n, line)?);
            }
            _ => {}
        }
    }

    let end = text.lines().count() + 1;
    match section {
        Section::Points => Err(malformed(end, "missing spring header")),
        Section::Springs => Err(malformed(end, "missing polygon header")),
        Section::Polygons => Ok(staged),
    }
}

fn parse_point(mut row: Row<'_>, index: usize) -> Result<Point, PersistError> {
    row.index(index)?;
    let fixed = match row.field::<u8>("fixed")? {
        0 => false,
        1 => true,
        other => return Err(malformed(row.line, format!("fixed must be 0 or 1, got {other}"))),
    };
    let pos = Vec2::new(row.number("posx")?, row.number("posy")?);
    let vel = Vec2::new(row.number("velx")?, row.number("vely")?);
    let mass = row.number("mass")?;
    if !fixed && mass <= 0.0 {
        return Err(malformed(
            row.line,
            format!("mass of a free point must be positive, got {mass}"),
        ));
    }
    row.finish()?;

    let mut point = Point::new(pos, mass, fixed);
    point.vel = vel;
    Ok(point)
}

fn parse_spring(mut row: Row<'_>, index: usize) -> Result<StagedSpring, PersistError> {
    row.index(index)?;
    let spring = StagedSpring {
        spring_const: row.number("spring constant")?,
        natural_length: row.number("natural length")?,
        damping: row.number("damping factor")?,
        p1: row.field("point1")?,
        p2: row.field("point2")?,
    };
    row.finish()?;
    Ok(spring)
}

fn parse_polygon(n: usize, line: &str) -> Result<Polygon, PersistError> {
    let coords = line
        .split_whitespace()
        .map(|token| {
            token
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| malformed(n, format!("cannot parse coordinate `{token}`")))
        })
        .collect::<Result<Vec<_>, _>>()?;
    if coords.len() % 2 != 0 {
        return Err(malformed(n, format!("odd number of coordinates ({})", coords.len())));
    }

    let vertices: Vec<Vec2> = coords.chunks_exact(2).map(|c| Vec2::new(c[0], c[1])).collect();
    let polygon = Polygon::new(&vertices).map_err(|err| malformed(n, err.to_string()))?;
    if !polygon.is_convex() {
        return Err(malformed(n, "polygon is not convex"));
    }
    Ok(polygon)
}

/// Whitespace separated columns of one line.
struct Row<'a> {
    line: usize,
    fields: SplitWhitespace<'a>,
}

impl<'a> Row<'a> {
    fn new(line: usize, text: &'a str) -> Self {
        Self {
            line,
            fields: text.split_whitespace(),
        }
    }

    fn field<T: FromStr>(&mut self, name: &str) -> Result<T, PersistError> {
        let token = self
            .fields
            .next()
            .ok_or_else(|| malformed(self.line, format!("missing {name} column")))?;
        token
            .parse()
            .map_err(|_| malformed(self.line, format!("cannot parse {name} from `{token}`")))
    }

    fn number(&mut self, name: &str) -> Result<f64, PersistError> {
        let value: f64 = self.field(name)?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(malformed(self.line, format!("{name} must be finite, got {value}")))
        }
    }

    fn index(&mut self, expected: usize) -> Result<(), PersistError> {
        let index: usize = self.field("row index")?;
        if index == expected {
            Ok(())
        } else {
            Err(malformed(
                self.line,
                format!("row index {index} is out of sequence, expected {expected}"),
            ))
        }
    }

    fn finish(mut self) -> Result<(), PersistError> {
        match self.fields.next() {
            None => Ok(()),
            Some(extra) => Err(malformed(self.line, format!("unexpected extra column `{extra}`"))),
        }
    }
}
