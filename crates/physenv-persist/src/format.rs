//! Section headers and the knobs shared by reading and writing.

/// First line of the point section.
pub const POINT_HEADER: &str = "point-id fixed posx posy velx vely mass color(rgba)";
/// First line of the spring section.
pub const SPRING_HEADER: &str =
    "spring-id spring-const natural-length damping-factor point1 point2";
/// First line of the polygon section.
pub const POLYGON_HEADER: &str = "polygon-verts: x y ...";

/// Which sections are written, or read back.
///
/// Headers are always present in a file; a disabled section simply has no
/// rows on write and has its rows skipped on read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Sections {
    /// Point rows.
    pub points: bool,
    /// Spring rows. Only written together with points, since spring rows
    /// name their endpoints by point row.
    pub springs: bool,
    /// Polygon rows.
    pub polygons: bool,
}

impl Sections {
    /// Every section.
    pub const ALL: Self = Self {
        points: true,
        springs: true,
        polygons: true,
    };
    /// No section; only headers.
    pub const NONE: Self = Self {
        points: false,
        springs: false,
        polygons: false,
    };
}

impl Default for Sections {
    fn default() -> Self {
        Self::ALL
    }
}

/// What happens to objects already in the engine when loading.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadMode {
    /// Loaded objects are added next to the existing ones.
    Append,
    /// The engine is cleared first.
    Replace,
}

/// Number of objects a load added.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Points added.
    pub points: usize,
    /// Springs added.
    pub springs: usize,
    /// Polygons added.
    pub polygons: usize,
}
