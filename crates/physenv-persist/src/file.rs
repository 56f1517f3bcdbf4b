use std::{
    fs::{self, File},
    io::BufWriter,
    path::Path,
};

use physenv_engine::Engine;
use tracing::info;

use crate::{LoadMode, LoadReport, PersistError, Sections, decode_into, write_to};

/// Writes `engine` to the file at `path`, replacing it if it exists.
///
/// # Errors
///
/// [`PersistError::Io`] if the file cannot be created or written.
pub fn save(
    engine: &Engine,
    path: impl AsRef<Path>,
    sections: Sections,
) -> Result<(), PersistError> {
    let path = path.as_ref();
    let io_err = |source| PersistError::Io {
        path: path.to_owned(),
        source,
    };

    let file = File::create(path).map_err(io_err)?;
    write_to(engine, sections, BufWriter::new(file)).map_err(io_err)?;
    info!(
        path = %path.display(),
        points = engine.points().len(),
        springs = engine.springs().len(),
        polygons = engine.polygons().len(),
        "saved engine"
    );
    Ok(())
}

/// Loads the file at `path` into `engine`.
///
/// # Errors
///
/// [`PersistError::Io`] if the file cannot be read, otherwise as
/// [`decode_into`].
pub fn load(
    engine: &mut Engine,
    path: impl AsRef<Path>,
    sections: Sections,
    mode: LoadMode,
) -> Result<LoadReport, PersistError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| PersistError::Io {
        path: path.to_owned(),
        source,
    })?;
    let report = decode_into(engine, &text, sections, mode)?;
    info!(
        path = %path.display(),
        points = report.points,
        springs = report.springs,
        polygons = report.polygons,
        "loaded engine"
    );
    Ok(report)
}
