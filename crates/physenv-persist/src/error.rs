use std::{io, path::PathBuf};

use physenv_engine::EngineError;

/// Failure to read or write a saved engine.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    /// A line of the input does not match the format.
    #[error("line {line}: {reason}")]
    MalformedRecord {
        /// 1-based line number; one past the last line for a truncated input.
        line: usize,
        /// What is wrong with it.
        reason: String,
    },
    /// The engine refused a decoded object.
    #[error(transparent)]
    Engine(#[from] EngineError),
    /// Opening, reading or writing a file failed.
    #[error("{}: {source}", .path.display())]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        source: io::Error,
    },
    /// Reading from or writing to a caller-supplied stream failed.
    #[error(transparent)]
    Stream(#[from] io::Error),
}

pub(crate) fn malformed(line: usize, reason: impl Into<String>) -> PersistError {
    PersistError::MalformedRecord {
        line,
        reason: reason.into(),
    }
}
