//! Errors raised by the engine.

/// Failure of an engine operation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    /// A container rejected a handle or was empty.
    #[error(transparent)]
    Store(#[from] physenv_core::Error),
    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// A polygon needs at least three vertices.
    #[error("polygon needs at least 3 vertices, got {vertices}")]
    DegeneratePolygon {
        /// Number of vertices supplied.
        vertices: usize,
    },
    /// A polygon has no area or two coincident consecutive vertices.
    #[error("polygon is flat or has a zero-length edge")]
    FlatPolygon,
}
