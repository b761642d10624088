//! Error types.
//!
//! Configuration mistakes (bad polygons, zero-area shapes, nonsense world
//! settings) are reported when the offending object is built. Once a body is
//! in the world nothing in a step can fail; internal invariant violations
//! panic instead of continuing with corrupted state.

use thiserror::Error;

/// Invalid geometry or mass configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PhysicsError {
    #[error("polygon needs at least 3 vertices, got {0}")]
    TooFewVertices(usize),

    #[error("polygon supports at most 64 vertices, got {0}")]
    TooManyVertices(usize),

    #[error("polygon edge {index} is degenerate (squared length {length_sq})")]
    DegenerateEdge { index: usize, length_sq: f64 },

    #[error("point set does not wrap into a convex hull ({0} distinct hull points)")]
    DegenerateHull(usize),

    #[error("polygon area {0} is too small to derive mass from")]
    DegenerateArea(f64),

    #[error("circle radius must be positive, got {0}")]
    InvalidRadius(f64),

    #[error("density must be positive, got {0}")]
    InvalidDensity(f64),
}

/// Failure to load or validate configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("material not found: {0}")]
    NotFound(String),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
