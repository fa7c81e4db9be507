//! Startup errors. Everything that can go wrong at runtime is represented as
//! data (empty paths, wizard states) instead.

use thiserror::Error;

/// Grid construction failed; the tile data and the declared dimensions disagree.
#[derive(Debug, Error, PartialEq)]
pub enum GridError {
    #[error("floor layer has no tiles")]
    EmptyFloor,
    #[error("grid dimensions must be non-zero, got {width}x{height}")]
    ZeroDimensions { width: u32, height: u32 },
    #[error("grid is declared {expected:?} but the floor spans {found:?}")]
    DimensionMismatch {
        expected: (u32, u32),
        found: (u32, u32),
    },
    #[error("cell size must be positive and finite, got {0}")]
    InvalidCellSize(f64),
}

/// An ASCII maze file could not be parsed.
#[derive(Debug, Error, PartialEq)]
pub enum MapError {
    #[error("empty maze")]
    Empty,
    #[error("unknown tile character '{ch}' at ({x}, {y})")]
    UnknownTile { ch: char, x: usize, y: usize },
    #[error("no {0} spawn found in maze")]
    MissingSpawn(&'static str),
    #[error("multiple {what} spawns, second at ({x}, {y})")]
    DuplicateSpawn { what: &'static str, x: usize, y: usize },
}

/// Tuning file could not be read or holds nonsense.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}
