//! Error types
//!
//! Expected negative outcomes (an invalid move, a failed generation attempt)
//! are ordinary values, not errors. These types cover malformed input data and
//! replaying a playthrough that doesn't fit its level.

use thiserror::Error;

use crate::sim::Direction;

/// A level or playthrough document could not be decoded
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unexpected format '{found}', expected '{expected}'")]
    WrongFormat { expected: &'static str, found: String },

    #[error("format version {found} is not supported (latest is {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("{entities} entities but {types} entity types")]
    LengthMismatch { entities: usize, types: usize },

    #[error("unknown entity type '{0}'")]
    UnknownEntityType(String),

    #[error("entity {index} ({entity_type}) is malformed: {source}")]
    BadEntity {
        index: usize,
        entity_type: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("snake '{0}' has no segments")]
    EmptySnake(String),

    #[error("entity {index} has negative or oversized coordinates")]
    BadCoordinates { index: usize },

    #[error("level size {width}x{height} is out of range (at most {max} per side)")]
    BadLevelSize { width: i32, height: i32, max: i32 },

    #[error("active player index {0} does not point at a snake")]
    BadActivePlayer(i64),
}

/// A move input could not be replayed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReplayError {
    #[error("move {index}: no snake with id '{snake_id}'")]
    UnknownSnake { index: usize, snake_id: String },

    #[error("move {index}: snake '{snake_id}' cannot move {direction} (encumbered: {encumbered})")]
    InvalidMove {
        index: usize,
        snake_id: String,
        direction: Direction,
        encumbered: bool,
    },
}

/// Settings could not be loaded
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not read settings file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings in '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A level or playthrough file could not be loaded
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("could not read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not load '{path}': {source}")]
    Format {
        path: String,
        #[source]
        source: FormatError,
    },

    #[error("'{path}' has no entities")]
    Empty { path: String },
}
