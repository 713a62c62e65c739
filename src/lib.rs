//! Snakeshift - a sliding-snake puzzle on a two-layer collision plane
//!
//! Core modules:
//! - `sim`: Deterministic move engine (hit-testing, move analysis, take-move, level state)
//! - `generator`: Reverse-simulation level generator
//! - `simplify`: Playthrough simplifier (cycle removal + bounded re-solving)
//! - `session`: Interactive game session (active snake, undo/redo, feedback)
//! - `persistence`: Level and playthrough JSON formats
//! - `settings`: Data-driven generator/simplifier tuning

pub mod error;
pub mod generator;
pub mod persistence;
pub mod session;
pub mod settings;
pub mod sim;
pub mod simplify;

pub use error::{ConfigError, FormatError, LoadError, ReplayError};
pub use settings::{GeneratorPreset, Settings};

/// Game configuration constants
pub mod consts {
    /// `format` tag of level documents
    pub const LEVEL_FORMAT: &str = "snakeshift";
    /// Current level document version
    pub const LEVEL_FORMAT_VERSION: u32 = 6;
    /// `format` tag of playthrough documents
    pub const PLAYTHROUGH_FORMAT: &str = "snakeshift-moves";
    pub const PLAYTHROUGH_FORMAT_VERSION: u32 = 1;

    /// Generation attempts; the best-scoring level wins
    pub const GENERATION_TRIES: u32 = 200;
    /// Reverse-simulation iterations per attempt
    pub const REVERSE_STEP_LIMIT: u32 = 10_000;
    /// Accepted reverse moves after which an attempt stops early
    pub const TARGET_ACCEPTED_MOVES: usize = 1000;
    /// Probability that a terrain cell is White (otherwise Black)
    pub const BLOCK_DENSITY: f32 = 0.3;
    /// Probability that a reverse move un-grows the snake
    pub const FOOD_CHANCE: f32 = 0.9;

    /// Depth cap of the simplifier's shortcut search
    pub const SIMPLIFY_MAX_DEPTH: usize = 10;
}
