//! Generator and simplifier settings
//!
//! Loaded from a JSON file; any field left out takes its default.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;
use crate::generator::ComplexityMetric;

/// How much effort the generator spends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GeneratorPreset {
    Quick,
    #[default]
    Standard,
    Thorough,
}

impl GeneratorPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            GeneratorPreset::Quick => "Quick",
            GeneratorPreset::Standard => "Standard",
            GeneratorPreset::Thorough => "Thorough",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "quick" | "fast" => Some(GeneratorPreset::Quick),
            "standard" | "default" => Some(GeneratorPreset::Standard),
            "thorough" | "slow" => Some(GeneratorPreset::Thorough),
            _ => None,
        }
    }

    /// Generation attempts for this preset
    pub fn tries(&self) -> u32 {
        match self {
            GeneratorPreset::Quick => 20,
            GeneratorPreset::Standard => GENERATION_TRIES,
            GeneratorPreset::Thorough => 1000,
        }
    }

    /// Reverse-simulation iterations per attempt
    pub fn reverse_step_limit(&self) -> u32 {
        match self {
            GeneratorPreset::Quick => 2_000,
            GeneratorPreset::Standard => REVERSE_STEP_LIMIT,
            GeneratorPreset::Thorough => 20_000,
        }
    }
}

/// Level generator tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorSettings {
    pub preset: GeneratorPreset,
    /// Attempts; the highest-scoring level is kept
    pub tries: u32,
    /// Reverse-simulation iterations per attempt
    pub reverse_step_limit: u32,
    /// Stop an attempt early after this many accepted reverse moves
    pub target_moves: usize,
    /// Probability that a terrain cell is White
    pub block_density: f32,
    /// Probability that a reverse move un-grows the snake (leaving food behind)
    pub food_chance: f32,
    /// Inclusive range of level width and height
    pub min_size: i32,
    pub max_size: i32,
    /// Inclusive range of snake count
    pub min_snakes: usize,
    pub max_snakes: usize,
    /// Inclusive range of the length each snake is grown to before reverse play
    pub min_snake_length: usize,
    pub max_snake_length: usize,
    pub metric: ComplexityMetric,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            preset: GeneratorPreset::Standard,
            tries: GENERATION_TRIES,
            reverse_step_limit: REVERSE_STEP_LIMIT,
            target_moves: TARGET_ACCEPTED_MOVES,
            block_density: BLOCK_DENSITY,
            food_chance: FOOD_CHANCE,

            // Small levels tend toward puzzles rather than traversal.
            min_size: 2,
            max_size: 6,

            min_snakes: 1,
            max_snakes: 3,
            min_snake_length: 2,
            max_snake_length: 11,

            metric: ComplexityMetric::FoodCount,
        }
    }
}

impl GeneratorSettings {
    /// Create settings from a preset (applies preset effort levels)
    pub fn from_preset(preset: GeneratorPreset) -> Self {
        let mut settings = Self::default();
        settings.apply_preset(preset);
        settings
    }

    pub fn apply_preset(&mut self, preset: GeneratorPreset) {
        self.preset = preset;
        self.tries = preset.tries();
        self.reverse_step_limit = preset.reverse_step_limit();
    }
}

/// Playthrough simplifier tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimplifierSettings {
    /// Longest replacement sequence searched for at each step
    pub max_depth: usize,
}

impl Default for SimplifierSettings {
    fn default() -> Self {
        Self {
            max_depth: SIMPLIFY_MAX_DEPTH,
        }
    }
}

/// All tunables
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub generator: GeneratorSettings,
    pub simplifier: SimplifierSettings,
}

impl Settings {
    pub fn from_preset(preset: GeneratorPreset) -> Self {
        Self {
            generator: GeneratorSettings::from_preset(preset),
            simplifier: SimplifierSettings::default(),
        }
    }

    /// Load settings from a JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let settings: Settings = serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }
}
