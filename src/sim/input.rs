//! Replayable move inputs
//!
//! A `Move` holds entity indices into one particular level, so recordings use
//! `MoveInput` instead: a direction plus the snake's ID, valid against any
//! level state that still contains that snake.

use serde::{Deserialize, Serialize};

use super::geometry::Direction;
use super::moves::{Move, analyze_move, take_move};
use super::state::Level;
use crate::error::ReplayError;

/// One recorded step of a playthrough
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveInput {
    pub direction: Direction,
    pub snake_id: String,
}

impl MoveInput {
    pub fn new(direction: Direction, snake_id: impl Into<String>) -> Self {
        Self {
            direction,
            snake_id: snake_id.into(),
        }
    }

    /// Analyze this input against `level`; None if the snake isn't there
    pub fn analyze(&self, level: &Level) -> Option<Move> {
        let snake = level.snake_index(&self.snake_id)?;
        Some(analyze_move(level, snake, self.direction.delta()))
    }

    /// Record a move analyzed against `level`
    pub fn from_move(mv: &Move, level: &Level) -> Option<Self> {
        let direction = mv.direction()?;
        let snake = level.entities.get(mv.snake)?.as_snake()?;
        Some(Self::new(direction, snake.id.clone()))
    }
}

/// Apply one input, refusing invalid moves
///
/// `index` is the input's position in its playthrough, for error reporting.
pub fn apply_input(level: &mut Level, input: &MoveInput, index: usize) -> Result<(), ReplayError> {
    let mv = input.analyze(level).ok_or_else(|| ReplayError::UnknownSnake {
        index,
        snake_id: input.snake_id.clone(),
    })?;
    if !mv.valid {
        return Err(ReplayError::InvalidMove {
            index,
            snake_id: input.snake_id.clone(),
            direction: input.direction,
            encumbered: mv.encumbered,
        });
    }
    take_move(&mv, level);
    Ok(())
}

/// Replay inputs from `start`, returning every state including the start
pub fn replay(start: &Level, inputs: &[MoveInput]) -> Result<Vec<Level>, ReplayError> {
    let mut states = Vec::with_capacity(inputs.len() + 1);
    states.push(start.clone());
    for (index, input) in inputs.iter().enumerate() {
        let mut next = states[states.len() - 1].clone();
        apply_input(&mut next, input, index)?;
        states.push(next);
    }
    Ok(states)
}

/// Replay inputs and return only the final state
pub fn replay_final(start: &Level, inputs: &[MoveInput]) -> Result<Level, ReplayError> {
    let mut level = start.clone();
    for (index, input) in inputs.iter().enumerate() {
        apply_input(&mut level, input, index)?;
    }
    Ok(level)
}
