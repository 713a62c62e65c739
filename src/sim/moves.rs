//! Move analysis and application
//!
//! `analyze_move` decides whether a snake may step one tile and records what it
//! would land on; `take_move` applies a validated move to the same level.

use super::geometry::{Point, is_unit_step};
use super::hit_test::{HitTestOptions, hit_test_all, hits_to_entities, top_layer};
use super::state::{Entity, Level};
use crate::sim::Direction;

/// Result of analyzing a one-step move
///
/// Entity indices refer to the level the move was analyzed against and are
/// only meaningful until that level changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Move {
    /// Entity index of the moving snake
    pub snake: usize,
    pub to: Point,
    pub delta: Point,
    pub valid: bool,
    /// Something solid is stacked on top of the snake's body
    pub encumbered: bool,
    /// Entities at the destination, topmost first
    pub entities_there: Vec<usize>,
}

impl Move {
    pub fn direction(&self) -> Option<Direction> {
        Direction::from_delta(self.delta)
    }
}

/// Analyze moving the snake at entity index `snake` by `delta`
///
/// Valid iff the delta is a unit cardinal step, the destination is in
/// bounds, the snake is not doubling back onto its neck, nothing solid is
/// stacked on its body, and the destination's top layer does not collide
/// with the snake's layer.
///
/// # Panics
/// If `snake` is not the index of a snake in `level`.
pub fn analyze_move(level: &Level, snake: usize, delta: Point) -> Move {
    let mover = level.snake(snake);
    let head = mover.head();
    let to = head + delta;

    // A snake that isn't about to grow vacates its tail tile as it moves.
    let ignore_tail_of_snake = if mover.grow_on_next_move {
        None
    } else {
        Some(snake)
    };
    let hits_ahead = hit_test_all(to, level, HitTestOptions { ignore_tail_of_snake });

    let encumbered = mover.segments.iter().any(|&segment| {
        hit_test_all(segment, level, HitTestOptions::default())
            .iter()
            .any(|hit| hit.solid && hit.entity.is_some_and(|e| e != snake && e > snake))
    });

    // Tail exclusion would otherwise let a two-segment snake turn 180°.
    let moving_backwards =
        mover.segments.len() > 1 && delta == (mover.segments[1] - head).signum();

    let valid = is_unit_step(delta)
        && level.in_bounds(to)
        && !moving_backwards
        && !encumbered
        && !top_layer(&hits_ahead).collides(mover.layer);

    Move {
        snake,
        to,
        delta,
        valid,
        encumbered,
        entities_there: hits_to_entities(&hits_ahead),
    }
}

/// Analyze moving the snake's head onto `target`
pub fn analyze_move_to(level: &Level, snake: usize, target: Point) -> Move {
    let delta = target - level.snake(snake).head();
    analyze_move(level, snake, delta)
}

/// Whether the snake has any valid move
pub fn can_move(level: &Level, snake: usize) -> bool {
    Direction::ALL
        .iter()
        .any(|d| analyze_move(level, snake, d.delta()).valid)
}

/// Every valid move in the level, snakes bottom first, directions in `Direction::ALL` order
pub fn available_moves(level: &Level) -> Vec<Move> {
    let mut moves = Vec::new();
    for snake in level.snake_indices() {
        for direction in Direction::ALL {
            let mv = analyze_move(level, snake, direction.delta());
            if mv.valid {
                moves.push(mv);
            }
        }
    }
    moves
}

/// Apply a move produced by [`analyze_move`] on this same, unchanged level
///
/// Does not re-check validity; callers gate on `Move::valid`.
pub fn take_move(mv: &Move, level: &mut Level) {
    debug_assert!(mv.valid, "take_move called with an invalid move");
    let mut snake_index = mv.snake;

    let layer = {
        let snake = level.snake_mut(snake_index);
        if snake.grow_on_next_move {
            let tail = snake.tail();
            snake.segments.push(tail);
            snake.grow_on_next_move = false;
        }
        snake.move_by_head(mv.to);
        snake.layer
    };

    // Food to eat, identified before any reordering shifts indices.
    let mut eaten: Vec<usize> = mv
        .entities_there
        .iter()
        .copied()
        .filter(|&i| matches!(&level.entities[i], Entity::Food(food) if food.layer.collides(layer)))
        .collect();

    // Lift the mover above the topmost solid entity it landed on.
    let top_solid = mv
        .entities_there
        .iter()
        .copied()
        .filter(|&i| level.entities[i].is_solid())
        .max();
    if let Some(target) = top_solid.filter(|&t| t > snake_index) {
        // Equivalent to adjacent swaps carrying the mover up to `target`.
        level.entities[snake_index..=target].rotate_left(1);
        for i in eaten.iter_mut() {
            if *i > snake_index && *i <= target {
                *i -= 1;
            }
        }
        snake_index = target;
    }

    if eaten.is_empty() {
        return;
    }
    eaten.sort_unstable();
    eaten.dedup();
    for &i in eaten.iter().rev() {
        level.entities.remove(i);
        if i < snake_index {
            snake_index -= 1;
        }
    }
    level.snake_mut(snake_index).grow_on_next_move = true;
}
