//! Deterministic move engine
//!
//! All puzzle rules live here. This module must be pure and deterministic:
//! - No randomness (the generator brings its own RNG)
//! - No IO
//! - Side effects confined to the `Level` passed in

pub mod geometry;
pub mod hit_test;
pub mod input;
pub mod layer;
pub mod moves;
pub mod state;

#[cfg(test)]
pub(crate) mod fixtures;

pub use geometry::{Direction, Point, is_unit_step};
pub use hit_test::{Hit, HitTestOptions, hit_test_all, top_layer, top_layer_at};
pub use input::{MoveInput, apply_input, replay, replay_final};
pub use layer::CollisionLayer;
pub use moves::{Move, analyze_move, analyze_move_to, available_moves, can_move, take_move};
pub use state::{Entity, Food, Level, Snake};
