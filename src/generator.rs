//! Reverse-simulation level generator
//!
//! An attempt lays out random terrain and snakes (the solved state), then plays
//! random moves backwards, leaving food where a snake must have eaten. Every
//! reverse step is checked by analyzing the forward move and requiring that it
//! reproduces the state exactly, so the recorded moves, reversed, always solve
//! the generated level. Many attempts run and the highest-scoring level wins.

use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};
use serde::{Deserialize, Serialize};

use crate::error::ReplayError;
use crate::settings::GeneratorSettings;
use crate::sim::{
    CollisionLayer, Direction, Food, HitTestOptions, Level, MoveInput, Point, Snake, analyze_move_to,
    hit_test_all, replay_final, take_move, top_layer_at,
};

/// One accepted move of the generated solution, in forward order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedStep {
    pub input: MoveInput,
    /// Entities found at the destination when the move is played forward
    pub entities_touched: usize,
}

/// A generated puzzle with a known solution
#[derive(Debug, Clone)]
pub struct GeneratedLevel {
    pub level: Level,
    /// Moves that win `level`, in play order
    pub solution: Vec<MoveInput>,
    pub complexity: u32,
}

impl GeneratedLevel {
    /// Replay the recorded solution and report whether it wins
    pub fn verify(&self) -> Result<bool, ReplayError> {
        Ok(replay_final(&self.level, &self.solution)?.is_won())
    }
}

/// Scores a generated level; higher is more interesting
pub trait ComplexityScorer {
    fn score(&self, level: &Level, solution: &[GeneratedStep]) -> u32;
}

/// Built-in complexity heuristics
///
/// None of these is a reliable measure of puzzle quality. Food count is the
/// default; snake switches tends to favor open levels with spare snakes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ComplexityMetric {
    /// Food left to eat
    #[default]
    FoodCount,
    /// Times the solution changes which snake moves
    SnakeSwitches,
    /// Entities landed on across the solution
    EntitiesTouched,
}

impl ComplexityScorer for ComplexityMetric {
    fn score(&self, level: &Level, solution: &[GeneratedStep]) -> u32 {
        match self {
            ComplexityMetric::FoodCount => level.food_count() as u32,
            ComplexityMetric::SnakeSwitches => {
                let mut last: Option<&str> = None;
                let mut switches = 0;
                for step in solution {
                    if last != Some(step.input.snake_id.as_str()) {
                        switches += 1;
                    }
                    last = Some(step.input.snake_id.as_str());
                }
                switches
            }
            ComplexityMetric::EntitiesTouched => {
                solution.iter().map(|s| s.entities_touched as u32).sum()
            }
        }
    }
}

impl<F> ComplexityScorer for F
where
    F: Fn(&Level, &[GeneratedStep]) -> u32,
{
    fn score(&self, level: &Level, solution: &[GeneratedStep]) -> u32 {
        self(level, solution)
    }
}

/// Generate a level scored by the settings' metric
pub fn generate_level<R: Rng + ?Sized>(
    settings: &GeneratorSettings,
    rng: &mut R,
) -> Option<GeneratedLevel> {
    generate_level_with(settings, rng, &settings.metric)
}

/// Generate a level with a custom scorer
///
/// Returns None if no attempt produced a level with food and a positive score;
/// that is a normal outcome, callers may simply try again.
pub fn generate_level_with<R, S>(
    settings: &GeneratorSettings,
    rng: &mut R,
    scorer: &S,
) -> Option<GeneratedLevel>
where
    R: Rng + ?Sized,
    S: ComplexityScorer + ?Sized,
{
    let settings = sanitize(settings);
    let mut best: Option<GeneratedLevel> = None;
    for _ in 0..settings.tries {
        let Some(candidate) = attempt(&settings, rng, scorer) else {
            continue;
        };
        if candidate.complexity > best.as_ref().map_or(0, |b| b.complexity) {
            best = Some(candidate);
        }
    }
    match &best {
        Some(level) => log::info!(
            "Best complexity found: {} ({}x{}, {} moves)",
            level.complexity,
            level.level.width,
            level.level.height,
            level.solution.len()
        ),
        None => log::warn!("Failed to generate any valid level in {} tries", settings.tries),
    }
    best
}

/// One generation attempt; None if the result has no food
pub fn try_generate_level<R, S>(
    settings: &GeneratorSettings,
    rng: &mut R,
    scorer: &S,
) -> Option<GeneratedLevel>
where
    R: Rng + ?Sized,
    S: ComplexityScorer + ?Sized,
{
    attempt(&sanitize(settings), rng, scorer)
}

/// One attempt with settings already clamped by [`sanitize`]
fn attempt<R, S>(settings: &GeneratorSettings, rng: &mut R, scorer: &S) -> Option<GeneratedLevel>
where
    R: Rng + ?Sized,
    S: ComplexityScorer + ?Sized,
{
    let width = rng.random_range(settings.min_size..=settings.max_size);
    let height = rng.random_range(settings.min_size..=settings.max_size);
    let mut level = Level::new(width, height, CollisionLayer::Black);
    for cell in level.grid.iter_mut() {
        if rng.random::<f32>() < settings.block_density {
            *cell = CollisionLayer::White;
        }
    }

    spawn_snakes(&mut level, settings, rng);

    let mut steps = Vec::new();
    for _ in 0..settings.reverse_step_limit {
        if let Some(step) = reverse_step(&mut level, settings, rng) {
            steps.push(step);
            if steps.len() >= settings.target_moves {
                break;
            }
        }
    }

    if level.food_count() == 0 {
        // Nothing to eat: already solved, not a puzzle.
        return None;
    }

    steps.reverse();
    let complexity = scorer.score(&level, &steps);
    log::debug!(
        "Attempt: {}x{}, {} snakes, {} food, {} moves, complexity {}",
        width,
        height,
        level.snake_indices().len(),
        level.food_count(),
        steps.len(),
        complexity
    );
    Some(GeneratedLevel {
        level,
        solution: steps.into_iter().map(|s| s.input).collect(),
        complexity,
    })
}

/// Place snakes as randomized self-avoiding walks over compatible terrain
fn spawn_snakes<R: Rng + ?Sized>(level: &mut Level, settings: &GeneratorSettings, rng: &mut R) {
    let count = rng.random_range(settings.min_snakes..=settings.max_snakes);
    for i in 0..count {
        let mut at = Point::new(
            rng.random_range(0..level.width),
            rng.random_range(0..level.height),
        );
        // Read the layer before pushing so the snake doesn't see itself.
        let layer = top_layer_at(at, level).invert();
        level.push(Snake::new((i + 1).to_string(), vec![at], layer));
        let index = level.entities.len() - 1;

        let target_length =
            rng.random_range(settings.min_snake_length..=settings.max_snake_length);
        for _ in 1..target_length {
            let mut directions = Direction::ALL;
            directions.shuffle(rng);
            for direction in directions {
                let next = at + direction.delta();
                if !level.in_bounds(next) {
                    continue;
                }
                if !top_layer_at(next, level).collides(layer) {
                    at = next;
                    level.snake_mut(index).segments.push(next);
                    break;
                }
            }
        }
    }
}

/// Try to undo one random forward move, mutating `level` only on success
fn reverse_step<R: Rng + ?Sized>(
    level: &mut Level,
    settings: &GeneratorSettings,
    rng: &mut R,
) -> Option<GeneratedStep> {
    let snakes = level.snake_indices();
    let &index = snakes.choose(rng)?;
    let direction = *Direction::ALL.choose(rng)?;

    let snake = level.snake(index);
    let before_tile = snake.tail() + direction.opposite().delta();
    if !level.in_bounds(before_tile) || top_layer_at(before_tile, level).collides(snake.layer) {
        return None;
    }
    let head = snake.head();
    let layer = snake.layer;
    let id = snake.id.clone();
    // The forward move into this state ate food iff the snake is now due to grow.
    let ate = snake.grow_on_next_move;
    // Whether the snake was due to grow before the move, i.e. is one shorter.
    let shrink = snake.len() > 1 && rng.random::<f32>() < settings.food_chance;

    let mut candidate = level.clone();
    if ate {
        let food_there = hit_test_all(head, level, HitTestOptions::default())
            .iter()
            .any(|hit| hit.entity.is_some_and(|e| level.entities[e].is_food()));
        if food_there {
            return None;
        }
        candidate.push(Food::new(head, layer));
    }
    {
        let snake = candidate.snake_mut(index);
        snake.move_by_tail(before_tile);
        if shrink {
            snake.segments.pop();
        }
        snake.grow_on_next_move = shrink;
    }

    let forward = analyze_move_to(&candidate, index, head);
    if !forward.valid {
        log::trace!("Rejected reverse move of snake {id}: forward move invalid");
        return None;
    }
    // A valid move is not necessarily a valid precondition: it must also
    // reproduce this exact state, entity order included.
    let mut replayed = candidate.clone();
    take_move(&forward, &mut replayed);
    if replayed != *level {
        log::trace!("Rejected reverse move of snake {id}: forward replay differs");
        return None;
    }

    let step = GeneratedStep {
        input: MoveInput::new(forward.direction()?, id),
        entities_touched: forward.entities_there.len(),
    };
    *level = candidate;
    Some(step)
}

/// Clamp settings into ranges the generator can sample from
fn sanitize(settings: &GeneratorSettings) -> GeneratorSettings {
    let mut s = settings.clone();
    s.min_size = s.min_size.max(1);
    s.max_size = s.max_size.max(s.min_size);
    s.min_snakes = s.min_snakes.max(1);
    s.max_snakes = s.max_snakes.max(s.min_snakes);
    s.min_snake_length = s.min_snake_length.max(1);
    s.max_snake_length = s.max_snake_length.max(s.min_snake_length);
    s.block_density = s.block_density.clamp(0.0, 1.0);
    s.food_chance = s.food_chance.clamp(0.0, 1.0);
    s
}
