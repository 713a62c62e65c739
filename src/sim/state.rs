//! Level state and entity types
//!
//! A `Level` is a static terrain grid plus an ordered entity list. The list
//! order is the stacking order: later entities sit on top of earlier ones.
//! Move analysis and take-move depend on it, and level equality compares it
//! index for index. Entities are identified by their index in the list.

use serde::{Deserialize, Serialize};

use super::geometry::Point;
use super::layer::CollisionLayer;

/// A piece of food, eaten by a snake on a colliding layer
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Food {
    pub position: Point,
    pub layer: CollisionLayer,
}

impl Food {
    pub fn new(position: Point, layer: CollisionLayer) -> Self {
        Self { position, layer }
    }
}

/// A snake; all its segments share one layer
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Snake {
    pub id: String,
    /// Head first. Never empty.
    pub segments: Vec<Point>,
    pub grow_on_next_move: bool,
    pub layer: CollisionLayer,
}

impl Snake {
    pub fn new(id: impl Into<String>, segments: Vec<Point>, layer: CollisionLayer) -> Self {
        assert!(!segments.is_empty(), "snake must have at least one segment");
        Self {
            id: id.into(),
            segments,
            grow_on_next_move: false,
            layer,
        }
    }

    #[inline]
    pub fn head(&self) -> Point {
        self.segments[0]
    }

    #[inline]
    pub fn tail(&self) -> Point {
        self.segments[self.segments.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Index of the segment at `point`, optionally skipping the tail
    pub fn segment_at(&self, point: Point, ignore_tail: bool) -> Option<usize> {
        let last = self.segments.len() - 1;
        self.segments
            .iter()
            .enumerate()
            .find(|&(i, &segment)| segment == point && !(ignore_tail && i == last))
            .map(|(i, _)| i)
    }

    /// Slither forward: every segment takes its predecessor's place, then the head moves to `to`
    pub fn move_by_head(&mut self, to: Point) {
        for i in (1..self.segments.len()).rev() {
            self.segments[i] = self.segments[i - 1];
        }
        self.segments[0] = to;
    }

    /// Slither backward: every segment takes its successor's place, then the tail moves to `to`
    pub fn move_by_tail(&mut self, to: Point) {
        let last = self.segments.len() - 1;
        for i in 0..last {
            self.segments[i] = self.segments[i + 1];
        }
        self.segments[last] = to;
    }
}

/// Anything in a level's entity list
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Entity {
    Snake(Snake),
    Food(Food),
}

impl Entity {
    /// Solid entities block movement and stack; food does neither
    pub fn is_solid(&self) -> bool {
        match self {
            Entity::Snake(_) => true,
            Entity::Food(_) => false,
        }
    }

    pub fn layer(&self) -> CollisionLayer {
        match self {
            Entity::Snake(snake) => snake.layer,
            Entity::Food(food) => food.layer,
        }
    }

    pub fn as_snake(&self) -> Option<&Snake> {
        match self {
            Entity::Snake(snake) => Some(snake),
            _ => None,
        }
    }

    pub fn as_snake_mut(&mut self) -> Option<&mut Snake> {
        match self {
            Entity::Snake(snake) => Some(snake),
            _ => None,
        }
    }

    pub fn as_food(&self) -> Option<&Food> {
        match self {
            Entity::Food(food) => Some(food),
            _ => None,
        }
    }

    pub fn is_food(&self) -> bool {
        matches!(self, Entity::Food(_))
    }
}

impl From<Snake> for Entity {
    fn from(snake: Snake) -> Self {
        Entity::Snake(snake)
    }
}

impl From<Food> for Entity {
    fn from(food: Food) -> Self {
        Entity::Food(food)
    }
}

/// Complete puzzle state
///
/// `Clone` is a deep snapshot and `==` is structural equality including
/// entity order, which is what undo, generation rollback and the simplifier
/// rely on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Level {
    pub width: i32,
    pub height: i32,
    /// Static terrain, row-major (`y * width + x`)
    pub grid: Vec<CollisionLayer>,
    /// Stacking order, bottom first
    pub entities: Vec<Entity>,
}

impl Level {
    /// Create an entity-free level with uniform terrain
    pub fn new(width: i32, height: i32, fill: CollisionLayer) -> Self {
        assert!(width >= 0 && height >= 0, "level size must not be negative");
        Self {
            width,
            height,
            grid: vec![fill; width as usize * height as usize],
            entities: Vec::new(),
        }
    }

    #[inline]
    pub fn in_bounds(&self, point: Point) -> bool {
        point.x >= 0 && point.y >= 0 && point.x < self.width && point.y < self.height
    }

    /// Terrain layer, None outside the level
    pub fn terrain_at(&self, point: Point) -> Option<CollisionLayer> {
        if self.in_bounds(point) {
            Some(self.grid[(point.y * self.width + point.x) as usize])
        } else {
            None
        }
    }

    /// Set a terrain cell; out-of-bounds writes are ignored and return false
    pub fn set_terrain(&mut self, point: Point, layer: CollisionLayer) -> bool {
        if !self.in_bounds(point) {
            return false;
        }
        let index = (point.y * self.width + point.x) as usize;
        self.grid[index] = layer;
        true
    }

    /// Terrain rows, top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[CollisionLayer]> {
        self.grid.chunks(self.width.max(1) as usize)
    }

    /// The snake at entity index `index`
    ///
    /// # Panics
    /// If `index` is not a snake. Passing a non-snake index is a caller bug.
    pub fn snake(&self, index: usize) -> &Snake {
        match self.entities.get(index) {
            Some(Entity::Snake(snake)) => snake,
            other => panic!("entity {index} is not a snake: {other:?}"),
        }
    }

    /// Mutable form of [`Level::snake`]
    pub fn snake_mut(&mut self, index: usize) -> &mut Snake {
        match self.entities.get_mut(index) {
            Some(Entity::Snake(snake)) => snake,
            other => panic!("entity {index} is not a snake: {other:?}"),
        }
    }

    pub fn snake_index(&self, id: &str) -> Option<usize> {
        self.entities
            .iter()
            .position(|e| e.as_snake().is_some_and(|s| s.id == id))
    }

    /// Snakes with their entity indices, bottom first
    pub fn snakes(&self) -> impl Iterator<Item = (usize, &Snake)> {
        self.entities
            .iter()
            .enumerate()
            .filter_map(|(i, e)| e.as_snake().map(|s| (i, s)))
    }

    pub fn snake_indices(&self) -> Vec<usize> {
        self.snakes().map(|(i, _)| i).collect()
    }

    pub fn food_count(&self) -> usize {
        self.entities.iter().filter(|e| e.is_food()).count()
    }

    /// A level is won once every piece of food has been eaten
    pub fn is_won(&self) -> bool {
        !self.entities.iter().any(Entity::is_food)
    }

    pub fn push(&mut self, entity: impl Into<Entity>) {
        self.entities.push(entity.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::IVec2;

    fn p(x: i32, y: i32) -> Point {
        IVec2::new(x, y)
    }

    #[test]
    fn test_move_by_head_slithers() {
        let mut snake = Snake::new("1", vec![p(2, 0), p(1, 0), p(0, 0)], CollisionLayer::White);
        snake.move_by_head(p(2, 1));
        assert_eq!(snake.segments, vec![p(2, 1), p(2, 0), p(1, 0)]);
    }

    #[test]
    fn test_move_by_tail_reverses_move_by_head() {
        let original = Snake::new("1", vec![p(2, 0), p(1, 0), p(0, 0)], CollisionLayer::White);
        let mut snake = original.clone();
        snake.move_by_head(p(3, 0));
        snake.move_by_tail(p(0, 0));
        assert_eq!(snake, original);
    }

    #[test]
    fn test_segment_at_ignores_tail_on_request() {
        let snake = Snake::new("1", vec![p(1, 0), p(0, 0)], CollisionLayer::Black);
        assert_eq!(snake.segment_at(p(0, 0), false), Some(1));
        assert_eq!(snake.segment_at(p(0, 0), true), None);
        assert_eq!(snake.segment_at(p(1, 0), true), Some(0));
    }

    #[test]
    fn test_single_segment_tail_is_head() {
        let snake = Snake::new("1", vec![p(1, 1)], CollisionLayer::Black);
        assert_eq!(snake.segment_at(p(1, 1), true), None);
        assert_eq!(snake.head(), snake.tail());
    }

    #[test]
    fn test_terrain_bounds() {
        let mut level = Level::new(3, 2, CollisionLayer::Black);
        assert_eq!(level.terrain_at(p(2, 1)), Some(CollisionLayer::Black));
        assert_eq!(level.terrain_at(p(3, 0)), None);
        assert_eq!(level.terrain_at(p(0, -1)), None);
        assert!(level.set_terrain(p(1, 1), CollisionLayer::White));
        assert!(!level.set_terrain(p(-1, 1), CollisionLayer::White));
        let rows: Vec<_> = level.rows().collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1][1], CollisionLayer::White);
    }

    #[test]
    fn test_won_when_no_food() {
        let mut level = Level::new(2, 1, CollisionLayer::Black);
        level.push(Snake::new("1", vec![p(0, 0)], CollisionLayer::White));
        assert!(level.is_won());
        level.push(Food::new(p(1, 0), CollisionLayer::White));
        assert!(!level.is_won());
        assert_eq!(level.food_count(), 1);
        assert_eq!(level.snake_index("1"), Some(0));
        assert_eq!(level.snake_index("2"), None);
    }

    #[test]
    fn test_equality_is_positional() {
        let mut a = Level::new(2, 2, CollisionLayer::Black);
        a.push(Snake::new("1", vec![p(0, 0)], CollisionLayer::White));
        a.push(Snake::new("2", vec![p(0, 0)], CollisionLayer::Black));
        let mut b = a.clone();
        assert_eq!(a, b);
        b.entities.swap(0, 1);
        assert_ne!(a, b);
    }

    #[test]
    fn test_clone_is_deep() {
        let mut a = Level::new(2, 2, CollisionLayer::Black);
        a.push(Snake::new("1", vec![p(0, 0), p(1, 0)], CollisionLayer::White));
        let snapshot = a.clone();
        a.snake_mut(0).move_by_head(p(0, 1));
        a.set_terrain(p(1, 1), CollisionLayer::White);
        assert_ne!(a, snapshot);
        assert_eq!(snapshot.snake(0).segments, vec![p(0, 0), p(1, 0)]);
        assert_eq!(snapshot.terrain_at(p(1, 1)), Some(CollisionLayer::Black));
    }
}
