//! Tile hit-testing across the entity stack and terrain
//!
//! Hits come back topmost first: entities in reverse list order, then the
//! terrain cell as the lowest-priority fallback.

use super::geometry::Point;
use super::layer::CollisionLayer;
use super::state::{Entity, Level};

/// One occupant of a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    /// Entity index, None for terrain
    pub entity: Option<usize>,
    /// Segment index when the occupant is a snake
    pub segment: Option<usize>,
    pub layer: CollisionLayer,
    /// Whether the occupant blocks movement; terrain always does
    pub solid: bool,
}

impl Hit {
    pub fn terrain(layer: CollisionLayer) -> Self {
        Self {
            entity: None,
            segment: None,
            layer,
            solid: true,
        }
    }
}

/// Hit-test options
#[derive(Debug, Clone, Copy, Default)]
pub struct HitTestOptions {
    /// Skip the tail segment of the snake at this entity index
    pub ignore_tail_of_snake: Option<usize>,
}

/// All occupants of `point`, highest priority first
///
/// Out-of-bounds points yield no hits at all, not even terrain.
pub fn hit_test_all(point: Point, level: &Level, options: HitTestOptions) -> Vec<Hit> {
    let Some(terrain) = level.terrain_at(point) else {
        return Vec::new();
    };
    let mut hits = Vec::new();
    for (index, entity) in level.entities.iter().enumerate().rev() {
        match entity {
            Entity::Snake(snake) => {
                let ignore_tail = options.ignore_tail_of_snake == Some(index);
                if let Some(segment) = snake.segment_at(point, ignore_tail) {
                    hits.push(Hit {
                        entity: Some(index),
                        segment: Some(segment),
                        layer: snake.layer,
                        solid: true,
                    });
                }
            }
            Entity::Food(food) => {
                if food.position == point {
                    hits.push(Hit {
                        entity: Some(index),
                        segment: None,
                        layer: food.layer,
                        solid: false,
                    });
                }
            }
        }
    }
    hits.push(Hit::terrain(terrain));
    hits
}

/// Layer of the topmost solid hit
///
/// Food never blocks, so non-solid hits are skipped. An empty hit list means
/// the tile is off the grid and collides with everything.
pub fn top_layer(hits: &[Hit]) -> CollisionLayer {
    hits.iter()
        .find(|hit| hit.solid)
        .map(|hit| hit.layer)
        .unwrap_or(CollisionLayer::Both)
}

/// Shorthand for `top_layer(&hit_test_all(point, level, default))`
pub fn top_layer_at(point: Point, level: &Level) -> CollisionLayer {
    top_layer(&hit_test_all(point, level, HitTestOptions::default()))
}

/// Entity indices of the hits, terrain dropped
pub fn hits_to_entities(hits: &[Hit]) -> Vec<usize> {
    hits.iter().filter_map(|hit| hit.entity).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{Food, Snake};
    use glam::IVec2;

    fn p(x: i32, y: i32) -> Point {
        IVec2::new(x, y)
    }

    fn stacked_level() -> Level {
        let mut level = Level::new(3, 3, CollisionLayer::Black);
        level.set_terrain(p(2, 2), CollisionLayer::White);
        level.push(Snake::new("low", vec![p(1, 1), p(0, 1)], CollisionLayer::White));
        level.push(Food::new(p(1, 1), CollisionLayer::Black));
        level.push(Snake::new("high", vec![p(1, 0), p(1, 1)], CollisionLayer::Black));
        level
    }

    #[test]
    fn test_hits_topmost_first_with_terrain_last() {
        let level = stacked_level();
        let hits = hit_test_all(p(1, 1), &level, HitTestOptions::default());
        let entities: Vec<_> = hits.iter().map(|h| h.entity).collect();
        assert_eq!(entities, vec![Some(2), Some(1), Some(0), None]);
        assert_eq!(hits[0].segment, Some(1));
        assert!(!hits[1].solid);
        assert_eq!(hits[3], Hit::terrain(CollisionLayer::Black));
    }

    #[test]
    fn test_out_of_bounds_has_no_hits() {
        let level = stacked_level();
        assert!(hit_test_all(p(-1, 0), &level, HitTestOptions::default()).is_empty());
        assert!(hit_test_all(p(0, 3), &level, HitTestOptions::default()).is_empty());
        assert_eq!(top_layer_at(p(3, 0), &level), CollisionLayer::Both);
    }

    #[test]
    fn test_ignore_tail_only_for_named_snake() {
        let level = stacked_level();
        let options = HitTestOptions {
            ignore_tail_of_snake: Some(2),
        };
        let hits = hit_test_all(p(1, 1), &level, options);
        assert_eq!(hits_to_entities(&hits), vec![1, 0]);

        let options = HitTestOptions {
            ignore_tail_of_snake: Some(0),
        };
        let hits = hit_test_all(p(0, 1), &level, options);
        assert_eq!(hits_to_entities(&hits), Vec::<usize>::new());
    }

    #[test]
    fn test_top_layer_skips_food() {
        let mut level = Level::new(2, 1, CollisionLayer::Black);
        level.push(Food::new(p(0, 0), CollisionLayer::White));
        assert_eq!(top_layer_at(p(0, 0), &level), CollisionLayer::Black);
        assert_eq!(top_layer_at(p(1, 0), &level), CollisionLayer::Black);

        let level = stacked_level();
        assert_eq!(top_layer_at(p(1, 1), &level), CollisionLayer::Black);
        assert_eq!(top_layer_at(p(0, 1), &level), CollisionLayer::White);
        assert_eq!(top_layer_at(p(2, 2), &level), CollisionLayer::White);
    }
}
