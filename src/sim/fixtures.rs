//! Small level builders for tests
//!
//! Terrain sketch characters: `.` Black, `#` White, `_` Neither, `%` Both.

use glam::IVec2;

use super::geometry::Point;
use super::layer::CollisionLayer;
use super::state::{Food, Level, Snake};

pub fn p(x: i32, y: i32) -> Point {
    IVec2::new(x, y)
}

pub fn level(rows: &[&str]) -> Level {
    let height = rows.len() as i32;
    let width = rows.first().map_or(0, |r| r.len()) as i32;
    let mut level = Level::new(width, height, CollisionLayer::Neither);
    for (y, row) in rows.iter().enumerate() {
        assert_eq!(row.len() as i32, width, "ragged sketch row {y}");
        for (x, c) in row.chars().enumerate() {
            let layer = match c {
                '.' => CollisionLayer::Black,
                '#' => CollisionLayer::White,
                '_' => CollisionLayer::Neither,
                '%' => CollisionLayer::Both,
                other => panic!("unknown terrain character {other:?}"),
            };
            level.set_terrain(p(x as i32, y as i32), layer);
        }
    }
    level
}

pub fn snake(id: &str, layer: CollisionLayer, segments: &[(i32, i32)]) -> Snake {
    Snake::new(id, segments.iter().map(|&(x, y)| p(x, y)).collect(), layer)
}

pub fn food(x: i32, y: i32, layer: CollisionLayer) -> Food {
    Food::new(p(x, y), layer)
}
