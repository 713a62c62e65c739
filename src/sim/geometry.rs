//! Grid points and cardinal directions

use glam::IVec2;
use serde::{Deserialize, Serialize};

/// Integer tile coordinate, x to the right and y downward
pub type Point = IVec2;

/// One of the four unit steps a snake can take
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vector", into = "Vector")]
pub enum Direction {
    Right,
    Down,
    Left,
    Up,
}

impl Direction {
    /// All directions, in the order move search tries them
    pub const ALL: [Direction; 4] = [
        Direction::Right,
        Direction::Down,
        Direction::Left,
        Direction::Up,
    ];

    #[inline]
    pub fn delta(self) -> Point {
        match self {
            Direction::Right => IVec2::X,
            Direction::Down => IVec2::Y,
            Direction::Left => IVec2::NEG_X,
            Direction::Up => IVec2::NEG_Y,
        }
    }

    /// Direction for an exact unit step, None for anything else
    pub fn from_delta(delta: Point) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.delta() == delta)
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Right => Direction::Left,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Up => Direction::Down,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Right => "Right",
            Direction::Down => "Down",
            Direction::Left => "Left",
            Direction::Up => "Up",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether `delta` is a single axis-aligned unit step
#[inline]
pub fn is_unit_step(delta: Point) -> bool {
    (delta.x == 0 || delta.y == 0) && (delta.x.abs() == 1 || delta.y.abs() == 1)
}

/// Wire shape of a direction: `{ "x": dx, "y": dy }`
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Vector {
    pub x: i32,
    pub y: i32,
}

impl TryFrom<Vector> for Direction {
    type Error = String;

    fn try_from(v: Vector) -> Result<Self, Self::Error> {
        Direction::from_delta(IVec2::new(v.x, v.y))
            .ok_or_else(|| format!("({}, {}) is not a unit direction", v.x, v.y))
    }
}

impl From<Direction> for Vector {
    fn from(direction: Direction) -> Self {
        let d = direction.delta();
        Vector { x: d.x, y: d.y }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_steps() {
        for d in Direction::ALL {
            assert!(is_unit_step(d.delta()));
            assert_eq!(Direction::from_delta(d.delta()), Some(d));
            assert_eq!(d.opposite().delta(), -d.delta());
        }
        assert!(!is_unit_step(IVec2::ZERO));
        assert!(!is_unit_step(IVec2::new(1, 1)));
        assert!(!is_unit_step(IVec2::new(2, 0)));
        assert!(!is_unit_step(IVec2::new(0, -2)));
        assert_eq!(Direction::from_delta(IVec2::new(0, 2)), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Direction::Up.to_string(), "Up");
        assert_eq!(Direction::Right.opposite().to_string(), "Left");
    }

    #[test]
    fn test_direction_json_shape() {
        let json = serde_json::to_string(&Direction::Up).unwrap();
        assert_eq!(json, r#"{"x":0,"y":-1}"#);
        let d: Direction = serde_json::from_str(r#"{"x":1,"y":0}"#).unwrap();
        assert_eq!(d, Direction::Right);
        assert!(serde_json::from_str::<Direction>(r#"{"x":1,"y":1}"#).is_err());
    }
}
