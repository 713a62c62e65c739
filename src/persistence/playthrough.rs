//! Recorded playthroughs (`"format": "snakeshift-moves"`)

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::level::{LoadedLevel, check_format, level_from_value, serialize_level_with_id};
use crate::consts::{PLAYTHROUGH_FORMAT, PLAYTHROUGH_FORMAT_VERSION};
use crate::error::FormatError;
use crate::sim::{Level, MoveInput};

/// A starting level and the moves played on it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playthrough {
    pub level: LoadedLevel,
    pub moves: Vec<MoveInput>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaythroughDocument {
    format: String,
    format_version: u32,
    level: Value,
    moves: Vec<MoveInput>,
}

impl Playthrough {
    pub fn new(level: Level, moves: Vec<MoveInput>) -> Self {
        Self {
            level: LoadedLevel {
                level,
                active_snake: None,
                level_id: None,
            },
            moves,
        }
    }
}

pub fn serialize_playthrough(playthrough: &Playthrough) -> Result<String, FormatError> {
    let level = &playthrough.level;
    let level_json =
        serialize_level_with_id(&level.level, level.active_snake, level.level_id.as_deref())?;
    let doc = PlaythroughDocument {
        format: PLAYTHROUGH_FORMAT.to_string(),
        format_version: PLAYTHROUGH_FORMAT_VERSION,
        level: serde_json::from_str(&level_json)?,
        moves: playthrough.moves.clone(),
    };
    Ok(serde_json::to_string_pretty(&doc)?)
}

pub fn deserialize_playthrough(json: &str) -> Result<Playthrough, FormatError> {
    let value: Value = serde_json::from_str(json)?;
    check_format(&value, PLAYTHROUGH_FORMAT)?;
    let doc: PlaythroughDocument = serde_json::from_value(value)?;
    if doc.format_version != PLAYTHROUGH_FORMAT_VERSION {
        return Err(FormatError::UnsupportedVersion {
            found: doc.format_version,
            supported: PLAYTHROUGH_FORMAT_VERSION,
        });
    }
    Ok(Playthrough {
        level: level_from_value(doc.level)?,
        moves: doc.moves,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Direction;
    use crate::sim::fixtures::{food, level, snake};
    use crate::sim::layer::CollisionLayer::White;

    #[test]
    fn test_round_trip() {
        let mut lvl = level(&["..."]);
        lvl.push(snake("1", White, &[(0, 0)]));
        lvl.push(food(2, 0, White));
        let playthrough = Playthrough::new(lvl, vec![MoveInput::new(Direction::Right, "1"); 2]);
        let json = serialize_playthrough(&playthrough).unwrap();
        assert!(json.contains(r#""snakeId": "1""#));
        assert_eq!(deserialize_playthrough(&json).unwrap(), playthrough);
    }

    #[test]
    fn test_rejects_level_document() {
        let lvl = level(&["."]);
        let json = super::super::level::serialize_level(&lvl, None).unwrap();
        assert!(matches!(
            deserialize_playthrough(&json),
            Err(FormatError::WrongFormat { expected: "snakeshift-moves", .. })
        ));
    }

    #[test]
    fn test_rejects_future_version() {
        let json = r#"{"format":"snakeshift-moves","formatVersion":2,"level":{},"moves":[]}"#;
        assert!(matches!(
            deserialize_playthrough(json),
            Err(FormatError::UnsupportedVersion { found: 2, supported: 1 })
        ));
    }
}
