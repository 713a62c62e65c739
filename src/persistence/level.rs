//! Level documents (`"format": "snakeshift"`)
//!
//! Terrain is stored as `Block` entities, each a rectangle of one layer; cells
//! no block covers are `Neither`. Entities follow in stacking order. Older
//! format versions are upgraded step by step before decoding.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::consts::{LEVEL_FORMAT, LEVEL_FORMAT_VERSION};
use crate::error::FormatError;
use crate::sim::{CollisionLayer, Entity, Food, Level, Point, Snake};

/// A decoded level with its document metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedLevel {
    pub level: Level,
    /// Entity index of the snake the player was steering
    pub active_snake: Option<usize>,
    pub level_id: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct LevelInfo {
    width: i32,
    height: i32,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LevelDocument<E> {
    format: String,
    format_version: u32,
    level_info: LevelInfo,
    entities: Vec<E>,
    entity_types: Vec<String>,
    #[serde(default = "no_active_player")]
    active_player_entity_index: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    level_id: Option<String>,
}

/// Largest coordinate extent a document may describe
const MAX_EXTENT: i32 = 4096;

fn no_active_player() -> i64 {
    -1
}

fn one() -> i32 {
    1
}

/// Block, Food and snake segment shape
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct TileDef {
    x: i32,
    y: i32,
    #[serde(default = "one")]
    width: i32,
    #[serde(default = "one")]
    height: i32,
    #[serde(default)]
    layer: CollisionLayer,
}

impl TileDef {
    fn unit(at: Point, layer: CollisionLayer) -> Self {
        Self {
            x: at.x,
            y: at.y,
            width: 1,
            height: 1,
            layer,
        }
    }
}

/// Snake IDs are strings, though some documents store numbers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum SnakeId {
    Text(String),
    Number(i64),
}

impl SnakeId {
    fn into_string(self) -> String {
        match self {
            SnakeId::Text(s) => s,
            SnakeId::Number(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SnakeDef {
    id: SnakeId,
    segments: Vec<TileDef>,
    #[serde(default)]
    grow_on_next_move: bool,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum EntityDef {
    Tile(TileDef),
    Snake(SnakeDef),
}

/// Serialize a level (one Block per terrain cell)
pub fn serialize_level(level: &Level, active_snake: Option<usize>) -> Result<String, FormatError> {
    serialize_level_with_id(level, active_snake, None)
}

pub fn serialize_level_with_id(
    level: &Level,
    active_snake: Option<usize>,
    level_id: Option<&str>,
) -> Result<String, FormatError> {
    Ok(serde_json::to_string_pretty(&level_document(level, active_snake, level_id))?)
}

fn level_document(
    level: &Level,
    active_snake: Option<usize>,
    level_id: Option<&str>,
) -> LevelDocument<EntityDef> {
    let mut entities = Vec::new();
    let mut entity_types = Vec::new();

    for (y, row) in level.rows().enumerate() {
        for (x, &layer) in row.iter().enumerate() {
            entities.push(EntityDef::Tile(TileDef::unit(
                Point::new(x as i32, y as i32),
                layer,
            )));
            entity_types.push("Block".to_string());
        }
    }
    let blocks = entities.len();

    for entity in &level.entities {
        match entity {
            Entity::Food(food) => {
                entities.push(EntityDef::Tile(TileDef::unit(food.position, food.layer)));
                entity_types.push("Food".to_string());
            }
            Entity::Snake(snake) => {
                entities.push(EntityDef::Snake(SnakeDef {
                    id: SnakeId::Text(snake.id.clone()),
                    segments: snake
                        .segments
                        .iter()
                        .map(|&s| TileDef::unit(s, snake.layer))
                        .collect(),
                    grow_on_next_move: snake.grow_on_next_move,
                }));
                entity_types.push("Snake".to_string());
            }
        }
    }

    let active_player_entity_index = active_snake
        .filter(|&i| level.entities.get(i).is_some_and(|e| e.as_snake().is_some()))
        .map_or(-1, |i| (blocks + i) as i64);

    LevelDocument {
        format: LEVEL_FORMAT.to_string(),
        format_version: LEVEL_FORMAT_VERSION,
        level_info: LevelInfo {
            width: level.width,
            height: level.height,
        },
        entities,
        entity_types,
        active_player_entity_index,
        level_id: level_id.map(str::to_string),
    }
}

/// Deserialize a level document, upgrading older format versions
pub fn deserialize_level(json: &str) -> Result<LoadedLevel, FormatError> {
    let value: Value = serde_json::from_str(json)?;
    level_from_value(value)
}

pub(crate) fn level_from_value(mut value: Value) -> Result<LoadedLevel, FormatError> {
    check_format(&value, LEVEL_FORMAT)?;
    upgrade(&mut value)?;
    let doc: LevelDocument<Value> = serde_json::from_value(value)?;
    if doc.entities.len() != doc.entity_types.len() {
        return Err(FormatError::LengthMismatch {
            entities: doc.entities.len(),
            types: doc.entity_types.len(),
        });
    }

    let LevelInfo { width, height } = doc.level_info;
    if !(0..=MAX_EXTENT).contains(&width) || !(0..=MAX_EXTENT).contains(&height) {
        return Err(FormatError::BadLevelSize {
            width,
            height,
            max: MAX_EXTENT,
        });
    }

    let mut blocks = Vec::new();
    let mut entities = Vec::new();
    // Document index -> entity index, for the active player
    let mut entity_index = vec![None; doc.entities.len()];

    for (index, (data, entity_type)) in doc.entities.into_iter().zip(&doc.entity_types).enumerate()
    {
        let bad = |source| FormatError::BadEntity {
            index,
            entity_type: entity_type.clone(),
            source,
        };
        match entity_type.as_str() {
            "Block" => {
                let tile: TileDef = serde_json::from_value(data).map_err(bad)?;
                check_tile(&tile, index)?;
                blocks.push(tile);
            }
            "Food" => {
                let tile: TileDef = serde_json::from_value(data).map_err(bad)?;
                check_tile(&tile, index)?;
                entity_index[index] = Some(entities.len());
                entities.push(Entity::Food(Food::new(Point::new(tile.x, tile.y), tile.layer)));
            }
            "Snake" => {
                let def: SnakeDef = serde_json::from_value(data).map_err(bad)?;
                let id = def.id.into_string();
                let Some(first) = def.segments.first() else {
                    return Err(FormatError::EmptySnake(id));
                };
                let layer = first.layer;
                for segment in &def.segments {
                    check_tile(segment, index)?;
                }
                let mut snake = Snake::new(
                    id,
                    def.segments.iter().map(|s| Point::new(s.x, s.y)).collect(),
                    layer,
                );
                snake.grow_on_next_move = def.grow_on_next_move;
                entity_index[index] = Some(entities.len());
                entities.push(Entity::Snake(snake));
            }
            other => return Err(FormatError::UnknownEntityType(other.to_string())),
        }
    }

    // The grid must cover every block even if levelInfo says otherwise.
    let width = blocks
        .iter()
        .map(|b| b.x + b.width)
        .fold(width, i32::max);
    let height = blocks
        .iter()
        .map(|b| b.y + b.height)
        .fold(height, i32::max);
    let mut level = Level::new(width, height, CollisionLayer::Neither);
    for block in &blocks {
        for y in block.y..block.y + block.height {
            for x in block.x..block.x + block.width {
                level.set_terrain(Point::new(x, y), block.layer);
            }
        }
    }
    level.entities = entities;

    let active_snake = match doc.active_player_entity_index {
        -1 => None,
        i => {
            let mapped = usize::try_from(i)
                .ok()
                .and_then(|i| entity_index.get(i).copied().flatten())
                .filter(|&e| level.entities[e].as_snake().is_some());
            Some(mapped.ok_or(FormatError::BadActivePlayer(i))?)
        }
    };

    Ok(LoadedLevel {
        level,
        active_snake,
        level_id: doc.level_id,
    })
}

pub(crate) fn check_format(value: &Value, expected: &'static str) -> Result<(), FormatError> {
    let found = value.get("format").and_then(Value::as_str).unwrap_or_default();
    if found != expected {
        return Err(FormatError::WrongFormat {
            expected,
            found: found.to_string(),
        });
    }
    Ok(())
}

fn check_tile(tile: &TileDef, index: usize) -> Result<(), FormatError> {
    let within = |start: i32, extent: i32| {
        (0..=MAX_EXTENT).contains(&start)
            && (0..=MAX_EXTENT).contains(&extent)
            && start + extent <= MAX_EXTENT
    };
    let ok = within(tile.x, tile.width) && within(tile.y, tile.height);
    if ok {
        Ok(())
    } else {
        Err(FormatError::BadCoordinates { index })
    }
}

/// Bring an older document up to the current format version in place
fn upgrade(value: &mut Value) -> Result<(), FormatError> {
    let found = value
        .get("formatVersion")
        .and_then(Value::as_u64)
        .unwrap_or_default() as u32;
    if found == 0 || found > LEVEL_FORMAT_VERSION {
        return Err(FormatError::UnsupportedVersion {
            found,
            supported: LEVEL_FORMAT_VERSION,
        });
    }
    if found < LEVEL_FORMAT_VERSION {
        log::debug!("Upgrading level document from version {found}");
    }

    let types: Vec<String> = value
        .get("entityTypes")
        .and_then(Value::as_array)
        .map(|a| a.iter().map(|t| t.as_str().unwrap_or_default().to_string()).collect())
        .unwrap_or_default();

    let mut version = found;
    while version < LEVEL_FORMAT_VERSION {
        match version {
            1 => {
                // Segments had a single `size`.
                for_each_entity(value, |entity, i| {
                    if types.get(i).map(String::as_str) != Some("Snake") {
                        return;
                    }
                    let Some(segments) = entity.get_mut("segments").and_then(Value::as_array_mut)
                    else {
                        return;
                    };
                    for segment in segments {
                        let Some(obj) = segment.as_object_mut() else {
                            continue;
                        };
                        if obj.contains_key("width") {
                            continue;
                        }
                        let size = obj.get("size").cloned().unwrap_or(Value::from(1));
                        obj.insert("width".into(), size.clone());
                        obj.insert("height".into(), size);
                    }
                });
            }
            2 => {
                // Levels used to be a fixed 16x16.
                if let Some(obj) = value.as_object_mut() {
                    obj.insert(
                        "levelInfo".into(),
                        serde_json::json!({ "width": 16, "height": 16 }),
                    );
                }
            }
            3 => for_each_entity(value, |entity, i| {
                if types.get(i).map(String::as_str) == Some("Collectable") {
                    remove_key(entity, "_time");
                }
            }),
            4 => {
                if let Some(types) = value.get_mut("entityTypes").and_then(Value::as_array_mut) {
                    for t in types.iter_mut() {
                        if t.as_str() == Some("Collectable") {
                            *t = Value::from("Food");
                        }
                    }
                }
            }
            5 => for_each_entity(value, |entity, i| {
                let kind = types.get(i).map(String::as_str);
                if kind == Some("Food") || kind == Some("Collectable") {
                    remove_key(entity, "_time");
                    remove_key(entity, "solid");
                }
            }),
            _ => {}
        }
        version += 1;
    }
    if let Some(obj) = value.as_object_mut() {
        obj.insert("formatVersion".into(), Value::from(LEVEL_FORMAT_VERSION));
    }
    Ok(())
}

fn for_each_entity(value: &mut Value, mut f: impl FnMut(&mut Value, usize)) {
    if let Some(entities) = value.get_mut("entities").and_then(Value::as_array_mut) {
        for (i, entity) in entities.iter_mut().enumerate() {
            f(entity, i);
        }
    }
}

fn remove_key(value: &mut Value, key: &str) {
    if let Some(obj) = value.as_object_mut() {
        obj.remove(key);
    }
}
