//! Lossless JSON persistence of the external level layout.
//!
//! The on-disk tree is field-compatible with the source format: boards are
//! `world_list` entries carrying `infinite_tier`, entities carry a `type`
//! name and a WASD `orientation`, and board-pointer entities add a nested
//! `level` reference. Loading regenerates entity and board ids; layout
//! equality is checked structurally via [`Level::same_layout`].

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::direction::{Direction, Position};
use crate::entity::{
    BoardRef, Entity, EntityKind, ObjectKind, TextToken, TransformMarker,
};
use crate::error::{CoreError, CoreResult};
use crate::level::Level;

#[derive(Debug, Serialize, Deserialize)]
struct LevelRecord {
    name: String,
    world_list: Vec<BoardRecord>,
    super_level: Option<String>,
    main_world: BoardRef,
}

#[derive(Debug, Serialize, Deserialize)]
struct BoardRecord {
    name: String,
    infinite_tier: i32,
    size: [i32; 2],
    color: [u8; 3],
    object_list: Vec<EntityRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct EntityRecord {
    #[serde(rename = "type")]
    kind: String,
    position: [i32; 2],
    orientation: Direction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    level: Option<BoardRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    transform: Option<TransformMarker>,
}

/// Serialize a level to the external JSON layout.
pub fn to_json(level: &Level) -> CoreResult<String> {
    let record = LevelRecord {
        name: level.name.clone(),
        world_list: level.boards().iter().map(board_record).collect(),
        super_level: level.super_level.clone(),
        main_world: level.main_board.clone(),
    };
    serde_json::to_string_pretty(&record)
        .map_err(|e| CoreError::MalformedRecord(e.to_string()))
}

/// Load a level from the external JSON layout.
///
/// Fails with [`CoreError::UnknownKind`] on an unrecognized `type` string
/// and [`CoreError::MalformedRecord`] on structural problems; either aborts
/// this load only.
pub fn from_json(json: &str) -> CoreResult<Level> {
    let record: LevelRecord =
        serde_json::from_str(json).map_err(|e| CoreError::MalformedRecord(e.to_string()))?;
    let mut level = Level::new(record.name, record.main_world);
    level.super_level = record.super_level;
    for board_record in record.world_list {
        level.add_board(board_from_record(board_record)?);
    }
    Ok(level)
}

fn board_record(board: &Board) -> BoardRecord {
    BoardRecord {
        name: board.name.clone(),
        infinite_tier: board.tier,
        size: [board.width(), board.height()],
        color: board.color,
        object_list: board.entities().iter().map(entity_record).collect(),
    }
}

fn entity_record(entity: &Entity) -> EntityRecord {
    let (level, transform) = match &entity.kind {
        EntityKind::World(r) | EntityKind::Clone(r) | EntityKind::Level(r) => {
            (Some(r.clone()), None)
        }
        EntityKind::Transform(marker) => (None, Some(marker.clone())),
        EntityKind::Object(_) | EntityKind::Text(_) => (None, None),
    };
    EntityRecord {
        kind: entity.kind.type_name(),
        position: [entity.position.x, entity.position.y],
        orientation: entity.facing,
        level,
        transform,
    }
}

fn board_from_record(record: BoardRecord) -> CoreResult<Board> {
    let mut board = Board::new(record.name, record.infinite_tier, record.size[0], record.size[1]);
    board.color = record.color;
    for entity_record in record.object_list {
        board.insert(entity_from_record(entity_record)?);
    }
    Ok(board)
}

fn entity_from_record(record: EntityRecord) -> CoreResult<Entity> {
    let kind = parse_kind(&record.kind, record.level, record.transform)?;
    let position = Position::new(record.position[0], record.position[1]);
    Ok(Entity::new(kind, position, record.orientation))
}

fn parse_kind(
    name: &str,
    level: Option<BoardRef>,
    transform: Option<TransformMarker>,
) -> CoreResult<EntityKind> {
    let pointer_target = |level: Option<BoardRef>| {
        level.ok_or_else(|| {
            CoreError::MalformedRecord(format!("pointer entity \"{name}\" lacks a level reference"))
        })
    };
    match name {
        "world" => Ok(EntityKind::World(pointer_target(level)?)),
        "clone" => Ok(EntityKind::Clone(pointer_target(level)?)),
        "level" => Ok(EntityKind::Level(pointer_target(level)?)),
        "transform" => {
            let marker = transform.ok_or_else(|| {
                CoreError::MalformedRecord("transform entity lacks its marker".to_string())
            })?;
            Ok(EntityKind::Transform(marker))
        }
        other => {
            if let Some(kind) = ObjectKind::parse(other) {
                return Ok(EntityKind::Object(kind));
            }
            if let Some(token) = TextToken::parse(other) {
                return Ok(EntityKind::Text(token));
            }
            Err(CoreError::UnknownKind(other.to_string()))
        }
    }
}
