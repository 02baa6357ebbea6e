//! Core types for Wordbound: entities, boards, rules, and the level model.
//!
//! This crate defines the data that the round engine in `wb-engine`
//! operates on. It is independent of the effect pipeline — you can
//! construct a [`Level`] programmatically or load one from the external
//! JSON layout via [`persist`].

/// Boards: rectangular grids, spatial queries, and the sentence scanner.
pub mod board;
/// Directions, grid positions, and line arithmetic.
pub mod direction;
/// Entity kinds, identifiers, properties, and text tokens.
pub mod entity;
/// Error types used throughout the crate.
pub mod error;
/// The level: a named group of boards referencing each other.
pub mod level;
/// Lossless JSON persistence of the external layout format.
pub mod persist;
/// The bidirectional noun-to-kind registry.
pub mod registry;
/// Rule shapes and parsed rules.
pub mod rule;

/// Re-export of board types.
pub use board::{Board, BoardId};
/// Re-export of direction and position types.
pub use direction::{Direction, Position, collinear};
/// Re-export of core entity types.
pub use entity::{
    BoardRef, Entity, EntityId, EntityKind, Noun, ObjectKind, PointerKind, Property, TextToken,
    TransformMarker,
};
/// Re-export of error types.
pub use error::{CoreError, CoreResult};
/// Re-export of the level model.
pub use level::{ContainerRef, Level};
/// Re-export of the noun registry.
pub use registry::NounRegistry;
/// Re-export of rule types.
pub use rule::{Rule, RuleRhs, RuleShape, TokenSlot, default_shapes};
