use crate::board::BoardId;
use crate::entity::{EntityId, Noun};

/// Alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;

/// Data-integrity errors surfaced by the core model.
///
/// These abort only the affected load or lookup, never the process. Refused
/// pushes are not errors at all; move resolution reports them as an absent
/// plan.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A persisted record used a `type` string no kind parses from.
    #[error("unknown entity kind: \"{0}\"")]
    UnknownKind(String),

    /// A persisted record was structurally invalid.
    #[error("malformed record: {0}")]
    MalformedRecord(String),

    /// No board with the requested name and tier exists in the level.
    #[error("board not found: {name}@{tier}")]
    BoardNotFound {
        /// The requested board name.
        name: String,
        /// The requested recursion tier.
        tier: i32,
    },

    /// The requested entity ID does not exist where it was expected.
    #[error("entity not found: {0}")]
    EntityNotFound(EntityId),

    /// The requested board ID does not exist in the level.
    #[error("no board with id {0}")]
    UnknownBoard(BoardId),

    /// A registry constructor was given two mappings for the same word
    /// or the same kind.
    #[error("duplicate registry mapping for noun \"{}\"", .0.name())]
    DuplicateMapping(Noun),
}
