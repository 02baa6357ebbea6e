//! Round inputs and outcomes.

use wb_core::direction::Direction;
use wb_core::entity::{BoardRef, TransformMarker};

/// The player input driving one round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    /// Move every You entity one step in this direction.
    Move(Direction),
    /// No directional input; movement phases driven by input are skipped.
    Idle,
    /// Selection mode: report a board under a Select entity, mutate nothing
    /// beyond the regular non-movement phases.
    Select,
}

impl Input {
    /// The direction carried by a directional input.
    pub fn direction(self) -> Option<Direction> {
        match self {
            Self::Move(dir) => Some(dir),
            Self::Idle | Self::Select => None,
        }
    }
}

/// What one round reported back to the caller.
#[derive(Debug, Clone, Default)]
pub struct RoundOutcome {
    /// Whether a You entity reached a Win entity this round.
    pub win: bool,
    /// The board name reported by the select phase, if any.
    pub selected: Option<String>,
    /// Boards the transform phase materialized this round.
    pub created_boards: Vec<BoardRef>,
    /// Cross-level promotion requests for the external orchestrator.
    pub pending: Vec<TransformMarker>,
}
