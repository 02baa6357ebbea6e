use crate::board::{Board, BoardId};
use crate::direction::Position;
use crate::entity::{BoardRef, EntityId};
use crate::error::{CoreError, CoreResult};
use crate::rule::Rule;

/// Where a board-pointer entity referencing some board sits in the level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerRef {
    /// The board holding the pointer entity.
    pub board: BoardId,
    /// The pointer entity itself.
    pub entity: EntityId,
    /// The pointer entity's cell.
    pub position: Position,
}

/// A named group of boards forming one self-consistent puzzle instance.
///
/// Boards may reference each other through board-pointer entities; a
/// reference with no matching board is legal and resolves to "no such
/// board". The level-global rule list holds rules declared outside any
/// grid, supplied by the external orchestrator.
#[derive(Debug, Clone)]
pub struct Level {
    /// The level's name.
    pub name: String,
    /// The enclosing level's name, if any; round-tripped untouched.
    pub super_level: Option<String>,
    /// Which board play starts on.
    pub main_board: BoardRef,
    boards: Vec<Board>,
    global_rules: Vec<Rule>,
}

impl Level {
    /// Create an empty level whose play starts on `main_board`.
    pub fn new(name: impl Into<String>, main_board: BoardRef) -> Self {
        Self {
            name: name.into(),
            super_level: None,
            main_board,
            boards: Vec::new(),
            global_rules: Vec::new(),
        }
    }

    /// Add a board. Returns its id.
    pub fn add_board(&mut self, board: Board) -> BoardId {
        let id = board.id();
        self.boards.push(board);
        id
    }

    /// Remove and return a board by id.
    pub fn remove_board(&mut self, id: BoardId) -> Option<Board> {
        let idx = self.boards.iter().position(|b| b.id() == id)?;
        Some(self.boards.remove(idx))
    }

    /// All boards in insertion order.
    pub fn boards(&self) -> &[Board] {
        &self.boards
    }

    /// Mutable iteration over all boards.
    pub fn boards_mut(&mut self) -> impl Iterator<Item = &mut Board> {
        self.boards.iter_mut()
    }

    /// Look up a board by id.
    pub fn board(&self, id: BoardId) -> Option<&Board> {
        self.boards.iter().find(|b| b.id() == id)
    }

    /// Look up a board mutably by id.
    pub fn board_mut(&mut self, id: BoardId) -> Option<&mut Board> {
        self.boards.iter_mut().find(|b| b.id() == id)
    }

    /// Find the board with the given name and tier, if one exists.
    pub fn find_board(&self, name: &str, tier: i32) -> Option<&Board> {
        self.boards.iter().find(|b| b.name == name && b.tier == tier)
    }

    /// Find the id of the board with the given name and tier.
    pub fn find_board_id(&self, name: &str, tier: i32) -> Option<BoardId> {
        self.find_board(name, tier).map(Board::id)
    }

    /// Like [`find_board`](Self::find_board), but a missing board is a
    /// recoverable lookup error instead of `None`. For callers that treat
    /// absence as a data problem, e.g. resolving a `main_board` reference.
    pub fn require_board(&self, name: &str, tier: i32) -> CoreResult<&Board> {
        self.find_board(name, tier).ok_or(CoreError::BoardNotFound {
            name: name.to_string(),
            tier,
        })
    }

    /// Find the board-pointer entity elsewhere in the level that references
    /// `(name, tier)` — the cell a board's contents exit into when pushed
    /// past its edge. `None` when nothing contains the board.
    pub fn find_container(&self, name: &str, tier: i32) -> Option<ContainerRef> {
        for board in &self.boards {
            for entity in board.entities() {
                if !entity.kind.is_board_pointer() {
                    continue;
                }
                if let Some(r) = entity.kind.board_ref() {
                    if r.name == name && r.tier == tier {
                        return Some(ContainerRef {
                            board: board.id(),
                            entity: entity.id,
                            position: entity.position,
                        });
                    }
                }
            }
        }
        None
    }

    /// The board currently owning an entity.
    pub fn locate(&self, entity: EntityId) -> Option<BoardId> {
        self.boards
            .iter()
            .find(|b| b.entity(entity).is_some())
            .map(Board::id)
    }

    /// Atomically move an entity between boards: removed from the source
    /// before it is inserted into the destination, so it is never present
    /// in two boards at once.
    pub fn transfer(&mut self, entity: EntityId, from: BoardId, to: BoardId) -> CoreResult<()> {
        if self.board(to).is_none() {
            return Err(CoreError::UnknownBoard(to));
        }
        let taken = self
            .board_mut(from)
            .and_then(|b| b.remove(entity))
            .ok_or(CoreError::EntityNotFound(entity))?;
        let dest = self.board_mut(to).expect("destination checked above");
        dest.insert(taken);
        Ok(())
    }

    /// The level-global rules.
    pub fn global_rules(&self) -> &[Rule] {
        &self.global_rules
    }

    /// Replace the level-global rules. Supplied by the orchestrator.
    pub fn set_global_rules(&mut self, rules: Vec<Rule>) {
        self.global_rules = rules;
    }

    /// Append one level-global rule.
    pub fn push_global_rule(&mut self, rule: Rule) {
        self.global_rules.push(rule);
    }

    /// A board name not yet used by any board in the level, derived from
    /// `base` by appending a counter when needed.
    pub fn fresh_board_name(&self, base: &str) -> String {
        if self.boards.iter().all(|b| b.name != base) {
            return base.to_string();
        }
        let mut n = 2;
        loop {
            let candidate = format!("{base}_{n}");
            if self.boards.iter().all(|b| b.name != candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    /// Structural comparison ignoring identity and derived state.
    pub fn same_layout(&self, other: &Level) -> bool {
        self.name == other.name
            && self.super_level == other.super_level
            && self.main_board == other.main_board
            && self.boards.len() == other.boards.len()
            && self
                .boards
                .iter()
                .zip(other.boards.iter())
                .all(|(a, b)| a.same_layout(b))
    }
}
