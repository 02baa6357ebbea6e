//! Recursive push resolution.
//!
//! Planning is pure: a [`Resolver`] borrows the level immutably and returns
//! the full list of moves a push would cause, or `None` when the push is
//! refused. Application happens separately in [`apply_moves`]. The set of
//! visited boards is threaded through the recursion as an explicit
//! parameter, keeping resolution reentrant and testable in isolation.

use std::collections::HashSet;

use wb_core::board::BoardId;
use wb_core::direction::{Direction, Position};
use wb_core::entity::{Entity, EntityId, Property};
use wb_core::level::Level;

use crate::event::{EventLog, RoundEvent, RoundEventKind};

/// One planned relocation: `entity` ends up at `to` on `board`, facing
/// `facing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlannedMove {
    /// The entity to relocate.
    pub entity: EntityId,
    /// The board it ends up on.
    pub board: BoardId,
    /// The cell it ends up at.
    pub to: Position,
    /// The direction it ends up facing.
    pub facing: Direction,
}

/// Plans push chains against an immutable level snapshot.
#[derive(Debug)]
pub struct Resolver<'a> {
    level: &'a Level,
    max_depth: u32,
}

impl<'a> Resolver<'a> {
    /// Create a resolver with the given recursion depth bound.
    pub fn new(level: &'a Level, max_depth: u32) -> Self {
        Self { level, max_depth }
    }

    /// Plan moving `entity` one step in `dir` from `from` on `board`.
    ///
    /// Returns every move the push chain causes (exact-duplicate tuples
    /// removed, first occurrence winning), or `None` when the push is
    /// refused: blocked, missing container or target board, or the depth
    /// guard tripped. A refusal is a silent non-move, never an error.
    pub fn plan(
        &self,
        board: BoardId,
        entity: EntityId,
        from: Position,
        dir: Direction,
    ) -> Option<Vec<PlannedMove>> {
        let mut visited = HashSet::new();
        self.plan_inner(board, entity, from, dir, &mut visited, 0)
    }

    fn plan_inner(
        &self,
        board_id: BoardId,
        mover: EntityId,
        from: Position,
        dir: Direction,
        visited: &mut HashSet<BoardId>,
        depth: u32,
    ) -> Option<Vec<PlannedMove>> {
        if depth > self.max_depth {
            return None;
        }
        let board = self.level.board(board_id)?;
        let mover_open = self.entity(mover)?.has(Property::Open);
        let target = from.step(dir);

        // Past the edge: the mover leaves this board through whatever
        // contains it. A board already visited in this chain is an
        // infinite self-similar copy; its container is searched one tier
        // higher to break the loop.
        if !board.in_bounds(target) {
            let lookup_tier = if visited.contains(&board_id) {
                board.tier + 1
            } else {
                visited.insert(board_id);
                board.tier
            };
            let container = self.level.find_container(&board.name, lookup_tier)?;
            let sub = self.plan_inner(
                container.board,
                mover,
                container.position,
                dir,
                visited,
                depth + 1,
            )?;
            return Some(dedup_moves(sub));
        }

        // Stop blocking. An Open mover passes Stop but never Shut; anyone
        // else is refused by a Stop blocker that cannot be pushed.
        for blocker in board.entities_at(target) {
            if !blocker.has(Property::Stop) {
                continue;
            }
            if mover_open {
                if blocker.has(Property::Shut) {
                    return None;
                }
            } else if !blocker.has(Property::Push) {
                return None;
            }
        }

        let mut moves: Vec<PlannedMove> = Vec::new();

        // Push chain. Board pointers that refuse to budge are not a hard
        // failure; the mover enters them instead (below).
        let pushed: Vec<(EntityId, bool)> = board
            .entities_at(target)
            .filter(|e| e.has(Property::Push))
            .map(|e| (e.id, e.is_board_pointer()))
            .collect();
        for (pushed_id, is_pointer) in pushed {
            match self.plan_inner(board_id, pushed_id, target, dir, visited, depth + 1) {
                Some(sub) => moves.extend(sub),
                None if is_pointer => {}
                None => return None,
            }
        }

        // Entering a nested board. A pointer that already moved in this
        // call is skipped; a pointer whose board was already visited leads
        // into the self-similar copy one tier further down instead.
        let pointers: Vec<(EntityId, String, i32)> = board
            .entities_at(target)
            .filter(|e| e.is_board_pointer())
            .filter_map(|e| {
                e.kind
                    .board_ref()
                    .map(|r| (e.id, r.name.clone(), r.tier))
            })
            .collect();
        for (pointer_id, name, tier) in pointers {
            if moves.iter().any(|m| m.entity == pointer_id) {
                continue;
            }
            let referenced = self.level.find_board_id(&name, tier)?;
            let dest_id = if visited.contains(&referenced) {
                self.level.find_board_id(&name, tier - 1)?
            } else {
                visited.insert(referenced);
                referenced
            };
            let dest = self.level.board(dest_id)?;
            let entry = dest.default_entry_position(dir.opposite());
            let outside = entry.step(dir.opposite());
            let sub = self.plan_inner(dest_id, mover, outside, dir, visited, depth + 1)?;
            moves.extend(sub);
        }

        moves.push(PlannedMove {
            entity: mover,
            board: board_id,
            to: target,
            facing: dir,
        });
        Some(dedup_moves(moves))
    }

    fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.level.boards().iter().find_map(|b| b.entity(id))
    }
}

/// Remove exact-duplicate move tuples, keeping the first occurrence and
/// preserving order otherwise.
pub(crate) fn dedup_moves(moves: Vec<PlannedMove>) -> Vec<PlannedMove> {
    let mut seen = HashSet::new();
    moves.into_iter().filter(|m| seen.insert(*m)).collect()
}

/// Apply planned moves to the level.
///
/// Duplicate moves for the same entity are collapsed first (first
/// occurrence wins). A move into a different board removes the entity from
/// its current board before inserting it into the destination; every mover
/// is flagged moved-this-round.
pub(crate) fn apply_moves(
    level: &mut Level,
    moves: &[PlannedMove],
    events: &mut EventLog,
    round: u64,
) {
    let mut seen = HashSet::new();
    for planned in moves {
        if !seen.insert(planned.entity) {
            continue;
        }
        let Some(source) = level.locate(planned.entity) else {
            continue;
        };
        if source != planned.board {
            if level.transfer(planned.entity, source, planned.board).is_err() {
                continue;
            }
            events.push(RoundEvent::new(
                round,
                RoundEventKind::Crossed {
                    entity: planned.entity,
                    from: source,
                    to: planned.board,
                },
                format!("{} crossed into board {}", planned.entity, planned.board),
            ));
        }
        if let Some(entity) = level
            .board_mut(planned.board)
            .and_then(|b| b.entity_mut(planned.entity))
        {
            entity.position = planned.to;
            entity.facing = planned.facing;
            entity.moved = true;
        }
        events.push(RoundEvent::new(
            round,
            RoundEventKind::Moved {
                entity: planned.entity,
                board: planned.board,
                to: planned.to,
            },
            format!("{} moved to {}", planned.entity, planned.to),
        ));
    }
}
