//! The transform phase: `Noun IS Noun` rule application.

use std::collections::HashSet;

use wb_core::board::{Board, BoardId};
use wb_core::direction::{Direction, Position};
use wb_core::entity::{
    BoardRef, Entity, EntityId, EntityKind, Noun, PointerKind, TextToken, TransformMarker,
};
use wb_core::level::Level;
use wb_core::registry::NounRegistry;
use wb_core::rule::{Rule, RuleRhs};

use crate::event::{EventLog, RoundEvent, RoundEventKind};
use crate::rules::noun_matches;

/// What the transform phase produced beyond in-place kind changes.
#[derive(Debug, Clone, Default)]
pub struct TransformOutcome {
    /// Boards freshly allocated for objects that became boards.
    pub created_boards: Vec<BoardRef>,
    /// Cross-level promotion requests awaiting the external orchestrator.
    pub pending: Vec<TransformMarker>,
}

enum Step {
    /// Replace the victim with a fresh entity of this kind.
    Swap(EntityKind),
    /// Allocate a 1x1 board seeded with the victim and point at it.
    Wrap(PointerKind),
    /// Replace the victim with an opaque placeholder for the orchestrator.
    Pend(TransformMarker),
    /// No applicable conversion.
    Keep,
}

fn plan_step(kind: &EntityKind, target: Noun, registry: &NounRegistry) -> Step {
    match target {
        Noun::World | Noun::Clone => {
            let pointer = if target == Noun::World {
                PointerKind::World
            } else {
                PointerKind::Clone
            };
            match kind {
                EntityKind::World(r) => {
                    if pointer == PointerKind::World {
                        Step::Keep
                    } else {
                        Step::Swap(EntityKind::Clone(r.clone()))
                    }
                }
                EntityKind::Clone(r) => {
                    if pointer == PointerKind::Clone {
                        Step::Keep
                    } else {
                        Step::Swap(EntityKind::World(r.clone()))
                    }
                }
                EntityKind::Level(r) => Step::Pend(TransformMarker {
                    source: PointerKind::Level,
                    board: r.clone(),
                    target: pointer,
                }),
                EntityKind::Object(_) | EntityKind::Text(_) => Step::Wrap(pointer),
                EntityKind::Transform(_) => Step::Keep,
            }
        }
        Noun::Level => match kind {
            EntityKind::World(r) => Step::Pend(TransformMarker {
                source: PointerKind::World,
                board: r.clone(),
                target: PointerKind::Level,
            }),
            EntityKind::Clone(r) => Step::Pend(TransformMarker {
                source: PointerKind::Clone,
                board: r.clone(),
                target: PointerKind::Level,
            }),
            // A plain object has no board to promote; nothing happens.
            _ => Step::Keep,
        },
        Noun::Text => match kind {
            EntityKind::Object(object) => match registry.noun_of(*object) {
                Some(noun) => Step::Swap(EntityKind::Text(TextToken::Noun(noun))),
                None => Step::Keep,
            },
            EntityKind::World(_) => Step::Swap(EntityKind::Text(TextToken::Noun(Noun::World))),
            EntityKind::Clone(_) => Step::Swap(EntityKind::Text(TextToken::Noun(Noun::Clone))),
            EntityKind::Level(_) => Step::Swap(EntityKind::Text(TextToken::Noun(Noun::Level))),
            EntityKind::Text(_) | EntityKind::Transform(_) => Step::Keep,
        },
        _ => match registry.kind_of(target) {
            Some(object) if kind != &EntityKind::Object(object) => {
                Step::Swap(EntityKind::Object(object))
            }
            _ => Step::Keep,
        },
    }
}

/// Apply every `Noun IS Noun` rule: board-local rules to entities on the
/// board that produced them, level-global rules everywhere.
///
/// An entity converted by one rule is consumed for the rest of the phase,
/// so the first applicable rule wins. All replacements delete the old
/// entity and insert a fresh one at the same cell and facing.
pub fn apply_transforms(
    level: &mut Level,
    registry: &NounRegistry,
    events: &mut EventLog,
    round: u64,
) -> TransformOutcome {
    let mut outcome = TransformOutcome::default();
    let mut consumed: HashSet<EntityId> = HashSet::new();
    let board_ids: Vec<BoardId> = level.boards().iter().map(Board::id).collect();

    for board_id in board_ids {
        let rules: Vec<Rule> = {
            let Some(board) = level.board(board_id) else {
                continue;
            };
            board
                .rules()
                .iter()
                .chain(level.global_rules())
                .copied()
                .filter(|r| matches!(r.rhs, RuleRhs::Noun(target) if target != r.subject))
                .collect()
        };

        for rule in rules {
            let RuleRhs::Noun(target) = rule.rhs else {
                continue;
            };
            let victims: Vec<(EntityId, EntityKind, Position, Direction)> = {
                let Some(board) = level.board(board_id) else {
                    continue;
                };
                board
                    .entities()
                    .iter()
                    .filter(|e| {
                        !consumed.contains(&e.id) && noun_matches(rule.subject, &e.kind, registry)
                    })
                    .map(|e| (e.id, e.kind.clone(), e.position, e.facing))
                    .collect()
            };

            for (id, kind, position, facing) in victims {
                consumed.insert(id);
                match plan_step(&kind, target, registry) {
                    Step::Keep => {}
                    Step::Swap(new_kind) => {
                        replace(level, board_id, id, new_kind, position, facing, events, round);
                    }
                    Step::Wrap(pointer) => {
                        let name = level.fresh_board_name(&kind.type_name());
                        let mut inner = Board::new(name.clone(), 0, 1, 1);
                        inner.insert(Entity::new(kind.clone(), Position::new(0, 0), facing));
                        level.add_board(inner);
                        let r = BoardRef::new(name, 0);
                        outcome.created_boards.push(r.clone());
                        let new_kind = if pointer == PointerKind::World {
                            EntityKind::World(r)
                        } else {
                            EntityKind::Clone(r)
                        };
                        replace(level, board_id, id, new_kind, position, facing, events, round);
                    }
                    Step::Pend(marker) => {
                        outcome.pending.push(marker.clone());
                        replace(
                            level,
                            board_id,
                            id,
                            EntityKind::Transform(marker),
                            position,
                            facing,
                            events,
                            round,
                        );
                    }
                }
            }
        }
    }
    outcome
}

#[allow(clippy::too_many_arguments)]
fn replace(
    level: &mut Level,
    board_id: BoardId,
    id: EntityId,
    new_kind: EntityKind,
    position: Position,
    facing: Direction,
    events: &mut EventLog,
    round: u64,
) {
    let Some(board) = level.board_mut(board_id) else {
        return;
    };
    if board.remove(id).is_none() {
        return;
    }
    let into = new_kind.type_name();
    board.insert(Entity::new(new_kind, position, facing));
    events.push(RoundEvent::new(
        round,
        RoundEventKind::Transformed {
            entity: id,
            into: into.clone(),
        },
        format!("{id} transformed into {into}"),
    ));
}
