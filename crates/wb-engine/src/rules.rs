//! Property propagation from derived rules.

use wb_core::entity::{EntityKind, Noun};
use wb_core::level::Level;
use wb_core::registry::NounRegistry;
use wb_core::rule::{Rule, RuleRhs, RuleShape};

/// Whether a noun denotes a given entity kind.
///
/// Object nouns resolve through the registry; the World, Clone, Level and
/// Text nouns match the corresponding kinds structurally, regardless of
/// which board a pointer references.
pub fn noun_matches(noun: Noun, kind: &EntityKind, registry: &NounRegistry) -> bool {
    match (noun, kind) {
        (Noun::World, EntityKind::World(_)) => true,
        (Noun::Clone, EntityKind::Clone(_)) => true,
        (Noun::Level, EntityKind::Level(_)) => true,
        (Noun::Text, EntityKind::Text(_)) => true,
        (_, EntityKind::Object(object)) => registry.kind_of(noun) == Some(*object),
        _ => false,
    }
}

/// Clear every entity's property set, rescan every board for sentences,
/// and assign properties from the merged rule lists.
///
/// A board-local `Noun IS Property` rule applies to matching entities on
/// the board that produced it; level-global rules apply level-wide.
/// Assignment is idempotent: rescanning an unchanged grid yields identical
/// property sets.
pub fn recompute_properties(level: &mut Level, registry: &NounRegistry, shapes: &[RuleShape]) {
    for board in level.boards_mut() {
        for entity in board.entities_mut() {
            entity.properties.clear();
        }
    }

    let scanned: Vec<(wb_core::board::BoardId, Vec<Rule>)> = level
        .boards()
        .iter()
        .map(|b| (b.id(), b.scan_rules(registry, shapes)))
        .collect();
    for (id, rules) in &scanned {
        if let Some(board) = level.board_mut(*id) {
            board.set_rules(rules.clone());
        }
    }

    for (id, rules) in &scanned {
        for rule in rules {
            if let RuleRhs::Property(property) = rule.rhs {
                if let Some(board) = level.board_mut(*id) {
                    for entity in board.entities_mut() {
                        if noun_matches(rule.subject, &entity.kind, registry) {
                            entity.properties.insert(property);
                        }
                    }
                }
            }
        }
    }

    let global: Vec<Rule> = level.global_rules().to_vec();
    for rule in global {
        if let RuleRhs::Property(property) = rule.rhs {
            for board in level.boards_mut() {
                for entity in board.entities_mut() {
                    if noun_matches(rule.subject, &entity.kind, registry) {
                        entity.properties.insert(property);
                    }
                }
            }
        }
    }
}
