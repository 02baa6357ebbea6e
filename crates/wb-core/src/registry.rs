use std::collections::HashMap;

use crate::entity::{Noun, ObjectKind};
use crate::error::{CoreError, CoreResult};

/// Bidirectional, injective mapping between noun words and the plain object
/// kinds they denote.
///
/// Constructed once and passed into the components that need it; never
/// ambient global state. The pointer nouns (WORLD, CLONE, LEVEL, TEXT) have
/// no single concrete kind and deliberately have no mapping here; callers
/// treat that as a recoverable "no mapping".
#[derive(Debug, Clone)]
pub struct NounRegistry {
    noun_to_kind: HashMap<Noun, ObjectKind>,
    kind_to_noun: HashMap<ObjectKind, Noun>,
}

const STANDARD_PAIRS: [(Noun, ObjectKind); 12] = [
    (Noun::Baba, ObjectKind::Baba),
    (Noun::Keke, ObjectKind::Keke),
    (Noun::Wall, ObjectKind::Wall),
    (Noun::Rock, ObjectKind::Rock),
    (Noun::Flag, ObjectKind::Flag),
    (Noun::Water, ObjectKind::Water),
    (Noun::Skull, ObjectKind::Skull),
    (Noun::Box, ObjectKind::Box),
    (Noun::Grass, ObjectKind::Grass),
    (Noun::Lava, ObjectKind::Lava),
    (Noun::Door, ObjectKind::Door),
    (Noun::Key, ObjectKind::Key),
];

impl NounRegistry {
    /// The standard registry covering every plain object kind.
    pub fn standard() -> Self {
        Self::from_pairs(STANDARD_PAIRS).expect("standard pairs are injective")
    }

    /// Build a registry from explicit pairs, rejecting any noun or kind
    /// that appears twice.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (Noun, ObjectKind)>) -> CoreResult<Self> {
        let mut noun_to_kind = HashMap::new();
        let mut kind_to_noun = HashMap::new();
        for (noun, kind) in pairs {
            if noun_to_kind.insert(noun, kind).is_some() || kind_to_noun.insert(kind, noun).is_some()
            {
                return Err(CoreError::DuplicateMapping(noun));
            }
        }
        Ok(Self {
            noun_to_kind,
            kind_to_noun,
        })
    }

    /// The concrete kind a noun denotes, or `None` for nouns without a
    /// plain-kind mapping (WORLD, CLONE, LEVEL, TEXT).
    pub fn kind_of(&self, noun: Noun) -> Option<ObjectKind> {
        self.noun_to_kind.get(&noun).copied()
    }

    /// The noun denoting a plain kind (reverse lookup, object -> noun).
    ///
    /// Every internally registered kind has a noun; a miss is a programming
    /// contract violation, fatal in debug builds and a recoverable `None`
    /// in release.
    pub fn noun_of(&self, kind: ObjectKind) -> Option<Noun> {
        let noun = self.kind_to_noun.get(&kind).copied();
        debug_assert!(noun.is_some(), "object kind {kind:?} has no registered noun");
        noun
    }
}

impl Default for NounRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
