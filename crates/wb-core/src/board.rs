use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::direction::{Direction, Position, collinear};
use crate::entity::{Entity, EntityId, EntityKind, Noun, Property, TextToken};
use crate::registry::NounRegistry;
use crate::rule::{Rule, RuleShape};

/// Unique identifier for a board, distinct from its `(name, tier)` pair so
/// that renaming or retiering a board never breaks in-flight references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoardId(pub Uuid);

impl BoardId {
    /// Generate a new random board ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BoardId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BoardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// One rectangular grid and the entities placed on it.
///
/// Entity storage order is z-order for rendering; the logic never relies on
/// it except where explicitly stated. The derived rule list is rebuilt by
/// the engine every round.
#[derive(Debug, Clone)]
pub struct Board {
    id: BoardId,
    /// Board name; not required to be unique across tiers.
    pub name: String,
    /// Recursion tier distinguishing self-similar copies of one board.
    pub tier: i32,
    width: i32,
    height: i32,
    /// Display color, round-tripped through persistence untouched.
    pub color: [u8; 3],
    entities: Vec<Entity>,
    rules: Vec<Rule>,
}

impl Board {
    /// Create an empty board.
    pub fn new(name: impl Into<String>, tier: i32, width: i32, height: i32) -> Self {
        Self {
            id: BoardId::new(),
            name: name.into(),
            tier,
            width,
            height,
            color: [0, 0, 0],
            entities: Vec::new(),
            rules: Vec::new(),
        }
    }

    /// This board's stable identifier.
    pub fn id(&self) -> BoardId {
        self.id
    }

    /// Grid width in cells.
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Grid height in cells.
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Whether a position lies on the grid.
    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.x < self.width && pos.y >= 0 && pos.y < self.height
    }

    /// Place an entity on this board. Returns its id.
    ///
    /// The caller is responsible for the single-ownership invariant; use
    /// [`crate::level::Level::transfer`] to move an entity between boards.
    pub fn insert(&mut self, entity: Entity) -> EntityId {
        let id = entity.id;
        self.entities.push(entity);
        id
    }

    /// Remove and return an entity by id.
    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        let idx = self.entities.iter().position(|e| e.id == id)?;
        Some(self.entities.remove(idx))
    }

    /// Look up an entity by id.
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    /// Look up an entity mutably by id.
    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id == id)
    }

    /// All entities in z-order.
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Mutable iteration over all entities.
    pub fn entities_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.iter_mut()
    }

    /// The entities occupying a cell. Unordered by contract.
    pub fn entities_at(&self, pos: Position) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(move |e| e.position == pos)
    }

    /// The entities of a concrete kind.
    pub fn entities_of_kind<'a>(&'a self, kind: &'a EntityKind) -> impl Iterator<Item = &'a Entity> {
        self.entities.iter().filter(move |e| &e.kind == kind)
    }

    /// The rule list derived from this board's grid on the last scan.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Replace the derived rule list. Called by the engine after scanning.
    pub fn set_rules(&mut self, rules: Vec<Rule>) {
        self.rules = rules;
    }

    /// The cell just inside the edge named by `side`, where an entity shoved
    /// into this board from that side lands: the midpoint of that edge.
    pub fn default_entry_position(&self, side: Direction) -> Position {
        match side {
            Direction::Left => Position::new(0, self.height / 2),
            Direction::Right => Position::new(self.width - 1, self.height / 2),
            Direction::Up => Position::new(self.width / 2, 0),
            Direction::Down => Position::new(self.width / 2, self.height - 1),
        }
    }

    /// Scan the grid for sentences matching the registered rule shapes.
    ///
    /// Every cell is a potential sentence start, read rightward and
    /// downward. A cell's candidate tokens are every co-located text entity
    /// plus, for every co-located non-text entity holding Word, the noun
    /// the registry maps its kind to. When several candidates satisfy one
    /// offset the scan branches into the cartesian product. Duplicate rules
    /// are kept; de-duplication happens at property assignment, not here.
    pub fn scan_rules(&self, registry: &NounRegistry, shapes: &[RuleShape]) -> Vec<Rule> {
        let mut rules = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                let start = Position::new(x, y);
                for dir in [Direction::Right, Direction::Down] {
                    for shape in shapes {
                        self.scan_shape(registry, shape, start, dir, &mut rules);
                    }
                }
            }
        }
        rules
    }

    fn scan_shape(
        &self,
        registry: &NounRegistry,
        shape: &RuleShape,
        start: Position,
        dir: Direction,
        out: &mut Vec<Rule>,
    ) {
        let mut per_slot: Vec<Vec<TextToken>> = Vec::with_capacity(shape.len());
        let mut cells: Vec<Position> = Vec::with_capacity(shape.len());
        let mut pos = start;
        for slot in shape.slots() {
            if !self.in_bounds(pos) {
                return;
            }
            let admitted: Vec<TextToken> = self
                .candidate_tokens(registry, pos)
                .into_iter()
                .filter(|t| slot.admits(*t))
                .collect();
            if admitted.is_empty() {
                return;
            }
            cells.push(pos);
            per_slot.push(admitted);
            pos = pos.step(dir);
        }
        debug_assert!(collinear(&cells));

        let mut combos: Vec<Vec<TextToken>> = vec![Vec::new()];
        for slot_tokens in &per_slot {
            let mut next = Vec::with_capacity(combos.len() * slot_tokens.len());
            for combo in &combos {
                for token in slot_tokens {
                    let mut extended = combo.clone();
                    extended.push(*token);
                    next.push(extended);
                }
            }
            combos = next;
        }
        for combo in combos {
            if let Some(rule) = Rule::from_tokens(&combo) {
                out.push(rule);
            }
        }
    }

    /// The text tokens readable at a cell.
    fn candidate_tokens(&self, registry: &NounRegistry, pos: Position) -> Vec<TextToken> {
        let mut tokens = Vec::new();
        for entity in self.entities_at(pos) {
            match &entity.kind {
                EntityKind::Text(token) => tokens.push(*token),
                EntityKind::Object(kind) if entity.has(Property::Word) => {
                    if let Some(noun) = registry.noun_of(*kind) {
                        tokens.push(TextToken::Noun(noun));
                    }
                }
                EntityKind::World(_) if entity.has(Property::Word) => {
                    tokens.push(TextToken::Noun(Noun::World));
                }
                EntityKind::Clone(_) if entity.has(Property::Word) => {
                    tokens.push(TextToken::Noun(Noun::Clone));
                }
                EntityKind::Level(_) if entity.has(Property::Word) => {
                    tokens.push(TextToken::Noun(Noun::Level));
                }
                _ => {}
            }
        }
        tokens
    }

    /// Structural comparison ignoring identity and derived state.
    pub fn same_layout(&self, other: &Board) -> bool {
        self.name == other.name
            && self.tier == other.tier
            && self.width == other.width
            && self.height == other.height
            && self.color == other.color
            && self.entities.len() == other.entities.len()
            && self
                .entities
                .iter()
                .zip(other.entities.iter())
                .all(|(a, b)| a.same_layout(b))
    }
}
