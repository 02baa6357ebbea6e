use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::direction::{Direction, Position};

/// Unique identifier for every entity in a level.
///
/// Entity equality is identity-based: two entities are the same entity iff
/// their ids match, never by comparing positions or kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(pub Uuid);

impl EntityId {
    /// Generate a new random entity ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// The closed set of plain object kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// The classic protagonist creature.
    Baba,
    /// A second creature, usually an antagonist.
    Keke,
    /// An impassable (by default) wall segment.
    Wall,
    /// A pushable boulder.
    Rock,
    /// A goal flag.
    Flag,
    /// A water cell.
    Water,
    /// A skull hazard.
    Skull,
    /// A wooden crate.
    Box,
    /// A patch of grass.
    Grass,
    /// A lava cell.
    Lava,
    /// A door.
    Door,
    /// A key.
    Key,
}

impl ObjectKind {
    /// Every plain object kind, in a fixed order.
    pub const ALL: [ObjectKind; 12] = [
        ObjectKind::Baba,
        ObjectKind::Keke,
        ObjectKind::Wall,
        ObjectKind::Rock,
        ObjectKind::Flag,
        ObjectKind::Water,
        ObjectKind::Skull,
        ObjectKind::Box,
        ObjectKind::Grass,
        ObjectKind::Lava,
        ObjectKind::Door,
        ObjectKind::Key,
    ];

    /// The lowercase wire name of this kind.
    pub fn name(self) -> &'static str {
        match self {
            Self::Baba => "baba",
            Self::Keke => "keke",
            Self::Wall => "wall",
            Self::Rock => "rock",
            Self::Flag => "flag",
            Self::Water => "water",
            Self::Skull => "skull",
            Self::Box => "box",
            Self::Grass => "grass",
            Self::Lava => "lava",
            Self::Door => "door",
            Self::Key => "key",
        }
    }

    /// Parse a wire name back into a kind.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == s)
    }
}

/// Property words a rule can grant to entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    /// Controlled by directional input.
    You,
    /// Blocks movement into its cell.
    Stop,
    /// Can be shoved along a push chain.
    Push,
    /// Touching it with a You entity wins the round.
    Win,
    /// Moves on its own every round.
    Move,
    /// Carries co-located entities along its facing.
    Shift,
    /// Exempt from interactions with non-floating entities.
    Float,
    /// Destroys one co-located entity along with itself.
    Sink,
    /// Destroys co-located Melt entities.
    Hot,
    /// Destroyed by co-located Hot entities.
    Melt,
    /// Destroys co-located You entities.
    Defeat,
    /// Passes through Stop and cancels against Shut.
    Open,
    /// Blocks Open movers and cancels against Open.
    Shut,
    /// Teleports co-located partners to a twin of the same kind.
    Tele,
    /// Participates in board selection.
    Select,
    /// Makes a non-text entity readable as its own noun in sentences.
    Word,
}

impl Property {
    /// Every property word, in a fixed order.
    pub const ALL: [Property; 16] = [
        Property::You,
        Property::Stop,
        Property::Push,
        Property::Win,
        Property::Move,
        Property::Shift,
        Property::Float,
        Property::Sink,
        Property::Hot,
        Property::Melt,
        Property::Defeat,
        Property::Open,
        Property::Shut,
        Property::Tele,
        Property::Select,
        Property::Word,
    ];

    /// The lowercase wire word for this property.
    pub fn name(self) -> &'static str {
        match self {
            Self::You => "you",
            Self::Stop => "stop",
            Self::Push => "push",
            Self::Win => "win",
            Self::Move => "move",
            Self::Shift => "shift",
            Self::Float => "float",
            Self::Sink => "sink",
            Self::Hot => "hot",
            Self::Melt => "melt",
            Self::Defeat => "defeat",
            Self::Open => "open",
            Self::Shut => "shut",
            Self::Tele => "tele",
            Self::Select => "select",
            Self::Word => "word",
        }
    }

    /// Parse a wire word back into a property.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == s)
    }
}

/// Noun words: one per plain object kind, plus the words that denote
/// boards, levels, and text itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Noun {
    /// Denotes [`ObjectKind::Baba`].
    Baba,
    /// Denotes [`ObjectKind::Keke`].
    Keke,
    /// Denotes [`ObjectKind::Wall`].
    Wall,
    /// Denotes [`ObjectKind::Rock`].
    Rock,
    /// Denotes [`ObjectKind::Flag`].
    Flag,
    /// Denotes [`ObjectKind::Water`].
    Water,
    /// Denotes [`ObjectKind::Skull`].
    Skull,
    /// Denotes [`ObjectKind::Box`].
    Box,
    /// Denotes [`ObjectKind::Grass`].
    Grass,
    /// Denotes [`ObjectKind::Lava`].
    Lava,
    /// Denotes [`ObjectKind::Door`].
    Door,
    /// Denotes [`ObjectKind::Key`].
    Key,
    /// Denotes world-pointer entities.
    World,
    /// Denotes clone-pointer entities.
    Clone,
    /// Denotes whole-level entities.
    Level,
    /// Denotes text entities of any token.
    Text,
}

impl Noun {
    /// Every noun word, in a fixed order.
    pub const ALL: [Noun; 16] = [
        Noun::Baba,
        Noun::Keke,
        Noun::Wall,
        Noun::Rock,
        Noun::Flag,
        Noun::Water,
        Noun::Skull,
        Noun::Box,
        Noun::Grass,
        Noun::Lava,
        Noun::Door,
        Noun::Key,
        Noun::World,
        Noun::Clone,
        Noun::Level,
        Noun::Text,
    ];

    /// The lowercase wire word for this noun.
    pub fn name(self) -> &'static str {
        match self {
            Self::Baba => "baba",
            Self::Keke => "keke",
            Self::Wall => "wall",
            Self::Rock => "rock",
            Self::Flag => "flag",
            Self::Water => "water",
            Self::Skull => "skull",
            Self::Box => "box",
            Self::Grass => "grass",
            Self::Lava => "lava",
            Self::Door => "door",
            Self::Key => "key",
            Self::World => "world",
            Self::Clone => "clone",
            Self::Level => "level",
            Self::Text => "text",
        }
    }

    /// Parse a wire word back into a noun.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|n| n.name() == s)
    }
}

/// A single word of in-world text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextToken {
    /// A noun word such as ROCK.
    Noun(Noun),
    /// The connective IS.
    Is,
    /// A property word such as PUSH.
    Property(Property),
}

impl TextToken {
    /// The wire type name of the text entity carrying this token,
    /// e.g. `"text_rock"`, `"text_is"`, `"text_push"`.
    pub fn type_name(self) -> String {
        match self {
            Self::Noun(n) => format!("text_{}", n.name()),
            Self::Is => "text_is".to_string(),
            Self::Property(p) => format!("text_{}", p.name()),
        }
    }

    /// Parse a `text_*` wire type name back into a token.
    ///
    /// Noun words win over property words on a (non-existent today)
    /// name collision, keeping parsing deterministic.
    pub fn parse(s: &str) -> Option<Self> {
        let word = s.strip_prefix("text_")?;
        if word == "is" {
            return Some(Self::Is);
        }
        if let Some(n) = Noun::parse(word) {
            return Some(Self::Noun(n));
        }
        Property::parse(word).map(Self::Property)
    }
}

/// Reference to a board by name and recursion tier.
///
/// Boards with the same name but different tiers model successive zoom
/// levels of one self-similar board. A reference may dangle: the level is
/// not required to currently contain a matching board.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoardRef {
    /// The referenced board's name.
    pub name: String,
    /// The referenced board's recursion tier.
    #[serde(rename = "infinite_tier")]
    pub tier: i32,
}

impl BoardRef {
    /// Create a reference from a name and tier.
    pub fn new(name: impl Into<String>, tier: i32) -> Self {
        Self {
            name: name.into(),
            tier,
        }
    }
}

impl fmt::Display for BoardRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.tier)
    }
}

/// The kinds that stand for a whole board or level placed as an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerKind {
    /// A world pointer: the board is drawn inside the cell.
    World,
    /// A clone pointer: a second view of an already-placed board.
    Clone,
    /// A whole external level, opaque to the core.
    Level,
}

/// Opaque placeholder recording a cross-level promotion or demotion request.
///
/// Completing the request requires knowledge of the multi-level container,
/// so the engine only records it and hands it to the external orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformMarker {
    /// The pointer kind the source entity had.
    pub source: PointerKind,
    /// The board or level the source entity referenced.
    pub board: BoardRef,
    /// The pointer kind the rule asked for.
    pub target: PointerKind,
}

/// The concrete kind of an entity: a plain object, a text token, a pointer
/// to a nested board or an external level, or a transform placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityKind {
    /// A plain game object.
    Object(ObjectKind),
    /// A movable word of rule text.
    Text(TextToken),
    /// A nested board placed as an object (world pointer).
    World(BoardRef),
    /// A second placement of a nested board (clone pointer).
    Clone(BoardRef),
    /// A whole external level placed as an object; opaque to the core.
    Level(BoardRef),
    /// A pending cross-level promotion awaiting the orchestrator.
    Transform(TransformMarker),
}

impl EntityKind {
    /// Whether this kind is a text token.
    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }

    /// Whether this kind is one of the two board-pointer sub-kinds.
    ///
    /// `Level` entities reference a whole external level, not a board of
    /// this level, and are deliberately excluded.
    pub fn is_board_pointer(&self) -> bool {
        matches!(self, Self::World(_) | Self::Clone(_))
    }

    /// The board or level reference this kind carries, if any.
    pub fn board_ref(&self) -> Option<&BoardRef> {
        match self {
            Self::World(r) | Self::Clone(r) | Self::Level(r) => Some(r),
            Self::Transform(m) => Some(&m.board),
            Self::Object(_) | Self::Text(_) => None,
        }
    }

    /// The wire type name of this kind.
    pub fn type_name(&self) -> String {
        match self {
            Self::Object(k) => k.name().to_string(),
            Self::Text(t) => t.type_name(),
            Self::World(_) => "world".to_string(),
            Self::Clone(_) => "clone".to_string(),
            Self::Level(_) => "level".to_string(),
            Self::Transform(_) => "transform".to_string(),
        }
    }
}

/// A single placed object or text token.
///
/// `properties` and `moved` are derived fresh every round by the engine and
/// are never persisted.
#[derive(Debug, Clone)]
pub struct Entity {
    /// Unique identifier; the sole basis of entity equality.
    pub id: EntityId,
    /// The concrete kind of this entity.
    pub kind: EntityKind,
    /// Cell position within the owning board.
    pub position: Position,
    /// Which direction the entity faces.
    pub facing: Direction,
    /// Properties granted by the currently active rules.
    pub properties: HashSet<Property>,
    /// Whether this entity already moved this round.
    pub moved: bool,
}

impl Entity {
    /// Create an entity with a fresh id facing the given direction.
    pub fn new(kind: EntityKind, position: Position, facing: Direction) -> Self {
        Self {
            id: EntityId::new(),
            kind,
            position,
            facing,
            properties: HashSet::new(),
            moved: false,
        }
    }

    /// Whether the current rules grant this entity the given property.
    pub fn has(&self, property: Property) -> bool {
        self.properties.contains(&property)
    }

    /// Whether this entity is a text token.
    pub fn is_text(&self) -> bool {
        self.kind.is_text()
    }

    /// Whether this entity is a board pointer (world or clone).
    pub fn is_board_pointer(&self) -> bool {
        self.kind.is_board_pointer()
    }

    /// Structural comparison ignoring identity and derived state.
    ///
    /// Used by the persistence round-trip property, where ids are freshly
    /// generated on load.
    pub fn same_layout(&self, other: &Entity) -> bool {
        self.kind == other.kind && self.position == other.position && self.facing == other.facing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_id_display_shows_short_form() {
        let id = EntityId(Uuid::parse_str("a3f2b1c8-1234-5678-9abc-def012345678").unwrap());
        assert_eq!(id.to_string(), "a3f2b1c8");
    }

    #[test]
    fn object_kind_names_round_trip() {
        for kind in ObjectKind::ALL {
            assert_eq!(ObjectKind::parse(kind.name()), Some(kind));
        }
        assert_eq!(ObjectKind::parse("slime"), None);
    }

    #[test]
    fn text_token_names_round_trip() {
        let tokens = [
            TextToken::Noun(Noun::Rock),
            TextToken::Is,
            TextToken::Property(Property::Push),
            TextToken::Noun(Noun::World),
            TextToken::Noun(Noun::Text),
        ];
        for token in tokens {
            assert_eq!(TextToken::parse(&token.type_name()), Some(token));
        }
        assert_eq!(TextToken::parse("rock"), None);
        assert_eq!(TextToken::parse("text_slime"), None);
    }

    #[test]
    fn board_pointer_predicate_excludes_level() {
        let world = EntityKind::World(BoardRef::new("hub", 0));
        let clone = EntityKind::Clone(BoardRef::new("hub", 0));
        let level = EntityKind::Level(BoardRef::new("overworld", 0));
        assert!(world.is_board_pointer());
        assert!(clone.is_board_pointer());
        assert!(!level.is_board_pointer());
        assert!(!EntityKind::Object(ObjectKind::Rock).is_board_pointer());
    }

    #[test]
    fn board_ref_accessible_from_pointer_kinds() {
        let kind = EntityKind::Clone(BoardRef::new("hub", 2));
        assert_eq!(kind.board_ref(), Some(&BoardRef::new("hub", 2)));
        assert_eq!(EntityKind::Object(ObjectKind::Wall).board_ref(), None);
    }

    #[test]
    fn fresh_entity_has_no_properties() {
        let e = Entity::new(
            EntityKind::Object(ObjectKind::Baba),
            Position::new(1, 1),
            Direction::Right,
        );
        assert!(!e.has(Property::You));
        assert!(!e.moved);
    }

    #[test]
    fn same_layout_ignores_identity() {
        let a = Entity::new(
            EntityKind::Object(ObjectKind::Rock),
            Position::new(2, 3),
            Direction::Up,
        );
        let mut b = a.clone();
        b.id = EntityId::new();
        b.properties.insert(Property::Push);
        assert!(a.same_layout(&b));

        b.position = Position::new(0, 0);
        assert!(!a.same_layout(&b));
    }
}
