use crate::entity::{Noun, Property, TextToken};

/// Kind constraint for one offset of a rule shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSlot {
    /// The offset must hold a noun word.
    Noun,
    /// The offset must hold the connective IS.
    Is,
    /// The offset must hold either a noun or a property word.
    NounOrProperty,
}

impl TokenSlot {
    /// Whether the given token satisfies this slot's constraint.
    pub fn admits(self, token: TextToken) -> bool {
        match self {
            Self::Noun => matches!(token, TextToken::Noun(_)),
            Self::Is => matches!(token, TextToken::Is),
            Self::NounOrProperty => {
                matches!(token, TextToken::Noun(_) | TextToken::Property(_))
            }
        }
    }
}

/// A fixed-length sentence template the board scanner matches against
/// consecutive cells.
///
/// The default configuration registers only the three-word statement, but
/// the scanner works for any registered length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleShape {
    slots: Vec<TokenSlot>,
}

impl RuleShape {
    /// Create a shape from an explicit slot sequence.
    pub fn new(slots: Vec<TokenSlot>) -> Self {
        Self { slots }
    }

    /// The default three-word statement: `Noun IS Noun-or-Property`.
    pub fn statement() -> Self {
        Self::new(vec![
            TokenSlot::Noun,
            TokenSlot::Is,
            TokenSlot::NounOrProperty,
        ])
    }

    /// The slot constraints in offset order.
    pub fn slots(&self) -> &[TokenSlot] {
        &self.slots
    }

    /// The number of consecutive cells this shape spans.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the shape spans no cells at all.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// The rule shapes active by default.
pub fn default_shapes() -> Vec<RuleShape> {
    vec![RuleShape::statement()]
}

/// The right-hand side of a parsed rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleRhs {
    /// `Noun IS Property`: grants the property.
    Property(Property),
    /// `Noun IS Noun`: converts the subject kind into the object kind.
    Noun(Noun),
}

/// A sentence read off the grid: `subject IS rhs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rule {
    /// The noun naming the kinds the rule applies to.
    pub subject: Noun,
    /// What the rule grants or converts into.
    pub rhs: RuleRhs,
}

impl Rule {
    /// Build a property-granting rule.
    pub fn property(subject: Noun, property: Property) -> Self {
        Self {
            subject,
            rhs: RuleRhs::Property(property),
        }
    }

    /// Build a kind-conversion rule.
    pub fn becomes(subject: Noun, noun: Noun) -> Self {
        Self {
            subject,
            rhs: RuleRhs::Noun(noun),
        }
    }

    /// Parse a matched token sequence into a rule.
    ///
    /// Only the two three-word forms produce rules; anything else (including
    /// longer matched shapes) yields `None`.
    pub fn from_tokens(tokens: &[TextToken]) -> Option<Self> {
        match *tokens {
            [TextToken::Noun(subject), TextToken::Is, TextToken::Property(p)] => {
                Some(Self::property(subject, p))
            }
            [TextToken::Noun(subject), TextToken::Is, TextToken::Noun(n)] => {
                Some(Self::becomes(subject, n))
            }
            _ => None,
        }
    }
}
