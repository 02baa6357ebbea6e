use serde::{Deserialize, Serialize};

/// One of the four cardinal directions an entity can face or move in.
///
/// Serialized as the single letters the on-disk level format uses
/// (`"W"` up, `"S"` down, `"A"` left, `"D"` right).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Toward smaller y.
    #[serde(rename = "W")]
    Up,
    /// Toward larger y.
    #[serde(rename = "S")]
    Down,
    /// Toward smaller x.
    #[serde(rename = "A")]
    Left,
    /// Toward larger x.
    #[serde(rename = "D")]
    Right,
}

impl Direction {
    /// All four directions, in a fixed order.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// The reverse direction. Involutive: `d.opposite().opposite() == d`.
    pub fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// The unit cell offset of this direction as `(dx, dy)`.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }
}

/// An integer cell position on a board grid.
///
/// Positions may fall outside a board's bounds transiently while move
/// resolution probes neighbouring cells; boards reject out-of-bounds
/// positions before any mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal cell coordinate, increasing rightward.
    pub x: i32,
    /// Vertical cell coordinate, increasing downward.
    pub y: i32,
}

impl Position {
    /// Create a position from its coordinates.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The neighbouring cell one step along `dir`.
    pub fn step(self, dir: Direction) -> Self {
        let (dx, dy) = dir.delta();
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Whether all points lie on one straight horizontal or vertical line with
/// unit spacing and a consistent direction.
///
/// Fewer than two points are trivially collinear.
pub fn collinear(points: &[Position]) -> bool {
    if points.len() < 2 {
        return true;
    }
    let first = points[1];
    let dx = first.x - points[0].x;
    let dy = first.y - points[0].y;
    if !matches!((dx, dy), (0, 1) | (0, -1) | (1, 0) | (-1, 0)) {
        return false;
    }
    points
        .windows(2)
        .all(|w| w[1].x - w[0].x == dx && w[1].y - w[0].y == dy)
}
