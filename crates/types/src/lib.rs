//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the application.
//! All types are pure data structures with no external dependencies, making them
//! usable in any context (board engine, terminal rendering, adapter protocol).
//!
//! # Grid Coordinates
//!
//! - **Rows** are indexed top to bottom; row 0 is the top of the screen.
//! - **Columns** are indexed left to right.
//! - **Gravity** pulls balloons toward the highest row index.
//!
//! # Interaction Modes
//!
//! | Mode | Input | Match rule | After removal |
//! |------|-------|------------|---------------|
//! | `Swap` | `(position, direction)` | straight runs of 3+ | gravity + refill |
//! | `Tap` | `position` | connected cluster of 2+ | gravity, shift left, no refill |
//!
//! # Examples
//!
//! ```
//! use balloon_match_types::{Color, Direction, GameMode, Position};
//!
//! let color = Color::from_str("red").unwrap();
//! assert_eq!(color, Color::Red);
//!
//! let pos = Position::new(2, 3);
//! assert_eq!(pos.step(Direction::Up), Some(Position::new(1, 3)));
//! assert_eq!(Position::new(0, 0).step(Direction::Left), None);
//!
//! assert_eq!(GameMode::from_str("tap"), Some(GameMode::Tap));
//! ```

/// Default grid height in rows
pub const DEFAULT_ROWS: u8 = 8;

/// Default grid width in columns
pub const DEFAULT_COLS: u8 = 8;

/// Smallest grid edge accepted from configuration
pub const MIN_GRID_EDGE: u8 = 3;

/// Largest grid edge accepted from configuration
pub const MAX_GRID_EDGE: u8 = 16;

/// Minimum straight run length that counts as a swap-mode match
pub const MIN_RUN: usize = 3;

/// Minimum connected cluster size that a tap may clear
pub const MIN_CLUSTER: usize = 2;

/// Points per removed balloon under the linear score policy
pub const POINTS_PER_PIECE: u32 = 10;

/// Upper bound on removal waves in one cascading turn.
///
/// Every wave removes at least `MIN_RUN` balloons, so a real board settles far
/// sooner; the cap only guards against a pathological color source.
pub const MAX_CASCADE_WAVES: u32 = 64;

/// Balloon colors (the fixed palette)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Red,
    Green,
    Blue,
    Yellow,
    Purple,
    Orange,
}

impl Color {
    /// Every palette entry, in wire order
    pub const ALL: [Color; 6] = [
        Color::Red,
        Color::Green,
        Color::Blue,
        Color::Yellow,
        Color::Purple,
        Color::Orange,
    ];

    /// Number of palette entries
    pub const COUNT: usize = Self::ALL.len();

    /// Parse color from string (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use balloon_match_types::Color;
    ///
    /// assert_eq!(Color::from_str("Purple"), Some(Color::Purple));
    /// assert_eq!(Color::from_str("o"), Some(Color::Orange));
    /// assert_eq!(Color::from_str("pink"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "red" | "r" => Some(Color::Red),
            "green" | "g" => Some(Color::Green),
            "blue" | "b" => Some(Color::Blue),
            "yellow" | "y" => Some(Color::Yellow),
            "purple" | "p" => Some(Color::Purple),
            "orange" | "o" => Some(Color::Orange),
            _ => None,
        }
    }

    /// Convert to lowercase string
    pub fn as_str(&self) -> &'static str {
        match self {
            Color::Red => "red",
            Color::Green => "green",
            Color::Blue => "blue",
            Color::Yellow => "yellow",
            Color::Purple => "purple",
            Color::Orange => "orange",
        }
    }

    /// Stable 1-based wire code (0 is reserved for an empty cell)
    pub fn code(&self) -> u8 {
        match self {
            Color::Red => 1,
            Color::Green => 2,
            Color::Blue => 3,
            Color::Yellow => 4,
            Color::Purple => 5,
            Color::Orange => 6,
        }
    }

    /// Inverse of [`Color::code`]
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1..=6 => Some(Self::ALL[(code - 1) as usize]),
            _ => None,
        }
    }
}

/// Cell on the grid (None = empty, Some = balloon of a color)
pub type Cell = Option<Color>;

/// Wire code for a cell: 0 for empty, otherwise [`Color::code`]
pub fn cell_code(cell: Cell) -> u8 {
    cell.map(|c| c.code()).unwrap_or(0)
}

/// A `(row, col)` coordinate on the grid.
///
/// Bounds are not part of the type; the grid decides whether a position exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub row: u8,
    pub col: u8,
}

impl Position {
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// Step one cell in `dir`.
    ///
    /// Returns None when the step would leave the non-negative quadrant; the
    /// upper bounds are checked by the grid.
    pub fn step(self, dir: Direction) -> Option<Position> {
        let (dr, dc) = dir.delta();
        let row = self.row as i16 + dr as i16;
        let col = self.col as i16 + dc as i16;
        if row < 0 || col < 0 || row > u8::MAX as i16 || col > u8::MAX as i16 {
            return None;
        }
        Some(Position::new(row as u8, col as u8))
    }

    /// True when `other` shares an edge with `self`
    pub fn is_adjacent(self, other: Position) -> bool {
        let dr = (self.row as i16 - other.row as i16).abs();
        let dc = (self.col as i16 - other.col as i16).abs();
        dr + dc == 1
    }
}

/// Swipe directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// `(row delta, col delta)`
    pub fn delta(&self) -> (i8, i8) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }

    pub fn opposite(&self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "up" | "u" => Some(Direction::Up),
            "down" | "d" => Some(Direction::Down),
            "left" | "l" => Some(Direction::Left),
            "right" | "r" => Some(Direction::Right),
            _ => None,
        }
    }

    /// Convert to string
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

/// Interaction mode of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GameMode {
    /// Swipe a balloon into a neighbor to line up runs of three or more.
    #[default]
    Swap,
    /// Tap a connected cluster of two or more to pop it.
    Tap,
}

impl GameMode {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "swap" | "match3" | "match-3" => Some(GameMode::Swap),
            "tap" | "cluster" | "pop" => Some(GameMode::Tap),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Swap => "swap",
            GameMode::Tap => "tap",
        }
    }

    /// Score policy this mode uses unless configured otherwise
    pub fn default_score_policy(&self) -> ScorePolicy {
        match self {
            GameMode::Swap => ScorePolicy::Linear {
                points_per_piece: POINTS_PER_PIECE,
            },
            GameMode::Tap => ScorePolicy::Squared,
        }
    }

    /// Gravity policy tied to this mode
    pub fn gravity(&self) -> GravityMode {
        match self {
            GameMode::Swap => GravityMode::Refill,
            GameMode::Tap => GravityMode::ShiftLeft,
        }
    }
}

/// How a removal wave is turned into points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScorePolicy {
    /// `removed²`
    Squared,
    /// `removed × points_per_piece`
    Linear { points_per_piece: u32 },
}

impl ScorePolicy {
    /// Points for a wave that removed `removed` balloons
    pub fn points(&self, removed: usize) -> u32 {
        let n = u32::try_from(removed).unwrap_or(u32::MAX);
        match self {
            ScorePolicy::Squared => n.saturating_mul(n),
            ScorePolicy::Linear { points_per_piece } => n.saturating_mul(*points_per_piece),
        }
    }
}

/// What happens to the grid after balloons are removed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GravityMode {
    /// Collapse each column and refill vacated top cells with random colors.
    Refill,
    /// Collapse each column, then close empty columns toward column 0. No refill.
    ShiftLeft,
}

/// Whether a swap turn re-checks the board after gravity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CascadePolicy {
    /// One removal pass per turn; refills may leave new runs on the board.
    Single,
    /// Keep removing and refilling until no run remains.
    #[default]
    Repeat,
}

impl CascadePolicy {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "single" | "once" => Some(CascadePolicy::Single),
            "repeat" | "cascade" => Some(CascadePolicy::Repeat),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CascadePolicy::Single => "single",
            CascadePolicy::Repeat => "repeat",
        }
    }
}

/// A resolved player gesture, as delivered by the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputEvent {
    Swap { from: Position, direction: Direction },
    Tap { at: Position },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_codes_are_stable() {
        for (i, color) in Color::ALL.iter().enumerate() {
            assert_eq!(color.code() as usize, i + 1);
            assert_eq!(Color::from_code(color.code()), Some(*color));
        }
        assert_eq!(Color::from_code(0), None);
        assert_eq!(Color::from_code(7), None);
        assert_eq!(cell_code(None), 0);
        assert_eq!(cell_code(Some(Color::Orange)), 6);
    }

    #[test]
    fn step_stops_at_zero() {
        let origin = Position::new(0, 0);
        assert_eq!(origin.step(Direction::Up), None);
        assert_eq!(origin.step(Direction::Left), None);
        assert_eq!(origin.step(Direction::Down), Some(Position::new(1, 0)));
        assert_eq!(origin.step(Direction::Right), Some(Position::new(0, 1)));
    }

    #[test]
    fn adjacency_is_orthogonal_only() {
        let p = Position::new(3, 3);
        assert!(p.is_adjacent(Position::new(2, 3)));
        assert!(p.is_adjacent(Position::new(3, 4)));
        assert!(!p.is_adjacent(Position::new(4, 4)));
        assert!(!p.is_adjacent(p));
    }

    #[test]
    fn score_policies() {
        assert_eq!(ScorePolicy::Squared.points(3), 9);
        assert_eq!(
            ScorePolicy::Linear {
                points_per_piece: 10
            }
            .points(3),
            30
        );
        assert_eq!(ScorePolicy::Squared.points(usize::MAX), u32::MAX);
    }

    #[test]
    fn modes_pick_their_policies() {
        assert_eq!(GameMode::Swap.gravity(), GravityMode::Refill);
        assert_eq!(GameMode::Tap.gravity(), GravityMode::ShiftLeft);
        assert_eq!(GameMode::Tap.default_score_policy(), ScorePolicy::Squared);
        assert_eq!(CascadePolicy::from_str("once"), Some(CascadePolicy::Single));
        assert_eq!(CascadePolicy::default(), CascadePolicy::Repeat);
    }
}
