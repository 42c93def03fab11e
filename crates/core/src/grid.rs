//! Grid module - the rows x cols board of balloons
//!
//! Cells are stored in a flat row-major array for cache locality.
//! Coordinates: (row, col) where row 0 is the top and col 0 is the left edge.
//! Gravity pulls toward the highest row index.

use arrayvec::ArrayVec;

use crate::rng::ColorSource;
use crate::types::{Cell, Color, Direction, Position};

/// The game grid using flat array storage
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Grid {
    rows: u8,
    cols: u8,
    /// Flat array of cells, row-major order (row * cols + col)
    cells: Vec<Cell>,
}

impl Grid {
    /// Create a new all-empty grid
    pub fn new(rows: u8, cols: u8) -> Self {
        Self {
            rows,
            cols,
            cells: vec![None; rows as usize * cols as usize],
        }
    }

    /// Fill a `rows x cols` grid with independent, uniformly drawn colors.
    ///
    /// Pre-existing runs are allowed; see [`crate::generate::generate_playable`]
    /// for the validated variant.
    pub fn generate(rows: u8, cols: u8, source: &mut impl ColorSource) -> Self {
        let mut grid = Self::new(rows, cols);
        for cell in &mut grid.cells {
            *cell = Some(source.next_color());
        }
        grid
    }

    /// Build a grid from explicit rows (top row first).
    ///
    /// Returns None for ragged or empty input.
    pub fn from_rows(rows: &[Vec<Cell>]) -> Option<Self> {
        let height = rows.len();
        let width = rows.first()?.len();
        if width == 0 || height > u8::MAX as usize || width > u8::MAX as usize {
            return None;
        }
        if rows.iter().any(|r| r.len() != width) {
            return None;
        }
        Some(Self {
            rows: height as u8,
            cols: width as u8,
            cells: rows.iter().flatten().copied().collect(),
        })
    }

    #[inline(always)]
    fn index(&self, pos: Position) -> Option<usize> {
        if pos.row >= self.rows || pos.col >= self.cols {
            return None;
        }
        Some(pos.row as usize * self.cols as usize + pos.col as usize)
    }

    pub fn rows(&self) -> u8 {
        self.rows
    }

    pub fn cols(&self) -> u8 {
        self.cols
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.index(pos).is_some()
    }

    /// Get cell at `pos`. Returns None if out of bounds.
    pub fn get(&self, pos: Position) -> Option<Cell> {
        self.index(pos).map(|idx| self.cells[idx])
    }

    /// Color at `pos`, None for empty or out-of-bounds cells
    pub fn color(&self, pos: Position) -> Option<Color> {
        self.get(pos).flatten()
    }

    /// Set cell at `pos`. Returns false if out of bounds.
    pub fn set(&mut self, pos: Position, cell: Cell) -> bool {
        match self.index(pos) {
            Some(idx) => {
                self.cells[idx] = cell;
                true
            }
            None => false,
        }
    }

    /// Exchange the contents of two cells. Returns false if either is out of bounds.
    pub fn swap(&mut self, a: Position, b: Position) -> bool {
        match (self.index(a), self.index(b)) {
            (Some(ia), Some(ib)) => {
                self.cells.swap(ia, ib);
                true
            }
            _ => false,
        }
    }

    /// The in-bounds cell one step from `pos` in `dir`
    pub fn neighbor(&self, pos: Position, dir: Direction) -> Option<Position> {
        pos.step(dir).filter(|p| self.contains(*p))
    }

    /// Orthogonal in-bounds neighbors (up, down, left, right order)
    pub fn neighbors(&self, pos: Position) -> ArrayVec<Position, 4> {
        Direction::ALL
            .iter()
            .filter_map(|&dir| self.neighbor(pos, dir))
            .collect()
    }

    /// Iterate all positions in row-major order
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.rows).flat_map(move |row| (0..self.cols).map(move |col| Position::new(row, col)))
    }

    /// Check if a column has no balloons
    pub fn is_column_empty(&self, col: u8) -> bool {
        col < self.cols && (0..self.rows).all(|row| self.get(Position::new(row, col)) == Some(None))
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|c| c.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|c| c.is_none())
    }

    pub fn count_empty(&self) -> usize {
        self.cells.iter().filter(|c| c.is_none()).count()
    }

    /// Get a reference to the internal cells array
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Clear the entire grid
    pub fn clear(&mut self) {
        self.cells.fill(None);
    }
}

/// Parse a compact fixture like `"rrgb\ng.by"` (one letter per color, `.` empty).
///
/// Used by tests and benches to write boards by hand.
pub fn parse_grid(text: &str) -> Option<Grid> {
    let rows: Option<Vec<Vec<Cell>>> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|line| {
            line.chars()
                .map(|ch| match ch {
                    '.' => Some(None),
                    other => Color::from_str(&other.to_string()).map(Some),
                })
                .collect()
        })
        .collect();
    Grid::from_rows(&rows?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SimpleRng;

    #[test]
    fn test_grid_index_calculation() {
        let grid = Grid::new(6, 5);
        assert_eq!(grid.index(Position::new(0, 0)), Some(0));
        assert_eq!(grid.index(Position::new(0, 4)), Some(4));
        assert_eq!(grid.index(Position::new(1, 0)), Some(5));
        assert_eq!(grid.index(Position::new(5, 4)), Some(29));
        assert_eq!(grid.index(Position::new(6, 0)), None);
        assert_eq!(grid.index(Position::new(0, 5)), None);
    }

    #[test]
    fn test_generate_fills_every_cell() {
        let mut rng = SimpleRng::new(7);
        let grid = Grid::generate(6, 6, &mut rng);
        assert_eq!(grid.rows(), 6);
        assert_eq!(grid.cols(), 6);
        assert_eq!(grid.cells().len(), 36);
        assert!(grid.is_full());
    }

    #[test]
    fn test_neighbors_at_corner_and_center() {
        let grid = Grid::new(4, 4);
        let corner = grid.neighbors(Position::new(0, 0));
        assert_eq!(corner.as_slice(), &[Position::new(1, 0), Position::new(0, 1)]);
        assert_eq!(grid.neighbors(Position::new(2, 2)).len(), 4);
    }

    #[test]
    fn test_swap_out_of_bounds_leaves_grid() {
        let mut grid = parse_grid("rg\nby").unwrap();
        let before = grid.clone();
        assert!(!grid.swap(Position::new(0, 0), Position::new(0, 2)));
        assert_eq!(grid, before);
        assert!(grid.swap(Position::new(0, 0), Position::new(0, 1)));
        assert_eq!(grid.color(Position::new(0, 0)), Some(Color::Green));
    }

    #[test]
    fn test_parse_grid_rejects_ragged_rows() {
        assert!(parse_grid("rgb\nrg").is_none());
        assert!(parse_grid("rgx").is_none());
        let grid = parse_grid("r.\n.b").unwrap();
        assert_eq!(grid.count_empty(), 2);
        assert!(!grid.is_column_empty(0));
    }
}
