//! Matching module - run detection, cluster flood fill, and move detection
//!
//! Two match rules live side by side:
//! - **Runs** (swap mode): straight horizontal or vertical lines of `MIN_RUN`+
//!   identical colors.
//! - **Clusters** (tap mode): 4-connected components of identical colors.

use std::collections::BTreeSet;

use crate::grid::Grid;
use crate::types::{Color, Direction, Position, MIN_RUN};

/// A set of unique positions, iterated in row-major order
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct MatchSet {
    positions: BTreeSet<Position>,
}

impl MatchSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a position. Returns false if it was already present.
    pub fn insert(&mut self, pos: Position) -> bool {
        self.positions.insert(pos)
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.positions.contains(&pos)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Position> + '_ {
        self.positions.iter().copied()
    }

    /// Merge `other` into `self`
    pub fn extend(&mut self, other: &MatchSet) {
        self.positions.extend(other.positions.iter().copied());
    }

    pub fn to_vec(&self) -> Vec<Position> {
        self.iter().collect()
    }
}

impl FromIterator<Position> for MatchSet {
    fn from_iter<I: IntoIterator<Item = Position>>(iter: I) -> Self {
        Self {
            positions: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a MatchSet {
    type Item = &'a Position;
    type IntoIter = std::collections::btree_set::Iter<'a, Position>;

    fn into_iter(self) -> Self::IntoIter {
        self.positions.iter()
    }
}

/// Find every horizontal and vertical run of `MIN_RUN` or more identical colors.
///
/// Pure: the grid is not touched. Positions on both a horizontal and a
/// vertical run appear once.
pub fn find_matches(grid: &Grid) -> MatchSet {
    let mut matches = MatchSet::new();

    for row in 0..grid.rows() {
        scan_line(
            grid,
            (0..grid.cols()).map(|col| Position::new(row, col)),
            &mut matches,
        );
    }
    for col in 0..grid.cols() {
        scan_line(
            grid,
            (0..grid.rows()).map(|row| Position::new(row, col)),
            &mut matches,
        );
    }

    matches
}

/// Walk one line of positions, flushing qualifying runs into `out`
fn scan_line(grid: &Grid, line: impl Iterator<Item = Position>, out: &mut MatchSet) {
    let mut run: Vec<Position> = Vec::new();
    let mut run_color: Option<Color> = None;

    for pos in line {
        let color = grid.color(pos);
        if color.is_some() && color == run_color {
            run.push(pos);
            continue;
        }
        flush_run(&run, out);
        run.clear();
        run_color = color;
        if color.is_some() {
            run.push(pos);
        }
    }
    flush_run(&run, out);
}

#[inline]
fn flush_run(run: &[Position], out: &mut MatchSet) {
    if run.len() >= MIN_RUN {
        for &p in run {
            out.insert(p);
        }
    }
}

/// Depth-first flood fill from `start` over same-colored orthogonal neighbors.
///
/// Returns an empty set when `start` is empty or off the grid.
pub fn get_cluster(grid: &Grid, start: Position) -> MatchSet {
    let mut cluster = MatchSet::new();
    let Some(color) = grid.color(start) else {
        return cluster;
    };

    let mut stack = vec![start];
    cluster.insert(start);
    while let Some(pos) = stack.pop() {
        for next in grid.neighbors(pos) {
            if grid.color(next) == Some(color) && cluster.insert(next) {
                stack.push(next);
            }
        }
    }

    cluster
}

/// True iff no two orthogonally adjacent balloons share a color.
///
/// Empty cells never pair up, so a cleared board has no moves.
pub fn check_no_moves(grid: &Grid) -> bool {
    for pos in grid.positions() {
        let Some(color) = grid.color(pos) else {
            continue;
        };
        // Right and down cover every adjacent pair exactly once.
        for dir in [Direction::Right, Direction::Down] {
            if let Some(next) = grid.neighbor(pos, dir) {
                if grid.color(next) == Some(color) {
                    return false;
                }
            }
        }
    }
    true
}

/// True if `pos` sits on a horizontal or vertical run of `MIN_RUN`+
pub fn has_run_through(grid: &Grid, pos: Position) -> bool {
    let Some(color) = grid.color(pos) else {
        return false;
    };
    let span = |a: Direction, b: Direction| {
        1 + count_same(grid, pos, a, color) + count_same(grid, pos, b, color)
    };
    span(Direction::Left, Direction::Right) >= MIN_RUN
        || span(Direction::Up, Direction::Down) >= MIN_RUN
}

fn count_same(grid: &Grid, from: Position, dir: Direction, color: Color) -> usize {
    let mut n = 0;
    let mut cur = from;
    while let Some(next) = grid.neighbor(cur, dir) {
        if grid.color(next) != Some(color) {
            break;
        }
        n += 1;
        cur = next;
    }
    n
}

/// Would swapping `pos` with its neighbor in `dir` produce a match?
///
/// Uses the same whole-board rule as turn resolution, so a board that already
/// holds a run reports every in-bounds swap as matching.
pub fn swap_creates_match(grid: &Grid, pos: Position, dir: Direction) -> bool {
    let Some(target) = grid.neighbor(pos, dir) else {
        return false;
    };
    let mut trial = grid.clone();
    trial.swap(pos, target);
    !find_matches(&trial).is_empty()
}

/// True iff at least one orthogonal swap makes `find_matches` non-empty.
///
/// Swap-mode game-over detector.
pub fn has_swap_move(grid: &Grid) -> bool {
    if !find_matches(grid).is_empty() {
        return true;
    }

    // With no standing run, only runs through the two swapped cells can appear.
    let mut trial = grid.clone();
    for pos in grid.positions() {
        for dir in [Direction::Right, Direction::Down] {
            let Some(target) = grid.neighbor(pos, dir) else {
                continue;
            };
            if grid.color(pos) == grid.color(target) {
                continue;
            }
            trial.swap(pos, target);
            let hit = has_run_through(&trial, pos) || has_run_through(&trial, target);
            trial.swap(pos, target);
            if hit {
                return true;
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::parse_grid;

    fn p(row: u8, col: u8) -> Position {
        Position::new(row, col)
    }

    #[test]
    fn test_row_run_of_three() {
        let grid = parse_grid("rrrbb").unwrap();
        let m = find_matches(&grid);
        assert_eq!(m.to_vec(), vec![p(0, 0), p(0, 1), p(0, 2)]);
    }

    #[test]
    fn test_run_at_row_end_is_flushed() {
        let grid = parse_grid("bbggg").unwrap();
        assert_eq!(find_matches(&grid).to_vec(), vec![p(0, 2), p(0, 3), p(0, 4)]);
    }

    #[test]
    fn test_empty_cells_break_runs() {
        let grid = parse_grid("rr.rr").unwrap();
        assert!(find_matches(&grid).is_empty());
        let grid = parse_grid("...\n...\n...").unwrap();
        assert!(find_matches(&grid).is_empty());
    }

    #[test]
    fn test_cross_shares_center() {
        let grid = parse_grid(
            "
            bgb
            ggg
            bgb
            ",
        )
        .unwrap();
        let m = find_matches(&grid);
        assert_eq!(m.len(), 5);
        assert!(m.contains(p(1, 1)));
    }

    #[test]
    fn test_cluster_flood_fill() {
        let grid = parse_grid(
            "
            rrb
            brb
            rrr
            ",
        )
        .unwrap();
        let c = get_cluster(&grid, p(0, 0));
        assert_eq!(c.len(), 6);
        assert!(!c.contains(p(1, 0)));
        assert_eq!(get_cluster(&grid, p(1, 0)).len(), 1);
        assert!(get_cluster(&grid, p(9, 9)).is_empty());
    }

    #[test]
    fn test_check_no_moves() {
        let checker = parse_grid("rgr\ngrg\nrgr").unwrap();
        assert!(check_no_moves(&checker));
        let paired = parse_grid("rgr\ngrg\nrgg").unwrap();
        assert!(!check_no_moves(&paired));
        let holes = parse_grid("..\n..").unwrap();
        assert!(check_no_moves(&holes));
    }

    #[test]
    fn test_has_swap_move() {
        // Swapping (0,2) down completes the top row.
        let grid = parse_grid(
            "
            rrby
            gyrb
            ",
        )
        .unwrap();
        assert!(has_swap_move(&grid));
        assert!(swap_creates_match(&grid, p(0, 2), Direction::Down));
        assert!(!swap_creates_match(&grid, p(0, 0), Direction::Up));

        let stuck = parse_grid(
            "
            rgb
            gbr
            ",
        )
        .unwrap();
        assert!(!has_swap_move(&stuck));
    }
}
