//! Gravity module - column compaction, refill, and left shift
//!
//! Two post-removal policies, kept separate on purpose:
//! - [`apply_gravity`]: swap mode. Collapse, then refill every vacated slot.
//! - [`collapse`] + [`shift_left`]: tap mode. Collapse, then close empty
//!   columns toward column 0. Nothing is refilled.

use crate::grid::Grid;
use crate::rng::ColorSource;
use crate::types::{Cell, Position};

/// Collapse every column downward, preserving top-to-bottom order.
///
/// Uses a two-pointer pass per column (read from the bottom, write from the
/// bottom). Returns the number of vacated cells left at the tops of columns.
pub fn collapse(grid: &mut Grid) -> usize {
    let mut vacated = 0;
    for col in 0..grid.cols() {
        vacated += collapse_column(grid, col);
    }
    vacated
}

fn collapse_column(grid: &mut Grid, col: u8) -> usize {
    let rows = grid.rows();
    let mut write = rows;

    for read in (0..rows).rev() {
        let cell = grid.get(Position::new(read, col)).flatten();
        if cell.is_some() {
            write -= 1;
            if write != read {
                grid.set(Position::new(write, col), cell);
                grid.set(Position::new(read, col), None);
            }
        }
    }

    // Rows 0..write are now empty.
    write as usize
}

/// Collapse each column, then refill vacated cells with fresh colors.
///
/// Leaves no empty cell behind. Refill order is column by column, bottom-most
/// vacated slot first, so scripted sources produce predictable boards.
pub fn apply_gravity(grid: &mut Grid, source: &mut impl ColorSource) -> usize {
    let mut refilled = 0;
    for col in 0..grid.cols() {
        let empty_top = collapse_column(grid, col) as u8;
        for row in (0..empty_top).rev() {
            grid.set(Position::new(row, col), Some(source.next_color()));
            refilled += 1;
        }
    }
    refilled
}

/// Remove fully empty columns by shifting the columns to their right left.
///
/// Vacated rightmost columns stay empty. Returns how many gaps were closed.
pub fn shift_left(grid: &mut Grid) -> usize {
    let rows = grid.rows();
    let mut write = 0u8;
    let mut closed = 0usize;

    for read in 0..grid.cols() {
        if grid.is_column_empty(read) {
            continue;
        }
        if write != read {
            for row in 0..rows {
                let cell: Cell = grid.get(Position::new(row, read)).flatten();
                grid.set(Position::new(row, write), cell);
                grid.set(Position::new(row, read), None);
            }
            closed = (read - write) as usize;
        }
        write += 1;
    }

    closed
}

/// Set every listed position to empty. Out-of-bounds positions are ignored.
pub fn remove_positions<'a>(
    grid: &mut Grid,
    positions: impl IntoIterator<Item = &'a Position>,
) -> usize {
    let mut removed = 0;
    for &pos in positions {
        if grid.get(pos).flatten().is_some() && grid.set(pos, None) {
            removed += 1;
        }
    }
    removed
}
