//! Board generation with post-validation
//!
//! [`Grid::generate`] is deliberately unconstrained: boards may open with runs
//! already on them, or with no legal move at all. Sessions that want a clean
//! start use [`generate_playable`], which rejects and regenerates.

use crate::grid::Grid;
use crate::matching::{check_no_moves, find_matches, has_swap_move};
use crate::rng::ColorSource;
use crate::types::GameMode;

/// Default number of candidate boards before giving up
pub const DEFAULT_GENERATION_ATTEMPTS: u32 = 256;

/// How a session builds its starting board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GenerationPolicy {
    /// Independent uniform colors, no checks
    Relaxed,
    /// Reject and regenerate (up to `DEFAULT_GENERATION_ATTEMPTS`) until [`is_playable`]
    #[default]
    Playable,
}

/// True when `grid` is a fair opening position for `mode`.
///
/// Swap mode: no standing run and at least one swap that makes one.
/// Tap mode: at least one adjacent same-color pair.
pub fn is_playable(grid: &Grid, mode: GameMode) -> bool {
    match mode {
        GameMode::Swap => find_matches(grid).is_empty() && has_swap_move(grid),
        GameMode::Tap => !check_no_moves(grid),
    }
}

/// Generate until [`is_playable`] holds.
///
/// Returns the board and how many candidates were drawn. After
/// `max_attempts` failures the last candidate is returned as-is.
pub fn generate_playable(
    rows: u8,
    cols: u8,
    mode: GameMode,
    source: &mut impl ColorSource,
    max_attempts: u32,
) -> (Grid, u32) {
    let max_attempts = max_attempts.max(1);
    let mut attempts = 0;
    loop {
        attempts += 1;
        let grid = Grid::generate(rows, cols, source);
        if is_playable(&grid, mode) {
            return (grid, attempts);
        }
        if attempts >= max_attempts {
            log::warn!(
                "no playable {}x{} {} board after {} attempts; using last candidate",
                rows,
                cols,
                mode.as_str(),
                attempts
            );
            return (grid, attempts);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::parse_grid;
    use crate::rng::{ScriptedColors, SimpleRng};
    use crate::types::Color;

    #[test]
    fn test_playable_swap_board_has_no_standing_runs() {
        let mut rng = SimpleRng::new(2024);
        for _ in 0..10 {
            let (grid, attempts) =
                generate_playable(8, 8, GameMode::Swap, &mut rng, DEFAULT_GENERATION_ATTEMPTS);
            assert!(attempts >= 1);
            assert!(find_matches(&grid).is_empty());
            assert!(has_swap_move(&grid));
        }
    }

    #[test]
    fn test_gives_up_after_max_attempts() {
        // A single color can never be run-free.
        let mut src = ScriptedColors::new(vec![Color::Red]);
        let (grid, attempts) = generate_playable(3, 3, GameMode::Swap, &mut src, 4);
        assert_eq!(attempts, 4);
        assert!(grid.is_full());
    }

    #[test]
    fn test_tap_playability() {
        assert!(is_playable(&parse_grid("rr\ngb").unwrap(), GameMode::Tap));
        assert!(!is_playable(&parse_grid("rg\ngr").unwrap(), GameMode::Tap));
    }
}
