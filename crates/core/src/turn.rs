//! Turn module - the BoardEngine and its swap / tap resolution
//!
//! The engine owns configuration and a color source, never a grid. Callers
//! pass the grid in, and it is mutated in place only when a move succeeds:
//! rejected moves leave every cell exactly as it was.

use crate::error::{InvalidInput, InvalidMove};
use crate::gravity::{apply_gravity, collapse, remove_positions, shift_left};
use crate::grid::Grid;
use crate::matching::{check_no_moves, find_matches, get_cluster, has_swap_move, MatchSet};
use crate::rng::{ColorSource, SimpleRng};
use crate::scoring::calculate_turn_score;
use crate::types::{
    CascadePolicy, Direction, GameMode, Position, ScorePolicy, MAX_CASCADE_WAVES, MIN_CLUSTER,
};

/// Engine rules for one session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    pub mode: GameMode,
    pub score_policy: ScorePolicy,
    pub cascade: CascadePolicy,
}

impl EngineConfig {
    /// Mode defaults: linear x10 for swaps, squared for taps, cascades on
    pub fn for_mode(mode: GameMode) -> Self {
        Self {
            mode,
            score_policy: mode.default_score_policy(),
            cascade: CascadePolicy::default(),
        }
    }

    pub fn with_score_policy(mut self, policy: ScorePolicy) -> Self {
        self.score_policy = policy;
        self
    }

    pub fn with_cascade(mut self, cascade: CascadePolicy) -> Self {
        self.cascade = cascade;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::for_mode(GameMode::Swap)
    }
}

/// A move that changed the board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// The swapped pair, None for taps
    pub swapped: Option<(Position, Position)>,
    /// Removed positions per wave; the first wave is the move itself
    pub waves: Vec<MatchSet>,
    pub score_delta: u32,
}

impl Resolution {
    /// Positions removed by the move itself (before any cascade)
    pub fn matches(&self) -> &MatchSet {
        &self.waves[0]
    }

    pub fn cascades(&self) -> usize {
        self.waves.len().saturating_sub(1)
    }
}

/// Result of offering a move to the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    Resolved(Resolution),
    Rejected(InvalidMove),
}

impl TurnOutcome {
    pub fn is_resolved(&self) -> bool {
        matches!(self, TurnOutcome::Resolved(_))
    }

    pub fn score_delta(&self) -> u32 {
        match self {
            TurnOutcome::Resolved(r) => r.score_delta,
            TurnOutcome::Rejected(_) => 0,
        }
    }

    pub fn resolution(&self) -> Option<&Resolution> {
        match self {
            TurnOutcome::Resolved(r) => Some(r),
            TurnOutcome::Rejected(_) => None,
        }
    }
}

/// Board generation, match detection, and turn resolution
#[derive(Debug, Clone)]
pub struct BoardEngine<S = SimpleRng> {
    config: EngineConfig,
    source: S,
}

impl BoardEngine<SimpleRng> {
    /// Engine drawing colors from a seeded [`SimpleRng`]
    pub fn seeded(config: EngineConfig, seed: u32) -> Self {
        Self::new(config, SimpleRng::new(seed))
    }
}

impl<S: ColorSource> BoardEngine<S> {
    pub fn new(config: EngineConfig, source: S) -> Self {
        Self { config, source }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn mode(&self) -> GameMode {
        self.config.mode
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// A `rows x cols` grid of independent uniform colors (matches allowed)
    pub fn generate_board(&mut self, rows: u8, cols: u8) -> Grid {
        Grid::generate(rows, cols, &mut self.source)
    }

    /// The neighbor of `pos` in `direction`, or None past the edge
    pub fn is_valid_swap_target(
        &self,
        grid: &Grid,
        pos: Position,
        direction: Direction,
    ) -> Option<Position> {
        grid.neighbor(pos, direction)
    }

    /// Set every matched position to empty
    pub fn remove_matches(&self, grid: &mut Grid, matches: &MatchSet) -> usize {
        remove_positions(grid, matches)
    }

    /// Collapse columns and refill with this engine's source
    pub fn apply_gravity(&mut self, grid: &mut Grid) -> usize {
        apply_gravity(grid, &mut self.source)
    }

    /// Swipe `pos` toward `direction` and resolve the resulting swap.
    ///
    /// A swipe off the edge is [`InvalidMove::OutOfBounds`], not an error.
    pub fn resolve_swipe(
        &mut self,
        grid: &mut Grid,
        pos: Position,
        direction: Direction,
    ) -> Result<TurnOutcome, InvalidInput> {
        ensure_on_grid(grid, pos)?;
        match self.is_valid_swap_target(grid, pos, direction) {
            Some(target) => self.resolve_turn(grid, pos, target),
            None => Ok(TurnOutcome::Rejected(InvalidMove::OutOfBounds)),
        }
    }

    /// Swap `a` and `b`, keep the swap only if it produces a match.
    ///
    /// On success the matched balloons are removed, the columns fall and are
    /// refilled, and (under [`CascadePolicy::Repeat`]) the board is re-checked
    /// until it settles. On [`InvalidMove::NoMatch`] the grid is restored.
    /// A `b` one step past the edge from `a` is [`InvalidMove::OutOfBounds`].
    pub fn resolve_turn(
        &mut self,
        grid: &mut Grid,
        a: Position,
        b: Position,
    ) -> Result<TurnOutcome, InvalidInput> {
        ensure_on_grid(grid, a)?;
        if !grid.contains(b) && Direction::ALL.iter().any(|&d| a.step(d) == Some(b)) {
            return Ok(TurnOutcome::Rejected(InvalidMove::OutOfBounds));
        }
        ensure_on_grid(grid, b)?;
        if !a.is_adjacent(b) {
            return Err(InvalidInput::NotAdjacent);
        }

        grid.swap(a, b);
        let first = find_matches(grid);
        if first.is_empty() {
            grid.swap(a, b);
            log::trace!("swap {:?} <-> {:?} reverted: no match", a, b);
            return Ok(TurnOutcome::Rejected(InvalidMove::NoMatch));
        }

        let waves = self.settle(grid, first);
        let score = calculate_turn_score(self.config.score_policy, &waves);
        log::debug!(
            "swap {:?} <-> {:?}: {} removed in {} wave(s), +{}",
            a,
            b,
            score.removed,
            waves.len(),
            score.total
        );

        Ok(TurnOutcome::Resolved(Resolution {
            swapped: Some((a, b)),
            waves,
            score_delta: score.total,
        }))
    }

    /// Remove `first`, drop and refill, then cascade per config
    fn settle(&mut self, grid: &mut Grid, first: MatchSet) -> Vec<MatchSet> {
        let mut waves = Vec::new();
        let mut current = first;

        loop {
            self.remove_matches(grid, &current);
            self.apply_gravity(grid);
            waves.push(current);

            if self.config.cascade == CascadePolicy::Single
                || waves.len() as u32 >= MAX_CASCADE_WAVES
            {
                break;
            }
            current = find_matches(grid);
            if current.is_empty() {
                break;
            }
            log::trace!("cascade wave {}: {} matched", waves.len() + 1, current.len());
        }

        waves
    }

    /// Pop the cluster under `pos` (tap mode).
    ///
    /// Clusters smaller than `MIN_CLUSTER` are rejected. Survivors fall, empty
    /// columns close toward column 0, and nothing is refilled.
    pub fn resolve_tap(&mut self, grid: &mut Grid, pos: Position) -> Result<TurnOutcome, InvalidInput> {
        ensure_on_grid(grid, pos)?;

        let cluster = get_cluster(grid, pos);
        if cluster.is_empty() {
            return Ok(TurnOutcome::Rejected(InvalidMove::EmptyCell));
        }
        if cluster.len() < MIN_CLUSTER {
            return Ok(TurnOutcome::Rejected(InvalidMove::ClusterTooSmall {
                size: cluster.len(),
                min: MIN_CLUSTER,
            }));
        }

        remove_positions(grid, &cluster);
        collapse(grid);
        shift_left(grid);

        let waves = vec![cluster];
        let score = calculate_turn_score(self.config.score_policy, &waves);
        log::debug!("tap {:?}: popped {}, +{}", pos, score.removed, score.total);

        Ok(TurnOutcome::Resolved(Resolution {
            swapped: None,
            waves,
            score_delta: score.total,
        }))
    }

    /// Terminal-state check for this engine's mode
    pub fn is_game_over(&self, grid: &Grid) -> bool {
        match self.config.mode {
            GameMode::Swap => !has_swap_move(grid),
            GameMode::Tap => check_no_moves(grid),
        }
    }
}

fn ensure_on_grid(grid: &Grid, pos: Position) -> Result<(), InvalidInput> {
    if grid.contains(pos) {
        Ok(())
    } else {
        Err(InvalidInput::OutOfGrid {
            row: pos.row,
            col: pos.col,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::parse_grid;
    use crate::rng::ScriptedColors;
    use crate::types::Color;

    fn p(row: u8, col: u8) -> Position {
        Position::new(row, col)
    }

    fn scripted(config: EngineConfig, colors: Vec<Color>) -> BoardEngine<ScriptedColors> {
        BoardEngine::new(config, ScriptedColors::new(colors))
    }

    #[test]
    fn test_swipe_off_edge_is_noop() {
        let mut grid = parse_grid("rgb\ngbr").unwrap();
        let before = grid.clone();
        let mut engine = BoardEngine::seeded(EngineConfig::default(), 1);
        let out = engine.resolve_swipe(&mut grid, p(0, 0), Direction::Up).unwrap();
        assert_eq!(out, TurnOutcome::Rejected(InvalidMove::OutOfBounds));
        assert_eq!(grid, before);
    }

    #[test]
    fn test_swap_with_cell_past_edge_is_noop() {
        let mut grid = parse_grid("rrgy\nbgry").unwrap();
        let before = grid.clone();
        let mut engine = BoardEngine::seeded(EngineConfig::default(), 1);
        let out = engine.resolve_turn(&mut grid, p(0, 3), p(0, 4)).unwrap();
        assert_eq!(out, TurnOutcome::Rejected(InvalidMove::OutOfBounds));
        let out = engine.resolve_turn(&mut grid, p(1, 0), p(2, 0)).unwrap();
        assert_eq!(out, TurnOutcome::Rejected(InvalidMove::OutOfBounds));
        assert_eq!(grid, before);

        assert_eq!(
            engine.resolve_turn(&mut grid, p(0, 3), p(0, 6)),
            Err(InvalidInput::OutOfGrid { row: 0, col: 6 })
        );
        assert_eq!(
            engine.resolve_turn(&mut grid, p(2, 0), p(1, 0)),
            Err(InvalidInput::OutOfGrid { row: 2, col: 0 })
        );
    }

    #[test]
    fn test_non_adjacent_swap_is_invalid_input() {
        let mut grid = parse_grid("rgb\ngbr").unwrap();
        let mut engine = BoardEngine::seeded(EngineConfig::default(), 1);
        assert_eq!(
            engine.resolve_turn(&mut grid, p(0, 0), p(1, 1)),
            Err(InvalidInput::NotAdjacent)
        );
        assert_eq!(
            engine.resolve_turn(&mut grid, p(0, 0), p(0, 0)),
            Err(InvalidInput::NotAdjacent)
        );
        assert_eq!(
            engine.resolve_tap(&mut grid, p(5, 0)),
            Err(InvalidInput::OutOfGrid { row: 5, col: 0 })
        );
    }

    #[test]
    fn test_single_cascade_stops_after_one_wave() {
        // Swapping (1,2) up completes the top row; the refill lines up three
        // reds in row 0 again, which Single leaves on the board.
        let mut grid = parse_grid(
            "
            rrgy
            bgry
            ",
        )
        .unwrap();
        let config = EngineConfig::default().with_cascade(CascadePolicy::Single);
        let mut engine = scripted(config, vec![Color::Red]);
        let out = engine.resolve_turn(&mut grid, p(0, 2), p(1, 2)).unwrap();
        let res = out.resolution().unwrap();
        assert_eq!(res.waves.len(), 1);
        assert_eq!(res.score_delta, 30);
        assert!(!find_matches(&grid).is_empty());
    }

    #[test]
    fn test_repeat_cascade_settles_board() {
        let mut grid = parse_grid(
            "
            rrgy
            bgry
            ",
        )
        .unwrap();
        // First refill is red (another run), then the source alternates.
        let mut engine = scripted(
            EngineConfig::default(),
            vec![
                Color::Red,
                Color::Red,
                Color::Red,
                Color::Blue,
                Color::Purple,
                Color::Orange,
            ],
        );
        let out = engine.resolve_turn(&mut grid, p(0, 2), p(1, 2)).unwrap();
        let res = out.resolution().unwrap();
        assert!(res.waves.len() >= 2);
        assert_eq!(res.cascades(), res.waves.len() - 1);
        assert!(find_matches(&grid).is_empty());
        assert!(grid.is_full());
    }

    #[test]
    fn test_tap_pops_cluster_and_shifts() {
        let mut grid = parse_grid(
            "
            rb
            rb
            ",
        )
        .unwrap();
        let mut engine = BoardEngine::seeded(EngineConfig::for_mode(GameMode::Tap), 1);
        let out = engine.resolve_tap(&mut grid, p(1, 0)).unwrap();
        assert_eq!(out.score_delta(), 4);
        assert_eq!(grid, parse_grid("b.\nb.").unwrap());
    }

    #[test]
    fn test_tap_single_balloon_rejected() {
        let mut grid = parse_grid("rb\nbr").unwrap();
        let before = grid.clone();
        let mut engine = BoardEngine::seeded(EngineConfig::for_mode(GameMode::Tap), 1);
        let out = engine.resolve_tap(&mut grid, p(0, 0)).unwrap();
        assert_eq!(
            out,
            TurnOutcome::Rejected(InvalidMove::ClusterTooSmall { size: 1, min: 2 })
        );
        assert_eq!(grid, before);
    }
}
