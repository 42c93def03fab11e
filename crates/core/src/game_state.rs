//! Game state module - one play session around the BoardEngine
//!
//! `GameState` is the explicit session context: it owns the grid, the engine,
//! the running score, and the single-slot turn gate. Nothing here is global.
//!
//! # Turn gate
//!
//! After a move resolves, the session is `busy` until the presentation layer
//! calls [`GameState::commit`] (typically once the pop animation has played).
//! Input arriving in between is refused with [`SessionError::Busy`], so no
//! second turn can start before the previous result is visible.

use crate::config::SessionConfig;
use crate::error::{InvalidInput, InvalidMove, SessionError};
use crate::generate::{generate_playable, GenerationPolicy, DEFAULT_GENERATION_ATTEMPTS};
use crate::grid::Grid;
use crate::matching::MatchSet;
use crate::rng::{ColorSource, SimpleRng};
use crate::snapshot::{GameSnapshot, TurnSummary};
use crate::turn::{BoardEngine, TurnOutcome};
use crate::types::{GameMode, InputEvent};

/// What one input produced, for the presentation layer to render
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnEvent {
    pub grid: Grid,
    /// Removed positions per wave (empty when rejected)
    pub removed: Vec<MatchSet>,
    pub score_delta: u32,
    pub game_over: bool,
    /// Set when the gesture was a no-op (grid unchanged)
    pub rejected: Option<InvalidMove>,
}

impl TurnEvent {
    pub fn is_resolved(&self) -> bool {
        self.rejected.is_none()
    }
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameState<S = SimpleRng> {
    config: SessionConfig,
    engine: BoardEngine<S>,
    grid: Grid,
    /// Monotonic episode id (increments on restart)
    episode_id: u32,
    seed: u32,
    /// Resolved turns this episode
    turn: u32,
    score: u32,
    busy: bool,
    game_over: bool,
    last_turn: Option<TurnSummary>,
}

impl GameState<SimpleRng> {
    /// Start a session from `config`, seeding the color source with `config.seed`
    pub fn new(config: SessionConfig) -> Self {
        let engine = BoardEngine::seeded(config.engine, config.seed);
        let mut state = Self::from_engine(config, engine, Grid::new(config.rows, config.cols));
        state.grid = state.fresh_board();
        state.game_over = state.engine.is_game_over(&state.grid);
        state
    }

    /// New episode with a new seed
    pub fn restart_seeded(&mut self, seed: u32) {
        self.engine = BoardEngine::seeded(self.config.engine, seed);
        self.seed = seed;
        self.restart();
    }
}

impl<S: ColorSource> GameState<S> {
    /// Session over an explicit starting grid and color source.
    ///
    /// The grid's size replaces `config.rows`/`config.cols`, so restarts keep it.
    pub fn with_grid(mut config: SessionConfig, grid: Grid, source: S) -> Self {
        config.rows = grid.rows();
        config.cols = grid.cols();
        let engine = BoardEngine::new(config.engine, source);
        let mut state = Self::from_engine(config, engine, grid);
        state.game_over = state.engine.is_game_over(&state.grid);
        state
    }

    fn from_engine(config: SessionConfig, engine: BoardEngine<S>, grid: Grid) -> Self {
        Self {
            config,
            engine,
            grid,
            episode_id: 0,
            seed: config.seed,
            turn: 0,
            score: 0,
            busy: false,
            game_over: false,
            last_turn: None,
        }
    }

    fn fresh_board(&mut self) -> Grid {
        let (rows, cols) = (self.config.rows, self.config.cols);
        match self.config.generation {
            GenerationPolicy::Relaxed => self.engine.generate_board(rows, cols),
            GenerationPolicy::Playable => {
                let mode = self.engine.mode();
                generate_playable(
                    rows,
                    cols,
                    mode,
                    self.engine.source_mut(),
                    DEFAULT_GENERATION_ATTEMPTS,
                )
                .0
            }
        }
    }

    /// New episode on the current color source
    pub fn restart(&mut self) {
        self.grid = self.fresh_board();
        self.episode_id = self.episode_id.wrapping_add(1);
        self.turn = 0;
        self.score = 0;
        self.busy = false;
        self.last_turn = None;
        self.game_over = self.engine.is_game_over(&self.grid);
        log::info!(
            "episode {} started ({} mode, {}x{})",
            self.episode_id,
            self.mode().as_str(),
            self.grid.rows(),
            self.grid.cols()
        );
    }

    /// Feed one resolved gesture into the session.
    ///
    /// Rejected gestures (swipe off the edge, no match, lone balloon) come back
    /// as `Ok` with `rejected` set and leave the gate open.
    pub fn apply(&mut self, event: InputEvent) -> Result<TurnEvent, SessionError> {
        if self.game_over {
            return Err(SessionError::GameOver);
        }
        if self.busy {
            return Err(SessionError::Busy);
        }

        let outcome = match (self.mode(), event) {
            (GameMode::Swap, InputEvent::Swap { from, direction }) => {
                self.engine.resolve_swipe(&mut self.grid, from, direction)?
            }
            (GameMode::Tap, InputEvent::Tap { at }) => self.engine.resolve_tap(&mut self.grid, at)?,
            (mode, _) => return Err(InvalidInput::WrongMode { expected: mode }.into()),
        };

        match outcome {
            TurnOutcome::Rejected(reason) => Ok(TurnEvent {
                grid: self.grid.clone(),
                removed: Vec::new(),
                score_delta: 0,
                game_over: false,
                rejected: Some(reason),
            }),
            TurnOutcome::Resolved(resolution) => {
                self.turn = self.turn.wrapping_add(1);
                self.score = self.score.saturating_add(resolution.score_delta);
                self.busy = true;
                self.game_over = self.engine.is_game_over(&self.grid);
                self.last_turn = Some(TurnSummary::from(&resolution));
                if self.game_over {
                    log::info!(
                        "episode {} over after {} turns, score {}",
                        self.episode_id,
                        self.turn,
                        self.score
                    );
                }

                Ok(TurnEvent {
                    grid: self.grid.clone(),
                    removed: resolution.waves,
                    score_delta: resolution.score_delta,
                    game_over: self.game_over,
                    rejected: None,
                })
            }
        }
    }

    /// Open the turn gate once the last result has been shown
    pub fn commit(&mut self) {
        self.busy = false;
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            rows: self.grid.rows(),
            cols: self.grid.cols(),
            cells: self.grid.cells().to_vec(),
            mode: self.mode(),
            episode_id: self.episode_id,
            seed: self.seed,
            turn: self.turn,
            score: self.score,
            busy: self.busy,
            game_over: self.game_over,
            last_turn: self.last_turn.clone(),
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn mode(&self) -> GameMode {
        self.engine.mode()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn episode_id(&self) -> u32 {
        self.episode_id
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn busy(&self) -> bool {
        self.busy
    }

    pub fn game_over(&self) -> bool {
        self.game_over
    }

    pub fn last_turn(&self) -> Option<&TurnSummary> {
        self.last_turn.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::parse_grid;
    use crate::rng::ScriptedColors;
    use crate::types::{Color, Direction, Position};

    fn swap_session(grid: &str, refill: Vec<Color>) -> GameState<ScriptedColors> {
        let grid = parse_grid(grid).unwrap();
        let config = SessionConfig::for_mode(GameMode::Swap).with_size(grid.rows(), grid.cols());
        GameState::with_grid(config, grid, ScriptedColors::new(refill))
    }

    #[test]
    fn test_new_session_is_full_and_open() {
        let state = GameState::new(SessionConfig::default().with_seed(9));
        assert!(state.grid().is_full());
        assert!(!state.busy());
        assert_eq!(state.score(), 0);
        assert_eq!(state.turn(), 0);
    }

    #[test]
    fn test_gate_blocks_until_commit() {
        let mut state = swap_session(
            "
            rrgyb
            bgryp
            gbopy
            ",
            vec![Color::Blue, Color::Purple, Color::Orange],
        );
        let ev = state
            .apply(InputEvent::Swap {
                from: Position::new(1, 2),
                direction: Direction::Up,
            })
            .unwrap();
        assert!(ev.is_resolved());
        assert!(state.busy());

        let again = state.apply(InputEvent::Swap {
            from: Position::new(2, 0),
            direction: Direction::Right,
        });
        assert_eq!(again, Err(SessionError::Busy));

        state.commit();
        assert!(!state.busy());
    }

    #[test]
    fn test_wrong_mode_input() {
        let mut state = swap_session("rrgyb\nbgryp\ngbopy", vec![Color::Red]);
        assert!(!state.game_over());
        let err = state
            .apply(InputEvent::Tap {
                at: Position::new(0, 0),
            })
            .unwrap_err();
        assert_eq!(
            err,
            SessionError::Input(InvalidInput::WrongMode {
                expected: GameMode::Swap
            })
        );
    }

    #[test]
    fn test_rejected_swap_keeps_gate_open() {
        let mut state = swap_session(
            "
            rrgyb
            bgryp
            gbopy
            ",
            vec![Color::Red],
        );
        let before = state.grid().clone();
        let ev = state
            .apply(InputEvent::Swap {
                from: Position::new(2, 4),
                direction: Direction::Down,
            })
            .unwrap();
        assert_eq!(ev.rejected, Some(InvalidMove::OutOfBounds));
        assert!(!state.busy());
        assert_eq!(state.grid(), &before);
        assert_eq!(state.turn(), 0);
    }

    #[test]
    fn test_restart_keeps_fixture_size() {
        let grid = parse_grid("rgb\ngbr\nbrg").unwrap();
        let config = SessionConfig::for_mode(GameMode::Tap);
        assert_eq!((config.rows, config.cols), (8, 8));

        let mut state = GameState::with_grid(
            config,
            grid,
            ScriptedColors::new(vec![Color::Red, Color::Green, Color::Blue]),
        );
        assert_eq!((state.config().rows, state.config().cols), (3, 3));

        state.restart();
        assert_eq!((state.grid().rows(), state.grid().cols()), (3, 3));
        assert!(state.grid().is_full());
    }

    #[test]
    fn test_restart_resets_counters() {
        let mut state = GameState::new(SessionConfig::default().with_seed(3));
        state.restart_seeded(4);
        assert_eq!(state.episode_id(), 1);
        assert_eq!(state.seed(), 4);
        assert_eq!(state.score(), 0);
        assert!(state.last_turn().is_none());
    }
}
