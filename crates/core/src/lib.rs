//! Core game logic module - pure, deterministic, and testable
//!
//! This crate contains the board rules and the session state for the balloon
//! game. It has **no dependencies** on UI, networking, or I/O, making it:
//!
//! - **Deterministic**: the same seed (or scripted color source) replays the same game
//! - **Testable**: every rule is reachable from a plain `Grid`
//! - **Portable**: runs in the terminal frontend, the AI adapter, or headless
//!
//! # Module Structure
//!
//! - [`grid`]: rectangular grid of balloon cells, row-major
//! - [`rng`]: the `ColorSource` seam plus a seeded LCG and a scripted source
//! - [`matching`]: run detection, cluster flood fill, move-availability checks
//! - [`gravity`]: column collapse, refill, and the left shift used by tap mode
//! - [`scoring`]: per-wave score policies
//! - [`turn`]: `BoardEngine`, which resolves one swap or tap into a `TurnOutcome`
//! - [`generate`]: starting-board generation with playability checks
//! - [`game_state`]: one play session with its score and turn gate
//! - [`snapshot`]: read-only session copies for renderers and observers
//! - [`config`]: session configuration from `BALLOON_*` env vars
//! - [`error`]: error enums with stable string codes
//!
//! # Game Rules
//!
//! - **Swap mode**: swipe a balloon onto its neighbor. The swap stands only if
//!   it lines up three or more of one color. Matches pop, columns fall, and new
//!   balloons drop in from the top. Cascades repeat until the board settles.
//! - **Tap mode**: tap a cluster of two or more connected same-color balloons.
//!   Nothing refills; emptied columns close toward the left.
//! - **Game over**: no swap can make a run (swap mode), or no two neighbors
//!   share a color (tap mode).
//!
//! # Example
//!
//! ```
//! use balloon_match_core::{parse_grid, BoardEngine, EngineConfig, ScriptedColors};
//! use balloon_match_core::types::{Color, GameMode, Position};
//!
//! let mut grid = parse_grid("rrgy\nbgry").unwrap();
//! let mut engine = BoardEngine::new(
//!     EngineConfig::for_mode(GameMode::Swap),
//!     ScriptedColors::new(vec![Color::Purple]),
//! );
//!
//! let outcome = engine
//!     .resolve_turn(&mut grid, Position::new(0, 2), Position::new(1, 2))
//!     .unwrap();
//! assert!(outcome.is_resolved());
//! assert!(outcome.score_delta() > 0);
//! ```

pub mod config;
pub mod error;
pub mod game_state;
pub mod generate;
pub mod gravity;
pub mod grid;
pub mod matching;
pub mod rng;
pub mod scoring;
pub mod snapshot;
pub mod turn;

pub use balloon_match_types as types;

// Re-export commonly used types for convenience
pub use config::{time_seed, SessionConfig};
pub use error::{InvalidInput, InvalidMove, SessionError};
pub use game_state::{GameState, TurnEvent};
pub use generate::{generate_playable, is_playable, GenerationPolicy, DEFAULT_GENERATION_ATTEMPTS};
pub use gravity::{apply_gravity, collapse, remove_positions, shift_left};
pub use grid::{parse_grid, Grid};
pub use matching::{
    check_no_moves, find_matches, get_cluster, has_swap_move, swap_creates_match,
    MatchSet,
};
pub use rng::{ColorSource, ScriptedColors, SimpleRng};
pub use scoring::{calculate_turn_score, calculate_wave_score, ScoreResult};
pub use snapshot::{GameSnapshot, TurnSummary};
pub use turn::{BoardEngine, EngineConfig, Resolution, TurnOutcome};
