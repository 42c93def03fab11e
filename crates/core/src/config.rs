//! Session configuration
//!
//! Read from `BALLOON_*` environment variables, falling back to defaults for
//! anything missing or unparsable.

use std::env;

use crate::generate::GenerationPolicy;
use crate::turn::EngineConfig;
use crate::types::{CascadePolicy, GameMode, DEFAULT_COLS, DEFAULT_ROWS, MAX_GRID_EDGE, MIN_GRID_EDGE};

/// Everything needed to start a game session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub rows: u8,
    pub cols: u8,
    pub seed: u32,
    pub engine: EngineConfig,
    pub generation: GenerationPolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
            seed: 1,
            engine: EngineConfig::default(),
            generation: GenerationPolicy::default(),
        }
    }
}

impl SessionConfig {
    pub fn for_mode(mode: GameMode) -> Self {
        Self {
            engine: EngineConfig::for_mode(mode),
            ..Self::default()
        }
    }

    pub fn with_size(mut self, rows: u8, cols: u8) -> Self {
        self.rows = clamp_edge(rows);
        self.cols = clamp_edge(cols);
        self
    }

    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    /// Create from environment variables.
    ///
    /// - `BALLOON_MODE`: `swap` | `tap`
    /// - `BALLOON_ROWS`, `BALLOON_COLS`: clamped to the supported range
    /// - `BALLOON_SEED`: u32; defaults to a time-derived seed
    /// - `BALLOON_CASCADE`: `single` | `repeat`
    pub fn from_env() -> Self {
        let mode = env::var("BALLOON_MODE")
            .ok()
            .and_then(|s| GameMode::from_str(&s))
            .unwrap_or_default();

        let rows = env_u8("BALLOON_ROWS").unwrap_or(DEFAULT_ROWS);
        let cols = env_u8("BALLOON_COLS").unwrap_or(DEFAULT_COLS);

        let seed = env::var("BALLOON_SEED")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or_else(time_seed);

        let cascade = env::var("BALLOON_CASCADE")
            .ok()
            .and_then(|s| CascadePolicy::from_str(&s))
            .unwrap_or_default();

        Self {
            engine: EngineConfig::for_mode(mode).with_cascade(cascade),
            ..Self::default()
        }
        .with_size(rows, cols)
        .with_seed(seed)
    }
}

fn env_u8(key: &str) -> Option<u8> {
    env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

fn clamp_edge(n: u8) -> u8 {
    n.clamp(MIN_GRID_EDGE, MAX_GRID_EDGE)
}

/// Seed from the wall clock (sub-second bits mixed in)
pub fn time_seed() -> u32 {
    use std::time::{SystemTime, UNIX_EPOCH};
    let d = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    (d.as_secs() as u32) ^ d.subsec_nanos()
}
