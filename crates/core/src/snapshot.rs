use crate::turn::Resolution;
use crate::types::{cell_code, Cell, GameMode, Position};

/// Summary of the last resolved turn, for renderers and observers
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TurnSummary {
    pub swapped: Option<(Position, Position)>,
    /// Every removed position across all waves, row-major per wave
    pub removed: Vec<Position>,
    pub waves: u32,
    pub score_delta: u32,
}

impl From<&Resolution> for TurnSummary {
    fn from(value: &Resolution) -> Self {
        Self {
            swapped: value.swapped,
            removed: value.waves.iter().flat_map(|w| w.iter()).collect(),
            waves: value.waves.len() as u32,
            score_delta: value.score_delta,
        }
    }
}

/// Read-only copy of a session, safe to hand to another thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSnapshot {
    pub rows: u8,
    pub cols: u8,
    /// Row-major cells
    pub cells: Vec<Cell>,
    pub mode: GameMode,
    pub episode_id: u32,
    pub seed: u32,
    pub turn: u32,
    pub score: u32,
    pub busy: bool,
    pub game_over: bool,
    pub last_turn: Option<TurnSummary>,
}

impl GameSnapshot {
    pub fn cell(&self, row: u8, col: u8) -> Cell {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.cells[row as usize * self.cols as usize + col as usize]
    }

    /// Cells as wire codes (0 = empty), one inner vec per row
    pub fn code_rows(&self) -> Vec<Vec<u8>> {
        self.cells
            .chunks(self.cols.max(1) as usize)
            .map(|r| r.iter().map(|c| cell_code(*c)).collect())
            .collect()
    }

    pub fn playable(&self) -> bool {
        !self.game_over && !self.busy
    }
}

impl Default for GameSnapshot {
    fn default() -> Self {
        Self {
            rows: 0,
            cols: 0,
            cells: Vec::new(),
            mode: GameMode::Swap,
            episode_id: 0,
            seed: 0,
            turn: 0,
            score: 0,
            busy: false,
            game_over: false,
            last_turn: None,
        }
    }
}
