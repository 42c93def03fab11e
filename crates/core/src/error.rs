//! Error types for turn resolution and sessions
//!
//! `InvalidMove` is ordinary gameplay (a swipe off the edge, a swap that makes
//! no run) and travels inside `Ok` outcomes. `InvalidInput` and `SessionError`
//! are real rejections: the caller handed the engine something it must refuse.

use thiserror::Error;

use crate::types::GameMode;

/// A legal-looking gesture that does nothing; the grid is left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum InvalidMove {
    #[error("swap target is outside the grid")]
    OutOfBounds,
    #[error("swap does not line up three balloons")]
    NoMatch,
    #[error("tapped cell is empty")]
    EmptyCell,
    #[error("cluster of {size} is smaller than {min}")]
    ClusterTooSmall { size: usize, min: usize },
}

impl InvalidMove {
    pub fn code(self) -> &'static str {
        match self {
            InvalidMove::OutOfBounds => "out_of_bounds",
            InvalidMove::NoMatch => "no_match",
            InvalidMove::EmptyCell => "empty_cell",
            InvalidMove::ClusterTooSmall { .. } => "cluster_too_small",
        }
    }
}

/// Malformed input; rejected before any state changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum InvalidInput {
    #[error("position ({row}, {col}) is outside the grid")]
    OutOfGrid { row: u8, col: u8 },
    #[error("swapped cells are not orthogonal neighbors")]
    NotAdjacent,
    #[error("{} mode does not accept this input", .expected.as_str())]
    WrongMode { expected: GameMode },
}

impl InvalidInput {
    pub fn code(self) -> &'static str {
        match self {
            InvalidInput::OutOfGrid { .. } => "out_of_grid",
            InvalidInput::NotAdjacent => "not_adjacent",
            InvalidInput::WrongMode { .. } => "wrong_mode",
        }
    }
}

/// Session-level rejection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum SessionError {
    #[error("previous turn has not been committed")]
    Busy,
    #[error("game is over")]
    GameOver,
    #[error(transparent)]
    Input(#[from] InvalidInput),
}

impl SessionError {
    pub fn code(self) -> &'static str {
        match self {
            SessionError::Busy => "busy",
            SessionError::GameOver => "game_over",
            SessionError::Input(_) => "invalid_input",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_and_codes() {
        let e = InvalidInput::OutOfGrid { row: 9, col: 2 };
        assert_eq!(e.to_string(), "position (9, 2) is outside the grid");
        assert_eq!(e.code(), "out_of_grid");

        let e = InvalidInput::WrongMode {
            expected: GameMode::Tap,
        };
        assert_eq!(e.to_string(), "tap mode does not accept this input");

        let s: SessionError = InvalidInput::NotAdjacent.into();
        assert_eq!(s.code(), "invalid_input");
        assert_eq!(s.to_string(), "swapped cells are not orthogonal neighbors");

        let m = InvalidMove::ClusterTooSmall { size: 1, min: 2 };
        assert_eq!(m.to_string(), "cluster of 1 is smaller than 2");
        assert_eq!(m.code(), "cluster_too_small");
    }
}
