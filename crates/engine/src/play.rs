use crate::core::{ColorSource, GameState, SessionError, TurnEvent};
use crate::moves::hint;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayError {
    NoMove,
    Session(SessionError),
}

impl PlayError {
    pub fn code(self) -> &'static str {
        match self {
            PlayError::NoMove => "no_move",
            PlayError::Session(e) => e.code(),
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            PlayError::NoMove => "no move is available on this board",
            PlayError::Session(SessionError::Busy) => "previous turn has not been committed",
            PlayError::Session(SessionError::GameOver) => "game is over",
            PlayError::Session(SessionError::Input(_)) => "hinted move was refused",
        }
    }
}

impl From<SessionError> for PlayError {
    fn from(value: SessionError) -> Self {
        PlayError::Session(value)
    }
}

/// Play the move [`hint`] suggests for the session's current board
pub fn play_hint<S: ColorSource>(state: &mut GameState<S>) -> Result<TurnEvent, PlayError> {
    if state.game_over() {
        return Err(PlayError::Session(SessionError::GameOver));
    }
    if state.busy() {
        return Err(PlayError::Session(SessionError::Busy));
    }

    let Some(event) = hint(state.grid(), state.mode()) else {
        return Err(PlayError::NoMove);
    };
    log::debug!("playing hint {:?}", event);
    Ok(state.apply(event)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{parse_grid, ScriptedColors, SessionConfig};
    use crate::types::{Color, GameMode};

    #[test]
    fn play_hint_resolves_a_turn() {
        let grid = parse_grid(
            "
            rrgyb
            bgryp
            gbopy
            ",
        )
        .unwrap();
        let config = SessionConfig::for_mode(GameMode::Swap).with_size(3, 5);
        let mut gs = GameState::with_grid(
            config,
            grid,
            ScriptedColors::new(vec![Color::Blue, Color::Purple, Color::Orange]),
        );
        let ev = play_hint(&mut gs).unwrap();
        assert!(ev.is_resolved());
        assert!(ev.score_delta > 0);

        let err = play_hint(&mut gs).unwrap_err();
        assert_eq!(err, PlayError::Session(SessionError::Busy));
        assert_eq!(err.code(), "busy");
    }

    #[test]
    fn play_hint_refused_after_game_over() {
        let grid = parse_grid("rgb\ngbr\nbrg").unwrap();
        let config = SessionConfig::for_mode(GameMode::Tap).with_size(3, 3);
        let mut gs = GameState::with_grid(config, grid, ScriptedColors::new(vec![Color::Red]));
        assert!(gs.game_over());
        assert_eq!(
            play_hint(&mut gs).unwrap_err(),
            PlayError::Session(SessionError::GameOver)
        );
    }
}
