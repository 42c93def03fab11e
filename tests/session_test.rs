use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use balloon_match::core::{parse_grid, GameState, ScriptedColors, SessionConfig, SessionError};
use balloon_match::input::{handle_key_event, InputHandler};
use balloon_match::types::{Color, Direction, GameMode, InputEvent, Position};

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn fixture() -> GameState<ScriptedColors> {
    let grid = parse_grid(
        "
        rrgyb
        bgryp
        gbopy
        ",
    )
    .unwrap();
    let config = SessionConfig::for_mode(GameMode::Swap).with_size(grid.rows(), grid.cols());
    GameState::with_grid(
        config,
        grid,
        ScriptedColors::new(vec![Color::Blue, Color::Purple, Color::Orange]),
    )
}

#[test]
fn same_seed_same_board() {
    let config = SessionConfig::for_mode(GameMode::Swap).with_seed(77);
    let a = GameState::new(config);
    let b = GameState::new(config);
    assert_eq!(a.grid(), b.grid());
    assert_eq!(a.snapshot().code_rows(), b.snapshot().code_rows());

    let c = GameState::new(config.with_seed(78));
    assert_ne!(a.grid(), c.grid());
}

#[test]
fn keyboard_grab_and_swipe_resolves_a_turn() {
    let mut state = fixture();
    let mut handler = InputHandler::new(state.mode(), state.grid().rows(), state.grid().cols());

    // Move to (1, 2), grab, swipe up.
    let mut events = Vec::new();
    for code in [
        KeyCode::Down,
        KeyCode::Right,
        KeyCode::Right,
        KeyCode::Char(' '),
        KeyCode::Up,
    ] {
        let cmd = handle_key_event(key(code)).expect("mapped key");
        events.extend(handler.handle(cmd));
    }
    assert_eq!(events.len(), 1);
    assert_eq!(handler.cursor(), Position::new(1, 2));

    let event = state.apply(events[0]).unwrap();
    assert!(event.is_resolved());
    assert_eq!(event.score_delta, 30);
    handler.follow(events[0]);
    assert_eq!(handler.cursor(), Position::new(0, 2));

    let snap = state.snapshot();
    assert!(snap.busy);
    assert!(!snap.playable());
    assert_eq!(snap.turn, 1);
    assert_eq!(snap.score, 30);
    let last = snap.last_turn.expect("turn summary");
    assert_eq!(last.swapped, Some((Position::new(1, 2), Position::new(0, 2))));
    assert_eq!(last.waves, 1);
    assert_eq!(
        last.removed,
        vec![Position::new(0, 0), Position::new(0, 1), Position::new(0, 2)]
    );
}

#[test]
fn busy_gate_serializes_turns() {
    let mut state = fixture();
    let turns = [
        InputEvent::Swap {
            from: Position::new(1, 2),
            direction: Direction::Up,
        },
        InputEvent::Swap {
            from: Position::new(2, 0),
            direction: Direction::Right,
        },
    ];

    assert!(state.apply(turns[0]).unwrap().is_resolved());
    assert_eq!(state.apply(turns[1]), Err(SessionError::Busy));
    assert_eq!(state.turn(), 1);

    state.commit();
    assert!(state.apply(turns[1]).is_ok());
}

#[test]
fn restart_starts_new_episode() {
    let config = SessionConfig::for_mode(GameMode::Tap).with_size(6, 7).with_seed(3);
    let mut state = GameState::new(config);
    assert_eq!(state.grid().rows(), 6);
    assert_eq!(state.grid().cols(), 7);

    let first = state.episode_id();
    state.restart_seeded(4);
    assert_eq!(state.episode_id(), first + 1);
    assert_eq!(state.seed(), 4);
    assert_eq!(state.score(), 0);
    assert!(state.grid().is_full());
    assert!(state.last_turn().is_none());
}
