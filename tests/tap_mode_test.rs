use balloon_match::core::{
    parse_grid, GameState, InvalidInput, InvalidMove, ScriptedColors, SessionConfig, SessionError,
};
use balloon_match::engine::tap_targets;
use balloon_match::types::{Color, GameMode, InputEvent, Position};

fn tap_session(text: &str) -> GameState<ScriptedColors> {
    let grid = parse_grid(text).expect("fixture grid");
    let config = SessionConfig::for_mode(GameMode::Tap);
    GameState::with_grid(config, grid, ScriptedColors::new(vec![Color::Red]))
}

fn tap(row: u8, col: u8) -> InputEvent {
    InputEvent::Tap {
        at: Position::new(row, col),
    }
}

#[test]
fn tap_pops_cluster_collapses_and_scores_squared() {
    let mut state = tap_session(
        "
        rrg
        rgb
        ybb
        ",
    );
    let event = state.apply(tap(0, 0)).unwrap();
    assert!(event.is_resolved());
    assert_eq!(event.score_delta, 9);
    assert_eq!(event.removed.len(), 1);
    assert_eq!(event.removed[0].len(), 3);
    assert_eq!(
        event.grid,
        parse_grid(
            "
            ..g
            .gb
            ybb
            "
        )
        .unwrap()
    );
    assert!(!event.game_over);
    assert_eq!(state.score(), 9);
}

#[test]
fn emptied_column_closes_leftward_without_refill() {
    let mut state = tap_session(
        "
        rgy
        rbp
        ",
    );
    let event = state.apply(tap(1, 0)).unwrap();
    assert_eq!(event.score_delta, 4);
    assert_eq!(
        event.grid,
        parse_grid(
            "
            gy.
            bp.
            "
        )
        .unwrap()
    );
    // No two neighbours share a color any more.
    assert!(event.game_over);
    assert!(state.game_over());

    state.commit();
    assert_eq!(state.apply(tap(0, 0)), Err(SessionError::GameOver));
}

#[test]
fn lone_balloon_and_empty_cell_are_rejected() {
    let mut state = tap_session(
        "
        rgy
        rbp
        .bp
        ",
    );
    let before = state.grid().clone();

    let event = state.apply(tap(0, 1)).unwrap();
    assert_eq!(
        event.rejected,
        Some(InvalidMove::ClusterTooSmall { size: 1, min: 2 })
    );
    let event = state.apply(tap(2, 0)).unwrap();
    assert_eq!(event.rejected, Some(InvalidMove::EmptyCell));

    assert_eq!(state.grid(), &before);
    assert!(!state.busy());
    assert_eq!(state.turn(), 0);
}

#[test]
fn tap_outside_grid_is_invalid_input() {
    let mut state = tap_session("rr\ngb");
    assert_eq!(
        state.apply(tap(5, 0)),
        Err(SessionError::Input(InvalidInput::OutOfGrid { row: 5, col: 0 }))
    );
}

#[test]
fn tap_targets_lists_each_cluster_once() {
    let grid = parse_grid(
        "
        rrg
        bgg
        bpy
        ",
    )
    .unwrap();
    let clusters = tap_targets(&grid);
    let mut sizes: Vec<usize> = clusters.iter().map(|c| c.len()).collect();
    sizes.sort_unstable();
    assert_eq!(sizes, vec![2, 2, 3]);
}
