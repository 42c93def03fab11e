use balloon_match::core::{parse_grid, GameState, ScriptedColors, SessionConfig};
use balloon_match::store::{balance, credit, JsonFileStore, KeyValueStore, MemoryStore};
use balloon_match::types::{Color, Direction, GameMode, InputEvent, Position};

#[test]
fn finished_session_score_lands_in_file_store() {
    let grid = parse_grid("rrgyb\nbgryp\ngbopy").unwrap();
    let config = SessionConfig::for_mode(GameMode::Swap).with_size(3, 5);
    let mut state = GameState::with_grid(
        config,
        grid,
        ScriptedColors::new(vec![Color::Blue, Color::Purple, Color::Orange]),
    );
    state
        .apply(InputEvent::Swap {
            from: Position::new(1, 2),
            direction: Direction::Up,
        })
        .unwrap();
    state.commit();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("balloon-store.json");
    {
        let mut store = JsonFileStore::open(&path).unwrap();
        assert_eq!(credit(&mut store, state.score() as u64).unwrap(), 30);
    }
    {
        let mut store = JsonFileStore::open(&path).unwrap();
        assert_eq!(credit(&mut store, 12).unwrap(), 42);
    }

    let text = std::fs::read_to_string(&path).unwrap();
    let raw: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(raw["balance"], "42");
}

#[test]
fn stores_share_one_contract() {
    fn exercise(store: &mut impl KeyValueStore) {
        assert_eq!(store.get("owned").unwrap(), None);
        store.set("owned", "[]").unwrap();
        store.set("owned", "[\"hat\"]").unwrap();
        assert_eq!(store.get("owned").unwrap().as_deref(), Some("[\"hat\"]"));
        assert_eq!(balance(&*store).unwrap(), 0);
    }

    exercise(&mut MemoryStore::new());

    let dir = tempfile::tempdir().unwrap();
    exercise(&mut JsonFileStore::open(dir.path().join("s.json")).unwrap());
}
