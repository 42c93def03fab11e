//! Key mapping from terminal events to UI commands.

use crate::types::Direction;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// What a key press asks the frontend to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiCommand {
    /// Move the cursor (or swipe the grabbed balloon)
    Cursor(Direction),
    /// Swipe the balloon under the cursor
    Swipe(Direction),
    /// Grab/release in swap mode, tap in tap mode
    Select,
    /// Jump the cursor to a suggested move
    Hint,
    Restart,
}

/// Map keyboard input to UI commands.
///
/// Lowercase letters and plain arrows move the cursor; Shift+arrow and the
/// uppercase letters swipe.
pub fn handle_key_event(key: KeyEvent) -> Option<UiCommand> {
    let shifted = key.modifiers.contains(KeyModifiers::SHIFT);
    let arrow = |dir: Direction| {
        if shifted {
            UiCommand::Swipe(dir)
        } else {
            UiCommand::Cursor(dir)
        }
    };

    match key.code {
        KeyCode::Left => Some(arrow(Direction::Left)),
        KeyCode::Right => Some(arrow(Direction::Right)),
        KeyCode::Up => Some(arrow(Direction::Up)),
        KeyCode::Down => Some(arrow(Direction::Down)),

        KeyCode::Char('h') | KeyCode::Char('a') => Some(UiCommand::Cursor(Direction::Left)),
        KeyCode::Char('l') | KeyCode::Char('d') => Some(UiCommand::Cursor(Direction::Right)),
        KeyCode::Char('k') | KeyCode::Char('w') => Some(UiCommand::Cursor(Direction::Up)),
        KeyCode::Char('j') | KeyCode::Char('s') => Some(UiCommand::Cursor(Direction::Down)),

        KeyCode::Char('H') | KeyCode::Char('A') => Some(UiCommand::Swipe(Direction::Left)),
        KeyCode::Char('L') | KeyCode::Char('D') => Some(UiCommand::Swipe(Direction::Right)),
        KeyCode::Char('K') | KeyCode::Char('W') => Some(UiCommand::Swipe(Direction::Up)),
        KeyCode::Char('J') | KeyCode::Char('S') => Some(UiCommand::Swipe(Direction::Down)),

        KeyCode::Char(' ') | KeyCode::Enter => Some(UiCommand::Select),
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Char('?') => Some(UiCommand::Hint),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(UiCommand::Restart),

        _ => None,
    }
}

/// Check if key should quit the game.
pub fn should_quit(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q'))
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    #[test]
    fn test_cursor_keys() {
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Left)),
            Some(UiCommand::Cursor(Direction::Left))
        );
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Char('j'))),
            Some(UiCommand::Cursor(Direction::Down))
        );
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Char('w'))),
            Some(UiCommand::Cursor(Direction::Up))
        );
    }

    #[test]
    fn test_swipe_keys() {
        assert_eq!(
            handle_key_event(KeyEvent::new(KeyCode::Right, KeyModifiers::SHIFT)),
            Some(UiCommand::Swipe(Direction::Right))
        );
        assert_eq!(
            handle_key_event(KeyEvent::new(KeyCode::Char('K'), KeyModifiers::SHIFT)),
            Some(UiCommand::Swipe(Direction::Up))
        );
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Char('A'))),
            Some(UiCommand::Swipe(Direction::Left))
        );
    }

    #[test]
    fn test_action_keys() {
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Char(' '))),
            Some(UiCommand::Select)
        );
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Enter)),
            Some(UiCommand::Select)
        );
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Char('r'))),
            Some(UiCommand::Restart)
        );
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Char('n'))),
            Some(UiCommand::Hint)
        );
        assert_eq!(handle_key_event(KeyEvent::from(KeyCode::Char('x'))), None);
    }

    #[test]
    fn test_quit_keys() {
        assert!(should_quit(KeyEvent::from(KeyCode::Char('q'))));
        assert!(should_quit(KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL
        )));
        assert!(!should_quit(KeyEvent::from(KeyCode::Char('c'))));
    }
}
