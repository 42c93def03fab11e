//! Cursor and grab state for keyboard play.
//!
//! A terminal has no drag gesture, so a swipe is either a grab (Select)
//! followed by a direction, or a single Shift+direction press.

use crate::map::UiCommand;
use crate::types::{Direction, GameMode, InputEvent, Position};

/// Resolves [`UiCommand`]s into board input.
#[derive(Debug, Clone)]
pub struct InputHandler {
    mode: GameMode,
    rows: u8,
    cols: u8,
    cursor: Position,
    grabbed: Option<Position>,
}

impl InputHandler {
    pub fn new(mode: GameMode, rows: u8, cols: u8) -> Self {
        Self {
            mode,
            rows: rows.max(1),
            cols: cols.max(1),
            cursor: Position::new(0, 0),
            grabbed: None,
        }
    }

    pub fn cursor(&self) -> Position {
        self.cursor
    }

    pub fn grabbed(&self) -> Option<Position> {
        self.grabbed
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    /// Place the cursor, clamped to the grid. Drops any grab.
    pub fn set_cursor(&mut self, pos: Position) {
        self.cursor = Position::new(pos.row.min(self.rows - 1), pos.col.min(self.cols - 1));
        self.grabbed = None;
    }

    /// Feed one command; returns the board input it completes, if any.
    ///
    /// `Restart` and `Hint` are frontend concerns and yield nothing here.
    pub fn handle(&mut self, cmd: UiCommand) -> Option<InputEvent> {
        match (self.mode, cmd) {
            (GameMode::Swap, UiCommand::Cursor(dir)) => match self.grabbed.take() {
                Some(from) => Some(self.swipe(from, dir)),
                None => {
                    self.step_cursor(dir);
                    None
                }
            },
            (GameMode::Swap, UiCommand::Swipe(dir)) => {
                self.grabbed = None;
                Some(self.swipe(self.cursor, dir))
            }
            (GameMode::Swap, UiCommand::Select) => {
                self.grabbed = match self.grabbed {
                    Some(_) => None,
                    None => Some(self.cursor),
                };
                None
            }
            (GameMode::Tap, UiCommand::Cursor(dir) | UiCommand::Swipe(dir)) => {
                self.step_cursor(dir);
                None
            }
            (GameMode::Tap, UiCommand::Select) => Some(InputEvent::Tap { at: self.cursor }),
            (_, UiCommand::Hint | UiCommand::Restart) => None,
        }
    }

    /// The cursor stays on the swiped balloon until the turn resolves.
    fn swipe(&mut self, from: Position, direction: Direction) -> InputEvent {
        self.cursor = from;
        InputEvent::Swap { from, direction }
    }

    /// Move the cursor along with a swap the session resolved.
    ///
    /// Call only for resolved turns; a reverted or refused swipe leaves the
    /// cursor on the balloon that never moved.
    pub fn follow(&mut self, input: InputEvent) {
        if let InputEvent::Swap { from, direction } = input {
            self.cursor = from;
            self.step_cursor(direction);
        }
    }

    fn step_cursor(&mut self, dir: Direction) {
        if let Some(next) = self.cursor.step(dir) {
            if next.row < self.rows && next.col < self.cols {
                self.cursor = next;
            }
        }
    }

    pub fn reset(&mut self) {
        self.cursor = Position::new(0, 0);
        self.grabbed = None;
    }
}
