//! Terminal input module (engine-facing).
//!
//! This module is intentionally independent of any UI framework. It maps
//! `crossterm` key events into [`UiCommand`]s and resolves them, together with
//! a cursor and an optional grabbed balloon, into core
//! [`InputEvent`](crate::types::InputEvent)s.

pub mod handler;
pub mod map;

pub use balloon_match_types as types;

pub use handler::InputHandler;
pub use map::{handle_key_event, should_quit, UiCommand};
