//! Terminal "game renderer" module.
//!
//! This is a small, game-oriented rendering layer for terminal gameplay.
//! It intentionally avoids widget/layout libraries and instead renders into a
//! simple framebuffer that is diffed and flushed to a terminal backend.
//!
//! Goals:
//! - Keep `core` deterministic and testable
//! - Keep the view pure: a `GameSnapshot` plus an [`Overlay`] in, glyphs out
//! - Allow precise control over aspect ratio (2 columns per balloon)

pub mod fb;
pub mod game_view;
pub mod renderer;

pub use balloon_match_core as core;
pub use balloon_match_types as types;

pub use fb::{CellStyle, FrameBuffer, Glyph, Rgb};
pub use game_view::{preview_swap, AdapterStatusView, AnchorY, GameView, Overlay, Viewport};
pub use renderer::{encode_diff_into, encode_full_into, TerminalRenderer};
