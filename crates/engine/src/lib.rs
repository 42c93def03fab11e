//! Move search on top of the core rules.
//!
//! Nothing here mutates a board except [`play_hint`], which goes through the
//! same `GameState::apply` path as player input.

pub mod moves;
pub mod play;

pub use balloon_match_core as core;
pub use balloon_match_types as types;

pub use moves::{hint, legal_swaps, rank_swaps, tap_targets, RankedSwap};
pub use play::{play_hint, PlayError};
