//! Balloon Match (workspace facade crate).
//!
//! Re-exports the workspace crates as `balloon_match::{core,engine,input,term,adapter,store,types}`.

pub use balloon_match_adapter as adapter;
pub use balloon_match_core as core;
pub use balloon_match_engine as engine;
pub use balloon_match_input as input;
pub use balloon_match_store as store;
pub use balloon_match_term as term;
pub use balloon_match_types as types;
