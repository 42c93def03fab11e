//! Adapter - external control of a balloon session over TCP
//!
//! External agents connect to a TCP socket and exchange line-delimited JSON.
//!
//! 1. **Handshake**: client sends `hello`, server answers `welcome`
//! 2. **Controller**: first client that does not ask to observe becomes controller
//! 3. **Observations**: streaming clients get a full board snapshot after every turn
//! 4. **Commands**: the controller sends one `swap`, `tap`, or `action` per command
//!
//! Every message carries a `seq` that must strictly increase per client.
//! Commands are acked by the game loop once applied; failures come back as
//! `error` messages with a stable `code`.
//!
//! # Environment Variables
//!
//! - `BALLOON_AI_HOST`: bind address (default `127.0.0.1`)
//! - `BALLOON_AI_PORT`: port (default 7878)
//! - `BALLOON_AI_MAX_PENDING`: queued commands before `backpressure` (default 10)
//! - `BALLOON_AI_DISABLED`: `1` or `true` disables the adapter
//!
//! # Example Protocol Flow
//!
//! ```text
//! -> {"type":"hello","seq":1,"ts":0,"client":{"name":"bot","version":"0.1"},"protocol_version":"1.0.0","requested":{"stream_observations":true}}
//! <- {"type":"welcome","seq":1,"ts":...,"protocol_version":"1.0.0","client_id":1,"role":"controller","controller_id":1,"game_id":"balloon-match","mode":"swap","rows":8,"cols":8}
//! <- {"type":"observation","seq":1,...,"grid":{"rows":8,"cols":8,"cells":[[1,3,...],...]},"state_hash":"..."}
//! -> {"type":"command","seq":2,"ts":0,"swap":{"row":3,"col":4,"direction":"up"}}
//! <- {"type":"ack","seq":2,"ts":...,"status":"ok","score_delta":30,"removed":3,"game_over":false}
//! ```

pub mod protocol;
pub mod runtime;
pub mod server;

pub use balloon_match_core as core;
pub use balloon_match_engine as engine;
pub use balloon_match_types as types;

pub use protocol::*;
pub use runtime::{
    apply_client_command, Adapter, Applied, ClientCommand, InboundCommand, InboundPayload,
    OutboundMessage,
};
pub use server::{
    build_observation, run_server, serve, AdapterStatus, ServerConfig, StatusSnapshot,
};
