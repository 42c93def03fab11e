//! Adapter runtime integration.
//!
//! Bridges the sync game loop with the async TCP server.

use std::sync::Arc;

use tokio::runtime::Runtime;
use tokio::sync::mpsc;

use crate::core::{ColorSource, GameState, SessionError, TurnEvent};
use crate::engine::{play_hint, PlayError};
use crate::protocol::{
    create_ack, create_error, AckMessage, ErrorCode, ErrorMessage, GameInfo, ObservationMessage,
};
use crate::server::{serve, AdapterStatus, ServerConfig, StatusSnapshot};
use crate::types::InputEvent;

/// Command delivered to the game loop.
#[derive(Debug, Clone)]
pub struct InboundCommand {
    pub client_id: usize,
    pub seq: u64,
    pub payload: InboundPayload,
}

#[derive(Debug, Clone)]
pub enum InboundPayload {
    /// Client asked for an immediate observation (after hello).
    SnapshotRequest,
    Command(ClientCommand),
}

/// Command payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCommand {
    Input(InputEvent),
    Restart,
    Hint,
}

/// Outbound message to be delivered by the server.
#[derive(Debug, Clone)]
pub enum OutboundMessage {
    ToClientObservation { client_id: usize, obs: ObservationMessage },
    BroadcastObservation { obs: ObservationMessage },
    ToClientAck { client_id: usize, ack: AckMessage },
    ToClientError { client_id: usize, err: ErrorMessage },
}

/// Result of a command the session accepted
#[derive(Debug, Clone)]
pub struct Applied {
    pub ack: AckMessage,
    /// The resolved turn, absent for restarts
    pub event: Option<TurnEvent>,
}

fn turn_ack(seq: u64, event: &TurnEvent) -> AckMessage {
    let mut ack = create_ack(seq);
    ack.score_delta = event.score_delta;
    ack.removed = event.removed.iter().map(|w| w.len() as u32).sum();
    ack.game_over = event.game_over;
    ack
}

fn session_error(seq: u64, err: SessionError) -> ErrorMessage {
    let code = match err {
        SessionError::Busy => ErrorCode::Busy,
        SessionError::GameOver => ErrorCode::GameOver,
        SessionError::Input(_) => ErrorCode::InvalidInput,
    };
    create_error(seq, code, &err.to_string())
}

/// Apply one client command to the session.
///
/// A resolved turn leaves the session busy; the caller commits once it has
/// shown the result, exactly as it does for keyboard turns.
pub fn apply_client_command<S: ColorSource>(
    state: &mut GameState<S>,
    seq: u64,
    command: &ClientCommand,
) -> Result<Applied, ErrorMessage> {
    let event = match *command {
        ClientCommand::Restart => {
            state.restart();
            return Ok(Applied {
                ack: create_ack(seq),
                event: None,
            });
        }
        ClientCommand::Input(input) => state.apply(input).map_err(|e| session_error(seq, e))?,
        ClientCommand::Hint => match play_hint(state) {
            Ok(event) => event,
            Err(PlayError::Session(e)) => return Err(session_error(seq, e)),
            Err(e @ PlayError::NoMove) => {
                return Err(create_error(seq, ErrorCode::InvalidMove, e.message()))
            }
        },
    };

    if let Some(reason) = event.rejected {
        return Err(create_error(
            seq,
            ErrorCode::InvalidMove,
            &format!("{}: {}", reason.code(), reason),
        ));
    }
    Ok(Applied {
        ack: turn_ack(seq, &event),
        event: Some(event),
    })
}

/// Running adapter instance.
pub struct Adapter {
    _rt: Runtime,
    cmd_rx: mpsc::Receiver<InboundCommand>,
    out_tx: mpsc::UnboundedSender<OutboundMessage>,
    status: Arc<AdapterStatus>,
}

impl Adapter {
    /// Start the adapter from environment variables.
    ///
    /// Returns `Ok(None)` if `BALLOON_AI_DISABLED` is set.
    pub fn start_from_env(game: GameInfo) -> anyhow::Result<Option<Self>> {
        if ServerConfig::is_disabled() {
            log::info!("adapter disabled by BALLOON_AI_DISABLED");
            return Ok(None);
        }
        Self::start(ServerConfig::from_env().with_game(game)).map(Some)
    }

    pub fn start(config: ServerConfig) -> anyhow::Result<Self> {
        let max_pending = config.max_pending_commands.max(1);
        let (cmd_tx, cmd_rx) = mpsc::channel::<InboundCommand>(max_pending);
        let (out_tx, out_rx) = mpsc::unbounded_channel::<OutboundMessage>();
        let status = Arc::new(AdapterStatus::default());

        let rt = Runtime::new()?;
        let server_status = Arc::clone(&status);
        rt.spawn(async move {
            if let Err(e) = serve(config, server_status, cmd_tx, out_rx, None).await {
                log::error!("adapter server stopped: {}", e);
            }
        });

        Ok(Self {
            _rt: rt,
            cmd_rx,
            out_tx,
            status,
        })
    }

    pub fn try_recv(&mut self) -> Option<InboundCommand> {
        self.cmd_rx.try_recv().ok()
    }

    pub fn send(&self, msg: OutboundMessage) {
        let _ = self.out_tx.send(msg);
    }

    pub fn status(&self) -> StatusSnapshot {
        self.status.snapshot()
    }
}
