//! TCP server for the controller adapter
//!
//! Handles incoming connections and manages client lifecycle. Commands from
//! every client funnel into one bounded channel read by the game loop, so
//! turns are applied strictly one at a time.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU16, AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot, RwLock};

use crate::core::GameSnapshot;
use crate::protocol::*;
use crate::runtime::{ClientCommand, InboundCommand, InboundPayload, OutboundMessage};
use crate::types::GameMode;

/// Stable 64-bit FNV-1a hasher for deterministic `state_hash`.
///
/// `DefaultHasher` output is not guaranteed stable across Rust versions.
#[derive(Debug, Clone)]
struct Fnv1aHasher {
    state: u64,
}

impl Fnv1aHasher {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;

    fn new() -> Self {
        Self {
            state: Self::OFFSET_BASIS,
        }
    }
}

impl std::hash::Hasher for Fnv1aHasher {
    fn finish(&self) -> u64 {
        self.state
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.state ^= b as u64;
            self.state = self.state.wrapping_mul(Self::PRIME);
        }
    }
}

fn extract_seq_best_effort(s: &str) -> Option<u64> {
    let start = s.find("\"seq\"")?;
    let after_key = &s[start + 5..];
    let colon = after_key.find(':')?;
    let rest = after_key[colon + 1..].trim_start();
    let end = rest.bytes().take_while(u8::is_ascii_digit).count();
    if end == 0 {
        return None;
    }
    rest[..end].parse::<u64>().ok()
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub protocol_version: String,
    pub max_pending_commands: usize,
    /// Reported to clients in `welcome`
    pub game: GameInfo,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7878,
            protocol_version: PROTOCOL_VERSION.to_string(),
            max_pending_commands: 10,
            game: GameInfo {
                mode: GameMode::Swap,
                rows: crate::types::DEFAULT_ROWS,
                cols: crate::types::DEFAULT_COLS,
            },
        }
    }
}

impl ServerConfig {
    /// Create from environment variables.
    ///
    /// - `BALLOON_AI_HOST` (default `127.0.0.1`)
    /// - `BALLOON_AI_PORT` (default 7878)
    /// - `BALLOON_AI_MAX_PENDING` (default 10)
    pub fn from_env() -> Self {
        use std::env;

        let defaults = Self::default();
        let host = env::var("BALLOON_AI_HOST")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.host);
        let port = env::var("BALLOON_AI_PORT")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.port);
        let max_pending_commands = env::var("BALLOON_AI_MAX_PENDING")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.max_pending_commands);

        Self {
            host,
            port,
            max_pending_commands,
            ..defaults
        }
    }

    pub fn with_game(mut self, game: GameInfo) -> Self {
        self.game = game;
        self
    }

    /// Check if the adapter is disabled via `BALLOON_AI_DISABLED`
    pub fn is_disabled() -> bool {
        std::env::var("BALLOON_AI_DISABLED")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }
}

/// Connection counters readable from the game loop without locking.
#[derive(Debug, Default)]
pub struct AdapterStatus {
    clients: AtomicU16,
    streaming: AtomicU16,
    /// Controller client id, 0 when none (ids start at 1)
    controller: AtomicUsize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusSnapshot {
    pub client_count: u16,
    pub streaming_count: u16,
    pub controller_id: Option<usize>,
}

impl AdapterStatus {
    pub fn snapshot(&self) -> StatusSnapshot {
        let controller = self.controller.load(Ordering::Relaxed);
        StatusSnapshot {
            client_count: self.clients.load(Ordering::Relaxed),
            streaming_count: self.streaming.load(Ordering::Relaxed),
            controller_id: (controller != 0).then_some(controller),
        }
    }
}

/// Shared server state
struct ServerState {
    config: ServerConfig,
    clients: RwLock<Vec<ClientHandle>>,
    controller: RwLock<Option<usize>>,
    status: Arc<AdapterStatus>,
}

impl ServerState {
    async fn publish_status(&self) {
        // Lock order everywhere: controller, then clients.
        let controller = *self.controller.read().await;
        let clients = self.clients.read().await;
        let streaming = clients.iter().filter(|c| c.stream_observations).count();
        self.status
            .clients
            .store(clients.len().min(u16::MAX as usize) as u16, Ordering::Relaxed);
        self.status
            .streaming
            .store(streaming.min(u16::MAX as usize) as u16, Ordering::Relaxed);
        self.status
            .controller
            .store(controller.unwrap_or(0), Ordering::Relaxed);
    }

    async fn is_handshaken(&self, client_id: usize) -> bool {
        let clients = self.clients.read().await;
        clients
            .iter()
            .find(|c| c.id == client_id)
            .map(|c| c.handshaken)
            .unwrap_or(false)
    }

    async fn is_controller(&self, client_id: usize) -> bool {
        *self.controller.read().await == Some(client_id)
    }

    /// Enforce strictly increasing seq per sender.
    async fn check_and_update_seq(&self, client_id: usize, seq: u64) -> bool {
        let mut clients = self.clients.write().await;
        let Some(client) = clients.iter_mut().find(|c| c.id == client_id) else {
            return true;
        };
        match client.last_seq {
            Some(prev) if seq <= prev => false,
            _ => {
                client.last_seq = Some(seq);
                true
            }
        }
    }
}

/// Handle to a connected client
struct ClientHandle {
    id: usize,
    addr: SocketAddr,
    stream_observations: bool,
    handshaken: bool,
    last_seq: Option<u64>,
    tx: mpsc::UnboundedSender<ClientOutbound>,
}

#[derive(Debug, Clone)]
enum ClientOutbound {
    Welcome(WelcomeMessage),
    Ack(AckMessage),
    Error(ErrorMessage),
    Observation(ObservationMessage),
}

/// Start the TCP server with private status counters
pub async fn run_server(
    config: ServerConfig,
    command_tx: mpsc::Sender<InboundCommand>,
    out_rx: mpsc::UnboundedReceiver<OutboundMessage>,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    serve(config, Arc::default(), command_tx, out_rx, ready_tx).await
}

/// Start the TCP server, publishing connection counts into `status`
pub async fn serve(
    config: ServerConfig,
    status: Arc<AdapterStatus>,
    command_tx: mpsc::Sender<InboundCommand>,
    mut out_rx: mpsc::UnboundedReceiver<OutboundMessage>,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;
    let bound = listener.local_addr()?;
    log::info!("adapter listening on {}", bound);
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    let state = Arc::new(ServerState {
        config,
        clients: RwLock::new(Vec::new()),
        controller: RwLock::new(None),
        status,
    });

    // Outbound dispatcher.
    {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            while let Some(msg) = out_rx.recv().await {
                let clients = state.clients.read().await;
                let to = |id: usize| clients.iter().find(|c| c.id == id);
                match msg {
                    OutboundMessage::ToClientObservation { client_id, obs } => {
                        if let Some(c) = to(client_id) {
                            let _ = c.tx.send(ClientOutbound::Observation(obs));
                        }
                    }
                    OutboundMessage::BroadcastObservation { obs } => {
                        for c in clients.iter().filter(|c| c.stream_observations) {
                            let _ = c.tx.send(ClientOutbound::Observation(obs.clone()));
                        }
                    }
                    OutboundMessage::ToClientAck { client_id, ack } => {
                        if let Some(c) = to(client_id) {
                            let _ = c.tx.send(ClientOutbound::Ack(ack));
                        }
                    }
                    OutboundMessage::ToClientError { client_id, err } => {
                        if let Some(c) = to(client_id) {
                            let _ = c.tx.send(ClientOutbound::Error(err));
                        }
                    }
                }
            }
        });
    }

    let mut client_id_counter = 0usize;
    loop {
        let (socket, addr) = listener.accept().await?;
        client_id_counter += 1;
        let client_id = client_id_counter;
        log::info!("client {} connected from {}", client_id, addr);

        let state = Arc::clone(&state);
        let command_tx = command_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_client(socket, addr, client_id, &state, command_tx).await {
                log::warn!("client {} error: {}", client_id, e);
            }
            log::info!("client {} disconnected", client_id);
        });
    }
}

fn send_error(tx: &mpsc::UnboundedSender<ClientOutbound>, seq: u64, code: ErrorCode, message: &str) {
    log::debug!("-> error {} (seq {}): {}", code.as_str(), seq, message);
    let _ = tx.send(ClientOutbound::Error(create_error(seq, code, message)));
}

async fn write_line<T: serde::Serialize>(
    writer: &mut (impl AsyncWriteExt + Unpin),
    buf: &mut Vec<u8>,
    msg: &T,
) -> std::io::Result<()> {
    buf.clear();
    serde_json::to_writer(&mut *buf, msg)?;
    buf.push(b'\n');
    writer.write_all(buf).await?;
    writer.flush().await
}

/// Handle a single client connection
async fn handle_client(
    socket: TcpStream,
    addr: SocketAddr,
    client_id: usize,
    state: &Arc<ServerState>,
    command_tx: mpsc::Sender<InboundCommand>,
) -> anyhow::Result<()> {
    let (reader, mut writer) = tokio::io::split(socket);
    let mut reader = BufReader::new(reader);
    let (tx, mut rx) = mpsc::unbounded_channel::<ClientOutbound>();

    state.clients.write().await.push(ClientHandle {
        id: client_id,
        addr,
        stream_observations: false,
        handshaken: false,
        last_seq: None,
        tx: tx.clone(),
    });
    state.publish_status().await;

    let write_task = tokio::spawn(async move {
        let mut buf: Vec<u8> = Vec::with_capacity(4096);
        while let Some(msg) = rx.recv().await {
            let res = match &msg {
                ClientOutbound::Welcome(m) => write_line(&mut writer, &mut buf, m).await,
                ClientOutbound::Ack(m) => write_line(&mut writer, &mut buf, m).await,
                ClientOutbound::Error(m) => write_line(&mut writer, &mut buf, m).await,
                ClientOutbound::Observation(m) => write_line(&mut writer, &mut buf, m).await,
            };
            if res.is_err() {
                break;
            }
        }
    });

    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            break;
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        log::trace!("<- client {}: {}", client_id, trimmed);

        match parse_message(trimmed) {
            Ok(ParsedMessage::Hello(hello)) => {
                if state.is_handshaken(client_id).await
                    && !state.check_and_update_seq(client_id, hello.seq).await
                {
                    send_error(&tx, hello.seq, ErrorCode::InvalidCommand, "seq must be strictly increasing");
                    continue;
                }

                let major = state.config.protocol_version.split('.').next().unwrap_or("1");
                if hello.protocol_version.split('.').next() != Some(major) {
                    send_error(
                        &tx,
                        hello.seq,
                        ErrorCode::ProtocolMismatch,
                        &format!("protocol version {} not supported", hello.protocol_version),
                    );
                    break;
                }

                let wants_control = hello.requested.role != Some(RequestedRole::Observer);
                let (role, controller_id) = {
                    let mut controller = state.controller.write().await;
                    let mut clients = state.clients.write().await;
                    if let Some(client) = clients.iter_mut().find(|c| c.id == client_id) {
                        client.handshaken = true;
                        client.last_seq = Some(hello.seq);
                        client.stream_observations = hello.requested.stream_observations;
                    }
                    if wants_control && controller.is_none() {
                        *controller = Some(client_id);
                        log::info!("client {} is now controller", client_id);
                    }
                    let role = if *controller == Some(client_id) {
                        AssignedRole::Controller
                    } else {
                        AssignedRole::Observer
                    };
                    (role, controller.map(|id| id as u64))
                };
                state.publish_status().await;

                let welcome = create_welcome(
                    hello.seq,
                    &state.config.protocol_version,
                    client_id as u64,
                    role,
                    controller_id,
                    state.config.game,
                );
                let _ = tx.send(ClientOutbound::Welcome(welcome));

                if hello.requested.stream_observations {
                    let _ = command_tx.try_send(InboundCommand {
                        client_id,
                        seq: hello.seq,
                        payload: InboundPayload::SnapshotRequest,
                    });
                }
            }

            Ok(ParsedMessage::Command(cmd)) => {
                if !state.is_handshaken(client_id).await {
                    send_error(&tx, cmd.seq, ErrorCode::HandshakeRequired, "send hello before command");
                    continue;
                }
                if !state.check_and_update_seq(client_id, cmd.seq).await {
                    send_error(&tx, cmd.seq, ErrorCode::InvalidCommand, "seq must be strictly increasing");
                    continue;
                }
                if !state.is_controller(client_id).await {
                    send_error(&tx, cmd.seq, ErrorCode::NotController, "only the controller may send commands");
                    continue;
                }

                let mapped = match map_command(&cmd) {
                    Ok(c) => c,
                    Err(message) => {
                        send_error(&tx, cmd.seq, ErrorCode::InvalidCommand, message);
                        continue;
                    }
                };

                // Bounded queue; the ack comes from the game loop once applied.
                let inbound = InboundCommand {
                    client_id,
                    seq: cmd.seq,
                    payload: InboundPayload::Command(mapped),
                };
                if command_tx.try_send(inbound).is_err() {
                    send_error(&tx, cmd.seq, ErrorCode::Backpressure, "command queue is full");
                }
            }

            Ok(ParsedMessage::Control(ctrl)) => {
                if !state.is_handshaken(client_id).await {
                    send_error(&tx, ctrl.seq, ErrorCode::HandshakeRequired, "send hello before control");
                    continue;
                }
                if !state.check_and_update_seq(client_id, ctrl.seq).await {
                    send_error(&tx, ctrl.seq, ErrorCode::InvalidCommand, "seq must be strictly increasing");
                    continue;
                }

                let granted = {
                    let mut controller = state.controller.write().await;
                    match ctrl.action {
                        ControlAction::Claim if controller.is_none() => {
                            *controller = Some(client_id);
                            Ok(())
                        }
                        ControlAction::Claim => Err((ErrorCode::ControllerActive, "controller already assigned")),
                        ControlAction::Release if *controller == Some(client_id) => {
                            *controller = None;
                            Ok(())
                        }
                        ControlAction::Release => Err((ErrorCode::NotController, "only the controller may release")),
                    }
                };
                match granted {
                    Ok(()) => {
                        state.publish_status().await;
                        let _ = tx.send(ClientOutbound::Ack(create_ack(ctrl.seq)));
                    }
                    Err((code, message)) => send_error(&tx, ctrl.seq, code, message),
                }
            }

            Ok(ParsedMessage::Unknown(unknown)) => {
                if state.is_handshaken(client_id).await
                    && !state.check_and_update_seq(client_id, unknown.seq).await
                {
                    send_error(&tx, unknown.seq, ErrorCode::InvalidCommand, "seq must be strictly increasing");
                    continue;
                }
                send_error(&tx, unknown.seq, ErrorCode::InvalidCommand, "unknown message type");
            }

            Err(e) => {
                let seq = extract_seq_best_effort(trimmed).unwrap_or(0);
                send_error(&tx, seq, ErrorCode::InvalidCommand, &format!("JSON parse error: {}", e));
            }
        }
    }

    // Remove the client and promote the lowest remaining id if it held control.
    {
        let mut controller = state.controller.write().await;
        let mut clients = state.clients.write().await;
        clients.retain(|c| c.id != client_id);

        if *controller == Some(client_id) {
            let next = clients.iter().filter(|c| c.handshaken).min_by_key(|c| c.id);
            *controller = next.map(|c| c.id);
            match next {
                Some(c) => log::info!("client {} ({}) promoted to controller", c.id, c.addr),
                None => log::info!("controller {} released", client_id),
            }
        }
    }
    state.publish_status().await;

    drop(tx);
    let _ = write_task.await;
    Ok(())
}

/// Map a protocol command into a game-loop command.
fn map_command(cmd: &CommandMessage) -> Result<ClientCommand, &'static str> {
    match (&cmd.swap, &cmd.tap, cmd.action) {
        (Some(swap), None, None) => Ok(ClientCommand::Input(swap.input())),
        (None, Some(tap), None) => Ok(ClientCommand::Input(tap.input())),
        (None, None, Some(ActionName::Restart)) => Ok(ClientCommand::Restart),
        (None, None, Some(ActionName::Hint)) => Ok(ClientCommand::Hint),
        (None, None, None) => Err("missing swap, tap, or action"),
        _ => Err("exactly one of swap, tap, or action is allowed"),
    }
}

/// Build an observation message from a session snapshot
pub fn build_observation(snap: &GameSnapshot, seq: u64) -> ObservationMessage {
    use std::hash::{Hash, Hasher};

    let cells = snap.code_rows();

    let mut hasher = Fnv1aHasher::new();
    snap.rows.hash(&mut hasher);
    snap.cols.hash(&mut hasher);
    cells.hash(&mut hasher);
    snap.mode.as_str().hash(&mut hasher);
    snap.episode_id.hash(&mut hasher);
    snap.seed.hash(&mut hasher);
    snap.turn.hash(&mut hasher);
    snap.score.hash(&mut hasher);
    snap.busy.hash(&mut hasher);
    snap.game_over.hash(&mut hasher);
    let state_hash = StateHash(hasher.finish());

    let last_turn = snap.last_turn.as_ref().map(|t| LastTurn {
        swapped: t
            .swapped
            .map(|(a, b)| [[a.row, a.col], [b.row, b.col]]),
        removed: t.removed.iter().map(|p| [p.row, p.col]).collect(),
        waves: t.waves,
        score_delta: t.score_delta,
    });

    ObservationMessage {
        msg_type: ObservationType::Observation,
        seq,
        ts: current_timestamp_ms(),
        playable: snap.playable(),
        busy: snap.busy,
        game_over: snap.game_over,
        episode_id: snap.episode_id,
        seed: snap.seed,
        mode: snap.mode.as_str().to_string(),
        turn: snap.turn,
        score: snap.score,
        grid: GridSnapshot {
            rows: snap.rows,
            cols: snap.cols,
            cells,
        },
        last_turn,
        state_hash,
    }
}
