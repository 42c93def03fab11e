//! Protocol module - JSON message types for the controller adapter
//!
//! Every message is one JSON object per line carrying `type`, `seq` (sender
//! sequence number) and `ts` (milliseconds since the epoch).

use serde::{Deserialize, Serialize};

use crate::types::{Direction, InputEvent, Position};

pub const PROTOCOL_VERSION: &str = "1.0.0";
pub const GAME_ID: &str = "balloon-match";

// ============== Client -> Game Messages ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum HelloType {
    #[serde(rename = "hello")]
    #[default]
    Hello,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CommandType {
    #[serde(rename = "command")]
    #[default]
    Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ControlType {
    #[serde(rename = "control")]
    #[default]
    Control,
}

/// Client hello message (first message on a connection)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloMessage {
    #[serde(rename = "type")]
    #[serde(default)]
    pub msg_type: HelloType,
    pub seq: u64,
    pub ts: u64,
    pub client: ClientInfo,
    pub protocol_version: String,
    pub requested: RequestedCapabilities,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestedCapabilities {
    pub stream_observations: bool,
    /// `observer` keeps a client out of the controller slot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<RequestedRole>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestedRole {
    Auto,
    Controller,
    Observer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssignedRole {
    #[serde(rename = "controller")]
    Controller,
    #[serde(rename = "observer")]
    Observer,
}

/// Command message (controller only). Exactly one of `swap`, `tap`, `action`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandMessage {
    #[serde(rename = "type")]
    #[serde(default)]
    pub msg_type: CommandType,
    pub seq: u64,
    pub ts: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swap: Option<SwapCommand>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tap: Option<TapCommand>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<ActionName>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapCommand {
    pub row: u8,
    pub col: u8,
    pub direction: DirectionName,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TapCommand {
    pub row: u8,
    pub col: u8,
}

/// Direction on the wire; accepted case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DirectionName(pub Direction);

impl<'de> Deserialize<'de> for DirectionName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Direction::from_str(&s)
            .map(DirectionName)
            .ok_or_else(|| serde::de::Error::custom("invalid direction"))
    }
}

impl Serialize for DirectionName {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.0.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionName {
    Restart,
    Hint,
}

impl<'de> Deserialize<'de> for ActionName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        if s.eq_ignore_ascii_case("restart") {
            Ok(Self::Restart)
        } else if s.eq_ignore_ascii_case("hint") {
            Ok(Self::Hint)
        } else {
            Err(serde::de::Error::custom("unknown action"))
        }
    }
}

impl Serialize for ActionName {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            ActionName::Restart => serializer.serialize_str("restart"),
            ActionName::Hint => serializer.serialize_str("hint"),
        }
    }
}

impl SwapCommand {
    pub fn input(&self) -> InputEvent {
        InputEvent::Swap {
            from: Position::new(self.row, self.col),
            direction: self.direction.0,
        }
    }
}

impl TapCommand {
    pub fn input(&self) -> InputEvent {
        InputEvent::Tap {
            at: Position::new(self.row, self.col),
        }
    }
}

/// Control message (claim/release controller status)
#[derive(Debug, Clone, Deserialize)]
pub struct ControlMessage {
    #[serde(rename = "type")]
    #[serde(default)]
    pub msg_type: ControlType,
    pub seq: u64,
    pub ts: u64,
    pub action: ControlAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlAction {
    Claim,
    Release,
}

// ============== Game -> Client Messages ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WelcomeType {
    #[serde(rename = "welcome")]
    Welcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AckType {
    #[serde(rename = "ack")]
    Ack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AckStatus {
    #[serde(rename = "ok")]
    Ok,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorType {
    #[serde(rename = "error")]
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    HandshakeRequired,
    ProtocolMismatch,
    NotController,
    ControllerActive,
    InvalidCommand,
    InvalidMove,
    InvalidInput,
    Busy,
    GameOver,
    Backpressure,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::HandshakeRequired => "handshake_required",
            ErrorCode::ProtocolMismatch => "protocol_mismatch",
            ErrorCode::NotController => "not_controller",
            ErrorCode::ControllerActive => "controller_active",
            ErrorCode::InvalidCommand => "invalid_command",
            ErrorCode::InvalidMove => "invalid_move",
            ErrorCode::InvalidInput => "invalid_input",
            ErrorCode::Busy => "busy",
            ErrorCode::GameOver => "game_over",
            ErrorCode::Backpressure => "backpressure",
        }
    }
}

/// Welcome message (response to hello)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WelcomeMessage {
    #[serde(rename = "type")]
    pub msg_type: WelcomeType,
    pub seq: u64,
    pub ts: u64,
    pub protocol_version: String,
    pub client_id: u64,
    pub role: AssignedRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controller_id: Option<u64>,
    pub game_id: String,
    pub mode: String,
    pub rows: u8,
    pub cols: u8,
}

/// Acknowledgment once a command has been applied
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckMessage {
    #[serde(rename = "type")]
    pub msg_type: AckType,
    pub seq: u64,
    pub ts: u64,
    pub status: AckStatus,
    #[serde(default)]
    pub score_delta: u32,
    #[serde(default)]
    pub removed: u32,
    #[serde(default)]
    pub game_over: bool,
}

/// Error message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorMessage {
    #[serde(rename = "type")]
    pub msg_type: ErrorType,
    pub seq: u64,
    pub ts: u64,
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObservationType {
    #[serde(rename = "observation")]
    Observation,
}

/// Session state observation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservationMessage {
    #[serde(rename = "type")]
    pub msg_type: ObservationType,
    pub seq: u64,
    pub ts: u64,
    pub playable: bool,
    pub busy: bool,
    pub game_over: bool,
    pub episode_id: u32,
    pub seed: u32,
    pub mode: String,
    pub turn: u32,
    pub score: u32,
    pub grid: GridSnapshot,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_turn: Option<LastTurn>,
    pub state_hash: StateHash,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridSnapshot {
    pub rows: u8,
    pub cols: u8,
    /// 0 = empty, 1-6 = balloon color code
    pub cells: Vec<Vec<u8>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LastTurn {
    /// `[[row, col], [row, col]]` for swaps
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swapped: Option<[[u8; 2]; 2]>,
    pub removed: Vec<[u8; 2]>,
    pub waves: u32,
    pub score_delta: u32,
}

/// Deterministic state hash serialized as lowercase hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateHash(pub u64);

impl Serialize for StateHash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        const HEX: &[u8; 16] = b"0123456789abcdef";
        let mut buf = [0u8; 16];
        let mut v = self.0;
        for i in 0..16 {
            buf[15 - i] = HEX[(v & 0x0f) as usize];
            v >>= 4;
        }
        // Every byte is ASCII hex.
        let s = std::str::from_utf8(&buf).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(s)
    }
}

impl<'de> Deserialize<'de> for StateHash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        u64::from_str_radix(s.trim(), 16)
            .map(StateHash)
            .map_err(|_| serde::de::Error::custom("invalid hex"))
    }
}

// ============== Message Parsing ==============

/// Parsed incoming message
#[derive(Debug, Clone)]
pub enum ParsedMessage {
    Hello(HelloMessage),
    Command(CommandMessage),
    Control(ControlMessage),
    Unknown(UnknownMessage),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownMessage {
    pub seq: u64,
}

/// Parse one inbound line.
///
/// An unrecognised `type` is not a parse error; it comes back as
/// [`ParsedMessage::Unknown`] so the server can answer with the right seq.
pub fn parse_message(json: &str) -> Result<ParsedMessage, serde_json::Error> {
    #[derive(Debug, Deserialize)]
    #[serde(tag = "type")]
    enum InboundMessage {
        #[serde(rename = "hello")]
        Hello(HelloMessage),
        #[serde(rename = "command")]
        Command(CommandMessage),
        #[serde(rename = "control")]
        Control(ControlMessage),
    }

    match serde_json::from_str::<InboundMessage>(json) {
        Ok(InboundMessage::Hello(m)) => Ok(ParsedMessage::Hello(m)),
        Ok(InboundMessage::Command(m)) => Ok(ParsedMessage::Command(m)),
        Ok(InboundMessage::Control(m)) => Ok(ParsedMessage::Control(m)),
        Err(e) => {
            #[derive(Debug, Deserialize)]
            struct Header {
                #[serde(rename = "type")]
                msg_type: Option<String>,
                seq: Option<u64>,
            }
            let header = serde_json::from_str::<Header>(json)?;
            match header.msg_type.as_deref() {
                Some("hello" | "command" | "control") => Err(e),
                _ => Ok(ParsedMessage::Unknown(UnknownMessage {
                    seq: header.seq.unwrap_or(0),
                })),
            }
        }
    }
}

// ============== Utility Functions ==============

/// Create a hello message
pub fn create_hello(seq: u64, client_name: &str, protocol_version: &str) -> HelloMessage {
    HelloMessage {
        msg_type: HelloType::Hello,
        seq,
        ts: current_timestamp_ms(),
        client: ClientInfo {
            name: client_name.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        protocol_version: protocol_version.to_string(),
        requested: RequestedCapabilities {
            stream_observations: true,
            role: Some(RequestedRole::Auto),
        },
    }
}

/// Board facts the welcome carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameInfo {
    pub mode: crate::types::GameMode,
    pub rows: u8,
    pub cols: u8,
}

/// Create a welcome message
pub fn create_welcome(
    seq: u64,
    protocol_version: &str,
    client_id: u64,
    role: AssignedRole,
    controller_id: Option<u64>,
    game: GameInfo,
) -> WelcomeMessage {
    WelcomeMessage {
        msg_type: WelcomeType::Welcome,
        seq,
        ts: current_timestamp_ms(),
        protocol_version: protocol_version.to_string(),
        client_id,
        role,
        controller_id,
        game_id: GAME_ID.to_string(),
        mode: game.mode.as_str().to_string(),
        rows: game.rows,
        cols: game.cols,
    }
}

/// Create a bare acknowledgment (control messages)
pub fn create_ack(seq: u64) -> AckMessage {
    AckMessage {
        msg_type: AckType::Ack,
        seq,
        ts: current_timestamp_ms(),
        status: AckStatus::Ok,
        score_delta: 0,
        removed: 0,
        game_over: false,
    }
}

/// Create an error message
pub fn create_error(seq: u64, code: ErrorCode, message: &str) -> ErrorMessage {
    ErrorMessage {
        msg_type: ErrorType::Error,
        seq,
        ts: current_timestamp_ms(),
        code,
        message: message.to_string(),
    }
}

/// Get current timestamp in milliseconds
pub(crate) fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
