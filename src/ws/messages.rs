//! WebSocket message types: envelope, commands, and topics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Top-level WebSocket message envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WsMessage {
    /// Client-provided ID for requests; server-generated for pushes.
    pub id: String,
    /// Message type discriminator.
    #[serde(rename = "type")]
    pub msg_type: WsMessageType,
    /// ISO-8601 timestamp.
    pub timestamp: DateTime<Utc>,
    /// Variant-specific payload.
    pub payload: serde_json::Value,
}

impl WsMessage {
    /// Server push carrying `payload`.
    #[must_use]
    pub fn event(payload: serde_json::Value) -> Self {
        Self::with(uuid::Uuid::new_v4().to_string(), WsMessageType::Event, payload)
    }

    /// Reply to the command with id `id`.
    #[must_use]
    pub fn response(id: String, payload: serde_json::Value) -> Self {
        Self::with(id, WsMessageType::Response, payload)
    }

    /// Error reply with an HTTP-like code.
    #[must_use]
    pub fn error(id: String, code: u16, message: &str) -> Self {
        Self::with(
            id,
            WsMessageType::Error,
            serde_json::json!({ "code": code, "message": message }),
        )
    }

    fn with(id: String, msg_type: WsMessageType, payload: serde_json::Value) -> Self {
        Self {
            id,
            msg_type,
            timestamp: Utc::now(),
            payload,
        }
    }

    /// Encodes the message as a JSON text frame body.
    #[must_use]
    pub fn to_json(&self) -> Option<String> {
        serde_json::to_string(self).ok()
    }
}

/// Discriminator for WebSocket message types.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WsMessageType {
    /// Client → Server command.
    Command,
    /// Server → Client response to a command.
    Response,
    /// Server → Client push.
    Event,
    /// Server → Client error.
    Error,
}

/// Streams a connection can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    /// The caller's merged transaction feed, pushed as whole snapshots.
    Feed,
    /// Raw domain events the caller may see.
    Events,
}

/// Commands that a client can send over WebSocket, carried in the
/// payload of a `command` envelope.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum WsCommand {
    /// Start receiving the given topics.
    Subscribe {
        /// Topics to add.
        topics: Vec<Topic>,
    },
    /// Stop receiving the given topics.
    Unsubscribe {
        /// Topics to drop.
        topics: Vec<Topic>,
    },
    /// Liveness check; answered with `pong`.
    Ping,
}
