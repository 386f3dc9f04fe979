//! WebSocket message types: envelope and commands.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Top-level WebSocket message envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WsMessage {
    /// Client-provided ID for requests; server-generated for events.
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
    /// Builds a server message stamped with the current time.
    #[must_use]
    pub fn new(id: String, msg_type: WsMessageType, payload: serde_json::Value) -> Self {
        Self {
            id,
            msg_type,
            timestamp: Utc::now(),
            payload,
        }
    }

    /// Builds an error reply.
    #[must_use]
    pub fn error(id: String, code: u32, message: impl Into<String>) -> Self {
        Self::new(
            id,
            WsMessageType::Error,
            serde_json::json!({ "code": code, "message": message.into() }),
        )
    }

    /// Serializes the message, or `None` if it cannot be encoded.
    #[must_use]
    pub fn to_json(&self) -> Option<String> {
        serde_json::to_string(self).ok()
    }
}

/// Discriminator for WebSocket message types.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WsMessageType {
    /// Client → Server command.
    Command,
    /// Server → Client response to a command.
    Response,
    /// Server → Client broadcast event.
    Event,
    /// Server → Client error.
    Error,
}

/// Commands that a client can send over WebSocket, carried in the
/// envelope's `payload`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum WsCommand {
    /// Subscribe to event topics. `"*"` subscribes to every topic.
    Subscribe {
        /// Topic names (`pair`, `liquidity`, `swap`, `asset`, `admin`, `*`).
        topics: Vec<String>,
    },
    /// Unsubscribe from event topics.
    Unsubscribe {
        /// Topic names to drop.
        topics: Vec<String>,
    },
    /// Current pool of the configured assets.
    GetPair,
    /// Read-only swap quote.
    Quote {
        /// Input amount (string-encoded u128).
        amount_in: String,
        /// Asset addresses to route through.
        path: Vec<String>,
    },
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn commands_are_tagged() {
        let Ok(cmd) = serde_json::from_str::<WsCommand>(
            r#"{"command":"subscribe","topics":["swap","*"]}"#,
        ) else {
            panic!("command must parse");
        };
        let WsCommand::Subscribe { topics } = cmd else {
            panic!("expected subscribe");
        };
        assert_eq!(topics, vec!["swap".to_string(), "*".to_string()]);
        assert!(matches!(
            serde_json::from_str::<WsCommand>(r#"{"command":"get_pair"}"#),
            Ok(WsCommand::GetPair)
        ));
    }

    #[test]
    fn error_reply_shape() {
        let msg = WsMessage::error("7".to_string(), 400, "malformed JSON");
        assert_eq!(msg.msg_type, WsMessageType::Error);
        assert_eq!(
            msg.payload.get("code").and_then(serde_json::Value::as_u64),
            Some(400)
        );
    }
}
