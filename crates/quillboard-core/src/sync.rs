//! Wire protocol for room collaboration.
//!
//! Every message is a `{type, payload}` envelope with a kebab-case type name
//! and camelCase payload fields. The socket itself lives outside this crate;
//! it only has to implement [`Transport`].

use crate::shapes::{Element, ElementId};
use kurbo::Vec2;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::VecDeque;
use thiserror::Error;

/// Messages sent to the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    /// An element as it is being drawn, moved or resized, or once committed
    DrawingElement { element: Element },
    /// Local pointer position in scene units
    MousePosition { x: f64, y: f64 },
    /// Join a room
    JoinRoom { room_id: String, name: String, color: String },
    /// Leave a room
    LeaveRoom { room_id: String },
    /// Elements removed locally
    EraseElements { ids: Vec<ElementId> },
}

/// Messages received from the server
///
/// Elements arrive as raw JSON so one malformed element never discards the
/// rest of a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    /// An element authored by another participant
    DrawElement { new_element: Value },
    /// Another participant's pointer moved
    ParticipantPosition {
        user_id: String,
        x: f64,
        y: f64,
        #[serde(default)]
        color: String,
        #[serde(default)]
        name: String,
    },
    /// A participant left the room
    RemoveParticipant { user_id: String },
    /// Full room snapshot, sent once after joining
    RoomJoined {
        #[serde(default)]
        elements: Vec<Value>,
        #[serde(default = "default_scale")]
        scale: f64,
        #[serde(default)]
        pan_offset: Vec2,
    },
    /// Elements removed by another participant
    EraseElements { ids: Vec<ElementId> },
}

fn default_scale() -> f64 {
    1.0
}

impl ServerMessage {
    const TYPES: [&'static str; 5] = [
        "draw-element",
        "participant-position",
        "remove-participant",
        "room-joined",
        "erase-elements",
    ];
}

/// Errors decoding inbound messages.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Malformed message: {0}")]
    Malformed(String),
    #[error("Unknown message type: {0}")]
    UnknownMessage(String),
}

/// Decode one inbound envelope.
pub fn decode_server_message(text: &str) -> Result<ServerMessage, SyncError> {
    let value: Value = serde_json::from_str(text).map_err(|e| SyncError::Malformed(e.to_string()))?;
    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| SyncError::Malformed("missing type".to_string()))?;
    if !ServerMessage::TYPES.contains(&kind) {
        return Err(SyncError::UnknownMessage(kind.to_string()));
    }
    serde_json::from_value(value).map_err(|e| SyncError::Malformed(e.to_string()))
}

/// Connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Error,
}

/// Errors sending outbound messages.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Not connected")]
    Disconnected,
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A reliable, ordered message channel to the room server.
///
/// Reconnecting is the implementor's concern; sends while disconnected must
/// fail with [`TransportError::Disconnected`] rather than queue.
pub trait Transport {
    fn state(&self) -> ConnectionState;

    fn send(&mut self, message: &ClientMessage) -> Result<(), TransportError>;

    fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }
}

/// Transport that keeps sent messages as JSON in memory.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    state: ConnectionState,
    sent: VecDeque<String>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// A transport that is already connected.
    pub fn connected() -> Self {
        Self {
            state: ConnectionState::Connected,
            sent: VecDeque::new(),
        }
    }

    pub fn set_state(&mut self, state: ConnectionState) {
        self.state = state;
    }

    /// Take sent messages (drains the queue).
    pub fn take_sent(&mut self) -> Vec<String> {
        self.sent.drain(..).collect()
    }

    /// Sent messages decoded back into values, without draining.
    pub fn sent_messages(&self) -> Vec<ClientMessage> {
        self.sent.iter().filter_map(|json| serde_json::from_str(json).ok()).collect()
    }
}

impl Transport for MemoryTransport {
    fn state(&self) -> ConnectionState {
        self.state
    }

    fn send(&mut self, message: &ClientMessage) -> Result<(), TransportError> {
        if self.state != ConnectionState::Connected {
            return Err(TransportError::Disconnected);
        }
        self.sent.push_back(serde_json::to_string(message)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_envelope_shape() {
        let msg = ClientMessage::JoinRoom {
            room_id: "abc".to_string(),
            name: "Ada".to_string(),
            color: "#ff0000".to_string(),
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "join-room");
        assert_eq!(json["payload"]["roomId"], "abc");
    }

    #[test]
    fn test_decode_draw_element() {
        let text = r##"{"type":"draw-element","payload":{"newElement":{"type":"rectangle","id":"r"}}}"##;
        let ServerMessage::DrawElement { new_element } = decode_server_message(text).unwrap() else {
            panic!("expected draw-element");
        };
        assert_eq!(new_element["id"], "r");
    }

    #[test]
    fn test_decode_room_joined_defaults() {
        let text = r#"{"type":"room-joined","payload":{"elements":[]}}"#;
        let ServerMessage::RoomJoined { scale, pan_offset, .. } = decode_server_message(text).unwrap() else {
            panic!("expected room-joined");
        };
        assert!((scale - 1.0).abs() < f64::EPSILON);
        assert_eq!(pan_offset, Vec2::ZERO);
    }

    #[test]
    fn test_decode_unknown_and_malformed() {
        assert!(matches!(
            decode_server_message(r#"{"type":"kick","payload":{}}"#),
            Err(SyncError::UnknownMessage(t)) if t == "kick"
        ));
        assert!(matches!(decode_server_message("not json"), Err(SyncError::Malformed(_))));
        assert!(matches!(
            decode_server_message(r#"{"type":"remove-participant","payload":{}}"#),
            Err(SyncError::Malformed(_))
        ));
    }

    #[test]
    fn test_memory_transport_refuses_when_disconnected() {
        let mut transport = MemoryTransport::new();
        let msg = ClientMessage::MousePosition { x: 1.0, y: 2.0 };
        assert!(matches!(transport.send(&msg), Err(TransportError::Disconnected)));

        transport.set_state(ConnectionState::Connected);
        transport.send(&msg).unwrap();
        assert_eq!(transport.sent_messages(), vec![msg]);
        assert_eq!(transport.take_sent().len(), 1);
        assert!(transport.take_sent().is_empty());
    }
}
