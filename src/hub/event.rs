//! Wire-level event contract for the chat hub.
//!
//! Everything crossing the socket is a JSON text frame tagged on `event`.
//! Field names are part of the client contract and must not change.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// One broadcast chat entry, as kept in room history and sent on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub msg: String,
    pub username: String,
    pub room: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    Join,
    Leave,
}

/// Events delivered to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Full roster, pushed to everyone on each connect/disconnect.
    ActiveUsers { users: Vec<String> },
    /// Recent room history, replayed to a joining connection only.
    History { messages: Vec<Message> },
    /// Join/leave announcement, broadcast to one room.
    Status {
        msg: String,
        #[serde(rename = "type")]
        kind: StatusKind,
        #[serde(with = "time::serde::rfc3339")]
        timestamp: OffsetDateTime,
    },
    /// Room chat message, broadcast to the room's current members.
    Message(Message),
    /// Direct message, unicast to each connection with the target name.
    PrivateMessage {
        msg: String,
        from: String,
        to: String,
        #[serde(with = "time::serde::rfc3339")]
        timestamp: OffsetDateTime,
    },
    /// Addressing/validation failure, unicast to the offending connection.
    Error { message: String },
}

/// Events accepted from clients.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ClientEvent {
    Join { room: String },
    Leave { room: String },
    Message(MessagePayload),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    #[default]
    Message,
    Private,
}

/// Body of an inbound `message` event. Everything is optional on the wire;
/// the router decides what a given kind actually requires.
#[derive(Debug, Clone, Deserialize)]
pub struct MessagePayload {
    #[serde(default)]
    pub room: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: MessageKind,
    #[serde(default)]
    pub msg: String,
    #[serde(default)]
    pub target: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn room_message_wire_shape() {
        let event = ServerEvent::Message(Message {
            msg: "hi".to_owned(),
            username: "Guest1234567890".to_owned(),
            room: "General".to_owned(),
            timestamp: datetime!(2024-05-01 12:00:00 UTC),
        });

        let json: serde_json::Value = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "message");
        assert_eq!(json["msg"], "hi");
        assert_eq!(json["username"], "Guest1234567890");
        assert_eq!(json["room"], "General");
        assert_eq!(json["timestamp"], "2024-05-01T12:00:00Z");
    }

    #[test]
    fn status_uses_type_field() {
        let event = ServerEvent::Status {
            msg: "Guest has entered the room.".to_owned(),
            kind: StatusKind::Join,
            timestamp: datetime!(2024-05-01 12:00:00 UTC),
        };

        let json: serde_json::Value = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "status");
        assert_eq!(json["type"], "join");
    }

    #[test]
    fn inbound_message_defaults() {
        let event: ClientEvent =
            serde_json::from_str(r#"{"event":"message","msg":"hey","room":"General"}"#).unwrap();

        let ClientEvent::Message(payload) = event else {
            panic!("expected message event");
        };
        assert_eq!(payload.kind, MessageKind::Message);
        assert_eq!(payload.msg, "hey");
        assert_eq!(payload.room.as_deref(), Some("General"));
        assert_eq!(payload.target, None);
    }

    #[test]
    fn inbound_private_message() {
        let event: ClientEvent = serde_json::from_str(
            r#"{"event":"message","type":"private","msg":"psst","target":"Guest42"}"#,
        )
        .unwrap();

        let ClientEvent::Message(payload) = event else {
            panic!("expected message event");
        };
        assert_eq!(payload.kind, MessageKind::Private);
        assert_eq!(payload.target.as_deref(), Some("Guest42"));
    }
}
