//! The chat hub: live-connection registry, a fixed set of named rooms with
//! bounded history, and best-effort message fan-out.

mod error;
mod event;
mod history;
mod msg;
mod presence;
mod room;
mod ws;

pub use error::HubError;
pub use event::{ClientEvent, Message, MessageKind, MessagePayload, ServerEvent, StatusKind};
pub use history::RoomHistory;
pub use presence::{ConnectionId, Outbox, Participant, Presence};
pub use room::Room;

use std::collections::HashMap;

use axum::{Router, routing::get};
use time::OffsetDateTime;
use tokio::sync::mpsc;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/ws", get(ws::chat_ws))
}

/// Presence plus the configured rooms. One instance is shared across every
/// connection task; all methods are safe to call concurrently, and a
/// connection that has already gone away is treated as absent everywhere.
#[derive(Debug)]
pub struct Hub {
    presence: Presence,
    rooms: HashMap<String, Room>,
}

impl Hub {
    /// Builds the hub over a fixed, ordered room list. Rooms are never
    /// created or destroyed at runtime.
    pub fn new(room_names: &[String], history_capacity: usize) -> Self {
        let rooms = room_names
            .iter()
            .map(|name| (name.clone(), Room::new(name.clone(), history_capacity)))
            .collect();
        Self {
            presence: Presence::new(),
            rooms,
        }
    }

    pub fn presence(&self) -> &Presence {
        &self.presence
    }

    pub fn room(&self, name: &str) -> Option<&Room> {
        self.rooms.get(name)
    }

    /// Registers a new connection and pushes the refreshed roster to
    /// everyone, the new connection included. Returns the delivery channel
    /// the transport drains into the socket.
    pub async fn connect(
        &self,
        id: ConnectionId,
        username: &str,
        now: OffsetDateTime,
    ) -> UnboundedReceiver<ServerEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.presence.register(id, username.to_owned(), tx, now).await;
        self.broadcast_roster().await;
        tracing::info!(%id, username, "user connected");
        rx
    }

    /// Deregisters a connection. Membership in its current room is dropped
    /// silently; other members only observe the roster update.
    pub async fn disconnect(&self, id: ConnectionId) {
        let Some(participant) = self.presence.unregister(id).await else {
            return;
        };
        if let Some(room) = participant.room.as_deref().and_then(|r| self.rooms.get(r)) {
            room.remove(id).await;
        }
        self.broadcast_roster().await;
        tracing::info!(%id, username = %participant.username, "user disconnected");
    }

    /// Moves the connection into `room`: replays that room's history to the
    /// joiner alone, then announces the join to the whole room. A
    /// connection already in another room leaves it first, with the normal
    /// leave announcement.
    pub async fn join(
        &self,
        id: ConnectionId,
        username: &str,
        room: &str,
        now: OffsetDateTime,
    ) -> Result<(), HubError> {
        let Some(target) = self.rooms.get(room) else {
            return Err(HubError::InvalidRoom(room.to_owned()));
        };

        if let Some(previous) = self.presence.room_of(id).await {
            if previous != room {
                self.leave(id, username, &previous, now).await;
            }
        }

        let Some(outbox) = self.presence.outbox_of(id).await else {
            tracing::debug!(%id, room, "join from unknown connection");
            return Ok(());
        };

        target
            .join(
                id,
                outbox,
                ServerEvent::Status {
                    msg: format!("{username} has entered the room."),
                    kind: StatusKind::Join,
                    timestamp: now,
                },
            )
            .await;
        self.presence.set_room(id, Some(room)).await;

        tracing::info!(username, room, "user joined room");
        Ok(())
    }

    /// Drops the connection from `room` (a non-member is fine) and
    /// announces the departure to the remaining members.
    pub async fn leave(&self, id: ConnectionId, username: &str, room: &str, now: OffsetDateTime) {
        let Some(target) = self.rooms.get(room) else {
            tracing::debug!(room, "leave for unconfigured room");
            return;
        };

        target
            .leave(
                id,
                ServerEvent::Status {
                    msg: format!("{username} has left the room."),
                    kind: StatusKind::Leave,
                    timestamp: now,
                },
            )
            .await;

        // Only clear the registry entry when it names the room actually
        // being left; a stale leave must not orphan a live membership.
        if self.presence.room_of(id).await.as_deref() == Some(room) {
            self.presence.set_room(id, None).await;
        }

        tracing::info!(username, room, "user left room");
    }

    /// Routes one inbound `message` event. See [`msg::dispatch`].
    pub async fn handle_message(
        &self,
        username: &str,
        payload: MessagePayload,
        now: OffsetDateTime,
    ) -> Result<(), HubError> {
        msg::dispatch(self, username, payload, now).await
    }

    async fn broadcast_roster(&self) {
        let users = self.presence.roster().await;
        self.presence.broadcast(ServerEvent::ActiveUsers { users }).await;
    }
}
