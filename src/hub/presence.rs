//! Registry of live connections.
//!
//! The registry is the sole owner of participant state; every other part of
//! the hub refers to connections by id only.

use std::collections::HashMap;

use time::OffsetDateTime;
use tokio::sync::RwLock;
use tokio::sync::mpsc::UnboundedSender;
use uuid::Uuid;

use super::event::ServerEvent;

/// Opaque per-connection identifier, assigned by the transport layer.
pub type ConnectionId = Uuid;

/// Delivery handle for one connection. Sends enqueue and never block; the
/// transport drains the other end into the socket.
pub type Outbox = UnboundedSender<ServerEvent>;

/// One live connection.
#[derive(Debug, Clone)]
pub struct Participant {
    pub username: String,
    pub connected_at: OffsetDateTime,
    /// Room the connection is currently joined to, if any. At most one.
    pub room: Option<String>,
    pub outbox: Outbox,
}

#[derive(Debug, Default)]
pub struct Presence {
    inner: RwLock<HashMap<ConnectionId, Participant>>,
}

impl Presence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a participant with no room. Re-registering an id overwrites
    /// the previous entry.
    pub async fn register(
        &self,
        id: ConnectionId,
        username: String,
        outbox: Outbox,
        now: OffsetDateTime,
    ) {
        self.inner.write().await.insert(
            id,
            Participant {
                username,
                connected_at: now,
                room: None,
                outbox,
            },
        );
    }

    /// Removes and returns the participant. `None` on a double disconnect.
    pub async fn unregister(&self, id: ConnectionId) -> Option<Participant> {
        self.inner.write().await.remove(&id)
    }

    /// Updates the stored room for a known connection.
    pub async fn set_room(&self, id: ConnectionId, room: Option<&str>) {
        match self.inner.write().await.get_mut(&id) {
            Some(participant) => participant.room = room.map(str::to_owned),
            None => tracing::debug!(%id, "set_room for unknown connection"),
        }
    }

    pub async fn room_of(&self, id: ConnectionId) -> Option<String> {
        self.inner.read().await.get(&id).and_then(|p| p.room.clone())
    }

    pub async fn outbox_of(&self, id: ConnectionId) -> Option<Outbox> {
        self.inner.read().await.get(&id).map(|p| p.outbox.clone())
    }

    /// Display names of everyone connected, in registry iteration order.
    pub async fn roster(&self) -> Vec<String> {
        self.inner
            .read()
            .await
            .values()
            .map(|p| p.username.clone())
            .collect()
    }

    /// Every connection carrying the given display name. Names are not
    /// unique; zero, one or many matches are all possible.
    pub async fn find_by_username(&self, name: &str) -> Vec<(ConnectionId, Outbox)> {
        self.inner
            .read()
            .await
            .iter()
            .filter(|(_, p)| p.username == name)
            .map(|(id, p)| (*id, p.outbox.clone()))
            .collect()
    }

    /// Unicast to one connection. A gone or already-closed connection is
    /// ignored, never an error.
    pub async fn send_to(&self, id: ConnectionId, event: ServerEvent) {
        if let Some(participant) = self.inner.read().await.get(&id) {
            let _ = participant.outbox.send(event);
        }
    }

    /// Fan out to every registered connection.
    pub async fn broadcast(&self, event: ServerEvent) {
        for participant in self.inner.read().await.values() {
            let _ = participant.outbox.send(event.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;
    use tokio::sync::mpsc;
    use tokio::sync::mpsc::UnboundedReceiver;

    fn now() -> OffsetDateTime {
        datetime!(2024-05-01 12:00:00 UTC)
    }

    async fn register(presence: &Presence, name: &str) -> (ConnectionId, UnboundedReceiver<ServerEvent>) {
        let id = Uuid::now_v7();
        let (tx, rx) = mpsc::unbounded_channel();
        presence.register(id, name.to_owned(), tx, now()).await;
        (id, rx)
    }

    #[tokio::test]
    async fn register_and_roster() {
        let presence = Presence::new();
        let (a, _rx_a) = register(&presence, "Alice").await;
        let (_b, _rx_b) = register(&presence, "Bob").await;

        let mut roster = presence.roster().await;
        roster.sort();
        assert_eq!(roster, ["Alice", "Bob"]);

        presence.unregister(a).await.unwrap();
        assert_eq!(presence.roster().await, ["Bob"]);
    }

    #[tokio::test]
    async fn unregister_is_idempotent() {
        let presence = Presence::new();
        let (id, _rx) = register(&presence, "Alice").await;

        assert!(presence.unregister(id).await.is_some());
        assert!(presence.unregister(id).await.is_none());
    }

    #[tokio::test]
    async fn reregister_overwrites() {
        let presence = Presence::new();
        let (id, _rx) = register(&presence, "Alice").await;

        let (tx, _rx2) = mpsc::unbounded_channel();
        presence.register(id, "Alice2".to_owned(), tx, now()).await;

        assert_eq!(presence.roster().await, ["Alice2"]);
    }

    #[tokio::test]
    async fn set_room_tracks_current_room() {
        let presence = Presence::new();
        let (id, _rx) = register(&presence, "Alice").await;

        assert_eq!(presence.room_of(id).await, None);
        presence.set_room(id, Some("General")).await;
        assert_eq!(presence.room_of(id).await.as_deref(), Some("General"));
        presence.set_room(id, None).await;
        assert_eq!(presence.room_of(id).await, None);

        // Unknown id is a logged no-op.
        presence.set_room(Uuid::now_v7(), Some("General")).await;
    }

    #[tokio::test]
    async fn find_by_username_returns_every_match() {
        let presence = Presence::new();
        let (_a, _rx_a) = register(&presence, "Guest1").await;
        let (_b, _rx_b) = register(&presence, "Guest1").await;
        let (_c, _rx_c) = register(&presence, "Guest2").await;

        assert_eq!(presence.find_by_username("Guest1").await.len(), 2);
        assert_eq!(presence.find_by_username("Guest2").await.len(), 1);
        assert!(presence.find_by_username("Guest3").await.is_empty());
    }

    #[tokio::test]
    async fn send_to_gone_connection_is_ignored() {
        let presence = Presence::new();
        let (id, rx) = register(&presence, "Alice").await;
        drop(rx);

        // Closed receiver, then unknown id: neither faults.
        presence
            .send_to(id, ServerEvent::ActiveUsers { users: vec![] })
            .await;
        presence.unregister(id).await;
        presence
            .send_to(id, ServerEvent::ActiveUsers { users: vec![] })
            .await;
    }
}
