//! One configured room: its broadcast group and bounded history.

use std::collections::HashMap;

use tokio::sync::Mutex;

use super::event::{Message, ServerEvent};
use super::history::RoomHistory;
use super::presence::{ConnectionId, Outbox};

/// Group state lives behind a single per-room lock, and every room-wide
/// send happens inside that lock. Delivery order for a room therefore
/// always matches its history order, and rooms never contend with each
/// other.
#[derive(Debug)]
pub struct Room {
    name: String,
    inner: Mutex<RoomInner>,
}

#[derive(Debug)]
struct RoomInner {
    members: HashMap<ConnectionId, Outbox>,
    history: RoomHistory,
}

impl Room {
    pub fn new(name: impl Into<String>, history_capacity: usize) -> Self {
        Self {
            name: name.into(),
            inner: Mutex::new(RoomInner {
                members: HashMap::new(),
                history: RoomHistory::new(history_capacity),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Adds the connection to the broadcast group, replays history to it
    /// alone, then announces the join to the whole room (joiner included).
    pub async fn join(&self, id: ConnectionId, outbox: Outbox, announcement: ServerEvent) {
        let mut inner = self.inner.lock().await;
        let _ = outbox.send(ServerEvent::History {
            messages: inner.history.snapshot(),
        });
        inner.members.insert(id, outbox);
        fan_out(&mut inner.members, &announcement);
    }

    /// Removes the connection (a non-member is fine) and announces the
    /// departure to the remaining members.
    pub async fn leave(&self, id: ConnectionId, announcement: ServerEvent) {
        let mut inner = self.inner.lock().await;
        inner.members.remove(&id);
        fan_out(&mut inner.members, &announcement);
    }

    /// Silent removal, used when a connection drops.
    pub async fn remove(&self, id: ConnectionId) {
        self.inner.lock().await.members.remove(&id);
    }

    /// Records the message in history and fans it out to the group in one
    /// critical section.
    pub async fn publish(&self, message: Message) {
        let mut inner = self.inner.lock().await;
        inner.history.push(message.clone());
        fan_out(&mut inner.members, &ServerEvent::Message(message));
    }

    pub async fn contains(&self, id: ConnectionId) -> bool {
        self.inner.lock().await.members.contains_key(&id)
    }

    pub async fn member_count(&self) -> usize {
        self.inner.lock().await.members.len()
    }

    pub async fn history_snapshot(&self) -> Vec<Message> {
        self.inner.lock().await.history.snapshot()
    }
}

/// Enqueues the event to every member, pruning connections whose delivery
/// channel has closed.
fn fan_out(members: &mut HashMap<ConnectionId, Outbox>, event: &ServerEvent) {
    members.retain(|_, outbox| outbox.send(event.clone()).is_ok());
}
