//! Bounded per-room message history.

use std::collections::VecDeque;

use super::event::Message;

/// Ring of a room's most recent messages. Oldest entries are evicted first;
/// the buffer never grows past its capacity.
#[derive(Debug)]
pub struct RoomHistory {
    cap: usize,
    entries: VecDeque<Message>,
}

impl RoomHistory {
    pub fn new(cap: usize) -> Self {
        Self {
            cap,
            entries: VecDeque::with_capacity(cap),
        }
    }

    /// Appends a message, evicting the oldest one once the buffer is full.
    pub fn push(&mut self, message: Message) {
        if self.cap == 0 {
            return;
        }
        if self.entries.len() == self.cap {
            self.entries.pop_front();
        }
        self.entries.push_back(message);
    }

    /// Chronological copy of the buffer, oldest first.
    pub fn snapshot(&self) -> Vec<Message> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn message(text: &str) -> Message {
        Message {
            msg: text.to_owned(),
            username: "Guest1000001000".to_owned(),
            room: "General".to_owned(),
            timestamp: datetime!(2024-05-01 12:00:00 UTC),
        }
    }

    fn texts(history: &RoomHistory) -> Vec<String> {
        history.snapshot().into_iter().map(|m| m.msg).collect()
    }

    #[test]
    fn empty_snapshot() {
        let history = RoomHistory::new(5);
        assert!(history.is_empty());
        assert_eq!(history.snapshot(), Vec::new());
    }

    #[test]
    fn evicts_oldest_at_capacity() {
        let mut history = RoomHistory::new(5);
        for i in 1..=5 {
            history.push(message(&format!("m{i}")));
        }
        assert_eq!(history.len(), 5);

        history.push(message("m6"));

        assert_eq!(history.len(), 5);
        assert_eq!(texts(&history), ["m2", "m3", "m4", "m5", "m6"]);
    }

    #[test]
    fn never_exceeds_capacity() {
        let mut history = RoomHistory::new(5);
        for i in 0..100 {
            history.push(message(&format!("m{i}")));
            assert!(history.len() <= 5);
        }
        assert_eq!(texts(&history), ["m95", "m96", "m97", "m98", "m99"]);
    }
}
