//! Append-only clinical event log.
//!
//! Events are stored most-recent-first for display; `chronological`
//! reverses the order for export. The only removal operation is a full
//! clear, which happens on session reset.

use crate::EventKind;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single timestamped clinical event. Immutable once created.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Event {
    pub id: Uuid,
    /// Session `totalTime` (seconds) at the moment of creation.
    pub timestamp: f64,
    pub message: String,
    pub kind: EventKind,
}

impl Event {
    pub fn new(message: impl Into<String>, kind: EventKind, timestamp: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp,
            message: message.into(),
            kind,
        }
    }
}

/// Reverse-chronological list of events for one episode.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct EventLog {
    entries: Vec<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepend an event; the newest entry is always first.
    pub fn append(&mut self, event: Event) {
        self.entries.insert(0, event);
    }

    /// Newest-first iteration, as displayed.
    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.entries.iter()
    }

    /// Oldest-first iteration, for summaries and export.
    pub fn chronological(&self) -> impl Iterator<Item = &Event> {
        self.entries.iter().rev()
    }

    pub fn latest(&self) -> Option<&Event> {
        self.entries.first()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove every entry. Used by reset only.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_keeps_newest_first() {
        let mut log = EventLog::new();
        log.append(Event::new("first", EventKind::Status, 0.0));
        log.append(Event::new("second", EventKind::Shock, 10.0));

        assert_eq!(log.latest().unwrap().message, "second");
        let messages: Vec<_> = log.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["second", "first"]);
    }

    #[test]
    fn test_chronological_reverses_display_order() {
        let mut log = EventLog::new();
        log.append(Event::new("a", EventKind::Status, 0.0));
        log.append(Event::new("b", EventKind::Cpr, 121.0));
        log.append(Event::new("c", EventKind::Drug, 200.0));

        let timestamps: Vec<_> = log.chronological().map(|e| e.timestamp).collect();
        assert_eq!(timestamps, vec![0.0, 121.0, 200.0]);
    }

    #[test]
    fn test_clear_empties_log() {
        let mut log = EventLog::new();
        log.append(Event::new("x", EventKind::Status, 0.0));
        log.clear();
        assert!(log.is_empty());
        assert!(log.latest().is_none());
    }

    #[test]
    fn test_log_roundtrips_through_json() {
        let mut log = EventLog::new();
        log.append(Event::new("Shock 1 Delivered", EventKind::Shock, 65.0));
        let json = serde_json::to_string(&log).unwrap();
        let parsed: EventLog = serde_json::from_str(&json).unwrap();
        assert_eq!(log, parsed);
    }
}
