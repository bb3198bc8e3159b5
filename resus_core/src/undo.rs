//! Single-step-back undo history.
//!
//! Every mutating clinical action pushes a deep snapshot of the
//! session and event log before touching anything. `pop` hands the
//! most recent snapshot back to the engine, which applies it by
//! wholesale replacement. The stack is unbounded here; any cap is a
//! front-end decision.

use crate::{EventLog, Session};

/// Full structural copy of the session state at one instant.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub session: Session,
    pub events: EventLog,
}

/// Stack of pre-mutation snapshots for the current episode.
#[derive(Debug, Default)]
pub struct UndoHistory {
    stack: Vec<Snapshot>,
}

impl UndoHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, snapshot: Snapshot) {
        self.stack.push(snapshot);
    }

    /// Pop the most recent snapshot. `None` on an empty stack, which
    /// callers treat as a no-op rather than an error.
    pub fn pop(&mut self) -> Option<Snapshot> {
        self.stack.pop()
    }

    /// Drop all snapshots. Used by reset.
    pub fn clear(&mut self) {
        self.stack.clear();
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }
}
