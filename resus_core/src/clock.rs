//! Wall-clock abstraction for the arrest engine.
//!
//! All elapsed time in the engine is recomputed from absolute
//! timestamps (`now - started_at`), never accumulated tick by tick, so
//! the session clock self-corrects across missed ticks and process
//! suspension. This module is the only source of "now".

use chrono::{DateTime, Duration, Utc};
use std::cell::Cell;

/// Source of the current wall-clock instant. Synchronous, never blocks.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

/// Production clock backed by the system time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Settable clock for deterministic tests.
#[derive(Debug)]
pub struct ManualClock {
    now: Cell<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    /// Move the clock forward by a number of seconds.
    pub fn advance(&self, seconds: f64) {
        let delta = Duration::milliseconds((seconds * 1000.0).round() as i64);
        self.now.set(self.now.get() + delta);
    }

    pub fn set(&self, now: DateTime<Utc>) {
        self.now.set(now);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

/// Whole seconds elapsed between two instants.
///
/// Sub-second precision is kept internally (the subtraction is done at
/// millisecond resolution) but callers see floor-of-seconds, matching
/// the displayed session clock. Never negative.
pub fn elapsed_seconds(start: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let millis = (now - start).num_milliseconds().max(0);
    (millis / 1000) as f64
}
