//! Immutable log of fired transitions.
//!
//! Useful for combat debugging ("which interrupt ate my combo?") and
//! carried along in snapshots. Recording returns a new log rather than
//! mutating in place; the engine swaps the new log in after each commit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Record of a single fired transition.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// Active leaf path before the transition, e.g. `"grounded/idle"`.
    pub from: String,
    /// Active leaf path after the transition.
    pub to: String,
    /// Human-readable trigger, e.g. `"sequence(qcf_punch)"`.
    pub trigger: String,
    /// Tick on which the transition fired.
    pub tick: u64,
    /// Wall-clock time of the commit.
    pub timestamp: DateTime<Utc>,
}

/// Ordered history of fired transitions.
#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
pub struct TransitionLog {
    records: Vec<TransitionRecord>,
}

impl TransitionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a transition, returning a new log. The original is
    /// unchanged.
    pub fn record(&self, record: TransitionRecord) -> Self {
        let mut records = self.records.clone();
        records.push(record);
        Self { records }
    }

    pub fn records(&self) -> &[TransitionRecord] {
        &self.records
    }

    pub fn last(&self) -> Option<&TransitionRecord> {
        self.records.last()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records fired on the given tick (several levels may fire within
    /// one tick; levels never fire twice).
    pub fn on_tick(&self, tick: u64) -> impl Iterator<Item = &TransitionRecord> {
        self.records.iter().filter(move |r| r.tick == tick)
    }
}
