//! Snapshot and restore for the whole runtime.
//!
//! A snapshot captures everything that varies at runtime: the active
//! state path, live data contexts, in-flight sequence cursors and the
//! tick counter. Definitions, bindings, hooks and condition predicates
//! are configuration, not state, and are never serialized; a restore
//! re-attaches the captured state to an identically configured runtime.
//! This is the building block for rollback netcode and replay debugging.

pub mod error;

pub use error::SnapshotError;

use crate::machine::DataContext;
use crate::sequence::SequenceCursor;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Version identifier for the snapshot format.
pub const SNAPSHOT_VERSION: u32 = 1;

/// In-flight progress of one sequence attempt, tagged with its id.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct CursorSnapshot {
    pub sequence: String,
    pub cursor: SequenceCursor,
}

/// Serializable capture of runtime state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Snapshot {
    /// Snapshot format version.
    pub version: u32,

    /// Unique snapshot identifier.
    pub id: Uuid,

    /// When the snapshot was taken.
    pub taken_at: DateTime<Utc>,

    /// Tick counter at capture time.
    pub tick: u64,

    /// Active leaf path, e.g. `"grounded/attack/punch"`.
    pub active_path: String,

    /// Live contexts of the active path, keyed by state name.
    pub contexts: Vec<(String, DataContext)>,

    /// In-flight sequence attempts.
    pub cursors: Vec<CursorSnapshot>,
}

impl Snapshot {
    /// Serialize to pretty JSON, for tooling and diffing.
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| SnapshotError::SerializationFailed(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let snapshot: Self = serde_json::from_str(json)
            .map_err(|e| SnapshotError::DeserializationFailed(e.to_string()))?;
        snapshot.check_version()?;
        Ok(snapshot)
    }

    /// Serialize to the compact binary format used for rollback buffers.
    pub fn to_binary(&self) -> Result<Vec<u8>, SnapshotError> {
        bincode::serialize(self).map_err(|e| SnapshotError::SerializationFailed(e.to_string()))
    }

    pub fn from_binary(bytes: &[u8]) -> Result<Self, SnapshotError> {
        let snapshot: Self = bincode::deserialize(bytes)
            .map_err(|e| SnapshotError::DeserializationFailed(e.to_string()))?;
        snapshot.check_version()?;
        Ok(snapshot)
    }

    fn check_version(&self) -> Result<(), SnapshotError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: self.version,
                supported: SNAPSHOT_VERSION,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::{ContextKey, ContextValue};

    fn sample() -> Snapshot {
        let keys = vec![ContextKey::new("charge", ContextValue::Int(2))];
        Snapshot {
            version: SNAPSHOT_VERSION,
            id: Uuid::new_v4(),
            taken_at: Utc::now(),
            tick: 120,
            active_path: "grounded/attack/punch".to_string(),
            contexts: vec![(
                "punch".to_string(),
                crate::machine::DataContext::from_declared(&keys),
            )],
            cursors: vec![CursorSnapshot {
                sequence: "qcf_punch".to_string(),
                cursor: SequenceCursor {
                    step: 2,
                    started_ms: 1800,
                    last_step_ms: 1900,
                },
            }],
        }
    }

    #[test]
    fn snapshot_round_trips_through_json() {
        let snapshot = sample();
        let json = snapshot.to_json().unwrap();
        let back = Snapshot::from_json(&json).unwrap();

        assert_eq!(back.id, snapshot.id);
        assert_eq!(back.active_path, snapshot.active_path);
        assert_eq!(back.cursors, snapshot.cursors);
        assert_eq!(back.tick, 120);
    }

    #[test]
    fn snapshot_round_trips_through_binary() {
        let snapshot = sample();
        let bytes = snapshot.to_binary().unwrap();
        let back = Snapshot::from_binary(&bytes).unwrap();

        assert_eq!(back.id, snapshot.id);
        assert_eq!(back.contexts, snapshot.contexts);
    }

    #[test]
    fn future_version_is_rejected() {
        let mut snapshot = sample();
        snapshot.version = SNAPSHOT_VERSION + 1;
        let json = serde_json::to_string(&snapshot).unwrap();

        let err = Snapshot::from_json(&json).unwrap_err();
        assert!(matches!(
            err,
            SnapshotError::UnsupportedVersion { found, supported }
                if found == SNAPSHOT_VERSION + 1 && supported == SNAPSHOT_VERSION
        ));
    }

    #[test]
    fn garbage_bytes_are_a_deserialization_error() {
        let err = Snapshot::from_binary(&[0xff, 0x00, 0x13]).unwrap_err();
        assert!(matches!(err, SnapshotError::DeserializationFailed(_)));
    }
}
