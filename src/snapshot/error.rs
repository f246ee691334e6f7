//! Snapshot error types.

use thiserror::Error;

/// Errors that can occur while capturing or restoring a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Serialization to JSON or binary format failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(String),

    /// Deserialization from JSON or binary format failed.
    #[error("deserialization failed: {0}")]
    DeserializationFailed(String),

    /// Snapshot format version is not supported by this build.
    #[error("unsupported snapshot version {found}, supported: {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// The snapshot names a state the current definition does not have.
    #[error("snapshot references unknown state '{state}'")]
    UnknownState { state: String },

    /// The snapshot carries a cursor for a sequence that is no longer
    /// configured, or whose shape changed.
    #[error("snapshot references unknown sequence '{sequence}'")]
    UnknownSequence { sequence: String },
}
