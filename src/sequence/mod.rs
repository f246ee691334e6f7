//! Combo detection: ordered input sequences with timing windows.
//!
//! Definitions are static configuration; all runtime state lives in the
//! per-definition cursors owned by [`SequenceMatcher`]. The matcher runs
//! after the input recognizer and before transition resolution within the
//! same tick, so a completed sequence can gate a transition with no added
//! frame of latency.

mod definition;
mod matcher;

pub use definition::{
    SequenceDefinition, SequenceStep, StepPattern, DEFAULT_STEP_WINDOW_MS,
};
pub use matcher::{SequenceCursor, SequenceMatcher, SequenceTrigger};
