//! Input recognition: raw device samples in, logical input events out.
//!
//! The recognizer is the first stage of the per-tick pipeline. It owns all
//! logical input state; the sequence matcher and the state machine only
//! ever see the immutable [`InputEvent`] stream plus read-only phase and
//! magnitude queries.

mod binding;
mod event;
mod recognizer;

pub use binding::{BindingTable, InputBinding, RawBinding, RawSample, DEFAULT_THRESHOLD};
pub use event::{EventKind, InputEvent, InputPhase, LogicalInput};
pub use recognizer::InputRecognizer;
