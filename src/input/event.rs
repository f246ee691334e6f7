//! Logical input state and discrete input events.
//!
//! The recognizer maintains one [`LogicalInput`] per configured logical
//! input name and emits an immutable [`InputEvent`] whenever a phase
//! transition occurs. Events are the only thing downstream consumers
//! (sequence matcher, transition tables) ever see; the per-tick phase and
//! magnitude are exposed read-only for condition predicates.

use serde::{Deserialize, Serialize};

/// Phase of a logical input within the current tick.
///
/// `JustPressed` and `JustReleased` last exactly one tick; the recognizer
/// settles them into `Held`/`Idle` on the following sample.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum InputPhase {
    /// Not actuated.
    Idle,
    /// Crossed the activation threshold this tick.
    JustPressed,
    /// Actuated since at least the previous tick.
    Held,
    /// Dropped below the activation threshold this tick.
    JustReleased,
}

impl InputPhase {
    /// Whether the input is currently actuated.
    pub fn is_down(self) -> bool {
        matches!(self, Self::JustPressed | Self::Held)
    }
}

/// Current state of one logical input.
///
/// Mutated once per tick by the recognizer and nowhere else. `magnitude`
/// is the strongest bound raw source value, clamped to `0.0..=1.0`;
/// digital buttons report `0.0` or `1.0`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LogicalInput {
    pub id: String,
    pub phase: InputPhase,
    pub magnitude: f32,
}

impl LogicalInput {
    pub(crate) fn idle(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            phase: InputPhase::Idle,
            magnitude: 0.0,
        }
    }
}

/// Which edge of an input an event (or a pattern) refers to.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Pressed,
    Released,
}

/// Immutable record of a phase transition.
///
/// Produced by the recognizer, consumed by the sequence matcher and the
/// transition tables within the same tick. Never mutated after creation.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct InputEvent {
    /// Logical input name.
    pub input: String,
    pub kind: EventKind,
    /// Tick on which the transition occurred.
    pub tick: u64,
    /// Host-supplied timestamp for the tick, in milliseconds.
    pub time_ms: u64,
}

impl InputEvent {
    pub fn is(&self, input: &str, kind: EventKind) -> bool {
        self.kind == kind && self.input == input
    }
}
