//! Builder API for ergonomic machine construction.
//!
//! Fluent builders for states, transitions and whole machine definitions,
//! with all validation deferred to [`MachineBuilder::build`] so every
//! configuration error is reported at once.

pub mod machine;
pub mod transition;

pub use machine::{MachineBuilder, StateBuilder};
pub use transition::TransitionBuilder;

use crate::machine::Trigger;

/// Create a transition fired by a button press.
///
/// # Example
///
/// ```
/// use strikeframe::builder::press_transition;
///
/// let jab = press_transition("punch", "attack/jab");
/// ```
pub fn press_transition(input: &str, target: &str) -> TransitionBuilder {
    TransitionBuilder::new().on(Trigger::press(input)).to(target)
}

/// Create a transition fired by a completed input sequence.
///
/// # Example
///
/// ```
/// use strikeframe::builder::sequence_transition;
///
/// let special = sequence_transition("qcf_punch", "attack/fireball");
/// ```
pub fn sequence_transition(sequence: &str, target: &str) -> TransitionBuilder {
    TransitionBuilder::new()
        .on(Trigger::sequence(sequence))
        .to(target)
}

/// Create a high-priority interrupt fired by a named condition, suitable
/// for machine-wide reactions such as hit-stun.
///
/// # Example
///
/// ```
/// use strikeframe::builder::interrupt;
///
/// let stun = interrupt("got_hit", "hit_stun", 100);
/// ```
pub fn interrupt(condition: &str, target: &str, priority: i32) -> TransitionBuilder {
    TransitionBuilder::new()
        .on(Trigger::condition(condition))
        .to(target)
        .priority(priority)
}
