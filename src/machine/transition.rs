//! Transition table entries.

use super::node::{NodeId, StatePath};
use super::trigger::Trigger;

/// An unresolved transition as produced by builders and configuration:
/// the target is still a path, not an arena index.
#[derive(Clone, Debug)]
pub struct TransitionSpec {
    pub trigger: Trigger,
    pub target: StatePath,
    pub priority: i32,
    pub advance_time: bool,
}

/// A resolved transition table entry.
///
/// `target` is the arena index the target path resolved to at build time;
/// firing never has to look names up again, so a dangling target simply
/// cannot occur at runtime.
#[derive(Clone, Debug)]
pub struct Transition {
    pub(crate) trigger: Trigger,
    pub(crate) target: NodeId,
    pub(crate) target_path: StatePath,
    pub(crate) priority: i32,
    /// When false, the child machine under the target is not ticked in
    /// the same cycle that this transition fires, so the entry action can
    /// settle before the child sees any input.
    pub(crate) advance_time: bool,
}

impl Transition {
    pub fn trigger(&self) -> &Trigger {
        &self.trigger
    }

    pub fn target(&self) -> NodeId {
        self.target
    }

    pub fn target_path(&self) -> &StatePath {
        &self.target_path
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn advance_time(&self) -> bool {
        self.advance_time
    }
}

/// Order transitions for resolution: priority descending, declaration
/// order preserved on ties. Callers rely on this being a stable sort.
pub(crate) fn sort_for_resolution(transitions: &mut [Transition]) {
    transitions.sort_by(|a, b| b.priority.cmp(&a.priority));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(trigger: Trigger, priority: i32) -> Transition {
        Transition {
            trigger,
            target: 1,
            target_path: StatePath::parse("a"),
            priority,
            advance_time: true,
        }
    }

    #[test]
    fn sort_orders_by_priority_descending() {
        let mut transitions = vec![
            entry(Trigger::press("a"), 0),
            entry(Trigger::press("b"), 5),
            entry(Trigger::press("c"), 2),
        ];
        sort_for_resolution(&mut transitions);

        let inputs: Vec<String> = transitions.iter().map(|t| t.trigger.to_string()).collect();
        assert_eq!(inputs, vec!["press(b)", "press(c)", "press(a)"]);
    }

    #[test]
    fn sort_preserves_declaration_order_on_ties() {
        let mut transitions = vec![
            entry(Trigger::press("first"), 1),
            entry(Trigger::press("second"), 1),
            entry(Trigger::press("third"), 1),
        ];
        sort_for_resolution(&mut transitions);

        let inputs: Vec<String> = transitions.iter().map(|t| t.trigger.to_string()).collect();
        assert_eq!(inputs, vec!["press(first)", "press(second)", "press(third)"]);
    }
}
