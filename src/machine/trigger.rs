//! Transition triggers and the condition predicate registry.
//!
//! Triggers are a tagged union rather than opaque callables so the whole
//! transition table stays inspectable at load time: targets, priorities
//! and trigger shapes can all be validated before the machine ever runs.
//! Condition predicates are the one escape hatch: host-supplied boolean
//! callables referenced by name.

use crate::input::{EventKind, InputEvent};
use crate::sequence::SequenceTrigger;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Pattern over the input event stream.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct InputPattern {
    pub input: String,
    pub kind: EventKind,
}

impl InputPattern {
    pub fn press(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            kind: EventKind::Pressed,
        }
    }

    pub fn release(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            kind: EventKind::Released,
        }
    }

    pub fn matches(&self, event: &InputEvent) -> bool {
        event.is(&self.input, self.kind)
    }
}

/// What fires a transition: a discrete input event, a completed sequence,
/// or a named host condition.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub enum Trigger {
    Input(InputPattern),
    Sequence(String),
    Condition(String),
}

impl Trigger {
    pub fn press(input: impl Into<String>) -> Self {
        Self::Input(InputPattern::press(input))
    }

    pub fn release(input: impl Into<String>) -> Self {
        Self::Input(InputPattern::release(input))
    }

    pub fn sequence(id: impl Into<String>) -> Self {
        Self::Sequence(id.into())
    }

    pub fn condition(name: impl Into<String>) -> Self {
        Self::Condition(name.into())
    }

    /// Condition name referenced by this trigger, if any.
    pub fn condition_name(&self) -> Option<&str> {
        match self {
            Self::Condition(name) => Some(name),
            _ => None,
        }
    }

    /// Sequence id referenced by this trigger, if any.
    pub fn sequence_id(&self) -> Option<&str> {
        match self {
            Self::Sequence(id) => Some(id),
            _ => None,
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input(p) => match p.kind {
                EventKind::Pressed => write!(f, "press({})", p.input),
                EventKind::Released => write!(f, "release({})", p.input),
            },
            Self::Sequence(id) => write!(f, "sequence({id})"),
            Self::Condition(name) => write!(f, "condition({name})"),
        }
    }
}

type Predicate = Box<dyn Fn() -> bool + Send + Sync>;

/// Named boolean predicates supplied by the host (e.g. `"grounded"`,
/// `"health_depleted"`).
///
/// The engine treats them as opaque and evaluates each referenced name at
/// most once per tick. All names referenced by a machine's triggers must
/// be registered before the machine is instantiated; that check happens at
/// validation time, never mid-tick.
#[derive(Default)]
pub struct ConditionRegistry {
    predicates: HashMap<String, Predicate>,
}

impl ConditionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, name: impl Into<String>, predicate: F)
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        self.predicates.insert(name.into(), Box::new(predicate));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.predicates.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.predicates.keys().map(String::as_str)
    }

    pub(crate) fn eval(&self, name: &str) -> bool {
        self.predicates.get(name).map(|p| p()).unwrap_or(false)
    }
}

/// Per-tick memoization over a [`ConditionRegistry`], so each predicate
/// runs at most once per tick no matter how many transitions reference it.
pub(crate) struct ConditionCache<'a> {
    registry: &'a ConditionRegistry,
    cache: HashMap<String, bool>,
}

impl<'a> ConditionCache<'a> {
    pub(crate) fn new(registry: &'a ConditionRegistry) -> Self {
        Self {
            registry,
            cache: HashMap::new(),
        }
    }

    pub(crate) fn eval(&mut self, name: &str) -> bool {
        if let Some(&cached) = self.cache.get(name) {
            return cached;
        }
        let value = self.registry.eval(name);
        self.cache.insert(name.to_string(), value);
        value
    }
}

impl Trigger {
    /// Whether this trigger is satisfied by the current tick's inputs.
    pub(crate) fn is_satisfied(
        &self,
        events: &[InputEvent],
        sequences: &[SequenceTrigger],
        conditions: &mut ConditionCache<'_>,
    ) -> bool {
        match self {
            Self::Input(pattern) => events.iter().any(|e| pattern.matches(e)),
            Self::Sequence(id) => sequences.iter().any(|t| &t.sequence == id),
            Self::Condition(name) => conditions.eval(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn press_event(input: &str) -> InputEvent {
        InputEvent {
            input: input.to_string(),
            kind: EventKind::Pressed,
            tick: 1,
            time_ms: 16,
        }
    }

    #[test]
    fn input_trigger_matches_events() {
        let trigger = Trigger::press("punch");
        let registry = ConditionRegistry::new();
        let mut cache = ConditionCache::new(&registry);

        assert!(trigger.is_satisfied(&[press_event("punch")], &[], &mut cache));
        assert!(!trigger.is_satisfied(&[press_event("kick")], &[], &mut cache));
        assert!(!trigger.is_satisfied(&[], &[], &mut cache));
    }

    #[test]
    fn sequence_trigger_matches_by_id() {
        let trigger = Trigger::sequence("qcf_punch");
        let registry = ConditionRegistry::new();
        let mut cache = ConditionCache::new(&registry);

        let hit = SequenceTrigger {
            sequence: "qcf_punch".to_string(),
            tick: 1,
            time_ms: 16,
        };
        let miss = SequenceTrigger {
            sequence: "dp_punch".to_string(),
            tick: 1,
            time_ms: 16,
        };

        assert!(trigger.is_satisfied(&[], std::slice::from_ref(&hit), &mut cache));
        assert!(!trigger.is_satisfied(&[], &[miss], &mut cache));
    }

    #[test]
    fn condition_cache_evaluates_once_per_tick() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&calls);

        let mut registry = ConditionRegistry::new();
        registry.register("grounded", move || {
            counted.fetch_add(1, Ordering::SeqCst);
            true
        });

        let mut cache = ConditionCache::new(&registry);
        let trigger = Trigger::condition("grounded");
        assert!(trigger.is_satisfied(&[], &[], &mut cache));
        assert!(trigger.is_satisfied(&[], &[], &mut cache));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unregistered_condition_is_false() {
        let registry = ConditionRegistry::new();
        let mut cache = ConditionCache::new(&registry);
        assert!(!Trigger::condition("missing").is_satisfied(&[], &[], &mut cache));
    }

    #[test]
    fn trigger_display_names_its_shape() {
        assert_eq!(Trigger::press("punch").to_string(), "press(punch)");
        assert_eq!(Trigger::release("back").to_string(), "release(back)");
        assert_eq!(Trigger::sequence("qcf").to_string(), "sequence(qcf)");
        assert_eq!(Trigger::condition("hit").to_string(), "condition(hit)");
    }
}
