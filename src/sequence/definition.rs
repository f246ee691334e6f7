//! Static combo sequence definitions.

use crate::input::{EventKind, InputEvent};
use serde::{Deserialize, Serialize};

/// Default per-step window when a step does not specify one.
pub const DEFAULT_STEP_WINDOW_MS: u64 = 300;

/// One acceptable event for a sequence step.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct StepPattern {
    pub input: String,
    #[serde(default = "press")]
    pub kind: EventKind,
}

fn press() -> EventKind {
    EventKind::Pressed
}

impl StepPattern {
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

/// One step of a sequence: a set of acceptable events plus the maximum
/// time allowed since the previous step matched. The window of step 0 is
/// never consulted (there is no previous step).
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct SequenceStep {
    pub accepts: Vec<StepPattern>,
    #[serde(default = "default_window")]
    pub window_ms: u64,
}

fn default_window() -> u64 {
    DEFAULT_STEP_WINDOW_MS
}

impl SequenceStep {
    pub fn new(accepts: Vec<StepPattern>, window_ms: u64) -> Self {
        Self { accepts, window_ms }
    }

    pub fn press(input: impl Into<String>, window_ms: u64) -> Self {
        Self::new(vec![StepPattern::press(input)], window_ms)
    }

    pub fn accepts(&self, event: &InputEvent) -> bool {
        self.accepts.iter().any(|p| p.matches(event))
    }
}

/// A configured combo: ordered steps with per-step windows, an overall
/// window covering the whole attempt, and a strictness flag.
///
/// With `strict` set, an event that the current step does not accept
/// resets the attempt; otherwise unrelated inputs may interleave freely.
/// Immutable at runtime.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct SequenceDefinition {
    pub id: String,
    pub steps: Vec<SequenceStep>,
    /// Maximum time from the step-0 match to the final-step match.
    pub total_window_ms: u64,
    #[serde(default)]
    pub strict: bool,
}

impl SequenceDefinition {
    pub fn new(
        id: impl Into<String>,
        steps: Vec<SequenceStep>,
        total_window_ms: u64,
        strict: bool,
    ) -> Self {
        Self {
            id: id.into(),
            steps,
            total_window_ms,
            strict,
        }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// All logical input names referenced by any step.
    pub fn inputs(&self) -> impl Iterator<Item = &str> {
        self.steps
            .iter()
            .flat_map(|s| s.accepts.iter())
            .map(|p| p.input.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(input: &str, kind: EventKind) -> InputEvent {
        InputEvent {
            input: input.to_string(),
            kind,
            tick: 0,
            time_ms: 0,
        }
    }

    #[test]
    fn step_accepts_any_of_its_patterns() {
        let step = SequenceStep::new(
            vec![StepPattern::press("lp"), StepPattern::press("hp")],
            200,
        );

        assert!(step.accepts(&event("lp", EventKind::Pressed)));
        assert!(step.accepts(&event("hp", EventKind::Pressed)));
        assert!(!step.accepts(&event("lp", EventKind::Released)));
        assert!(!step.accepts(&event("kick", EventKind::Pressed)));
    }

    #[test]
    fn definition_lists_referenced_inputs() {
        let def = SequenceDefinition::new(
            "qcf_punch",
            vec![
                SequenceStep::press("down", 300),
                SequenceStep::press("right", 300),
                SequenceStep::press("punch", 300),
            ],
            900,
            false,
        );

        let inputs: Vec<&str> = def.inputs().collect();
        assert_eq!(inputs, vec!["down", "right", "punch"]);
    }

    #[test]
    fn step_window_defaults_when_omitted() {
        let json = r#"{"accepts": [{"input": "punch"}]}"#;
        let step: SequenceStep = serde_json::from_str(json).unwrap();
        assert_eq!(step.window_ms, DEFAULT_STEP_WINDOW_MS);
        assert_eq!(step.accepts[0].kind, EventKind::Pressed);
    }
}
