//! Time-windowed sequence matching over the input event stream.

use super::definition::SequenceDefinition;
use crate::input::InputEvent;
use serde::{Deserialize, Serialize};

/// Emitted when a sequence completes. Visible to transition resolution on
/// the same tick as the final input event (zero-frame latency).
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct SequenceTrigger {
    pub sequence: String,
    pub tick: u64,
    pub time_ms: u64,
}

/// Progress of one in-flight attempt for a single definition.
///
/// `step` is the index of the next expected step; an attempt only exists
/// once step 0 has matched.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct SequenceCursor {
    pub step: usize,
    pub started_ms: u64,
    pub last_step_ms: u64,
}

/// Tracks one cursor per configured [`SequenceDefinition`].
///
/// Attempts across definitions are independent: a single event may advance
/// several definitions on the same tick. Windows are enforced by timestamp
/// comparison only; there are no scheduled callbacks. The overall window
/// is checked before per-step windows and wins when both apply.
pub struct SequenceMatcher {
    definitions: Vec<SequenceDefinition>,
    cursors: Vec<Option<SequenceCursor>>,
}

impl SequenceMatcher {
    pub fn new(definitions: Vec<SequenceDefinition>) -> Self {
        let cursors = vec![None; definitions.len()];
        Self {
            definitions,
            cursors,
        }
    }

    pub fn definitions(&self) -> &[SequenceDefinition] {
        &self.definitions
    }

    /// Feed this tick's events through every definition, in order,
    /// returning the sequences that completed.
    pub fn process(&mut self, events: &[InputEvent]) -> Vec<SequenceTrigger> {
        let mut triggers = Vec::new();
        for event in events {
            for i in 0..self.definitions.len() {
                if let Some(trigger) = self.feed(i, event) {
                    triggers.push(trigger);
                }
            }
        }
        triggers
    }

    fn feed(&mut self, i: usize, event: &InputEvent) -> Option<SequenceTrigger> {
        let def = &self.definitions[i];
        let cursor = &mut self.cursors[i];

        // Overall window takes precedence: an attempt that has outlived it
        // is discarded no matter what the per-step windows say.
        if let Some(cur) = cursor.as_ref() {
            if event.time_ms.saturating_sub(cur.started_ms) > def.total_window_ms {
                *cursor = None;
            }
        }

        if let Some(cur) = cursor.as_mut() {
            let step = &def.steps[cur.step];
            if step.accepts(event) {
                if event.time_ms.saturating_sub(cur.last_step_ms) > step.window_ms {
                    // Too late for this step; the same event may still
                    // start a fresh attempt below.
                    *cursor = None;
                } else if cur.step + 1 == def.steps.len() {
                    let trigger = SequenceTrigger {
                        sequence: def.id.clone(),
                        tick: event.tick,
                        time_ms: event.time_ms,
                    };
                    *cursor = None;
                    return Some(trigger);
                } else {
                    cur.step += 1;
                    cur.last_step_ms = event.time_ms;
                    return None;
                }
            } else if def.strict {
                // Strict sequences do not tolerate interleaved inputs.
                *cursor = None;
            } else {
                return None;
            }
        }

        if def.steps[0].accepts(event) {
            if def.steps.len() == 1 {
                return Some(SequenceTrigger {
                    sequence: def.id.clone(),
                    tick: event.tick,
                    time_ms: event.time_ms,
                });
            }
            *cursor = Some(SequenceCursor {
                step: 1,
                started_ms: event.time_ms,
                last_step_ms: event.time_ms,
            });
        }

        None
    }

    /// Discard all in-flight attempts.
    pub fn reset(&mut self) {
        for cursor in &mut self.cursors {
            *cursor = None;
        }
    }

    /// Active cursors by sequence id, for snapshotting.
    pub fn cursors(&self) -> Vec<(String, SequenceCursor)> {
        self.definitions
            .iter()
            .zip(&self.cursors)
            .filter_map(|(def, c)| c.clone().map(|c| (def.id.clone(), c)))
            .collect()
    }

    /// Restore a cursor captured by [`cursors`](Self::cursors). Unknown
    /// ids are reported back to the caller.
    pub(crate) fn restore_cursor(&mut self, sequence: &str, cursor: SequenceCursor) -> bool {
        match self.definitions.iter().position(|d| d.id == sequence) {
            Some(i) if cursor.step < self.definitions[i].steps.len() => {
                self.cursors[i] = Some(cursor);
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::EventKind;
    use crate::sequence::definition::{SequenceStep, StepPattern};

    fn press(input: &str, time_ms: u64) -> InputEvent {
        InputEvent {
            input: input.to_string(),
            kind: EventKind::Pressed,
            tick: time_ms / 16,
            time_ms,
        }
    }

    fn two_step(window_ms: u64) -> SequenceDefinition {
        SequenceDefinition::new(
            "dash",
            vec![
                SequenceStep::press("right", window_ms),
                SequenceStep::press("right", window_ms),
            ],
            window_ms * 2,
            false,
        )
    }

    #[test]
    fn sequence_within_window_matches() {
        let mut matcher = SequenceMatcher::new(vec![two_step(300)]);

        let triggers = matcher.process(&[press("right", 0), press("right", 250)]);
        assert_eq!(triggers.len(), 1);
        assert_eq!(triggers[0].sequence, "dash");
    }

    #[test]
    fn step_window_exceeded_resets_to_step_zero() {
        let mut matcher = SequenceMatcher::new(vec![SequenceDefinition::new(
            "ab",
            vec![SequenceStep::press("a", 300), SequenceStep::press("b", 300)],
            600,
            false,
        )]);

        assert!(matcher.process(&[press("a", 0)]).is_empty());
        // 400ms gap: b is too late, attempt discarded.
        assert!(matcher.process(&[press("b", 400)]).is_empty());
        // Matching must now start over from a.
        assert!(matcher.process(&[press("b", 450)]).is_empty());
        let triggers = matcher.process(&[press("a", 500), press("b", 600)]);
        assert_eq!(triggers.len(), 1);
    }

    #[test]
    fn late_step_zero_event_restarts_attempt() {
        // Same input on both steps: a too-late second press restarts the
        // attempt instead of being thrown away.
        let mut matcher = SequenceMatcher::new(vec![two_step(200)]);

        assert!(matcher.process(&[press("right", 0)]).is_empty());
        assert!(matcher.process(&[press("right", 500)]).is_empty());
        // The 500ms press began a new attempt, so this completes it.
        let triggers = matcher.process(&[press("right", 650)]);
        assert_eq!(triggers.len(), 1);
    }

    #[test]
    fn overall_window_takes_precedence_over_step_windows() {
        let mut matcher = SequenceMatcher::new(vec![SequenceDefinition::new(
            "abc",
            vec![
                SequenceStep::press("a", 500),
                SequenceStep::press("b", 500),
                SequenceStep::press("c", 500),
            ],
            600,
            false,
        )]);

        // Every per-step gap is within 500ms, but 650ms total > 600ms.
        let triggers = matcher.process(&[press("a", 0), press("b", 400), press("c", 650)]);
        assert!(triggers.is_empty());

        // The same cadence inside the overall window matches.
        let triggers =
            matcher.process(&[press("a", 1000), press("b", 1300), press("c", 1550)]);
        assert_eq!(triggers.len(), 1);
    }

    #[test]
    fn strict_sequence_resets_on_interleaved_input() {
        let mut matcher = SequenceMatcher::new(vec![SequenceDefinition::new(
            "ab",
            vec![SequenceStep::press("a", 300), SequenceStep::press("b", 300)],
            600,
            true,
        )]);

        assert!(matcher
            .process(&[press("a", 0), press("x", 50), press("b", 100)])
            .is_empty());
    }

    #[test]
    fn lenient_sequence_tolerates_interleaved_input() {
        let mut matcher = SequenceMatcher::new(vec![SequenceDefinition::new(
            "ab",
            vec![SequenceStep::press("a", 300), SequenceStep::press("b", 300)],
            600,
            false,
        )]);

        let triggers = matcher.process(&[press("a", 0), press("x", 50), press("b", 100)]);
        assert_eq!(triggers.len(), 1);
    }

    #[test]
    fn one_event_advances_multiple_definitions() {
        let qcf = SequenceDefinition::new(
            "qcf",
            vec![SequenceStep::press("down", 300), SequenceStep::press("right", 300)],
            600,
            false,
        );
        let charge = SequenceDefinition::new(
            "flash",
            vec![SequenceStep::press("down", 400), SequenceStep::press("up", 400)],
            800,
            false,
        );
        let mut matcher = SequenceMatcher::new(vec![qcf, charge]);

        matcher.process(&[press("down", 0)]);
        let cursors = matcher.cursors();
        assert_eq!(cursors.len(), 2);

        let triggers = matcher.process(&[press("right", 100)]);
        assert_eq!(triggers.len(), 1);
        assert_eq!(triggers[0].sequence, "qcf");
        // The charge attempt is still alive.
        assert_eq!(matcher.cursors().len(), 1);
    }

    #[test]
    fn single_step_sequence_fires_immediately() {
        let mut matcher = SequenceMatcher::new(vec![SequenceDefinition::new(
            "taunt",
            vec![SequenceStep::press("select", 100)],
            100,
            false,
        )]);

        let triggers = matcher.process(&[press("select", 42)]);
        assert_eq!(triggers.len(), 1);
    }

    #[test]
    fn completion_resets_cursor() {
        let mut matcher = SequenceMatcher::new(vec![two_step(300)]);

        matcher.process(&[press("right", 0), press("right", 100)]);
        assert!(matcher.cursors().is_empty());

        // A fresh double-tap matches again from scratch.
        let triggers = matcher.process(&[press("right", 1000), press("right", 1100)]);
        assert_eq!(triggers.len(), 1);
    }

    #[test]
    fn release_patterns_participate_in_steps() {
        let def = SequenceDefinition::new(
            "charge_release",
            vec![
                SequenceStep::new(vec![StepPattern::press("back")], 300),
                SequenceStep::new(vec![StepPattern::release("back")], 2000),
            ],
            2000,
            false,
        );
        let mut matcher = SequenceMatcher::new(vec![def]);

        matcher.process(&[press("back", 0)]);
        let release = InputEvent {
            input: "back".to_string(),
            kind: EventKind::Released,
            tick: 60,
            time_ms: 1000,
        };
        let triggers = matcher.process(&[release]);
        assert_eq!(triggers.len(), 1);
    }
}
