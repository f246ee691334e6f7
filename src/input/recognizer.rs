//! Per-tick conversion of raw device samples into logical input events.

use super::binding::{BindingTable, RawSample};
use super::event::{EventKind, InputEvent, InputPhase, LogicalInput};
use std::collections::HashMap;

/// Converts raw per-frame samples into logical input phases and events.
///
/// Holds one [`LogicalInput`] per bound logical input. [`sample`] must be
/// called exactly once per tick, before the sequence matcher and the state
/// machine run; nothing else mutates logical input state.
///
/// [`sample`]: InputRecognizer::sample
pub struct InputRecognizer {
    table: BindingTable,
    states: Vec<LogicalInput>,
    index: HashMap<String, usize>,
}

impl InputRecognizer {
    pub fn new(table: BindingTable) -> Self {
        let states: Vec<LogicalInput> = table
            .inputs()
            .map(LogicalInput::idle)
            .collect();
        let index = states
            .iter()
            .enumerate()
            .map(|(i, s)| (s.id.clone(), i))
            .collect();
        Self {
            table,
            states,
            index,
        }
    }

    /// Fold one raw snapshot into the logical input states, returning the
    /// phase-transition events that occurred since the previous tick.
    ///
    /// Analog sources crossing their threshold upward produce `Pressed`,
    /// crossing downward produce `Released`. Events are emitted in binding
    /// declaration order.
    pub fn sample(&mut self, raw: &RawSample, tick: u64, time_ms: u64) -> Vec<InputEvent> {
        let mut events = Vec::new();

        for state in &mut self.states {
            // States are built from the binding table, so the lookup only
            // misses if the table was mutated out from under us.
            let Some(binding) = self.table.get(&state.id) else {
                continue;
            };

            let mut down = false;
            let mut magnitude = 0.0f32;
            for source in &binding.sources {
                let value = raw.get(&source.source);
                if value >= source.threshold {
                    down = true;
                }
                magnitude = magnitude.max(value);
            }
            state.magnitude = magnitude.clamp(0.0, 1.0);

            let was_down = state.phase.is_down();
            state.phase = match (was_down, down) {
                (false, true) => InputPhase::JustPressed,
                (true, true) => InputPhase::Held,
                (true, false) => InputPhase::JustReleased,
                (false, false) => InputPhase::Idle,
            };

            if !was_down && down {
                events.push(InputEvent {
                    input: state.id.clone(),
                    kind: EventKind::Pressed,
                    tick,
                    time_ms,
                });
            } else if was_down && !down {
                events.push(InputEvent {
                    input: state.id.clone(),
                    kind: EventKind::Released,
                    tick,
                    time_ms,
                });
            }
        }

        events
    }

    /// Current phase of a logical input, if it is bound.
    pub fn phase(&self, input: &str) -> Option<InputPhase> {
        self.index.get(input).map(|&i| self.states[i].phase)
    }

    /// Current magnitude of a logical input, if it is bound. Informational
    /// only; sequence matching never looks at magnitude.
    pub fn magnitude(&self, input: &str) -> Option<f32> {
        self.index.get(input).map(|&i| self.states[i].magnitude)
    }

    pub fn state(&self, input: &str) -> Option<&LogicalInput> {
        self.index.get(input).map(|&i| &self.states[i])
    }

    pub fn table(&self) -> &BindingTable {
        &self.table
    }

    /// Forget all phases, as if no source had ever been actuated. Held
    /// inputs re-press on the next sample.
    pub(crate) fn reset(&mut self) {
        for state in &mut self.states {
            state.phase = InputPhase::Idle;
            state.magnitude = 0.0;
        }
    }
}
