//! The per-entity runtime: recognizer, sequence matcher and machine wired
//! into one tick pipeline.
//!
//! The host calls [`Runtime::tick`] exactly once per simulation tick with
//! the raw device sample and the current time in milliseconds. Within the
//! tick the stages always run in the same order: raw sample to input
//! events, events to sequence triggers, then transition resolution.
//! Sequence completions are visible to resolution on the same tick as
//! their final input event, so a combo finisher never costs a frame of
//! latency.

use crate::config::{ConfigError, RuntimeConfig};
use crate::input::{BindingTable, InputEvent, InputPhase, InputRecognizer, RawSample};
use crate::machine::{
    ConditionRegistry, DataContext, Machine, MachineDef, StatePath, TickError, TransitionLog,
};
use crate::sequence::{SequenceDefinition, SequenceMatcher, SequenceTrigger};
use crate::snapshot::{CursorSnapshot, Snapshot, SnapshotError, SNAPSHOT_VERSION};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

/// What one tick produced, for host-side reactions and debugging.
#[derive(Clone, PartialEq, Debug)]
pub struct TickReport {
    pub tick: u64,
    /// Input events recognized this tick, in binding order.
    pub events: Vec<InputEvent>,
    /// Sequences that completed this tick.
    pub sequences: Vec<SequenceTrigger>,
    /// Number of transitions fired.
    pub fired: usize,
}

/// One entity's complete input-and-state runtime.
///
/// Construction validates everything across module boundaries: sequence
/// triggers against configured sequences, sequence steps against the
/// binding table, condition names against the registry. A runtime that
/// constructs successfully cannot hit a dangling reference mid-match.
pub struct Runtime {
    recognizer: InputRecognizer,
    matcher: SequenceMatcher,
    machine: Machine,
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime").finish_non_exhaustive()
    }
}

impl Runtime {
    /// Wire up and cross-validate all stages. The machine starts
    /// immediately; the first [`tick`](Runtime::tick) call runs against
    /// the initial state chain.
    pub fn new(
        table: BindingTable,
        sequences: Vec<SequenceDefinition>,
        def: MachineDef,
        conditions: ConditionRegistry,
    ) -> Result<Self, Vec<ConfigError>> {
        let mut errors = Vec::new();

        for (i, sequence) in sequences.iter().enumerate() {
            if sequence.is_empty() {
                errors.push(ConfigError::EmptySequence {
                    sequence: sequence.id.clone(),
                });
            }
            if sequences[..i].iter().any(|s| s.id == sequence.id) {
                errors.push(ConfigError::DuplicateSequence {
                    sequence: sequence.id.clone(),
                });
            }
            for input in sequence.inputs() {
                if !table.contains(input) {
                    errors.push(ConfigError::UnboundInput {
                        sequence: sequence.id.clone(),
                        input: input.to_string(),
                    });
                }
            }
        }

        for id in def.referenced_sequences() {
            if !sequences.iter().any(|s| s.id == id) {
                errors.push(ConfigError::UnknownSequence {
                    sequence: id.to_string(),
                });
            }
        }

        let mut machine = match Machine::new(Arc::new(def), conditions) {
            Ok(machine) if errors.is_empty() => machine,
            Ok(_) => return Err(errors),
            Err(condition_errors) => {
                errors.extend(condition_errors);
                return Err(errors);
            }
        };
        machine.start();

        Ok(Self {
            recognizer: InputRecognizer::new(table),
            matcher: SequenceMatcher::new(sequences),
            machine,
        })
    }

    /// Build a runtime from a configuration document plus the in-code
    /// condition registry.
    pub fn from_config(
        config: &RuntimeConfig,
        conditions: ConditionRegistry,
    ) -> Result<Self, Vec<ConfigError>> {
        let def = config.build_machine()?;
        Self::new(
            config.binding_table(),
            config.sequences.clone(),
            def,
            conditions,
        )
    }

    /// Run one simulation tick. `now_ms` is the host clock; it must be
    /// monotonically non-decreasing across calls.
    pub fn tick(&mut self, raw: &RawSample, now_ms: u64) -> Result<TickReport, TickError> {
        let tick = self.machine.tick_count() + 1;
        let events = self.recognizer.sample(raw, tick, now_ms);
        let sequences = self.matcher.process(&events);
        let fired = self.machine.tick(&events, &sequences)?;
        Ok(TickReport {
            tick,
            events,
            sequences,
            fired,
        })
    }

    pub fn machine(&self) -> &Machine {
        &self.machine
    }

    /// Active state names from root to leaf.
    pub fn active_path(&self) -> Vec<&str> {
        self.machine.active_path()
    }

    pub fn is_in(&self, state: &str) -> bool {
        self.machine.is_in(state)
    }

    pub fn context(&self, state: &str) -> Option<&DataContext> {
        self.machine.context(state)
    }

    pub fn context_mut(&mut self, state: &str) -> Option<&mut DataContext> {
        self.machine.context_mut(state)
    }

    /// Current phase of a logical input, for condition predicates and
    /// host queries.
    pub fn input_phase(&self, input: &str) -> Option<InputPhase> {
        self.recognizer.phase(input)
    }

    pub fn input_magnitude(&self, input: &str) -> Option<f32> {
        self.recognizer.magnitude(input)
    }

    pub fn log(&self) -> &TransitionLog {
        self.machine.log()
    }

    /// Capture all runtime state into a serializable snapshot.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            version: SNAPSHOT_VERSION,
            id: Uuid::new_v4(),
            taken_at: Utc::now(),
            tick: self.machine.tick_count(),
            active_path: self.machine.active_path_display(),
            contexts: self.machine.capture_contexts(),
            cursors: self
                .matcher
                .cursors()
                .into_iter()
                .map(|(sequence, cursor)| CursorSnapshot { sequence, cursor })
                .collect(),
        }
    }

    /// Reattach captured state to this runtime's configuration.
    ///
    /// Enter/exit hooks do not run and input phases reset to idle; a
    /// restore is a state assignment, not a replay of how the state was
    /// reached.
    pub fn restore(&mut self, snapshot: &Snapshot) -> Result<(), SnapshotError> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: snapshot.version,
                supported: SNAPSHOT_VERSION,
            });
        }
        self.machine.restore(
            &StatePath::parse(&snapshot.active_path),
            &snapshot.contexts,
            snapshot.tick,
        )?;
        self.matcher.reset();
        for entry in &snapshot.cursors {
            if !self
                .matcher
                .restore_cursor(&entry.sequence, entry.cursor.clone())
            {
                return Err(SnapshotError::UnknownSequence {
                    sequence: entry.sequence.clone(),
                });
            }
        }
        self.recognizer.reset();
        Ok(())
    }
}
