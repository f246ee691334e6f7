//! Declarative runtime configuration.
//!
//! A [`RuntimeConfig`] is the serde document model for a whole runtime:
//! input bindings, sequence definitions and the state machine tree. It can
//! be loaded from JSON (character move-sets are typically authored as
//! data, not code) and converted into the same builders the programmatic
//! API uses, so both paths share one validation pipeline.
//!
//! Hooks and condition predicates cannot be expressed as data; they are
//! registered in code and referenced from the config by name.

mod error;

pub use error::ConfigError;

use crate::builder::{MachineBuilder, StateBuilder, TransitionBuilder};
use crate::input::{BindingTable, InputBinding};
use crate::machine::{ContextKey, MachineDef, Trigger, DEFAULT_MAX_TRANSITIONS_PER_TICK};
use crate::sequence::SequenceDefinition;
use serde::{Deserialize, Serialize};

/// Top-level configuration document.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default)]
    pub bindings: Vec<InputBinding>,
    #[serde(default)]
    pub sequences: Vec<SequenceDefinition>,
    pub machine: MachineConfig,
}

/// The machine tree as configured.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MachineConfig {
    pub initial: String,
    pub states: Vec<StateConfig>,
    /// Machine-wide interrupts.
    #[serde(default)]
    pub globals: Vec<TransitionConfig>,
    #[serde(default = "default_max_transitions")]
    pub max_transitions: usize,
}

fn default_max_transitions() -> usize {
    DEFAULT_MAX_TRANSITIONS_PER_TICK
}

/// One state, possibly with nested children.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StateConfig {
    pub name: String,
    #[serde(default)]
    pub initial: Option<String>,
    #[serde(default)]
    pub context: Vec<ContextKey>,
    #[serde(default)]
    pub states: Vec<StateConfig>,
    #[serde(default)]
    pub transitions: Vec<TransitionConfig>,
    /// Interrupts scoped to this state's subtree.
    #[serde(default)]
    pub globals: Vec<TransitionConfig>,
}

/// One transition table entry as configured.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransitionConfig {
    pub trigger: TriggerConfig,
    /// Absolute target state path, e.g. `"grounded/attack"`.
    pub to: String,
    #[serde(default)]
    pub priority: i32,
    #[serde(default = "default_true")]
    pub advance_time: bool,
}

fn default_true() -> bool {
    true
}

/// Data form of a trigger, e.g. `{"press": "punch"}` or
/// `{"sequence": "qcf_punch"}`.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerConfig {
    Press(String),
    Release(String),
    Sequence(String),
    Condition(String),
}

impl TriggerConfig {
    fn to_trigger(&self) -> Trigger {
        match self {
            Self::Press(input) => Trigger::press(input.clone()),
            Self::Release(input) => Trigger::release(input.clone()),
            Self::Sequence(id) => Trigger::sequence(id.clone()),
            Self::Condition(name) => Trigger::condition(name.clone()),
        }
    }
}

impl RuntimeConfig {
    /// Parse a configuration document from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Assemble the binding table, preserving declaration order.
    pub fn binding_table(&self) -> BindingTable {
        let mut table = BindingTable::new();
        for binding in &self.bindings {
            table.bind(binding.input.clone(), binding.sources.clone());
        }
        table
    }

    /// Build and validate the machine definition. All configuration
    /// errors are reported together.
    pub fn build_machine(&self) -> Result<MachineDef, Vec<ConfigError>> {
        let mut builder = MachineBuilder::new()
            .initial(self.machine.initial.as_str())
            .max_transitions(self.machine.max_transitions);
        for state in &self.machine.states {
            builder = builder.state(state_builder(state));
        }
        for global in &self.machine.globals {
            builder = builder.global(transition_builder(global));
        }
        builder.build()
    }
}

fn state_builder(config: &StateConfig) -> StateBuilder {
    let mut builder = StateBuilder::new(config.name.as_str());
    if let Some(initial) = &config.initial {
        builder = builder.initial(initial.as_str());
    }
    for key in &config.context {
        builder = builder.context_key(key.name.as_str(), key.default.clone());
    }
    for child in &config.states {
        builder = builder.state(state_builder(child));
    }
    for transition in &config.transitions {
        builder = builder.transition(transition_builder(transition));
    }
    for global in &config.globals {
        builder = builder.global(transition_builder(global));
    }
    builder
}

fn transition_builder(config: &TransitionConfig) -> TransitionBuilder {
    let mut builder = TransitionBuilder::new()
        .on(config.trigger.to_trigger())
        .to(config.to.as_str())
        .priority(config.priority);
    if !config.advance_time {
        builder = builder.no_advance();
    }
    builder
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::StatePath;

    const FIGHTER_JSON: &str = r#"{
        "bindings": [
            {"input": "down", "sources": [{"source": "key_s"}]},
            {"input": "right", "sources": [{"source": "key_d"}]},
            {"input": "punch", "sources": [{"source": "key_z"}, {"source": "pad_x"}]}
        ],
        "sequences": [
            {
                "id": "qcf_punch",
                "steps": [
                    {"accepts": [{"input": "down"}]},
                    {"accepts": [{"input": "right"}], "window_ms": 250},
                    {"accepts": [{"input": "punch"}], "window_ms": 250}
                ],
                "total_window_ms": 600
            }
        ],
        "machine": {
            "initial": "grounded",
            "globals": [
                {"trigger": {"condition": "got_hit"}, "to": "hit_stun", "priority": 100}
            ],
            "states": [
                {
                    "name": "grounded",
                    "initial": "idle",
                    "states": [
                        {
                            "name": "idle",
                            "transitions": [
                                {"trigger": {"sequence": "qcf_punch"}, "to": "grounded/fireball"},
                                {"trigger": {"press": "jump"}, "to": "airborne"}
                            ]
                        },
                        {
                            "name": "fireball",
                            "context": [{"name": "active_frames", "default": {"int": 12}}]
                        }
                    ]
                },
                {"name": "airborne"},
                {"name": "hit_stun"}
            ]
        }
    }"#;

    #[test]
    fn full_document_parses_and_builds() {
        let config = RuntimeConfig::from_json(FIGHTER_JSON).unwrap();
        let def = config.build_machine().unwrap();

        let fireball = def
            .resolve_path(&StatePath::parse("grounded/fireball"))
            .unwrap();
        assert_eq!(def.display_path(fireball), "grounded/fireball");
        assert_eq!(def.node(fireball).context_keys()[0].name, "active_frames");
        assert_eq!(config.sequences[0].steps.len(), 3);
    }

    #[test]
    fn binding_table_preserves_declaration_order() {
        let config = RuntimeConfig::from_json(FIGHTER_JSON).unwrap();
        let table = config.binding_table();

        let inputs: Vec<&str> = table.inputs().collect();
        assert_eq!(inputs, vec!["down", "right", "punch"]);
        assert_eq!(table.get("punch").unwrap().sources.len(), 2);
    }

    #[test]
    fn transition_defaults_apply() {
        let json = r#"{"trigger": {"press": "punch"}, "to": "attack"}"#;
        let config: TransitionConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.priority, 0);
        assert!(config.advance_time);
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = RuntimeConfig::from_json("{not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn config_errors_surface_from_the_builder() {
        let json = r#"{
            "machine": {
                "initial": "idle",
                "states": [
                    {
                        "name": "idle",
                        "transitions": [{"trigger": {"press": "punch"}, "to": "nowhere"}]
                    }
                ]
            }
        }"#;
        let config = RuntimeConfig::from_json(json).unwrap();
        let errors = config.build_machine().unwrap_err();

        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::UnknownTarget { .. })));
    }

    #[test]
    fn document_round_trips_through_json() {
        let config = RuntimeConfig::from_json(FIGHTER_JSON).unwrap();
        let json = config.to_json().unwrap();
        let back = RuntimeConfig::from_json(&json).unwrap();
        assert_eq!(back.machine.states.len(), config.machine.states.len());
        assert_eq!(back.sequences, config.sequences);
    }
}
