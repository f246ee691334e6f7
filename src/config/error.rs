//! Configuration and validation errors.

use thiserror::Error;

/// Errors found while parsing or validating a runtime configuration.
///
/// Validation never stops at the first problem; callers receive every
/// error found in one pass so a bad config file can be fixed in one
/// round trip.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("machine defines no states")]
    EmptyMachine,

    #[error("duplicate state '{path}'")]
    DuplicateState { path: String },

    #[error("state '{state}' has children but no initial child")]
    MissingInitial { state: String },

    #[error("state '{state}' names unknown initial child '{initial}'")]
    UnknownInitial { state: String, initial: String },

    #[error("transition on '{state}' has no trigger")]
    MissingTrigger { state: String },

    #[error("transition on '{state}' has no target")]
    MissingTarget { state: String },

    #[error("transition on '{state}' targets unknown state '{target}'")]
    UnknownTarget { state: String, target: String },

    #[error("state '{state}' has two global transitions on '{trigger}' with equal priority")]
    AmbiguousGlobal { state: String, trigger: String },

    #[error("trigger references unregistered condition '{condition}'")]
    UnknownCondition { condition: String },

    #[error("trigger references unknown sequence '{sequence}'")]
    UnknownSequence { sequence: String },

    #[error("duplicate sequence id '{sequence}'")]
    DuplicateSequence { sequence: String },

    #[error("sequence '{sequence}' has no steps")]
    EmptySequence { sequence: String },

    #[error("sequence '{sequence}' references unbound input '{input}'")]
    UnboundInput { sequence: String, input: String },
}
