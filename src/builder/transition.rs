//! Builder for transition table entries.

use crate::config::ConfigError;
use crate::machine::{StatePath, TransitionSpec, Trigger};

/// Builder for a single transition with a fluent API.
///
/// The target is given as an absolute state path (from the root's
/// children); it is resolved to an arena index when the owning machine is
/// built, and an unknown path is reported then as a configuration error.
#[derive(Clone, Debug, Default)]
pub struct TransitionBuilder {
    trigger: Option<Trigger>,
    target: Option<StatePath>,
    priority: i32,
    no_advance: bool,
}

impl TransitionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the trigger (required).
    pub fn on(mut self, trigger: Trigger) -> Self {
        self.trigger = Some(trigger);
        self
    }

    /// Set the target state path (required).
    pub fn to(mut self, target: impl Into<StatePath>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Set the resolution priority. Higher wins; declaration order breaks
    /// ties. Defaults to 0.
    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Do not tick the entered child machine in the same cycle this
    /// transition fires.
    pub fn no_advance(mut self) -> Self {
        self.no_advance = true;
        self
    }

    /// Finalize into a spec, naming the declaring state in any error.
    pub(crate) fn into_spec(self, owner: &str) -> Result<TransitionSpec, ConfigError> {
        let trigger = self.trigger.ok_or_else(|| ConfigError::MissingTrigger {
            state: owner.to_string(),
        })?;
        let target = self.target.ok_or_else(|| ConfigError::MissingTarget {
            state: owner.to_string(),
        })?;
        Ok(TransitionSpec {
            trigger,
            target,
            priority: self.priority,
            advance_time: !self.no_advance,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_produces_spec_with_defaults() {
        let spec = TransitionBuilder::new()
            .on(Trigger::press("punch"))
            .to("attack")
            .into_spec("idle")
            .unwrap();

        assert_eq!(spec.target.to_string(), "attack");
        assert_eq!(spec.priority, 0);
        assert!(spec.advance_time);
    }

    #[test]
    fn missing_trigger_names_the_owner() {
        let err = TransitionBuilder::new()
            .to("attack")
            .into_spec("grounded/idle")
            .unwrap_err();

        assert!(matches!(
            err,
            ConfigError::MissingTrigger { state } if state == "grounded/idle"
        ));
    }

    #[test]
    fn missing_target_is_an_error() {
        let err = TransitionBuilder::new()
            .on(Trigger::press("punch"))
            .into_spec("idle")
            .unwrap_err();

        assert!(matches!(err, ConfigError::MissingTarget { .. }));
    }

    #[test]
    fn no_advance_clears_advance_time() {
        let spec = TransitionBuilder::new()
            .on(Trigger::press("punch"))
            .to("combat")
            .no_advance()
            .into_spec("idle")
            .unwrap();

        assert!(!spec.advance_time);
    }
}
