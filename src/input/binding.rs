//! Logical-input-to-raw-source bindings.
//!
//! A [`BindingTable`] maps each logical input name to one or more raw
//! device sources. Analog sources carry an activation threshold; a logical
//! input counts as actuated when any bound source is at or above its
//! threshold. Raw sources not referenced by any binding are ignored.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default activation threshold. Digital buttons report 0.0/1.0, so the
/// midpoint works for both digital and analog sources.
pub const DEFAULT_THRESHOLD: f32 = 0.5;

/// One raw device source feeding a logical input.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RawBinding {
    /// Host-defined source name, e.g. `"key_z"` or `"stick_left_x+"`.
    pub source: String,
    /// Value at or above which the source counts as actuated.
    #[serde(default = "default_threshold")]
    pub threshold: f32,
}

fn default_threshold() -> f32 {
    DEFAULT_THRESHOLD
}

impl RawBinding {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            threshold: DEFAULT_THRESHOLD,
        }
    }

    pub fn with_threshold(source: impl Into<String>, threshold: f32) -> Self {
        Self {
            source: source.into(),
            threshold,
        }
    }
}

/// All raw sources bound to one logical input.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InputBinding {
    pub input: String,
    pub sources: Vec<RawBinding>,
}

/// Ordered table of logical input bindings.
///
/// Built once at configuration time and immutable afterwards. Order is
/// preserved so recognizer output (and therefore event emission) is
/// deterministic across runs.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct BindingTable {
    bindings: Vec<InputBinding>,
}

impl BindingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a logical input to a set of raw sources. Re-binding an
    /// existing name replaces its sources.
    pub fn bind(&mut self, input: impl Into<String>, sources: Vec<RawBinding>) {
        let input = input.into();
        if let Some(existing) = self.bindings.iter_mut().find(|b| b.input == input) {
            existing.sources = sources;
        } else {
            self.bindings.push(InputBinding { input, sources });
        }
    }

    /// Convenience: bind a logical input to a single digital source.
    pub fn bind_button(&mut self, input: impl Into<String>, source: impl Into<String>) {
        self.bind(input, vec![RawBinding::new(source)]);
    }

    pub fn contains(&self, input: &str) -> bool {
        self.bindings.iter().any(|b| b.input == input)
    }

    pub fn get(&self, input: &str) -> Option<&InputBinding> {
        self.bindings.iter().find(|b| b.input == input)
    }

    pub fn bindings(&self) -> &[InputBinding] {
        &self.bindings
    }

    pub fn inputs(&self) -> impl Iterator<Item = &str> {
        self.bindings.iter().map(|b| b.input.as_str())
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// One raw-sample snapshot, delivered by the host once per tick.
///
/// Maps raw source names to values. Buttons use 0.0/1.0, axes anything in
/// `0.0..=1.0`. Missing sources read as 0.0.
#[derive(Clone, Debug, Default)]
pub struct RawSample {
    values: HashMap<String, f32>,
}

impl RawSample {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, source: impl Into<String>, value: f32) -> &mut Self {
        self.values.insert(source.into(), value);
        self
    }

    /// Shorthand for a fully pressed digital source.
    pub fn press(&mut self, source: impl Into<String>) -> &mut Self {
        self.set(source, 1.0)
    }

    pub fn get(&self, source: &str) -> f32 {
        self.values.get(source).copied().unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_replaces_existing_sources() {
        let mut table = BindingTable::new();
        table.bind_button("punch", "key_z");
        table.bind("punch", vec![RawBinding::new("pad_a")]);

        assert_eq!(table.len(), 1);
        assert_eq!(table.get("punch").unwrap().sources[0].source, "pad_a");
    }

    #[test]
    fn binding_order_is_preserved() {
        let mut table = BindingTable::new();
        table.bind_button("down", "key_s");
        table.bind_button("right", "key_d");
        table.bind_button("punch", "key_z");

        let inputs: Vec<&str> = table.inputs().collect();
        assert_eq!(inputs, vec!["down", "right", "punch"]);
    }

    #[test]
    fn missing_source_reads_zero() {
        let sample = RawSample::new();
        assert_eq!(sample.get("nothing"), 0.0);
    }

    #[test]
    fn default_threshold_applies() {
        let binding = RawBinding::new("trigger_l");
        assert_eq!(binding.threshold, DEFAULT_THRESHOLD);

        let json = r#"{"source": "trigger_l"}"#;
        let parsed: RawBinding = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.threshold, DEFAULT_THRESHOLD);
    }
}
