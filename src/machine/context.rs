//! Per-state data contexts.
//!
//! Every state node declares its context keys (with typed defaults) at
//! configuration time; the engine materializes a [`DataContext`] when the
//! node is entered and discards it on exit. Requiring declaration up front
//! turns "missing context key" into a load-time concern instead of a
//! runtime surprise.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A typed context value.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl ContextValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }
}

/// A declared context key with its configured default.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct ContextKey {
    pub name: String,
    pub default: ContextValue,
}

impl ContextKey {
    pub fn new(name: impl Into<String>, default: ContextValue) -> Self {
        Self {
            name: name.into(),
            default,
        }
    }
}

/// Live key/value storage for one active state node.
///
/// Initialized from the node's declared keys on entry, dropped on exit.
/// Only declared keys can be written; [`set`](DataContext::set) reports
/// whether the write landed.
#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
pub struct DataContext {
    values: HashMap<String, ContextValue>,
}

impl DataContext {
    pub(crate) fn from_declared(keys: &[ContextKey]) -> Self {
        Self {
            values: keys
                .iter()
                .map(|k| (k.name.clone(), k.default.clone()))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ContextValue> {
        self.values.get(name)
    }

    /// Write a declared key. Returns `false` (and stores nothing) when the
    /// key was never declared on this node.
    pub fn set(&mut self, name: &str, value: ContextValue) -> bool {
        match self.values.get_mut(name) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ContextValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}
