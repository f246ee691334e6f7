//! Arena-backed state nodes and state paths.
//!
//! The state hierarchy is a tree stored as a flat arena of [`StateNode`]
//! records referenced by index. Transitions rewrite the active path by
//! index, so no owning pointers ever alias. A node with children acts as
//! the root of a child machine: it carries a default child and may declare
//! global (interrupt) transitions that apply while any descendant is
//! active.

use super::context::ContextKey;
use super::context::DataContext;
use super::transition::Transition;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Index of a node in the machine's arena. The root is always index 0.
pub type NodeId = usize;

/// Synchronous hook run on entry, exit, or tick of a node, with mutable
/// access to that node's data context.
pub type NodeHook = Arc<dyn Fn(&mut DataContext) + Send + Sync>;

/// A `/`-separated path of state names from the root's children downward,
/// e.g. `"grounded/attack/punch"`.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatePath {
    segments: Vec<String>,
}

impl StatePath {
    pub fn new(segments: Vec<String>) -> Self {
        Self { segments }
    }

    pub fn parse(path: &str) -> Self {
        Self {
            segments: path
                .split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl fmt::Display for StatePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}

impl From<&str> for StatePath {
    fn from(path: &str) -> Self {
        Self::parse(path)
    }
}

/// One behavior unit in the state tree.
///
/// Definitions are immutable once the machine is built; all mutable state
/// (the active path, data contexts) lives on the machine instance.
pub struct StateNode {
    pub(crate) name: String,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) default_child: Option<NodeId>,
    pub(crate) context_keys: Vec<ContextKey>,
    pub(crate) on_enter: Option<NodeHook>,
    pub(crate) on_exit: Option<NodeHook>,
    pub(crate) on_tick: Option<NodeHook>,
    /// Evaluated only while this node itself is the deepest candidate on
    /// the active path walk.
    pub(crate) local_transitions: Vec<Transition>,
    /// Evaluated while this node or any descendant is active. Only
    /// meaningful on compound nodes (and the root).
    pub(crate) global_transitions: Vec<Transition>,
}

impl StateNode {
    pub(crate) fn new(name: impl Into<String>, parent: Option<NodeId>) -> Self {
        Self {
            name: name.into(),
            parent,
            children: Vec::new(),
            default_child: None,
            context_keys: Vec::new(),
            on_enter: None,
            on_exit: None,
            on_tick: None,
            local_transitions: Vec::new(),
            global_transitions: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Whether this node hosts a child machine.
    pub fn is_compound(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn default_child(&self) -> Option<NodeId> {
        self.default_child
    }

    pub fn context_keys(&self) -> &[ContextKey] {
        &self.context_keys
    }

    pub fn local_transitions(&self) -> &[Transition] {
        &self.local_transitions
    }

    pub fn global_transitions(&self) -> &[Transition] {
        &self.global_transitions
    }
}

impl fmt::Debug for StateNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateNode")
            .field("name", &self.name)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("default_child", &self.default_child)
            .field("context_keys", &self.context_keys)
            .field("local_transitions", &self.local_transitions.len())
            .field("global_transitions", &self.global_transitions.len())
            .finish()
    }
}
