//! Builders for states and machine definitions.
//!
//! A definition is assembled from nested [`StateBuilder`]s and finalized
//! by [`MachineBuilder::build`], which flattens the tree into the node
//! arena, resolves every transition target and reports all configuration
//! errors together rather than stopping at the first one.

use super::transition::TransitionBuilder;
use crate::config::ConfigError;
use crate::machine::{
    sort_for_resolution, ContextKey, ContextValue, DataContext, MachineDef, NodeHook, NodeId,
    StateNode, StatePath, Transition, DEFAULT_MAX_TRANSITIONS_PER_TICK, ROOT,
};
use std::sync::Arc;

/// Builder for a single state, possibly with nested children.
pub struct StateBuilder {
    name: String,
    initial: Option<String>,
    children: Vec<StateBuilder>,
    context_keys: Vec<ContextKey>,
    on_enter: Option<NodeHook>,
    on_exit: Option<NodeHook>,
    on_tick: Option<NodeHook>,
    locals: Vec<TransitionBuilder>,
    globals: Vec<TransitionBuilder>,
}

impl StateBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            initial: None,
            children: Vec::new(),
            context_keys: Vec::new(),
            on_enter: None,
            on_exit: None,
            on_tick: None,
            locals: Vec::new(),
            globals: Vec::new(),
        }
    }

    /// Name the default child entered when this state is entered.
    /// Required for states with children.
    pub fn initial(mut self, name: impl Into<String>) -> Self {
        self.initial = Some(name.into());
        self
    }

    /// Add a child state, making this state a child machine root.
    pub fn state(mut self, child: StateBuilder) -> Self {
        self.children.push(child);
        self
    }

    /// Declare a context key initialized to `default` each time this
    /// state is entered.
    pub fn context_key(mut self, name: impl Into<String>, default: ContextValue) -> Self {
        self.context_keys.push(ContextKey {
            name: name.into(),
            default,
        });
        self
    }

    pub fn on_enter<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut DataContext) + Send + Sync + 'static,
    {
        self.on_enter = Some(Arc::new(hook));
        self
    }

    pub fn on_exit<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut DataContext) + Send + Sync + 'static,
    {
        self.on_exit = Some(Arc::new(hook));
        self
    }

    pub fn on_tick<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut DataContext) + Send + Sync + 'static,
    {
        self.on_tick = Some(Arc::new(hook));
        self
    }

    /// Add a local transition, evaluated while this state is active.
    pub fn transition(mut self, transition: TransitionBuilder) -> Self {
        self.locals.push(transition);
        self
    }

    /// Add an interrupt transition, evaluated while this state or any
    /// descendant is active.
    pub fn global(mut self, transition: TransitionBuilder) -> Self {
        self.globals.push(transition);
        self
    }
}

/// Builder for a whole machine definition with a fluent API.
pub struct MachineBuilder {
    root: StateBuilder,
    max_transitions: usize,
}

impl MachineBuilder {
    pub fn new() -> Self {
        Self {
            root: StateBuilder::new(""),
            max_transitions: DEFAULT_MAX_TRANSITIONS_PER_TICK,
        }
    }

    /// Add a top-level state.
    pub fn state(mut self, state: StateBuilder) -> Self {
        self.root = self.root.state(state);
        self
    }

    /// Name the top-level state entered on start (required).
    pub fn initial(mut self, name: impl Into<String>) -> Self {
        self.root = self.root.initial(name);
        self
    }

    /// Add a machine-wide interrupt transition.
    pub fn global(mut self, transition: TransitionBuilder) -> Self {
        self.root = self.root.global(transition);
        self
    }

    /// Override the per-tick transition limit.
    pub fn max_transitions(mut self, limit: usize) -> Self {
        self.max_transitions = limit;
        self
    }

    /// Flatten, resolve and validate the definition. All errors found are
    /// returned together.
    pub fn build(self) -> Result<MachineDef, Vec<ConfigError>> {
        let mut errors = Vec::new();
        let mut nodes: Vec<StateNode> = Vec::new();
        let mut pending: Vec<Pending> = Vec::new();

        flatten(self.root, None, &mut nodes, &mut pending, &mut errors);

        if nodes[ROOT].children.is_empty() {
            errors.push(ConfigError::EmptyMachine);
        }

        for entry in pending {
            let owner = owner_name(&nodes, entry.id);

            let children: Vec<NodeId> = nodes[entry.id].children.clone();
            match (&entry.initial, children.is_empty()) {
                (None, false) => errors.push(ConfigError::MissingInitial {
                    state: owner.clone(),
                }),
                (Some(name), _) => {
                    match children.iter().find(|&&c| nodes[c].name == *name) {
                        Some(&child) => nodes[entry.id].default_child = Some(child),
                        None => errors.push(ConfigError::UnknownInitial {
                            state: owner.clone(),
                            initial: name.clone(),
                        }),
                    }
                }
                (None, true) => {}
            }

            nodes[entry.id].local_transitions =
                resolve_table(entry.locals, &owner, &nodes, &mut errors);
            let globals = resolve_table(entry.globals, &owner, &nodes, &mut errors);
            reject_ambiguous_globals(&globals, &owner, &mut errors);
            nodes[entry.id].global_transitions = globals;
        }

        if errors.is_empty() {
            Ok(MachineDef::new(nodes, self.max_transitions))
        } else {
            Err(errors)
        }
    }
}

impl Default for MachineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

struct Pending {
    id: NodeId,
    initial: Option<String>,
    locals: Vec<TransitionBuilder>,
    globals: Vec<TransitionBuilder>,
}

fn flatten(
    builder: StateBuilder,
    parent: Option<NodeId>,
    nodes: &mut Vec<StateNode>,
    pending: &mut Vec<Pending>,
    errors: &mut Vec<ConfigError>,
) -> NodeId {
    let id = nodes.len();
    let mut node = StateNode::new(builder.name, parent);
    node.context_keys = builder.context_keys;
    node.on_enter = builder.on_enter;
    node.on_exit = builder.on_exit;
    node.on_tick = builder.on_tick;
    nodes.push(node);
    pending.push(Pending {
        id,
        initial: builder.initial,
        locals: builder.locals,
        globals: builder.globals,
    });

    for child in builder.children {
        let duplicate = nodes[id]
            .children
            .iter()
            .any(|&c| nodes[c].name == child.name);
        if duplicate {
            errors.push(ConfigError::DuplicateState {
                path: child_path(nodes, id, &child.name),
            });
            continue;
        }
        let child_id = flatten(child, Some(id), nodes, pending, errors);
        nodes[id].children.push(child_id);
    }

    id
}

fn resolve_table(
    builders: Vec<TransitionBuilder>,
    owner: &str,
    nodes: &[StateNode],
    errors: &mut Vec<ConfigError>,
) -> Vec<Transition> {
    let mut table = Vec::new();
    for builder in builders {
        let spec = match builder.into_spec(owner) {
            Ok(spec) => spec,
            Err(error) => {
                errors.push(error);
                continue;
            }
        };
        match resolve(nodes, &spec.target) {
            Some(target) => table.push(Transition {
                trigger: spec.trigger,
                target,
                target_path: spec.target,
                priority: spec.priority,
                advance_time: spec.advance_time,
            }),
            None => errors.push(ConfigError::UnknownTarget {
                state: owner.to_string(),
                target: spec.target.to_string(),
            }),
        }
    }
    sort_for_resolution(&mut table);
    table
}

/// Two global transitions at the same scope with equal priority and the
/// same trigger have no defined winner, so the configuration is rejected.
/// Distinct condition names count as distinct triggers; the predicates
/// behind them are opaque here.
fn reject_ambiguous_globals(table: &[Transition], owner: &str, errors: &mut Vec<ConfigError>) {
    for (i, a) in table.iter().enumerate() {
        let clash = table[i + 1..]
            .iter()
            .any(|b| b.priority == a.priority && b.trigger == a.trigger);
        if clash {
            errors.push(ConfigError::AmbiguousGlobal {
                state: owner.to_string(),
                trigger: a.trigger.to_string(),
            });
        }
    }
}

/// Resolve an absolute state path against a partially built arena.
fn resolve(nodes: &[StateNode], path: &StatePath) -> Option<NodeId> {
    if path.is_empty() {
        return None;
    }
    let mut current = ROOT;
    for segment in path.segments() {
        current = *nodes[current]
            .children
            .iter()
            .find(|&&c| nodes[c].name == *segment)?;
    }
    Some(current)
}

fn owner_name(nodes: &[StateNode], id: NodeId) -> String {
    if id == ROOT {
        return "<root>".to_string();
    }
    let mut names = Vec::new();
    let mut current = Some(id);
    while let Some(node) = current {
        if node != ROOT {
            names.push(nodes[node].name.clone());
        }
        current = nodes[node].parent;
    }
    names.reverse();
    names.join("/")
}

fn child_path(nodes: &[StateNode], parent: NodeId, name: &str) -> String {
    if parent == ROOT {
        name.to_string()
    } else {
        format!("{}/{}", owner_name(nodes, parent), name)
    }
}
