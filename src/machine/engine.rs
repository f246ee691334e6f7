//! The hierarchical state machine engine.
//!
//! A [`MachineDef`] is the immutable, validated definition (arena of
//! nodes plus transition tables); a [`Machine`] is one live instance of
//! it, owning the active path, data contexts and transition log for a
//! single entity. Definitions are cheaply shared between instances via
//! `Arc`.
//!
//! Resolution within a tick is fully synchronous: globals are checked
//! outermost-first, then locals from the active leaf outward; at most one
//! transition fires per machine level, and a runaway chain of immediate
//! transitions is cut off by a per-tick limit.

use super::context::DataContext;
use super::log::{TransitionLog, TransitionRecord};
use super::node::{NodeHook, NodeId, StateNode, StatePath};
use super::transition::Transition;
use super::trigger::{ConditionCache, ConditionRegistry};
use crate::config::ConfigError;
use crate::input::InputEvent;
use crate::sequence::SequenceTrigger;
use crate::snapshot::SnapshotError;
use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Default cap on transitions fired within a single tick.
pub const DEFAULT_MAX_TRANSITIONS_PER_TICK: usize = 8;

pub(crate) const ROOT: NodeId = 0;

/// Errors surfaced while ticking an otherwise valid machine.
#[derive(Debug, Error)]
pub enum TickError {
    #[error("machine is not active; call start() before tick()")]
    NotStarted,

    /// An immediate-transition cycle exceeded the per-tick limit. The
    /// machine is left in its last successfully entered state.
    #[error("transition limit ({limit}) exceeded on tick {tick}; machine left in '{state}'")]
    TransitionLimitExceeded {
        limit: usize,
        tick: u64,
        state: String,
    },
}

/// Observable lifecycle of a machine instance. The transitioning phase is
/// internal to a tick and never visible across ticks.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MachineStatus {
    /// Constructed; root not yet entered.
    Idle,
    /// Steady state between transitions.
    Active,
}

/// Immutable machine definition: the node arena and all transition
/// tables, fully resolved and sorted at build time.
pub struct MachineDef {
    pub(crate) nodes: Vec<StateNode>,
    pub(crate) max_transitions: usize,
}

impl std::fmt::Debug for MachineDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MachineDef")
            .field("nodes", &self.nodes.len())
            .field("max_transitions", &self.max_transitions)
            .finish()
    }
}

impl MachineDef {
    pub(crate) fn new(nodes: Vec<StateNode>, max_transitions: usize) -> Self {
        Self {
            nodes,
            max_transitions,
        }
    }

    pub fn node(&self, id: NodeId) -> &StateNode {
        &self.nodes[id]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Resolve a path of state names (starting at the root's children) to
    /// an arena index.
    pub fn resolve_path(&self, path: &StatePath) -> Option<NodeId> {
        let mut current = ROOT;
        for segment in path.segments() {
            current = *self.nodes[current]
                .children
                .iter()
                .find(|&&c| self.nodes[c].name == *segment)?;
        }
        if current == ROOT {
            None
        } else {
            Some(current)
        }
    }

    /// Chain of node ids from the root down to `id`, inclusive.
    pub(crate) fn chain_to(&self, id: NodeId) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut current = Some(id);
        while let Some(node) = current {
            chain.push(node);
            current = self.nodes[node].parent;
        }
        chain.reverse();
        chain
    }

    /// Deepest node reached by descending default children from `id`.
    pub(crate) fn leaf_under(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(child) = self.nodes[current].default_child {
            current = child;
        }
        current
    }

    /// Display path (names joined with `/`, root excluded).
    pub fn display_path(&self, id: NodeId) -> String {
        let names: Vec<&str> = self
            .chain_to(id)
            .into_iter()
            .filter(|&n| n != ROOT)
            .map(|n| self.nodes[n].name.as_str())
            .collect();
        names.join("/")
    }

    /// Every condition name referenced by any trigger in the definition.
    pub fn referenced_conditions(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .transitions()
            .filter_map(|t| t.trigger().condition_name())
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    /// Every sequence id referenced by any trigger in the definition.
    pub fn referenced_sequences(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .transitions()
            .filter_map(|t| t.trigger().sequence_id())
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    fn transitions(&self) -> impl Iterator<Item = &Transition> {
        self.nodes
            .iter()
            .flat_map(|n| n.local_transitions.iter().chain(n.global_transitions.iter()))
    }
}

struct Fired {
    target: NodeId,
    advance_time: bool,
    trigger: String,
}

/// One live machine instance, owned by one entity.
///
/// All mutation happens inside [`start`](Machine::start) and
/// [`tick`](Machine::tick); every query method is read-only, which is the
/// contract external collaborators (e.g. a hit module reading the active
/// path to toggle hit volumes) rely on.
pub struct Machine {
    def: Arc<MachineDef>,
    conditions: ConditionRegistry,
    id: Uuid,
    status: MachineStatus,
    active: Vec<NodeId>,
    contexts: Vec<Option<DataContext>>,
    log: TransitionLog,
    tick_count: u64,
}

impl Machine {
    /// Create an instance of a validated definition.
    ///
    /// Every condition name referenced by the definition's triggers must
    /// already be registered; missing names are reported together, as
    /// configuration errors.
    pub fn new(
        def: Arc<MachineDef>,
        conditions: ConditionRegistry,
    ) -> Result<Self, Vec<ConfigError>> {
        let missing: Vec<ConfigError> = def
            .referenced_conditions()
            .into_iter()
            .filter(|name| !conditions.contains(name))
            .map(|name| ConfigError::UnknownCondition {
                condition: name.to_string(),
            })
            .collect();
        if !missing.is_empty() {
            return Err(missing);
        }

        let contexts = vec![None; def.nodes.len()];
        Ok(Self {
            def,
            conditions,
            id: Uuid::new_v4(),
            status: MachineStatus::Idle,
            active: Vec::new(),
            contexts,
            log: TransitionLog::new(),
            tick_count: 0,
        })
    }

    /// Enter the root's default chain. Idempotent once active.
    pub fn start(&mut self) {
        if self.status == MachineStatus::Active {
            return;
        }
        let def = Arc::clone(&self.def);
        let leaf = def.leaf_under(ROOT);
        for node in def.chain_to(leaf) {
            self.contexts[node] = Some(DataContext::from_declared(def.node(node).context_keys()));
            run_hook(&def.node(node).on_enter, &mut self.contexts[node]);
            self.active.push(node);
        }
        self.status = MachineStatus::Active;
    }

    /// Advance one tick: resolve transitions against this tick's input
    /// events, sequence triggers and condition predicates.
    ///
    /// Returns the number of transitions fired. "Nothing fired" is a
    /// normal outcome (the active path's tick hooks run instead), not an
    /// error.
    pub fn tick(
        &mut self,
        events: &[InputEvent],
        sequences: &[SequenceTrigger],
    ) -> Result<usize, TickError> {
        if self.status != MachineStatus::Active {
            return Err(TickError::NotStarted);
        }
        self.tick_count += 1;
        let tick = self.tick_count;
        let def = Arc::clone(&self.def);
        let mut conditions = ConditionCache::new(&self.conditions);

        let mut fired = 0usize;
        let mut scope_pos = 0usize;

        loop {
            let choice = Self::resolve_once(
                &def,
                &self.active,
                scope_pos,
                events,
                sequences,
                &mut conditions,
            );
            let Some(choice) = choice else { break };

            if fired == def.max_transitions {
                return Err(TickError::TransitionLimitExceeded {
                    limit: def.max_transitions,
                    tick,
                    state: def.display_path(*self.active.last().unwrap_or(&ROOT)),
                });
            }

            let from = def.display_path(*self.active.last().unwrap_or(&ROOT));
            Self::apply_fire(&def, &mut self.active, &mut self.contexts, choice.target);
            let to = def.display_path(*self.active.last().unwrap_or(&ROOT));
            self.log = self.log.record(TransitionRecord {
                from,
                to,
                trigger: choice.trigger,
                tick,
                timestamp: Utc::now(),
            });
            fired += 1;

            // Descend into the entered child machine only when the
            // transition advances time; otherwise the child must not see
            // the inputs that caused entry until next tick.
            if choice.advance_time && def.node(choice.target).is_compound() {
                match self.active.iter().position(|&n| n == choice.target) {
                    Some(pos) => scope_pos = pos,
                    None => break,
                }
            } else {
                break;
            }
        }

        if fired == 0 {
            // Tick actions run innermost first, and only on quiet ticks.
            for &node in self.active.clone().iter().rev() {
                run_hook(&def.node(node).on_tick, &mut self.contexts[node]);
            }
        }

        Ok(fired)
    }

    /// One resolution pass over the active path, restricted to the
    /// subtree rooted at `active[scope_pos]`: globals outermost-first,
    /// then locals from the leaf outward. Tables are pre-sorted by
    /// priority (declaration order on ties).
    fn resolve_once(
        def: &MachineDef,
        active: &[NodeId],
        scope_pos: usize,
        events: &[InputEvent],
        sequences: &[SequenceTrigger],
        conditions: &mut ConditionCache<'_>,
    ) -> Option<Fired> {
        for &node in &active[scope_pos..] {
            for transition in def.node(node).global_transitions() {
                if transition
                    .trigger()
                    .is_satisfied(events, sequences, conditions)
                {
                    return Some(Fired {
                        target: transition.target(),
                        advance_time: transition.advance_time(),
                        trigger: transition.trigger().to_string(),
                    });
                }
            }
        }

        for &node in active[scope_pos..].iter().rev() {
            for transition in def.node(node).local_transitions() {
                if transition
                    .trigger()
                    .is_satisfied(events, sequences, conditions)
                {
                    return Some(Fired {
                        target: transition.target(),
                        advance_time: transition.advance_time(),
                        trigger: transition.trigger().to_string(),
                    });
                }
            }
        }

        None
    }

    /// Exit up to (excluding) the common ancestor with the target, then
    /// enter down to the target's default leaf. Exited contexts are
    /// discarded, entered ones initialized from declared defaults; the
    /// whole rewrite happens before the next resolution pass, so it is
    /// atomic from any observer's point of view.
    fn apply_fire(
        def: &MachineDef,
        active: &mut Vec<NodeId>,
        contexts: &mut [Option<DataContext>],
        target: NodeId,
    ) {
        let leaf = active.last().copied().unwrap_or(ROOT);
        let target_leaf = def.leaf_under(target);
        let new_chain = def.chain_to(target_leaf);

        // Deepest node common to both paths. A transition targeting the
        // current leaf re-enters it (exit + enter) rather than no-opping.
        let mut lca_pos = 0;
        while lca_pos + 1 < active.len()
            && lca_pos + 1 < new_chain.len()
            && active[lca_pos + 1] == new_chain[lca_pos + 1]
        {
            lca_pos += 1;
        }
        if target_leaf == leaf && lca_pos > 0 {
            lca_pos -= 1;
        }

        for &node in active[lca_pos + 1..].iter().rev() {
            run_hook(&def.node(node).on_exit, &mut contexts[node]);
            contexts[node] = None;
        }

        for &node in &new_chain[lca_pos + 1..] {
            contexts[node] = Some(DataContext::from_declared(def.node(node).context_keys()));
            run_hook(&def.node(node).on_enter, &mut contexts[node]);
        }

        *active = new_chain;
    }

    pub fn status(&self) -> MachineStatus {
        self.status
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn def(&self) -> &Arc<MachineDef> {
        &self.def
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Active state names from root to leaf (root itself excluded).
    pub fn active_path(&self) -> Vec<&str> {
        self.active
            .iter()
            .filter(|&&n| n != ROOT)
            .map(|&n| self.def.node(n).name())
            .collect()
    }

    /// Display form of the active path, e.g. `"grounded/attack/punch"`.
    pub fn active_path_display(&self) -> String {
        self.active_path().join("/")
    }

    /// Whether a state of the given name is anywhere on the active path.
    pub fn is_in(&self, name: &str) -> bool {
        self.active
            .iter()
            .any(|&n| n != ROOT && self.def.node(n).name() == name)
    }

    /// Read-only context of an active node, by state name. `None` when
    /// the node is not active (its context does not exist then).
    pub fn context(&self, name: &str) -> Option<&DataContext> {
        self.active
            .iter()
            .find(|&&n| n != ROOT && self.def.node(n).name() == name)
            .and_then(|&n| self.contexts[n].as_ref())
    }

    /// Mutable context access for the host's own per-frame updates (e.g.
    /// a charge counter incremented by gameplay code).
    pub fn context_mut(&mut self, name: &str) -> Option<&mut DataContext> {
        let id = *self
            .active
            .iter()
            .find(|&&n| n != ROOT && self.def.node(n).name() == name)?;
        self.contexts[id].as_mut()
    }

    pub fn log(&self) -> &TransitionLog {
        &self.log
    }

    pub(crate) fn capture_contexts(&self) -> Vec<(String, DataContext)> {
        self.active
            .iter()
            .filter(|&&n| n != ROOT)
            .filter_map(|&n| {
                self.contexts[n]
                    .clone()
                    .map(|c| (self.def.node(n).name().to_string(), c))
            })
            .collect()
    }

    /// Rebuild instance state from a snapshot. Hooks do not run; a
    /// restore is a state assignment, not a replay.
    pub(crate) fn restore(
        &mut self,
        leaf_path: &StatePath,
        contexts: &[(String, DataContext)],
        tick: u64,
    ) -> Result<(), SnapshotError> {
        let target = self
            .def
            .resolve_path(leaf_path)
            .ok_or_else(|| SnapshotError::UnknownState {
                state: leaf_path.to_string(),
            })?;
        let leaf = self.def.leaf_under(target);
        let chain = self.def.chain_to(leaf);

        for slot in self.contexts.iter_mut() {
            *slot = None;
        }
        for &node in &chain {
            let mut context = DataContext::from_declared(self.def.node(node).context_keys());
            if let Some((_, saved)) = contexts
                .iter()
                .find(|(name, _)| name == self.def.node(node).name())
            {
                for (key, value) in saved.iter() {
                    // Only declared keys survive a restore.
                    context.set(key, value.clone());
                }
            }
            self.contexts[node] = Some(context);
        }
        self.active = chain;
        self.tick_count = tick;
        self.status = MachineStatus::Active;
        Ok(())
    }
}

fn run_hook(hook: &Option<NodeHook>, context: &mut Option<DataContext>) {
    if let (Some(hook), Some(context)) = (hook, context.as_mut()) {
        hook(context);
    }
}
