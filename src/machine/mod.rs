//! Hierarchical state machine: nodes, triggers, transitions and the
//! tick-driven engine.
//!
//! A machine is a tree of named states. Leaf states are plain behavior
//! units; a state with children hosts a child machine with its own
//! default state and interrupt (global) transitions. One entity owns one
//! [`Machine`] instance; definitions ([`MachineDef`]) are immutable and
//! shared.

mod context;
mod engine;
mod log;
mod node;
mod transition;
mod trigger;

pub use context::{ContextKey, ContextValue, DataContext};
pub use engine::{
    Machine, MachineDef, MachineStatus, TickError, DEFAULT_MAX_TRANSITIONS_PER_TICK,
};
pub use log::{TransitionLog, TransitionRecord};
pub use node::{NodeHook, NodeId, StateNode, StatePath};
pub use transition::{Transition, TransitionSpec};
pub use trigger::{ConditionRegistry, InputPattern, Trigger};

pub(crate) use engine::ROOT;
pub(crate) use transition::sort_for_resolution;
