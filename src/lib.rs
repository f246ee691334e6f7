//! Strikeframe: a deterministic input-and-state core for combat games.
//!
//! Strikeframe turns raw per-frame device samples into logical input
//! events, recognizes timed input sequences (combos), and drives a
//! hierarchical state machine per entity, all inside a single synchronous
//! tick with no internal clocks or callbacks. Time is whatever the host
//! says it is, which is what makes replays and rollback possible.
//!
//! # Core Concepts
//!
//! - **Recognizer**: binds raw device sources to logical inputs and emits
//!   press/release events on phase transitions
//! - **Sequences**: time-windowed input patterns, matched with zero-frame
//!   latency on the final event
//! - **Machine**: a tree of states where compound states host child
//!   machines with their own defaults and interrupts
//! - **Snapshots**: full runtime state capture and restore, for rollback
//!   and replay debugging
//!
//! # Example
//!
//! ```rust
//! use strikeframe::builder::{MachineBuilder, StateBuilder, TransitionBuilder};
//! use strikeframe::input::{BindingTable, RawSample};
//! use strikeframe::machine::{ConditionRegistry, Trigger};
//! use strikeframe::runtime::Runtime;
//!
//! let mut bindings = BindingTable::new();
//! bindings.bind_button("punch", "key_z");
//!
//! let machine = MachineBuilder::new()
//!     .state(StateBuilder::new("idle").transition(
//!         TransitionBuilder::new().on(Trigger::press("punch")).to("jab"),
//!     ))
//!     .state(StateBuilder::new("jab"))
//!     .initial("idle")
//!     .build()
//!     .unwrap();
//!
//! let mut runtime =
//!     Runtime::new(bindings, Vec::new(), machine, ConditionRegistry::new()).unwrap();
//!
//! let mut raw = RawSample::new();
//! raw.press("key_z");
//! runtime.tick(&raw, 16).unwrap();
//! assert_eq!(runtime.active_path(), vec!["jab"]);
//! ```

pub mod builder;
pub mod config;
pub mod input;
pub mod machine;
pub mod runtime;
pub mod sequence;
pub mod snapshot;

// Re-export the types most hosts touch every frame.
pub use config::{ConfigError, RuntimeConfig};
pub use input::{BindingTable, InputEvent, RawSample};
pub use machine::{ConditionRegistry, Machine, MachineDef, TickError, Trigger};
pub use runtime::{Runtime, TickReport};
pub use sequence::{SequenceDefinition, SequenceMatcher, SequenceTrigger};
pub use snapshot::{Snapshot, SnapshotError};
