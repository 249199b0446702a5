//! Switch-level simulation engine.
//!
//! The engine propagates a stimulus through the network until it settles:
//!
//! 1. A pin drive or a switching transistor queues nodes on a work list.
//! 2. Each queued node's electrical group is collected and resolved to one
//!    shared state (ground, then power, then the first pull found, then
//!    floating charge).
//! 3. Every member takes that state and re-evaluates the transistors it
//!    gates; transistors that switch queue their terminals for the next pass.
//!
//! A settle stops once a pass queues nothing, or after
//! [`DEFAULT_MAX_PASSES`] passes (configurable through [`EngineConfig`]) when
//! the network oscillates.

mod group;
mod relax;
mod reset;
mod simulator;
mod switch;

pub use group::{GroupResolver, GroupValue};
pub use relax::{Relaxation, SettleReport, WorkList};
pub use reset::{ResetReport, ResetSequence};
pub use simulator::{EngineConfig, IndeterminatePolicy, Simulator};
pub use switch::{float_node, on_gate_changed, switch_rail_gates};

/// Default pass cap for one settle.
pub const DEFAULT_MAX_PASSES: usize = 100;
