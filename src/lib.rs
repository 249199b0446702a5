//! # Chipsim Core
//!
//! A switch-level simulator for NMOS microprocessors.
//!
//! This library provides:
//! - A text format for transistor netlists extracted from die images
//! - A node/transistor network model with six-valued node states
//! - A relaxation engine that settles the network after every stimulus
//! - A stepping harness that clocks the chip and serves its memory bus
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`netlist`] - Lexer and parser for the netlist format
//! - [`network`] - Network graph representation and validation
//! - [`engine`] - Group resolution, switching and the relaxation loop
//! - [`harness`] - Half-cycle stepping against a memory bus
//!
//! ## Usage
//!
//! ### Native CLI
//!
//! ```bash
//! chipsim 6502.net --program test.bin --load-address 0x0400 --half-cycles 2000
//! ```
//!
//! ### Library
//!
//! ```no_run
//! use chipsim_core::{netlist, NetworkModel, ResetSequence, Simulator};
//!
//! # fn main() -> chipsim_core::Result<()> {
//! let text = std::fs::read_to_string("6502.net").unwrap_or_default();
//! let model = NetworkModel::from_ast(netlist::parse(&text)?)?;
//! let mut sim = Simulator::new(model);
//! sim.reset_network(&ResetSequence::mos6502())?;
//! let a = sim.read_bit_field("a", 8)?;
//! # let _ = a;
//! # Ok(())
//! # }
//! ```
//!
//! ## Simulation Method
//!
//! Every node holds one of six states: ground, power, pulled up, pulled
//! down, floating high or floating low. A stimulus queues nodes for
//! recalculation. For each queued node:
//!
//! 1. Collect the electrical group reachable through conducting transistors
//! 2. Resolve the group's shared state from its strongest member
//! 3. Assign it to every member and re-evaluate the transistors they gate
//!
//! Transistors that switch queue their terminals for the next pass. The loop
//! ends when a pass queues nothing, or at the pass cap for oscillating
//! networks.

pub mod engine;
pub mod error;
pub mod harness;
pub mod netlist;
pub mod network;

// Re-export main types for convenience
pub use engine::{EngineConfig, ResetSequence, SettleReport, Simulator};
pub use error::{ChipsimError, Result};
pub use harness::{BusPins, Memory, Stepper};
pub use network::{NetworkModel, NodeId, NodeState};

// WASM bindings
#[cfg(feature = "wasm")]
mod wasm;

#[cfg(feature = "wasm")]
pub use wasm::WasmChipSim;
