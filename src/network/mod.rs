//! Network model: the static node/transistor graph.
//!
//! This module holds the in-memory form of a netlist after loading. The
//! [`NetworkModel`] owns index-addressed node and transistor arrays plus the
//! pin-name table; only node states, pin drive flags and transistor `on`
//! flags change once it is built.

mod model;
mod types;
mod validate;

pub use model::{ModelOptions, NetworkModel, Node, NodeDef, Transistor, TransistorDef};
pub use types::*;
pub use validate::validate_model;
