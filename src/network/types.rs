//! Core types for the node/transistor graph.

use std::fmt;

/// A unique identifier for a node in the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "N{}", self.0)
    }
}

/// A unique identifier for a transistor, its index in definition order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransistorId(pub usize);

impl fmt::Display for TransistorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

/// Logic state of a node.
///
/// Ordered from driven to floating: rails, weak pulls, then retained charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeState {
    /// Connected to the ground rail
    Gnd,
    /// Connected to the power rail
    Vcc,
    /// Held high by a pullup
    Pullup,
    /// Held low by a pulldown
    Pulldown,
    /// Disconnected, retaining a high charge
    FloatHigh,
    /// Disconnected, retaining a low charge
    FloatLow,
}

impl NodeState {
    /// Whether the state reads as logic high.
    pub fn is_high(self) -> bool {
        matches!(
            self,
            NodeState::Vcc | NodeState::Pullup | NodeState::FloatHigh
        )
    }

    /// Whether the state is one of the two floating states.
    pub fn is_floating(self) -> bool {
        matches!(self, NodeState::FloatHigh | NodeState::FloatLow)
    }

    /// The state left behind when the node loses its driver.
    ///
    /// Hard lows become `FloatLow`, hard highs become `FloatHigh`; floating
    /// states are unchanged.
    pub fn floated(self) -> Self {
        match self {
            NodeState::Gnd | NodeState::Pulldown => NodeState::FloatLow,
            NodeState::Vcc | NodeState::Pullup => NodeState::FloatHigh,
            NodeState::FloatHigh | NodeState::FloatLow => self,
        }
    }
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NodeState::Gnd => "gnd",
            NodeState::Vcc => "vcc",
            NodeState::Pullup => "pu",
            NodeState::Pulldown => "pd",
            NodeState::FloatHigh => "fh",
            NodeState::FloatLow => "fl",
        };
        f.write_str(s)
    }
}
