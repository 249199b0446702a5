//! Node/transistor graph structure.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use super::types::{NodeId, NodeState, TransistorId};
use crate::error::{ChipsimError, Result};
use crate::netlist::{NetlistAst, NodeRef, MAX_NODE_ID};

/// Static definition of one node, as supplied by the netlist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeDef {
    /// Static pullup flag
    pub pullup: bool,
}

/// Static definition of one transistor, as supplied by the netlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransistorDef {
    /// Transistor name
    pub name: String,
    /// Gate node id
    pub gate: usize,
    /// First terminal node id
    pub c1: usize,
    /// Second terminal node id
    pub c2: usize,
}

impl TransistorDef {
    /// Create a transistor definition.
    pub fn new(name: impl Into<String>, gate: usize, c1: usize, c2: usize) -> Self {
        Self {
            name: name.into(),
            gate,
            c1,
            c2,
        }
    }
}

/// Options applied while building a [`NetworkModel`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ModelOptions {
    /// Drop transistors that repeat an earlier gate and terminal pair.
    pub dedup_transistors: bool,
}

/// A node in the network.
#[derive(Debug, Clone)]
pub struct Node {
    /// Static pullup, or a pin driven high
    pub pullup: bool,
    /// Pin driven low
    pub pulldown: bool,
    /// Current logic state
    pub state: NodeState,
    /// Transistors gated by this node
    pub gates: Vec<TransistorId>,
    /// Transistors switching this node, in definition order
    pub terminals: Vec<TransistorId>,
}

/// A transistor in the network.
#[derive(Debug, Clone)]
pub struct Transistor {
    /// Transistor name
    pub name: String,
    /// Gate node
    pub gate: NodeId,
    /// First terminal
    pub c1: NodeId,
    /// Second terminal
    pub c2: NodeId,
    /// Whether the transistor currently conducts
    pub on: bool,
}

impl Transistor {
    /// The terminal on the other side of `node`.
    pub fn other_terminal(&self, node: NodeId) -> NodeId {
        if self.c1 == node {
            self.c2
        } else {
            self.c1
        }
    }
}

/// A complete network ready for simulation.
///
/// Only the `on` flags, node states and pin drive flags change after
/// construction.
#[derive(Debug, Clone)]
pub struct NetworkModel {
    pub(crate) nodes: Vec<Node>,
    pub(crate) transistors: Vec<Transistor>,
    pins: HashMap<String, NodeId>,
    ground: NodeId,
    power: NodeId,
}

impl NetworkModel {
    /// Build a network from the ordered node and transistor definitions.
    pub fn from_definitions(
        node_defs: &[NodeDef],
        transistor_defs: &[TransistorDef],
        pins: HashMap<String, NodeId>,
        ground: NodeId,
        power: NodeId,
    ) -> Result<Self> {
        Self::from_definitions_with_options(
            node_defs,
            transistor_defs,
            pins,
            ground,
            power,
            ModelOptions::default(),
        )
    }

    /// Build a network with explicit [`ModelOptions`].
    pub fn from_definitions_with_options(
        node_defs: &[NodeDef],
        transistor_defs: &[TransistorDef],
        pins: HashMap<String, NodeId>,
        ground: NodeId,
        power: NodeId,
        options: ModelOptions,
    ) -> Result<Self> {
        let num_nodes = node_defs.len();

        if ground.0 >= num_nodes || power.0 >= num_nodes {
            return Err(ChipsimError::topology(format!(
                "rails {} and {} must lie inside the {} node list",
                ground, power, num_nodes
            )));
        }
        if ground == power {
            return Err(ChipsimError::topology("ground and power must be different nodes"));
        }
        if let Some((name, id)) = pins.iter().find(|(_, id)| id.0 >= num_nodes) {
            return Err(ChipsimError::topology(format!(
                "pin '{}' names node {} outside the node list",
                name, id.0
            )));
        }

        let mut nodes: Vec<Node> = node_defs
            .iter()
            .map(|def| Node {
                pullup: def.pullup,
                pulldown: false,
                state: NodeState::FloatLow,
                gates: Vec::new(),
                terminals: Vec::new(),
            })
            .collect();

        for (rail, state) in [(ground, NodeState::Gnd), (power, NodeState::Vcc)] {
            let node = &mut nodes[rail.0];
            node.pullup = false;
            node.state = state;
        }

        let mut transistors = Vec::with_capacity(transistor_defs.len());
        let mut seen = HashSet::new();
        let mut removed = 0usize;

        for def in transistor_defs {
            for id in [def.gate, def.c1, def.c2] {
                if id >= num_nodes {
                    return Err(ChipsimError::InvalidTransistor {
                        name: def.name.clone(),
                        node: id,
                    });
                }
            }

            if options.dedup_transistors {
                let key = (def.gate, def.c1.min(def.c2), def.c1.max(def.c2));
                if !seen.insert(key) {
                    removed += 1;
                    continue;
                }
            }

            let id = TransistorId(transistors.len());
            nodes[def.gate].gates.push(id);
            nodes[def.c1].terminals.push(id);
            nodes[def.c2].terminals.push(id);
            transistors.push(Transistor {
                name: def.name.clone(),
                gate: NodeId(def.gate),
                c1: NodeId(def.c1),
                c2: NodeId(def.c2),
                on: false,
            });
        }

        debug!(
            nodes = nodes.len(),
            transistors = transistors.len(),
            duplicates_removed = removed,
            pins = pins.len(),
            "network model built"
        );

        Ok(Self {
            nodes,
            transistors,
            pins,
            ground,
            power,
        })
    }

    /// Build a network from a parsed netlist.
    pub fn from_ast(ast: NetlistAst) -> Result<Self> {
        Self::from_ast_with_options(ast, ModelOptions::default())
    }

    /// Build a network from a parsed netlist with explicit [`ModelOptions`].
    pub fn from_ast_with_options(ast: NetlistAst, options: ModelOptions) -> Result<Self> {
        let mut pins: HashMap<String, NodeId> = ast
            .names
            .iter()
            .map(|decl| (decl.name.clone(), NodeId(decl.id)))
            .collect();

        let resolve = |pins: &HashMap<String, NodeId>, node: &NodeRef| -> Result<usize> {
            match node {
                NodeRef::Id(id) => Ok(*id),
                NodeRef::Name(name) => pins
                    .get(name)
                    .map(|id| id.0)
                    .ok_or_else(|| ChipsimError::NodeNotFound { node: name.clone() }),
            }
        };

        let vss = ast
            .vss
            .as_ref()
            .ok_or(ChipsimError::MissingRail { rail: "vss" })?;
        let vcc = ast
            .vcc
            .as_ref()
            .ok_or(ChipsimError::MissingRail { rail: "vcc" })?;
        let ground = resolve(&pins, vss)?;
        let power = resolve(&pins, vcc)?;

        // Rails are addressable by their conventional names unless the
        // netlist already uses them.
        pins.entry("vss".to_string()).or_insert(NodeId(ground));
        pins.entry("vcc".to_string()).or_insert(NodeId(power));

        let transistor_defs = ast
            .transistors
            .iter()
            .map(|t| {
                Ok(TransistorDef {
                    name: t.name.clone(),
                    gate: resolve(&pins, &t.gate)?,
                    c1: resolve(&pins, &t.c1)?,
                    c2: resolve(&pins, &t.c2)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        // Every id mentioned anywhere is a node; gaps are plain nodes.
        let max_id = ast
            .nodes
            .iter()
            .map(|n| n.id)
            .chain(pins.values().map(|id| id.0))
            .chain(transistor_defs.iter().flat_map(|t| [t.gate, t.c1, t.c2]))
            .chain([ground, power])
            .max()
            .unwrap_or(0);
        let node_count = max_id
            .checked_add(1)
            .filter(|_| max_id <= MAX_NODE_ID)
            .ok_or_else(|| {
                ChipsimError::topology(format!(
                    "node id {} exceeds the limit of {}",
                    max_id, MAX_NODE_ID
                ))
            })?;

        let mut node_defs = vec![NodeDef::default(); node_count];
        for decl in &ast.nodes {
            node_defs[decl.id].pullup = decl.pullup;
        }

        Self::from_definitions_with_options(
            &node_defs,
            &transistor_defs,
            pins,
            NodeId(ground),
            NodeId(power),
            options,
        )
    }

    /// Number of nodes, rails included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of transistors.
    pub fn transistor_count(&self) -> usize {
        self.transistors.len()
    }

    /// The ground rail.
    pub fn ground(&self) -> NodeId {
        self.ground
    }

    /// The power rail.
    pub fn power(&self) -> NodeId {
        self.power
    }

    /// Check if a node is one of the two rails.
    pub fn is_rail(&self, node: NodeId) -> bool {
        node == self.ground || node == self.power
    }

    /// Get a node.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Get a transistor.
    pub fn transistor(&self, id: TransistorId) -> &Transistor {
        &self.transistors[id.0]
    }

    /// Iterate over all node ids, rails excluded.
    pub fn switchable_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len())
            .map(NodeId)
            .filter(move |&id| !self.is_rail(id))
    }

    /// Current state of a node.
    pub fn state(&self, id: NodeId) -> NodeState {
        self.nodes[id.0].state
    }

    /// Find a pin by name.
    pub fn find_pin(&self, name: &str) -> Option<NodeId> {
        self.pins.get(name).copied()
    }

    /// Look up a pin by name, failing with [`ChipsimError::UnknownPin`].
    pub fn pin(&self, name: &str) -> Result<NodeId> {
        self.find_pin(name)
            .ok_or_else(|| ChipsimError::unknown_pin(name))
    }

    /// Put every switchable node back to `FloatLow` and every transistor off.
    ///
    /// Pull flags are left alone: static pullups are part of the netlist and
    /// pin drives persist until the pin is driven again.
    pub fn reset_states(&mut self) {
        let (ground, power) = (self.ground, self.power);
        for (i, node) in self.nodes.iter_mut().enumerate() {
            node.state = if i == ground.0 {
                NodeState::Gnd
            } else if i == power.0 {
                NodeState::Vcc
            } else {
                NodeState::FloatLow
            };
        }
        for transistor in &mut self.transistors {
            transistor.on = false;
        }
    }
}
