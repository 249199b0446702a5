//! Pin driver and observer interface over a relaxing network.

use tracing::debug;

use super::relax::{Relaxation, SettleReport, WorkList};
use super::switch;
use super::DEFAULT_MAX_PASSES;
use crate::error::{ChipsimError, Result};
use crate::network::{NetworkModel, NodeId, NodeState};

/// Recovery value for a group with no ground, power, pull or floating member.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IndeterminatePolicy {
    /// Float with the polarity the seed node read before resolution.
    #[default]
    FloatSeedPolarity,
    /// Always float low.
    FloatLow,
}

impl IndeterminatePolicy {
    /// The state assigned to an indeterminate group recalculated from a seed
    /// that was in `seed_state`.
    pub fn fallback(self, seed_state: NodeState) -> NodeState {
        match self {
            Self::FloatSeedPolarity if seed_state.is_high() => NodeState::FloatHigh,
            Self::FloatSeedPolarity | Self::FloatLow => NodeState::FloatLow,
        }
    }
}

/// Configuration for the simulator.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Pass cap for one settle.
    pub max_passes: usize,
    /// Fallback for indeterminate groups.
    pub indeterminate: IndeterminatePolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_passes: DEFAULT_MAX_PASSES,
            indeterminate: IndeterminatePolicy::default(),
        }
    }
}

impl EngineConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the pass cap.
    ///
    /// Networks with long ripple chains may need more than the default; a
    /// ring oscillator never settles whatever the cap.
    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = max_passes;
        self
    }

    /// Set the indeterminate group policy.
    pub fn with_indeterminate_policy(mut self, policy: IndeterminatePolicy) -> Self {
        self.indeterminate = policy;
        self
    }
}

/// The switch-level simulator.
#[derive(Debug)]
pub struct Simulator {
    pub(super) model: NetworkModel,
    relax: Relaxation,
    config: EngineConfig,
}

impl Simulator {
    /// Create a simulator with the default configuration.
    pub fn new(model: NetworkModel) -> Self {
        let relax = Relaxation::new(&model);
        Self {
            model,
            relax,
            config: EngineConfig::default(),
        }
    }

    /// Create a simulator with a custom configuration.
    pub fn with_config(model: NetworkModel, config: EngineConfig) -> Result<Self> {
        if config.max_passes == 0 {
            return Err(ChipsimError::invalid_param("max_passes must be at least 1"));
        }
        let relax = Relaxation::new(&model);
        Ok(Self {
            model,
            relax,
            config,
        })
    }

    /// The simulated network.
    pub fn model(&self) -> &NetworkModel {
        &self.model
    }

    /// The active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Relax the network starting from `seeds`.
    ///
    /// Seeds outside the network are ignored.
    pub fn settle(&mut self, seeds: &[NodeId]) -> SettleReport {
        self.relax.settle(
            &mut self.model,
            seeds.iter().copied(),
            self.config.max_passes,
            self.config.indeterminate,
        )
    }

    /// Bring rail-gated transistors in line with the rails, then recalculate
    /// every switchable node.
    pub fn settle_all(&mut self) -> SettleReport {
        let mut primed = WorkList::new(&self.model);
        switch::switch_rail_gates(&mut self.model, &mut primed);
        debug!(rail_gated = primed.len(), "settling every node");

        let seeds: Vec<NodeId> = self.model.switchable_nodes().collect();
        self.settle(&seeds)
    }

    /// Force a node high or low and settle from it.
    pub fn set_node(&mut self, node: NodeId, high: bool) -> Result<SettleReport> {
        self.check_drivable(node)?;
        self.apply_drive(node, high);
        Ok(self.settle(&[node]))
    }

    /// Whether a node currently reads as logic high.
    ///
    /// Nodes outside the network read low.
    pub fn is_node_high(&self, node: NodeId) -> bool {
        self.model
            .nodes
            .get(node.0)
            .map_or(false, |n| n.state.is_high())
    }

    /// Drive a named pin high and settle.
    pub fn drive_high(&mut self, name: &str) -> Result<SettleReport> {
        let node = self.model.pin(name)?;
        self.set_node(node, true)
    }

    /// Drive a named pin low and settle.
    pub fn drive_low(&mut self, name: &str) -> Result<SettleReport> {
        let node = self.model.pin(name)?;
        self.set_node(node, false)
    }

    /// Whether a named pin reads as logic high.
    pub fn read_logic_high(&self, name: &str) -> Result<bool> {
        Ok(self.is_node_high(self.model.pin(name)?))
    }

    /// State of a named pin.
    pub fn node_state(&self, name: &str) -> Result<NodeState> {
        Ok(self.model.state(self.model.pin(name)?))
    }

    /// Resolve the pins `prefix0 .. prefix{width-1}`, bit 0 first.
    pub fn bit_pins(&self, prefix: &str, width: usize) -> Result<Vec<NodeId>> {
        if !(1..=32).contains(&width) {
            return Err(ChipsimError::invalid_param(format!(
                "bit field width {} is outside 1..=32",
                width
            )));
        }
        (0..width)
            .map(|bit| self.model.pin(&format!("{}{}", prefix, bit)))
            .collect()
    }

    /// Compose the pins `prefix0 .. prefix{width-1}` into an integer,
    /// bit 0 least significant.
    pub fn read_bit_field(&self, prefix: &str, width: usize) -> Result<u32> {
        let nodes = self.bit_pins(prefix, width)?;
        Ok(self.read_nodes(&nodes))
    }

    /// Drive the pins `prefix0 .. prefix{width-1}` from `value`, then settle
    /// once from all of them.
    pub fn drive_bit_field(
        &mut self,
        prefix: &str,
        width: usize,
        value: u32,
    ) -> Result<SettleReport> {
        let nodes = self.bit_pins(prefix, width)?;
        self.drive_nodes(&nodes, value)
    }

    /// Compose node levels into an integer, first node least significant.
    ///
    /// Nodes past the 32nd are ignored.
    pub fn read_nodes(&self, nodes: &[NodeId]) -> u32 {
        nodes
            .iter()
            .take(u32::BITS as usize)
            .enumerate()
            .filter(|&(_, &node)| self.is_node_high(node))
            .fold(0, |acc, (bit, _)| acc | (1 << bit))
    }

    /// Drive nodes from the bits of `value`, first node least significant,
    /// then settle once from all of them.
    pub fn drive_nodes(&mut self, nodes: &[NodeId], value: u32) -> Result<SettleReport> {
        for &node in nodes {
            self.check_drivable(node)?;
        }
        for (bit, &node) in nodes.iter().enumerate() {
            self.apply_drive(node, value.checked_shr(bit as u32).unwrap_or(0) & 1 == 1);
        }
        Ok(self.settle(nodes))
    }

    /// Resolve a pin that may be driven.
    pub(crate) fn drivable_pin(&self, name: &str) -> Result<NodeId> {
        let node = self.model.pin(name)?;
        self.check_drivable(node)?;
        Ok(node)
    }

    fn check_drivable(&self, node: NodeId) -> Result<()> {
        if node.0 >= self.model.node_count() {
            return Err(ChipsimError::NodeNotFound {
                node: node.to_string(),
            });
        }
        if self.model.is_rail(node) {
            return Err(ChipsimError::topology(format!("rail {} cannot be driven", node)));
        }
        Ok(())
    }

    fn apply_drive(&mut self, node: NodeId, high: bool) {
        let node = &mut self.model.nodes[node.0];
        node.pullup = high;
        node.pulldown = !high;
    }
}
