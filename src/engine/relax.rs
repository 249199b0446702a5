//! Fixed-point relaxation of the network.

use tracing::{trace, warn};

use super::group::{GroupResolver, GroupValue};
use super::switch;
use super::IndeterminatePolicy;
use crate::error::{ChipsimError, Result};
use crate::network::{NetworkModel, NodeId};

/// Ordered, deduplicated set of nodes awaiting recalculation.
///
/// Rails and ids outside the network are silently refused.
#[derive(Debug, Clone)]
pub struct WorkList {
    items: Vec<NodeId>,
    queued: Vec<bool>,
    ground: NodeId,
    power: NodeId,
}

impl WorkList {
    /// Create an empty work list for a network.
    pub fn new(model: &NetworkModel) -> Self {
        Self {
            items: Vec::new(),
            queued: vec![false; model.node_count()],
            ground: model.ground(),
            power: model.power(),
        }
    }

    /// Queue a node unless it is a rail, unknown, or already queued.
    pub fn push(&mut self, node: NodeId) {
        if node == self.ground || node == self.power {
            return;
        }
        match self.queued.get_mut(node.0) {
            Some(queued) if !*queued => {
                *queued = true;
                self.items.push(node);
            }
            _ => {}
        }
    }

    /// Queued nodes in insertion order.
    pub fn items(&self) -> &[NodeId] {
        &self.items
    }

    /// Number of queued nodes.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Remove every queued node.
    pub fn clear(&mut self) {
        for node in self.items.drain(..) {
            self.queued[node.0] = false;
        }
    }
}

/// Summary of one settle call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SettleReport {
    /// Passes that processed a non-empty work list
    pub passes: usize,
    /// Nodes still queued when the loop stopped
    pub pending: usize,
    /// Groups resolved through the indeterminate fallback
    pub indeterminate: usize,
}

impl SettleReport {
    /// Whether the network reached a fixed point.
    pub fn converged(&self) -> bool {
        self.pending == 0
    }

    /// Turn a non-converged report into [`ChipsimError::NonConvergence`].
    pub fn into_result(self) -> Result<Self> {
        if self.converged() {
            Ok(self)
        } else {
            Err(ChipsimError::non_convergence(self.passes, self.pending))
        }
    }
}

/// The relaxation engine: two ping-pong work lists and a group resolver.
#[derive(Debug)]
pub struct Relaxation {
    current: WorkList,
    next: WorkList,
    resolver: GroupResolver,
}

impl Relaxation {
    /// Create a relaxation engine for a network.
    pub fn new(model: &NetworkModel) -> Self {
        Self {
            current: WorkList::new(model),
            next: WorkList::new(model),
            resolver: GroupResolver::new(model.node_count()),
        }
    }

    /// Recalculate from `seeds` until nothing changes or `max_passes` runs out.
    ///
    /// Hitting the cap is a diagnostic, not a failure: the states of the last
    /// pass are kept and the report carries the leftover work.
    pub fn settle<I>(
        &mut self,
        model: &mut NetworkModel,
        seeds: I,
        max_passes: usize,
        policy: IndeterminatePolicy,
    ) -> SettleReport
    where
        I: IntoIterator<Item = NodeId>,
    {
        self.current.clear();
        self.next.clear();
        for seed in seeds {
            self.current.push(seed);
        }

        let mut report = SettleReport::default();

        while report.passes < max_passes && !self.current.is_empty() {
            trace!(
                pass = report.passes,
                pending = self.current.len(),
                "relaxation pass"
            );

            let Self {
                current,
                next,
                resolver,
            } = self;
            for &node in current.items() {
                recalc_node(model, resolver, next, node, policy, &mut report);
            }

            report.passes += 1;
            std::mem::swap(&mut self.current, &mut self.next);
            self.next.clear();
        }

        report.pending = self.current.len();
        if !report.converged() {
            let err = ChipsimError::non_convergence(report.passes, report.pending);
            warn!(%err, "relaxation stopped at pass limit");
        }
        self.current.clear();

        report
    }
}

/// Recalculate the group containing `node` and re-evaluate the transistors
/// its members gate.
fn recalc_node(
    model: &mut NetworkModel,
    resolver: &mut GroupResolver,
    queue: &mut WorkList,
    node: NodeId,
    policy: IndeterminatePolicy,
    report: &mut SettleReport,
) {
    if model.is_rail(node) {
        return;
    }

    resolver.compute(model, node);
    let value = match resolver.resolve(model) {
        GroupValue::Resolved(state) => state,
        GroupValue::Indeterminate => {
            report.indeterminate += 1;
            let err = ChipsimError::IndeterminateGroup { seed: node.0 };
            let fallback = policy.fallback(model.state(node));
            warn!(
                %err,
                members = resolver.members().len(),
                %fallback,
                "using fallback group value"
            );
            fallback
        }
    };

    // Each member is restated before its own gates are re-evaluated, so a
    // transistor turning off may float members visited later in this loop.
    for &member in resolver.members() {
        if !model.is_rail(member) {
            model.nodes[member.0].state = value;
        }
        for i in 0..model.nodes[member.0].gates.len() {
            let t = model.nodes[member.0].gates[i];
            switch::on_gate_changed(model, t, queue);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::DEFAULT_MAX_PASSES;
    use crate::netlist;
    use crate::network::NodeState;

    fn model(text: &str) -> NetworkModel {
        let ast = netlist::parse(text).unwrap();
        NetworkModel::from_ast(ast).unwrap()
    }

    fn settle<I>(relax: &mut Relaxation, m: &mut NetworkModel, seeds: I) -> SettleReport
    where
        I: IntoIterator<Item = NodeId>,
    {
        relax.settle(m, seeds, DEFAULT_MAX_PASSES, IndeterminatePolicy::default())
    }

    const RING: &str = "\
.vss 0
.vcc 1
.node 2 pullup
.node 3 pullup
.node 4 pullup
t1 2 3 0
t2 3 4 0
t3 4 2 0
";

    #[test]
    fn test_worklist_dedup_and_rails() {
        let m = model(".vss 0\n.vcc 1\nt0 2 3 4");
        let mut list = WorkList::new(&m);
        list.push(NodeId(3));
        list.push(NodeId(0));
        list.push(NodeId(2));
        list.push(NodeId(3));
        list.push(NodeId(1));
        list.push(NodeId(5));
        assert_eq!(list.items(), &[NodeId(3), NodeId(2)]);
        list.clear();
        assert!(list.is_empty());
        list.push(NodeId(3));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_inverter_settles() {
        // in = 2 (pin), out = 3 (pullup)
        let mut m = model(".vss 0\n.vcc 1\n.node 3 pullup\nt1 2 3 0");
        let mut relax = Relaxation::new(&m);

        m.nodes[2].pullup = true;
        let report = settle(&mut relax, &mut m, [NodeId(2)]);
        assert_eq!(
            report,
            SettleReport {
                passes: 2,
                pending: 0,
                indeterminate: 0,
            }
        );
        assert_eq!(m.state(NodeId(2)), NodeState::Pullup);
        assert_eq!(m.state(NodeId(3)), NodeState::Gnd);

        m.nodes[2].pullup = false;
        m.nodes[2].pulldown = true;
        let report = settle(&mut relax, &mut m, [NodeId(2)]);
        assert!(report.converged());
        assert_eq!(report.passes, 2);
        assert_eq!(m.state(NodeId(2)), NodeState::Pulldown);
        assert_eq!(m.state(NodeId(3)), NodeState::Pullup);
        assert_eq!(m.state(NodeId(0)), NodeState::Gnd);
    }

    #[test]
    fn test_ring_oscillator_hits_pass_cap() {
        let mut m = model(RING);
        let mut relax = Relaxation::new(&m);
        let report = settle(&mut relax, &mut m, [NodeId(2), NodeId(3), NodeId(4)]);
        assert_eq!(report.passes, 100);
        assert!(report.pending > 0);
        assert_eq!(report.indeterminate, 0);
        assert!(matches!(
            report.into_result(),
            Err(ChipsimError::NonConvergence { passes: 100, .. })
        ));
        assert_eq!(m.state(NodeId(0)), NodeState::Gnd);
        assert_eq!(m.state(NodeId(1)), NodeState::Vcc);
    }

    #[test]
    fn test_empty_settle_is_noop() {
        let mut m = model(".vss 0\n.vcc 1\n.node 3 pullup\nt1 2 3 0");
        let mut relax = Relaxation::new(&m);
        m.nodes[2].pullup = true;
        settle(&mut relax, &mut m, [NodeId(2)]);
        let before: Vec<NodeState> = (0..m.node_count()).map(|i| m.state(NodeId(i))).collect();

        let report = settle(&mut relax, &mut m, std::iter::empty());
        assert_eq!(report, SettleReport::default());
        let after: Vec<NodeState> = (0..m.node_count()).map(|i| m.state(NodeId(i))).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_isolated_node_keeps_floating_polarity() {
        let mut m = model(".vss 0\n.vcc 1\nt1 5 2 3");
        let mut relax = Relaxation::new(&m);
        m.nodes[2].state = NodeState::FloatHigh;
        m.nodes[3].state = NodeState::FloatLow;
        let report = settle(&mut relax, &mut m, [NodeId(2), NodeId(3)]);
        assert!(report.converged());
        assert_eq!(m.state(NodeId(2)), NodeState::FloatHigh);
        assert_eq!(m.state(NodeId(3)), NodeState::FloatLow);
    }

    #[test]
    fn test_indeterminate_group_uses_policy() {
        let mut m = model(".vss 0\n.vcc 1\nt1 5 2 3");
        let mut relax = Relaxation::new(&m);
        m.transistors[0].on = true;
        m.nodes[2].state = NodeState::Pullup;
        m.nodes[3].state = NodeState::Pulldown;

        let policy = IndeterminatePolicy::FloatSeedPolarity;
        let report = relax.settle(&mut m, [NodeId(2)], DEFAULT_MAX_PASSES, policy);
        assert_eq!(report.indeterminate, 1);
        assert_eq!(m.state(NodeId(2)), NodeState::FloatHigh);
        assert_eq!(m.state(NodeId(3)), NodeState::FloatHigh);

        m.nodes[2].state = NodeState::Pullup;
        m.nodes[3].state = NodeState::Pulldown;
        let policy = IndeterminatePolicy::FloatLow;
        relax.settle(&mut m, [NodeId(2)], DEFAULT_MAX_PASSES, policy);
        assert_eq!(m.state(NodeId(2)), NodeState::FloatLow);
        assert_eq!(m.state(NodeId(3)), NodeState::FloatLow);
    }
}
