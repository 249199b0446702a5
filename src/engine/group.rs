//! Electrical group discovery and value resolution.

use crate::network::{NetworkModel, NodeId, NodeState};

/// Outcome of resolving a group's shared value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupValue {
    /// Every member takes this state.
    Resolved(NodeState),
    /// No rail, pull or floating member was found.
    Indeterminate,
}

/// Reusable traversal state for finding electrical groups.
///
/// Members are collected in depth-first preorder, following each node's
/// terminal transistors in definition order. That order decides which pull
/// wins when a group holds both a pullup and a pulldown, so it must match a
/// recursive walk exactly; the explicit stack only avoids deep recursion on
/// large groups.
#[derive(Debug)]
pub struct GroupResolver {
    members: Vec<NodeId>,
    stack: Vec<NodeId>,
    /// Per-node visit stamp; a node is in the current group iff its mark
    /// equals `epoch`.
    marks: Vec<u32>,
    epoch: u32,
}

impl GroupResolver {
    /// Create a resolver sized for a network.
    pub fn new(node_count: usize) -> Self {
        Self {
            members: Vec::new(),
            stack: Vec::new(),
            marks: vec![0; node_count],
            epoch: 0,
        }
    }

    /// Collect the group containing `seed`.
    ///
    /// Rails are added as members but never expanded.
    pub fn compute(&mut self, model: &NetworkModel, seed: NodeId) -> &[NodeId] {
        self.begin(model.node_count());
        self.stack.push(seed);

        while let Some(node) = self.stack.pop() {
            if self.marks[node.0] == self.epoch {
                continue;
            }
            self.marks[node.0] = self.epoch;
            self.members.push(node);

            if model.is_rail(node) {
                continue;
            }

            // Reverse push so the first terminal is walked first.
            for &t in model.node(node).terminals.iter().rev() {
                let transistor = model.transistor(t);
                if !transistor.on {
                    continue;
                }
                let other = transistor.other_terminal(node);
                if self.marks[other.0] != self.epoch {
                    self.stack.push(other);
                }
            }
        }

        &self.members
    }

    /// Members of the most recently computed group, in discovery order.
    pub fn members(&self) -> &[NodeId] {
        &self.members
    }

    /// Whether `node` belongs to the most recently computed group.
    pub fn contains(&self, node: NodeId) -> bool {
        self.epoch != 0 && self.marks.get(node.0) == Some(&self.epoch)
    }

    /// Resolve the shared value of the most recently computed group.
    ///
    /// Precedence: ground, then power, then the first member (in discovery
    /// order) carrying a pullup or pulldown, then floating charge with high
    /// dominating low.
    pub fn resolve(&self, model: &NetworkModel) -> GroupValue {
        if self.contains(model.ground()) {
            return GroupValue::Resolved(NodeState::Gnd);
        }
        if self.contains(model.power()) {
            return GroupValue::Resolved(NodeState::Vcc);
        }

        for &member in &self.members {
            let node = model.node(member);
            if node.pullup {
                return GroupValue::Resolved(NodeState::Pullup);
            }
            if node.pulldown {
                return GroupValue::Resolved(NodeState::Pulldown);
            }
        }

        let mut low = false;
        for &member in &self.members {
            let state = model.state(member);
            if state == NodeState::FloatHigh {
                return GroupValue::Resolved(NodeState::FloatHigh);
            }
            low |= state.is_floating();
        }

        if low {
            GroupValue::Resolved(NodeState::FloatLow)
        } else {
            GroupValue::Indeterminate
        }
    }

    fn begin(&mut self, node_count: usize) {
        if self.marks.len() != node_count {
            self.marks = vec![0; node_count];
            self.epoch = 0;
        }
        self.epoch = self.epoch.wrapping_add(1);
        if self.epoch == 0 {
            self.marks.fill(0);
            self.epoch = 1;
        }
        self.members.clear();
        self.stack.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netlist;

    fn model(text: &str) -> NetworkModel {
        let ast = netlist::parse(text).unwrap();
        NetworkModel::from_ast(ast).unwrap()
    }

    fn turn_on(model: &mut NetworkModel, indices: &[usize]) {
        for &i in indices {
            model.transistors[i].on = true;
        }
    }

    #[test]
    fn test_group_follows_on_transistors_only() {
        // 2 -t0- 3 -t1- 4, t2 links 4 to 5 but stays off
        let mut m = model(".vss 0\n.vcc 1\nt0 9 2 3\nt1 9 3 4\nt2 9 4 5");
        turn_on(&mut m, &[0, 1]);
        let mut resolver = GroupResolver::new(m.node_count());
        let members = resolver.compute(&m, NodeId(2)).to_vec();
        assert_eq!(members, vec![NodeId(2), NodeId(3), NodeId(4)]);
        assert!(!resolver.contains(NodeId(5)));
    }

    #[test]
    fn test_group_preorder_matches_recursive_walk() {
        // From 2: t0 -> 3, then 3's own branch t2 -> 5, back to 2's t1 -> 4
        let mut m = model(".vss 0\n.vcc 1\nt0 9 2 3\nt1 9 2 4\nt2 9 3 5");
        turn_on(&mut m, &[0, 1, 2]);
        let mut resolver = GroupResolver::new(m.node_count());
        let members = resolver.compute(&m, NodeId(2)).to_vec();
        assert_eq!(members, vec![NodeId(2), NodeId(3), NodeId(5), NodeId(4)]);
    }

    #[test]
    fn test_rails_are_members_but_not_expanded() {
        // 2 and 3 both tie to ground; they must not merge through it
        let mut m = model(".vss 0\n.vcc 1\nt0 9 2 0\nt1 9 3 0");
        turn_on(&mut m, &[0, 1]);
        let mut resolver = GroupResolver::new(m.node_count());
        let members = resolver.compute(&m, NodeId(2)).to_vec();
        assert_eq!(members, vec![NodeId(2), NodeId(0)]);
        assert_eq!(resolver.resolve(&m), GroupValue::Resolved(NodeState::Gnd));
    }

    #[test]
    fn test_ground_beats_power() {
        let mut m = model(".vss 0\n.vcc 1\n.node 2 pullup\nt0 9 2 1\nt1 9 2 0");
        turn_on(&mut m, &[0, 1]);
        let mut resolver = GroupResolver::new(m.node_count());
        resolver.compute(&m, NodeId(2));
        assert_eq!(resolver.resolve(&m), GroupValue::Resolved(NodeState::Gnd));

        m.transistors[1].on = false;
        resolver.compute(&m, NodeId(2));
        assert_eq!(resolver.resolve(&m), GroupValue::Resolved(NodeState::Vcc));
    }

    #[test]
    fn test_first_pull_in_discovery_order_wins() {
        // Node 2 has no pull; t0 reaches the pullup node 3 before t1 reaches
        // the pulled-down node 4.
        let text_a = ".vss 0\n.vcc 1\n.node 3 pullup\nt0 9 2 3\nt1 9 2 4";
        let mut m = model(text_a);
        m.nodes[4].pulldown = true;
        turn_on(&mut m, &[0, 1]);
        let mut resolver = GroupResolver::new(m.node_count());
        resolver.compute(&m, NodeId(2));
        assert_eq!(
            resolver.resolve(&m),
            GroupValue::Resolved(NodeState::Pullup)
        );

        // Same circuit with the transistor lines swapped
        let text_b = ".vss 0\n.vcc 1\n.node 3 pullup\nt1 9 2 4\nt0 9 2 3";
        let mut m = model(text_b);
        m.nodes[4].pulldown = true;
        turn_on(&mut m, &[0, 1]);
        resolver.compute(&m, NodeId(2));
        assert_eq!(
            resolver.resolve(&m),
            GroupValue::Resolved(NodeState::Pulldown)
        );
    }

    #[test]
    fn test_seed_decides_pull_conflict() {
        let mut m = model(".vss 0\n.vcc 1\n.node 3 pullup\nt0 9 2 3");
        m.nodes[2].pulldown = true;
        turn_on(&mut m, &[0]);
        let mut resolver = GroupResolver::new(m.node_count());
        resolver.compute(&m, NodeId(2));
        assert_eq!(
            resolver.resolve(&m),
            GroupValue::Resolved(NodeState::Pulldown)
        );
        resolver.compute(&m, NodeId(3));
        assert_eq!(
            resolver.resolve(&m),
            GroupValue::Resolved(NodeState::Pullup)
        );
    }

    #[test]
    fn test_float_high_dominates_regardless_of_position() {
        let mut m = model(".vss 0\n.vcc 1\nt0 9 2 3\nt1 9 3 4");
        turn_on(&mut m, &[0, 1]);
        m.nodes[2].state = NodeState::FloatLow;
        m.nodes[3].state = NodeState::FloatLow;
        m.nodes[4].state = NodeState::FloatHigh;
        let mut resolver = GroupResolver::new(m.node_count());
        resolver.compute(&m, NodeId(2));
        assert_eq!(
            resolver.resolve(&m),
            GroupValue::Resolved(NodeState::FloatHigh)
        );

        m.nodes[4].state = NodeState::FloatLow;
        resolver.compute(&m, NodeId(2));
        assert_eq!(
            resolver.resolve(&m),
            GroupValue::Resolved(NodeState::FloatLow)
        );
    }

    #[test]
    fn test_indeterminate_without_evidence() {
        let mut m = model(".vss 0\n.vcc 1\nt0 9 2 3");
        turn_on(&mut m, &[0]);
        m.nodes[2].state = NodeState::Pulldown;
        m.nodes[3].state = NodeState::Gnd;
        let mut resolver = GroupResolver::new(m.node_count());
        resolver.compute(&m, NodeId(3));
        assert_eq!(resolver.resolve(&m), GroupValue::Indeterminate);
    }

    #[test]
    fn test_epoch_wraps_cleanly() {
        let m = model(".vss 0\n.vcc 1\nt0 9 2 3");
        let mut resolver = GroupResolver::new(m.node_count());
        resolver.epoch = u32::MAX;
        resolver.marks[3] = 1;
        let members = resolver.compute(&m, NodeId(2)).to_vec();
        assert_eq!(members, vec![NodeId(2)]);
        assert!(!resolver.contains(NodeId(3)));
    }
}
