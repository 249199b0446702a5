//! Transistor switching and charge retention.

use tracing::trace;

use super::relax::WorkList;
use crate::network::{NetworkModel, NodeId, TransistorId};

/// Re-evaluate a transistor after its gate may have changed level.
///
/// A transistor that switches queues both terminals, since their groups
/// have merged or split. Turning off first floats both terminals so they
/// keep their polarity without their driving strength.
pub fn on_gate_changed(model: &mut NetworkModel, id: TransistorId, queue: &mut WorkList) {
    let transistor = &model.transistors[id.0];
    let high = model.nodes[transistor.gate.0].state.is_high();
    let (c1, c2) = (transistor.c1, transistor.c2);

    match (high, transistor.on) {
        (true, false) => {
            trace!(transistor = %transistor.name, gate = %transistor.gate, %c1, %c2, "on");
            model.transistors[id.0].on = true;
        }
        (false, true) => {
            trace!(transistor = %transistor.name, gate = %transistor.gate, %c1, %c2, "off");
            model.transistors[id.0].on = false;
            float_node(model, c1);
            float_node(model, c2);
        }
        _ => return,
    }

    queue.push(c1);
    queue.push(c2);
}

/// Drop a node's driving strength while keeping its polarity.
///
/// Rails are immune.
pub fn float_node(model: &mut NetworkModel, node: NodeId) {
    if model.is_rail(node) {
        return;
    }
    let node_ref = &mut model.nodes[node.0];
    node_ref.state = node_ref.state.floated();
    trace!(%node, state = %node_ref.state, "floating");
}

/// Switch every transistor gated by a rail to match the rail's fixed level.
pub fn switch_rail_gates(model: &mut NetworkModel, queue: &mut WorkList) {
    for rail in [model.ground(), model.power()] {
        for i in 0..model.node(rail).gates.len() {
            let t = model.node(rail).gates[i];
            on_gate_changed(model, t, queue);
        }
    }
}
