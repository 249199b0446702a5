//! Network validation.

use tracing::warn;

use crate::error::{ChipsimError, Result};

use super::NetworkModel;

/// Validate a network for simulation.
///
/// Checks:
/// - The network has at least one transistor
/// - No transistor is gated by the node it shorts to itself
///
/// Degenerate transistors (both terminals on one node) and unused rails are
/// reported as warnings only; extracted netlists contain both.
pub fn validate_model(model: &NetworkModel) -> Result<()> {
    if model.transistor_count() == 0 {
        return Err(ChipsimError::topology("Network has no transistors"));
    }

    for transistor in &model.transistors {
        if transistor.c1 == transistor.c2 {
            warn!(
                transistor = %transistor.name,
                node = %transistor.c1,
                "transistor shorts a node to itself"
            );
        }
        if transistor.gate == transistor.c1 && transistor.gate == transistor.c2 {
            return Err(ChipsimError::topology(format!(
                "transistor '{}' is gated by its own channel node",
                transistor.name
            )));
        }
    }

    for rail in [model.ground(), model.power()] {
        let node = model.node(rail);
        if node.terminals.is_empty() && node.gates.is_empty() {
            warn!(%rail, "rail is not connected to any transistor");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netlist;

    fn validate(text: &str) -> Result<()> {
        let ast = netlist::parse(text).unwrap();
        let model = NetworkModel::from_ast(ast).unwrap();
        validate_model(&model)
    }

    #[test]
    fn test_validate_accepts_inverter() {
        assert!(validate(".vss 0\n.vcc 1\n.node 3 pullup\nt1 2 3 0").is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_network() {
        assert!(matches!(
            validate(".vss 0\n.vcc 1"),
            Err(ChipsimError::InvalidTopology { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_self_gated_short() {
        assert!(validate(".vss 0\n.vcc 1\nt1 2 2 2").is_err());
        // A plain self-short is only a warning
        assert!(validate(".vss 0\n.vcc 1\nt1 3 2 2").is_ok());
    }
}
