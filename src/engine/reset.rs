//! Power-on reset sequencing.

use tracing::{debug, info};

use super::relax::SettleReport;
use super::Simulator;
use crate::error::Result;
use crate::network::NodeId;

/// A fixed pin sequence that brings a chip to its power-on state.
///
/// Applied in order: every `initial` pin drive (each settled on its own),
/// one settle of the whole network, `clock_pulses` high/low clock pulses,
/// `reset` driven high, then `release_edges` clock edges with no bus
/// activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetSequence {
    /// Pins driven before the first full settle, with their level
    pub initial: Vec<(String, bool)>,
    /// Clock input pin
    pub clock: String,
    /// Active-low reset pin
    pub reset: String,
    /// Full clock pulses while reset is held
    pub clock_pulses: usize,
    /// Clock edges after reset is released
    pub release_edges: usize,
}

impl ResetSequence {
    /// The NMOS 6502 reset: `res` and `clk0` low, `rdy` high, `so` low,
    /// `irq` and `nmi` high, 8 pulses, release, 18 edges.
    pub fn mos6502() -> Self {
        let initial = [
            ("res", false),
            ("clk0", false),
            ("rdy", true),
            ("so", false),
            ("irq", true),
            ("nmi", true),
        ]
        .into_iter()
        .map(|(name, high)| (name.to_string(), high))
        .collect();

        Self {
            initial,
            clock: "clk0".to_string(),
            reset: "res".to_string(),
            clock_pulses: 8,
            release_edges: 18,
        }
    }
}

impl Default for ResetSequence {
    fn default() -> Self {
        Self::mos6502()
    }
}

/// Totals over every settle performed by a reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResetReport {
    pub settles: usize,
    pub passes: usize,
    /// Settles that stopped at the pass cap
    pub non_converged: usize,
}

impl ResetReport {
    pub(crate) fn record(&mut self, report: SettleReport) {
        self.settles += 1;
        self.passes += report.passes;
        if !report.converged() {
            self.non_converged += 1;
        }
    }
}

impl Simulator {
    /// Reinitialize every node and transistor, then apply `sequence`.
    ///
    /// All pins are resolved first; an unknown or rail pin fails before any
    /// state changes.
    pub fn reset_network(&mut self, sequence: &ResetSequence) -> Result<ResetReport> {
        let initial = sequence
            .initial
            .iter()
            .map(|(name, high)| Ok((self.drivable_pin(name)?, *high)))
            .collect::<Result<Vec<(NodeId, bool)>>>()?;
        let clock = self.drivable_pin(&sequence.clock)?;
        let reset = self.drivable_pin(&sequence.reset)?;

        self.model.reset_states();
        let mut report = ResetReport::default();

        for (node, high) in initial {
            report.record(self.set_node(node, high)?);
        }
        report.record(self.settle_all());

        for _ in 0..sequence.clock_pulses {
            report.record(self.set_node(clock, true)?);
            report.record(self.set_node(clock, false)?);
        }
        debug!(pulses = sequence.clock_pulses, "releasing reset");
        report.record(self.set_node(reset, true)?);

        for _ in 0..sequence.release_edges {
            let high = self.is_node_high(clock);
            report.record(self.set_node(clock, !high)?);
        }

        info!(
            settles = report.settles,
            passes = report.passes,
            non_converged = report.non_converged,
            "network reset complete"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChipsimError;
    use crate::netlist;
    use crate::network::{NetworkModel, NodeState};

    /// Control pins of a 6502, a reset acknowledge buffered from `res`,
    /// and an 8-bit register field `r0..r7` whose bits are pulled low by
    /// so, rdy, irq, nmi, res, clk0, nothing and vcc respectively.
    const CHIP: &str = "\
.vss 0
.vcc 1
.name clk0 2
.name res 3
.name rdy 4
.name so 5
.name irq 6
.name nmi 7
.name resack 9
.node 8 pullup
.node 9 pullup
.node 10 pullup
.node 11 pullup
.node 12 pullup
.node 13 pullup
.node 14 pullup
.node 15 pullup
.node 16 pullup
.node 17 pullup
.name r0 10
.name r1 11
.name r2 12
.name r3 13
.name r4 14
.name r5 15
.name r6 16
.name r7 17
t_inv res 8 vss
t_ack 8 resack vss
t_r0 so r0 vss
t_r1 rdy r1 vss
t_r2 irq r2 vss
t_r3 nmi r3 vss
t_r4 res r4 vss
t_r5 clk0 r5 vss
t_r7 vcc r7 vss
";

    fn chip() -> Simulator {
        let ast = netlist::parse(CHIP).unwrap();
        let model = NetworkModel::from_ast(ast).unwrap();
        Simulator::new(model)
    }

    #[test]
    fn test_mos6502_sequence() {
        let seq = ResetSequence::default();
        assert_eq!(seq, ResetSequence::mos6502());
        assert_eq!(seq.initial.len(), 6);
        assert_eq!(seq.initial[0], ("res".to_string(), false));
        assert_eq!(seq.clock_pulses, 8);
        assert_eq!(seq.release_edges, 18);
    }

    #[test]
    fn test_reset_reaches_power_on_state() {
        let mut sim = chip();
        let report = sim.reset_network(&ResetSequence::mos6502()).unwrap();

        assert_eq!(
            report,
            ResetReport {
                settles: 42,
                passes: 82,
                non_converged: 0,
            }
        );
        assert!(!sim.read_logic_high("clk0").unwrap());
        assert!(sim.read_logic_high("res").unwrap());
        assert!(sim.read_logic_high("resack").unwrap());
        assert_eq!(sim.read_bit_field("r", 8).unwrap(), 0x61);
        assert_eq!(sim.node_state("r7").unwrap(), NodeState::Gnd);
    }

    #[test]
    fn test_reset_is_repeatable() {
        let mut sim = chip();
        let first = sim.reset_network(&ResetSequence::mos6502()).unwrap();
        sim.drive_high("clk0").unwrap();
        sim.drive_low("irq").unwrap();
        let second = sim.reset_network(&ResetSequence::mos6502()).unwrap();
        assert_eq!(first.settles, second.settles);
        assert_eq!(sim.read_bit_field("r", 8).unwrap(), 0x61);
    }

    #[test]
    fn test_unknown_pin_leaves_network_untouched() {
        let mut sim = chip();
        sim.reset_network(&ResetSequence::mos6502()).unwrap();
        let before: Vec<NodeState> = (0..sim.model().node_count())
            .map(|i| sim.model().state(NodeId(i)))
            .collect();

        let mut seq = ResetSequence::mos6502();
        seq.initial.push(("sync".to_string(), true));
        assert!(matches!(
            sim.reset_network(&seq),
            Err(ChipsimError::UnknownPin { .. })
        ));

        let mut seq = ResetSequence::mos6502();
        seq.clock = "vcc".to_string();
        assert!(matches!(
            sim.reset_network(&seq),
            Err(ChipsimError::InvalidTopology { .. })
        ));

        let after: Vec<NodeState> = (0..sim.model().node_count())
            .map(|i| sim.model().state(NodeId(i)))
            .collect();
        assert_eq!(before, after);
    }
}
