//! Half-cycle stepping with bus emulation.

use std::fmt;

use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use super::{Bus, Memory};
use crate::engine::{ResetReport, ResetSequence, SettleReport, Simulator};
use crate::error::{ChipsimError, Result};
use crate::network::NodeId;

/// Names of the pins the stepper drives and samples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusPins {
    /// Clock input
    pub clock: String,
    /// Read/write output, high for read
    pub rw: String,
    /// Address bus pin prefix
    pub address_prefix: String,
    pub address_width: usize,
    /// Data bus pin prefix
    pub data_prefix: String,
    pub data_width: usize,
}

impl Default for BusPins {
    fn default() -> Self {
        Self {
            clock: "clk0".to_string(),
            rw: "rw".to_string(),
            address_prefix: "ab".to_string(),
            address_width: 16,
            data_prefix: "db".to_string(),
            data_width: 8,
        }
    }
}

/// Snapshot of the bus pins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChipStatus {
    pub half_cycle: u64,
    pub clock: bool,
    pub address: u16,
    pub data: u8,
    /// High during read cycles
    pub rw: bool,
}

impl fmt::Display for ChipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "halfcyc:{} phi0:{} AB:{:04X} D:{:02X} RnW:{}",
            self.half_cycle,
            u8::from(self.clock),
            self.address,
            self.data,
            u8::from(self.rw)
        )
    }
}

#[derive(Debug)]
struct ResolvedPins {
    clock: NodeId,
    rw: NodeId,
    address: Vec<NodeId>,
    data: Vec<NodeId>,
}

/// Drives a simulated chip one clock edge at a time and serves its bus
/// cycles from `B`.
#[derive(Debug)]
pub struct Stepper<B: Bus = Memory> {
    sim: Simulator,
    bus: B,
    pins: ResolvedPins,
    half_cycle: u64,
}

impl<B: Bus> Stepper<B> {
    /// Create a stepper, resolving every bus pin up front.
    pub fn new(sim: Simulator, bus: B, pins: &BusPins) -> Result<Self> {
        if pins.address_width > 16 || pins.data_width > 8 {
            return Err(ChipsimError::invalid_param(format!(
                "bus widths {}/{} exceed 16 address and 8 data bits",
                pins.address_width, pins.data_width
            )));
        }

        let resolved = ResolvedPins {
            clock: sim.drivable_pin(&pins.clock)?,
            rw: sim.model().pin(&pins.rw)?,
            address: sim.bit_pins(&pins.address_prefix, pins.address_width)?,
            data: sim.bit_pins(&pins.data_prefix, pins.data_width)?,
        };
        if let Some(&rail) = resolved.data.iter().find(|&&n| sim.model().is_rail(n)) {
            return Err(ChipsimError::topology(format!("data bus pin {} is a rail", rail)));
        }

        Ok(Self {
            sim,
            bus,
            pins: resolved,
            half_cycle: 0,
        })
    }

    /// Toggle the clock and serve the resulting bus cycle.
    ///
    /// Data is placed on the bus after the falling edge of a read cycle and
    /// taken from it after the rising edge of a write cycle.
    pub fn half_step(&mut self) -> Result<()> {
        self.edge(|_| {})
    }

    /// Run the reset sequence and restart the half-cycle count.
    ///
    /// The edges after reset is released are served from the bus, so the
    /// chip can fetch its reset vector.
    pub fn reset(&mut self, sequence: &ResetSequence) -> Result<ResetReport> {
        let held = ResetSequence {
            release_edges: 0,
            ..sequence.clone()
        };
        let mut report = self.sim.reset_network(&held)?;
        for _ in 0..sequence.release_edges {
            self.edge(|settle| report.record(settle))?;
        }
        self.half_cycle = 0;
        Ok(report)
    }

    fn edge(&mut self, mut record: impl FnMut(SettleReport)) -> Result<()> {
        let clock = self.pins.clock;

        if self.sim.is_node_high(clock) {
            record(self.sim.set_node(clock, false)?);
            if self.sim.is_node_high(self.pins.rw) {
                let addr = self.address();
                let value = self.bus.read(addr);
                trace!(addr, value, "bus read");
                record(self.sim.drive_nodes(&self.pins.data, u32::from(value))?);
            }
        } else {
            record(self.sim.set_node(clock, true)?);
            if !self.sim.is_node_high(self.pins.rw) {
                let addr = self.address();
                let value = self.data();
                trace!(addr, value, "bus write");
                self.bus.write(addr, value);
            }
        }

        self.half_cycle += 1;
        Ok(())
    }

    /// Step until `token` is cancelled or `limit` half-steps have run.
    ///
    /// The token is only checked between half-steps, and the task yields
    /// after each one. Returns the number of half-steps performed.
    pub async fn run(&mut self, token: &CancellationToken, limit: Option<u64>) -> Result<u64> {
        let mut ticks = 0;

        while !token.is_cancelled() && limit.map_or(true, |limit| ticks < limit) {
            self.half_step()?;
            ticks += 1;
            tokio::task::yield_now().await;
        }

        debug!(ticks, cancelled = token.is_cancelled(), "stepping stopped");
        Ok(ticks)
    }

    pub fn status(&self) -> ChipStatus {
        ChipStatus {
            half_cycle: self.half_cycle,
            clock: self.sim.is_node_high(self.pins.clock),
            address: self.address(),
            data: self.data(),
            rw: self.sim.is_node_high(self.pins.rw),
        }
    }

    /// Half-steps since creation or the last reset.
    pub fn half_cycle(&self) -> u64 {
        self.half_cycle
    }

    pub fn simulator(&self) -> &Simulator {
        &self.sim
    }

    pub fn simulator_mut(&mut self) -> &mut Simulator {
        &mut self.sim
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    fn address(&self) -> u16 {
        self.sim.read_nodes(&self.pins.address) as u16
    }

    fn data(&self) -> u8 {
        self.sim.read_nodes(&self.pins.data) as u8
    }
}
