//! WASM bindings for Chipsim Core.
//!
//! This module provides JavaScript-friendly bindings for stepping a chip in
//! the browser, for example to animate a die visualisation.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { WasmChipSim } from 'chipsim_core';
//!
//! await init();
//!
//! const sim = new WasmChipSim(netlistText);
//! sim.write_memory(0x0400, program);
//! sim.write_memory(0xfffc, new Uint8Array([0x00, 0x04]));
//! sim.reset();
//!
//! function tick() {
//!   sim.half_step();
//!   console.log(sim.half_cycle, sim.read_bits("ab", 16).toString(16));
//!   requestAnimationFrame(tick);
//! }
//! ```

use wasm_bindgen::prelude::*;

use crate::engine::{ResetSequence, Simulator};
use crate::error::ChipsimError;
use crate::harness::{BusPins, Memory, Stepper};
use crate::netlist;
use crate::network::{validate_model, NetworkModel};

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

fn to_js(err: ChipsimError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// WASM-compatible chip simulator attached to 64 KiB of memory.
#[wasm_bindgen]
pub struct WasmChipSim {
    stepper: Stepper<Memory>,
}

#[wasm_bindgen]
impl WasmChipSim {
    /// Create a simulator from netlist text.
    ///
    /// The chip is not reset; call `reset()` once memory is loaded.
    #[wasm_bindgen(constructor)]
    pub fn new(netlist_text: &str) -> Result<WasmChipSim, JsValue> {
        let ast = netlist::parse(netlist_text).map_err(to_js)?;
        let model = NetworkModel::from_ast(ast).map_err(to_js)?;
        validate_model(&model).map_err(to_js)?;

        let sim = Simulator::new(model);
        let stepper = Stepper::new(sim, Memory::new(), &BusPins::default()).map_err(to_js)?;
        Ok(WasmChipSim { stepper })
    }

    /// Run the 6502 reset sequence. Returns the number of passes it took.
    #[wasm_bindgen]
    pub fn reset(&mut self) -> Result<usize, JsValue> {
        let report = self
            .stepper
            .reset(&ResetSequence::mos6502())
            .map_err(to_js)?;
        Ok(report.passes)
    }

    /// Advance by one clock edge.
    #[wasm_bindgen]
    pub fn half_step(&mut self) -> Result<(), JsValue> {
        self.stepper.half_step().map_err(to_js)
    }

    /// Drive a named pin high or low.
    #[wasm_bindgen]
    pub fn drive(&mut self, pin: &str, high: bool) -> Result<(), JsValue> {
        let sim = self.stepper.simulator_mut();
        let result = if high {
            sim.drive_high(pin)
        } else {
            sim.drive_low(pin)
        };
        result.map(|_| ()).map_err(to_js)
    }

    /// Whether a named pin reads high.
    #[wasm_bindgen]
    pub fn read_pin(&self, pin: &str) -> Result<bool, JsValue> {
        self.stepper.simulator().read_logic_high(pin).map_err(to_js)
    }

    /// Read the pins `prefix0 .. prefix{width-1}` as an integer.
    #[wasm_bindgen]
    pub fn read_bits(&self, prefix: &str, width: usize) -> Result<u32, JsValue> {
        self.stepper
            .simulator()
            .read_bit_field(prefix, width)
            .map_err(to_js)
    }

    /// Copy bytes into memory.
    #[wasm_bindgen]
    pub fn write_memory(&mut self, addr: u16, data: &[u8]) -> Result<(), JsValue> {
        self.stepper.bus_mut().load(addr, data).map_err(to_js)
    }

    /// Half-steps since the last reset.
    #[wasm_bindgen(getter)]
    pub fn half_cycle(&self) -> u64 {
        self.stepper.half_cycle()
    }

    /// Bus status line, as printed by the CLI.
    #[wasm_bindgen]
    pub fn status(&self) -> String {
        self.stepper.status().to_string()
    }
}

/// Get the library version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
