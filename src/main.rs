//! Chipsim - Switch-Level Microprocessor Simulator
//!
//! Loads a transistor netlist, resets the chip and clocks it against 64 KiB
//! of memory.
//!
//! # Usage
//!
//! ```bash
//! chipsim 6502.net --program test.bin --load-address 0x0400 \
//!     --reset-vector 0x0400 --half-cycles 2000
//! ```

use std::path::PathBuf;

use chipsim_core::{
    error::{ChipsimError, Result},
    netlist,
    network::validate_model,
    BusPins, EngineConfig, Memory, NetworkModel, ResetSequence, Simulator, Stepper,
};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Switch-level transistor netlist simulator
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the netlist file
    #[arg(value_name = "NETLIST")]
    netlist: PathBuf,

    /// Binary image to load into memory
    #[arg(short, long)]
    program: Option<PathBuf>,

    /// Address the program image is loaded at
    #[arg(long, default_value = "0x0000", value_parser = parse_address)]
    load_address: u16,

    /// Reset vector to store at $FFFC
    #[arg(long, value_parser = parse_address)]
    reset_vector: Option<u16>,

    /// Half-cycles to run after reset (runs until Ctrl-C when omitted)
    #[arg(short = 'n', long)]
    half_cycles: Option<u64>,

    /// Pass cap for one settle
    #[arg(long, default_value_t = chipsim_core::engine::DEFAULT_MAX_PASSES)]
    max_passes: usize,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn parse_address(s: &str) -> std::result::Result<u16, String> {
    let parsed = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix('$')) {
        u16::from_str_radix(hex, 16)
    } else {
        s.parse::<u16>()
    };
    parsed.map_err(|e| format!("invalid address '{}': {}", s, e))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Parse and build the network
    let ast = netlist::parse_file(&args.netlist)?;
    let model = NetworkModel::from_ast(ast)?;
    validate_model(&model)?;

    let config = EngineConfig::new().with_max_passes(args.max_passes);
    let sim = Simulator::with_config(model, config)?;
    debug!(
        max_passes = sim.config().max_passes,
        policy = ?sim.config().indeterminate,
        "engine configured"
    );

    // Prepare memory
    let mut memory = Memory::new();
    if let Some(path) = &args.program {
        let image = std::fs::read(path).map_err(|e| ChipsimError::FileReadError {
            path: path.display().to_string(),
            source: e,
        })?;
        memory.load(args.load_address, &image)?;
        info!(
            bytes = image.len(),
            address = args.load_address,
            "program loaded"
        );
    }
    if let Some(vector) = args.reset_vector {
        memory.set_reset_vector(vector);
    }

    let mut stepper = Stepper::new(sim, memory, &BusPins::default())?;
    let report = stepper.reset(&ResetSequence::mos6502())?;
    if report.non_converged > 0 {
        warn!(
            settles = report.non_converged,
            "reset left settles unconverged"
        );
    }

    let token = CancellationToken::new();
    let ctrl_c = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    let ticks = stepper.run(&token, args.half_cycles).await?;
    info!(ticks, "run finished");
    println!("{}", stepper.status());

    Ok(())
}
