//! Everdrive Tetris bridge (default binary).
//!
//! Opens the cartridge link and the solver connection, optionally sends a
//! ROM image, then runs the bridge loop until Ctrl-C.

use std::fs;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use everdrive_tetris::adapter::{
    AdapterRuntime, Bridge, SerialTransport, SessionLog, TcpSolver, Transport,
};
use everdrive_tetris::cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .compact()
        .init();

    let defines = cli.build_defines();
    if !defines.is_empty() {
        info!("ROM build defines: {}", defines.join(" "));
    }

    let runtime = AdapterRuntime::new()?;

    let mut transport = SerialTransport::open(&cli.serial_config())?;
    if let Some(rom) = &cli.rom {
        let image = fs::read(rom).with_context(|| format!("cannot read ROM {}", rom.display()))?;
        transport
            .load_program(&image)
            .with_context(|| format!("failed to load ROM {}", rom.display()))?;
        info!("launched {}", rom.display());
    }

    let solver_config = cli.solver_config();
    info!("connecting to solver at {}", solver_config.addr());
    let solver = TcpSolver::connect(runtime.handle(), solver_config)?;

    let mut bridge = Bridge::new(transport, solver, cli.bridge_config(), runtime.interrupt());
    if let Some(path) = &cli.log_path {
        bridge = bridge.with_session_log(SessionLog::open(path)?);
        info!("session log: {}", path.display());
    }

    runtime.watch_ctrl_c();
    bridge.run();
    Ok(())
}
