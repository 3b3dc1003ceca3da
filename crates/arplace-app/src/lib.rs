//! Terminal simulator for the arplace placement pipeline
//!
//! A simulated device (room geometry, head tracking from the keyboard and
//! delayed asset downloads) feeds the real session lifecycle, which renders
//! into the terminal through [`terminal::TerminalBackend`].

pub mod cli;
pub mod hud;
pub mod input;
pub mod logging;
pub mod runner;
pub mod sim;
pub mod terminal;

use anyhow::{Context, Result};
use arplace::ArPlaceConfig;

use crate::cli::Cli;
use crate::runner::SimRunner;
use crate::terminal::TerminalBackend;

/// Run the simulator until the user quits
pub fn run(cli: &Cli, config: ArPlaceConfig) -> Result<()> {
    config.validate().context("invalid configuration")?;
    let backend = TerminalBackend::stdout(&config.camera).context("failed to query terminal size")?;
    let mut runner = SimRunner::new(cli, &config, backend);
    runner.run().context("terminal I/O failed")
}
