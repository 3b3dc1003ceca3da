//! Terminal AR placement simulator
//!
//! Controls:
//! - E: Enter AR (start a session)
//! - W/A/S/D or arrows: Look around
//! - Space: Air tap (select / place)
//! - F: Toggle wireframe
//! - 1-9: Pick a model from the catalog
//! - X: Exit AR from the app
//! - B: System back gesture (the platform ends the session)
//! - R: Reset
//! - Ctrl-Q: Quit
//!
//! Usage:
//!   arplace-sim
//!   arplace-sim --config demos/arplace.toml --load-delay-ms 1500

use anyhow::{Context, Result};
use arplace::ArPlaceConfig;
use clap::Parser;

use arplace_app::cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    arplace_app::logging::init(&cli.log_file)?;

    let config = match &cli.config {
        Some(path) => ArPlaceConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ArPlaceConfig::default(),
    };
    tracing::info!(models = config.model_catalog().len(), "starting simulator");

    arplace_app::run(&cli, config)
}
