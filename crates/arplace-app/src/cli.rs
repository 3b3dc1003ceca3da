//! Command-line options

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

/// Terminal simulator for the arplace surface placement pipeline
#[derive(Debug, Clone, Parser)]
#[command(name = "arplace-sim", version, about)]
pub struct Cli {
    /// TOML config with session, material, camera and model catalog sections
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Where tracing output goes; the terminal is taken by the viewport
    #[arg(long, default_value = "arplace-sim.log")]
    pub log_file: PathBuf,

    /// Simulate a device whose sessions cannot hit-test
    #[arg(long)]
    pub no_hit_test: bool,

    /// Simulate a device that refuses immersive AR sessions
    #[arg(long)]
    pub no_ar: bool,

    /// Simulated model download time in milliseconds
    #[arg(long, default_value_t = 600)]
    pub load_delay_ms: u64,

    /// Frame interval in milliseconds
    #[arg(long, default_value_t = 50)]
    pub tick_ms: u64,
}

impl Cli {
    pub fn load_delay(&self) -> Duration {
        Duration::from_millis(self.load_delay_ms)
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }
}
