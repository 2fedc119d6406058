//! Sonaura - presence-reactive audio and motor installation

mod app;
mod logging_setup;

use anyhow::{Context, Result};
use clap::Parser;
use sonaura_core::SessionConfig;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "sonaura")]
#[command(about = "Presence-reactive audio and motor installation", long_about = None)]
struct Cli {
    /// Session configuration (.ron, .sonaura or .json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the serial device path
    #[arg(short = 'p', long)]
    serial_port: Option<String>,

    /// Override the presence listener UDP port
    #[arg(long)]
    presence_port: Option<u16>,

    /// Run without audio devices
    #[arg(long)]
    no_audio: bool,

    /// Run without the serial link
    #[arg(long)]
    no_serial: bool,

    /// Seed for the cutoff sweep randomization
    #[arg(long)]
    seed: Option<u64>,

    /// Override the log level
    #[arg(long)]
    log_level: Option<String>,

    /// Write the effective configuration to this file and exit
    #[arg(long, value_name = "PATH")]
    save_config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => sonaura_io::load_config(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => SessionConfig::default(),
    };
    if let Some(port) = cli.serial_port {
        config.serial.port = port;
    }
    if let Some(port) = cli.presence_port {
        config.presence_port = port;
    }
    if let Some(level) = cli.log_level {
        config.log.level = level;
    }

    if let Some(path) = &cli.save_config {
        sonaura_io::save_config(&config, path)
            .with_context(|| format!("Failed to save config {}", path.display()))?;
        println!("Wrote {}", path.display());
        return Ok(());
    }

    let _log_guard = logging_setup::init(&config.log)?;

    info!("==========================================");
    info!("===      Sonaura Session Started       ===");
    info!("==========================================");

    app::run(
        config,
        app::RunOptions {
            no_audio: cli.no_audio,
            no_serial: cli.no_serial,
            seed: cli.seed,
        },
    )
}
