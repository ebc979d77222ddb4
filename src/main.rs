use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::Level;

use orrery::OrreryConfig;

#[derive(Parser)]
#[command(name = "orrery")]
#[command(about = "Earth orbiting the Sun, with live mass sliders and point-of-view buttons")]
struct Cli {
    /// JSON config file; missing fields use the stock Sun/Earth scene
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Window width in logical pixels
    #[arg(long)]
    width: Option<u32>,

    /// Window height in logical pixels
    #[arg(long)]
    height: Option<u32>,

    /// Log level: error, warn, info, debug or trace
    #[arg(long, default_value = "info")]
    log_level: Level,

    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    print_config: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt().with_max_level(cli.log_level).init();

    let mut config = match &cli.config {
        Some(path) => {
            let config = OrreryConfig::load(path)
                .with_context(|| format!("loading {}", path.display()))?;
            tracing::info!(path = %path.display(), "config loaded");
            config
        }
        None => {
            tracing::info!("using built-in config");
            OrreryConfig::default()
        }
    };
    if let Some(width) = cli.width {
        config.window.width = width;
    }
    if let Some(height) = cli.height {
        config.window.height = height;
    }

    if cli.print_config {
        println!("{}", config.to_json());
        return Ok(());
    }

    orrery::run(config).context("orrery exited with an error")
}
