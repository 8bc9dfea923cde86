//! Glide - replay chat list animations frame by frame
//!
//! Frames are printed to stdout as JSON lines; logs go to stderr and are
//! filtered with `RUST_LOG`.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use glide_cli::{default_config_toml, load_config, replay_crossfade, replay_unlock};
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Replay Glide chat list animations frame by frame
#[derive(Parser, Debug)]
#[command(name = "glide")]
#[command(about = "Replay Glide chat list animations frame by frame")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the default motion configuration as TOML
    Config,

    /// Replay a pull on the archive unlock affordance
    Unlock {
        /// Pull distance for each frame, comma separated
        #[arg(long, value_delimiter = ',', required = true, allow_hyphen_values = true)]
        pull: Vec<f32>,

        /// Lift the finger after the last pull
        #[arg(long)]
        release: bool,

        /// Frames per second (defaults to the config's replay fps)
        #[arg(long)]
        fps: Option<u32>,

        /// Motion config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Replay a QR sheet theme switch
    Crossfade {
        /// Frames per second (defaults to the config's replay fps)
        #[arg(long)]
        fps: Option<u32>,

        /// Motion config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Config => {
            print!("{}", default_config_toml()?);
        }
        Commands::Unlock {
            pull,
            release,
            fps,
            config,
        } => {
            let config = load_config(config.as_deref())?;
            let fps = fps.unwrap_or(config.replay.fps);
            tracing::info!(frames = pull.len(), release, fps, "replaying unlock");
            let frames = replay_unlock(&config, &pull, release, fps)?;
            print_frames(&frames)?;
        }
        Commands::Crossfade { fps, config } => {
            let config = load_config(config.as_deref())?;
            let fps = fps.unwrap_or(config.replay.fps);
            tracing::info!(fps, "replaying theme crossfade");
            let frames = replay_crossfade(&config, fps)?;
            print_frames(&frames)?;
        }
    }

    Ok(())
}

fn print_frames<T: Serialize>(frames: &[T]) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for frame in frames {
        let line = serde_json::to_string(frame).context("Failed to encode frame")?;
        writeln!(out, "{line}").context("Failed to write frame")?;
    }
    Ok(())
}
