use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use burn::backend::ndarray::{NdArray, NdArrayDevice};
use clap::{Parser, ValueEnum};

use pacman_rl::env::{build_env, EnvConfig, EnvVariant};
use pacman_rl::modes::{PlayMode, WatchMode};
use pacman_rl::nav::NavTables;

#[derive(Parser)]
#[command(name = "pacman_rl")]
#[command(version, about = "Pacman RL environments with a terminal UI")]
struct Cli {
    /// Session mode
    #[arg(long, default_value = "play")]
    mode: Mode,

    /// Observation/reward variant
    #[arg(long, default_value = "naive")]
    variant: Variant,

    /// Scatter Pacman and the ghosts over random cells at reset
    #[arg(long)]
    random_start: bool,

    /// Simulation ticks per environment step (default depends on variant)
    #[arg(long)]
    ticks_per_step: Option<u32>,

    /// Directory holding the precomputed navigation tables (embedding
    /// variant only)
    #[arg(long, default_value = "computed_data")]
    data_dir: PathBuf,
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    /// Steer Pacman with the keyboard
    Play,
    /// Watch a random agent driven by the action mask
    Watch,
}

#[derive(Clone, Copy, ValueEnum)]
enum Variant {
    /// Two planes: raw cell codes and entity codes
    Naive,
    /// Fifteen semantic planes
    Channels,
    /// Flat vector of graph embeddings
    Embedding,
    /// Trail planes with a distance field
    Attention,
}

impl From<Variant> for EnvVariant {
    fn from(variant: Variant) -> Self {
        match variant {
            Variant::Naive => EnvVariant::Naive,
            Variant::Channels => EnvVariant::Channels,
            Variant::Embedding => EnvVariant::Embedding,
            Variant::Attention => EnvVariant::Attention,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = EnvConfig {
        random_start: cli.random_start,
        ticks_per_step: cli.ticks_per_step,
    };

    // Only the embedding variant reads the precomputed tables.
    let nav = match cli.variant {
        Variant::Embedding => Some(Arc::new(
            NavTables::load(&cli.data_dir).context("failed to load navigation tables")?,
        )),
        _ => None,
    };

    let env = build_env::<NdArray<f32>>(
        cli.variant.into(),
        config,
        nav,
        NdArrayDevice::default(),
    )?;

    match cli.mode {
        Mode::Play => PlayMode::new(env).run().await,
        Mode::Watch => WatchMode::new(env).run().await,
    }
}
