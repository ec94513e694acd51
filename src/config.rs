use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::error::EngineError;
use crate::factory::RandomPieceProvider;
use crate::game::{Game, DEFAULT_HEIGHT, DEFAULT_WIDTH};

pub const DEFAULT_TICK_MS: u64 = 500;

/// Runtime settings for a play session. Every flag can also come from the
/// environment.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "blockfall", version, about = "Falling-block puzzle in the terminal")]
pub struct Config {
    /// Board width in cells
    #[arg(
        long,
        env = "BLOCKFALL_WIDTH",
        default_value_t = DEFAULT_WIDTH as u16,
        value_parser = clap::value_parser!(u16).range(4..=64)
    )]
    pub width: u16,

    /// Board height in cells
    #[arg(
        long,
        env = "BLOCKFALL_HEIGHT",
        default_value_t = DEFAULT_HEIGHT as u16,
        value_parser = clap::value_parser!(u16).range(4..=64)
    )]
    pub height: u16,

    /// Gravity period in milliseconds
    #[arg(
        long,
        env = "BLOCKFALL_TICK_MS",
        default_value_t = DEFAULT_TICK_MS,
        value_parser = clap::value_parser!(u64).range(50..=5000)
    )]
    pub tick_ms: u64,

    /// Seed for piece draws; omit for a different game every run
    #[arg(long, env = "BLOCKFALL_SEED")]
    pub seed: Option<u64>,

    /// Write logs to this file (filtered by RUST_LOG)
    #[arg(long, env = "BLOCKFALL_LOG_FILE", value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
    pub log_file: Option<PathBuf>,
}

impl Config {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn piece_provider(&self) -> RandomPieceProvider {
        match self.seed {
            Some(seed) => RandomPieceProvider::seeded(seed),
            None => RandomPieceProvider::from_entropy(),
        }
    }

    pub fn new_game(&self) -> Result<Game, EngineError> {
        Game::with_provider(
            self.width as usize,
            self.height as usize,
            Box::new(self.piece_provider()),
        )
    }
}
