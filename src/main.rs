//! lrc-embed - batch lyric and cover embedding for MP3/FLAC files.
//!
//! Matches each audio file in a directory to a sidecar LRC lyric file and a
//! cover image by filename, then rewrites the container through ffmpeg with
//! the lyrics and artwork embedded, replacing the original in place.

pub mod batch;
pub mod cli;
pub mod commit;
pub mod config;
pub mod error;
pub mod ffmpeg;
pub mod lyrics;
pub mod matcher;
pub mod mux;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(EnvFilter::from_default_env().add_directive("lrc_embed=info".parse().unwrap()))
        .init();

    cli::run_command(&args)
}
