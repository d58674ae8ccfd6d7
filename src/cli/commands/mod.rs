//! CLI command definitions and dispatch.
//!
//! Each subcommand is implemented in its own submodule:
//! - `embed`: the batch embedding pipeline
//! - `configure`: persisted per-user defaults
//! - `tools`: external tool diagnostics

mod configure;
mod embed;
mod tools;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use configure::cmd_config;
pub use embed::cmd_embed;
pub use tools::cmd_check_tools;

/// lrc-embed CLI
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Embed lyrics and cover art into MP3/FLAC files
    Embed {
        /// Directory containing the audio files
        #[arg(short, long)]
        dir: PathBuf,
        /// Directory containing .lrc files (defaults to the audio directory)
        #[arg(short, long)]
        lyrics_dir: Option<PathBuf>,
        /// Directory containing cover images (covers are off when unset)
        #[arg(short, long)]
        cover_dir: Option<PathBuf>,
        /// Lyric text encoding label, e.g. gb2312, utf-8
        #[arg(short, long)]
        encoding: Option<String>,
        /// Keep matched lyric files after embedding (default: delete them)
        #[arg(short, long)]
        keep_lyrics: bool,
        /// Use NVENC hardware acceleration when the installed ffmpeg supports it
        #[arg(short = 'g', long)]
        accel: bool,
        /// Skip lyric embedding, covers only
        #[arg(short, long)]
        skip_lyrics: bool,
    },
    /// Check that ffmpeg is installed and report its capabilities
    CheckTools,
    /// Show or update the persisted defaults for the embed command
    Config {
        /// Default lyric encoding label
        #[arg(long)]
        encoding: Option<String>,
        /// Keep lyric files after embedding by default
        #[arg(long)]
        keep_lyrics: Option<bool>,
        /// Request hardware acceleration by default
        #[arg(long)]
        use_accel: Option<bool>,
    },
}

/// Run the specified CLI command.
pub fn run_command(cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Embed {
            dir,
            lyrics_dir,
            cover_dir,
            encoding,
            keep_lyrics,
            accel,
            skip_lyrics,
        } => cmd_embed(
            dir,
            lyrics_dir.as_ref(),
            cover_dir.as_ref(),
            encoding.as_deref(),
            *keep_lyrics,
            *accel,
            *skip_lyrics,
        ),
        Commands::CheckTools => cmd_check_tools(),
        Commands::Config {
            encoding,
            keep_lyrics,
            use_accel,
        } => cmd_config(encoding.as_deref(), *keep_lyrics, *use_accel),
    }
}

// ============================================================================
// Shared helper functions
// ============================================================================

/// Print installation instructions for ffmpeg
pub(crate) fn print_ffmpeg_install_instructions() {
    eprintln!("Error: ffmpeg not found.");
    eprintln!("Install ffmpeg:");
    eprintln!("  Windows: winget install Gyan.FFmpeg");
    eprintln!("  macOS:   brew install ffmpeg");
    eprintln!("  Linux:   apt install ffmpeg");
}
