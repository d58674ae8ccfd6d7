//! Batch embedding command.

use std::path::PathBuf;

use crate::batch::{self, EmbedOptions};
use crate::config;
use crate::error::Error;
use crate::ffmpeg;

use super::print_ffmpeg_install_instructions;

/// Embed lyrics and cover art into the audio files of a directory
#[allow(clippy::too_many_arguments)]
pub fn cmd_embed(
    dir: &PathBuf,
    lyrics_dir: Option<&PathBuf>,
    cover_dir: Option<&PathBuf>,
    encoding: Option<&str>,
    keep_lyrics: bool,
    accel: bool,
    skip_lyrics: bool,
) -> anyhow::Result<()> {
    let defaults = config::load();

    let options = EmbedOptions {
        audio_dir: dir.clone(),
        lyrics_dir: lyrics_dir.cloned(),
        cover_dir: cover_dir.cloned(),
        encoding: encoding.map(str::to_string).unwrap_or(defaults.encoding),
        keep_lyrics: keep_lyrics || defaults.keep_lyrics,
        use_accel: accel || defaults.use_accel,
        skip_lyrics,
    };

    // Reject impossible configurations before probing anything
    if let Err(e) = options.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // ffmpeg must be present for the batch to do any work at all
    if !ffmpeg::is_available() {
        print_ffmpeg_install_instructions();
        std::process::exit(1);
    }

    println!("Embedding into audio files in {:?}", options.audio_dir);
    if !options.skip_lyrics {
        println!("Lyric encoding: {}", options.encoding);
        println!(
            "Lyric files will be {} after embedding",
            if options.keep_lyrics { "kept" } else { "deleted" }
        );
    }
    println!();

    match batch::run(&options) {
        Ok(report) => {
            println!();
            println!("Done: {}/{} file(s) processed.", report.processed, report.total);
            Ok(())
        }
        Err(Error::ToolMissing) => {
            print_ffmpeg_install_instructions();
            std::process::exit(1);
        }
        Err(Error::Config(message)) => {
            eprintln!("Error: {}", message);
            std::process::exit(1);
        }
        Err(e) => Err(e.into()),
    }
}
