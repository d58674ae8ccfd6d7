//! Batch orchestration: scan, match, plan, commit, count.
//!
//! Files are processed strictly one at a time, each fully finished (scratch
//! cleanup included) before the next begins. A failure on one file is logged
//! and the batch moves on; only two conditions abort the whole run: ffmpeg
//! missing from the execution path, and a configuration with nothing to do.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::commit::{self, ScratchLyrics};
use crate::error::{Error, Result, ResultExt};
use crate::ffmpeg::{self, AccelMode};
use crate::lyrics;
use crate::matcher;
use crate::mux::{self, Container, MuxRequest, Payload};

/// Inputs for one batch run. Owned by the CLI layer, validated here.
#[derive(Debug, Clone)]
pub struct EmbedOptions {
    /// Directory holding the audio files (required)
    pub audio_dir: PathBuf,
    /// Directory holding .lrc files; defaults to the audio directory
    pub lyrics_dir: Option<PathBuf>,
    /// Directory holding cover images; feature off when unset
    pub cover_dir: Option<PathBuf>,
    /// Encoding label for lyric files
    pub encoding: String,
    /// Keep matched lyric files after embedding
    pub keep_lyrics: bool,
    /// Request NVENC hardware acceleration
    pub use_accel: bool,
    /// Skip lyric embedding entirely, covers only
    pub skip_lyrics: bool,
}

impl EmbedOptions {
    /// Reject configurations the batch could never act on.
    pub fn validate(&self) -> Result<()> {
        if !self.audio_dir.is_dir() {
            return Err(Error::config(format!(
                "audio directory {} does not exist",
                self.audio_dir.display()
            )));
        }
        if self.skip_lyrics && self.cover_dir.is_none() {
            return Err(Error::config(
                "nothing to embed: lyrics are skipped and no cover directory is set",
            ));
        }
        Ok(())
    }
}

/// Per-run counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Files successfully rewritten
    pub processed: usize,
    /// Audio files found by the scan
    pub total: usize,
}

/// Resolved per-run directories and settings.
struct RunContext {
    /// `None` means lyric embedding is skipped
    lyrics_dir: Option<PathBuf>,
    /// `None` means the cover feature is off
    cover_dir: Option<PathBuf>,
    encoding: String,
}

/// Result of the per-file matching stage.
struct ResolvedFile {
    payload: Payload,
    /// The matched lyric file, kept for post-success deletion
    lyric_path: Option<PathBuf>,
    lyric_text: Option<String>,
    cover: Option<PathBuf>,
}

enum Outcome {
    Embedded(Payload),
    Skipped,
}

/// Run one batch over the configured directories.
pub fn run(opts: &EmbedOptions) -> Result<RunReport> {
    opts.validate()?;

    let ffmpeg_bin = ffmpeg::locate().ok_or(Error::ToolMissing)?;
    let accel = ffmpeg::negotiate_accel(opts.use_accel);

    let ctx = RunContext {
        lyrics_dir: resolve_lyrics_dir(opts),
        cover_dir: resolve_cover_dir(opts),
        encoding: opts.encoding.clone(),
    };

    let files = scan_audio_files(&opts.audio_dir)?;
    if files.is_empty() {
        warn!(dir = %opts.audio_dir.display(), "no MP3 or FLAC files found");
        return Ok(RunReport::default());
    }
    info!(
        count = files.len(),
        dir = %opts.audio_dir.display(),
        hw_accel = accel.is_hardware(),
        "starting batch"
    );

    let mut processed = 0;
    for audio in &files {
        match process_file(ffmpeg_bin, audio, &ctx, accel, opts) {
            Ok(Outcome::Embedded(payload)) => {
                processed += 1;
                info!(
                    file = %display_name(audio),
                    lyrics = payload.has_lyrics(),
                    cover = payload.has_cover(),
                    "embedded"
                );
            }
            Ok(Outcome::Skipped) => {}
            Err(e) => {
                warn!(file = %display_name(audio), error = %e, "processing failed");
            }
        }
    }

    Ok(RunReport {
        processed,
        total: files.len(),
    })
}

/// List `.mp3`/`.flac` files in `dir` (non-recursive), excluding staged
/// leftovers from a prior run, sorted for a deterministic processing order.
pub fn scan_audio_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries =
        fs::read_dir(dir).with_context(format!("reading audio directory {}", dir.display()))?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
        .map(|e| e.path())
        .filter(|p| is_audio_file(p))
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .map(|n| !n.contains(mux::TEMP_MARKER))
                .unwrap_or(false)
        })
        .collect();
    files.sort_unstable();
    Ok(files)
}

/// Check if a path has a supported audio extension
fn is_audio_file(path: &Path) -> bool {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase());
    matches!(ext.as_deref(), Some("mp3" | "flac"))
}

/// The lyrics directory defaults to the audio directory; a configured but
/// missing directory falls back to the audio directory with a warning.
fn resolve_lyrics_dir(opts: &EmbedOptions) -> Option<PathBuf> {
    if opts.skip_lyrics {
        info!("skipping lyric embedding");
        return None;
    }
    match &opts.lyrics_dir {
        Some(dir) if dir != &opts.audio_dir => {
            if dir.is_dir() {
                info!(dir = %dir.display(), "reading lyric files from lyrics directory");
                Some(dir.clone())
            } else {
                warn!(
                    dir = %dir.display(),
                    "lyrics directory does not exist, using the audio directory"
                );
                Some(opts.audio_dir.clone())
            }
        }
        _ => {
            info!("reading lyric files from the audio directory");
            Some(opts.audio_dir.clone())
        }
    }
}

/// The cover feature is off when the directory is unset or nonexistent.
fn resolve_cover_dir(opts: &EmbedOptions) -> Option<PathBuf> {
    match &opts.cover_dir {
        Some(dir) if dir.is_dir() => {
            info!(dir = %dir.display(), "reading cover images from cover directory");
            Some(dir.clone())
        }
        Some(dir) => {
            warn!(dir = %dir.display(), "cover directory does not exist, covers disabled");
            None
        }
        None => None,
    }
}

/// Resolve lyric and cover matches for one audio file.
///
/// Returns `None` when the file must be skipped. The state machine:
/// - lyric matching runs only when lyric embedding is enabled; a missing
///   match or a failed/empty decode downgrades to "no lyrics", which skips
///   the file unless a cover directory is configured
/// - after both resolutions, a file with nothing to embed is skipped, so the
///   committer is never invoked for a no-op
fn resolve_file(audio: &Path, ctx: &RunContext) -> Option<ResolvedFile> {
    let base = audio.file_stem().and_then(|s| s.to_str())?;

    let mut lyric_path = None;
    let mut lyric_text = None;
    if let Some(lyrics_dir) = &ctx.lyrics_dir {
        match matcher::find_lyrics_in_dir(base, lyrics_dir) {
            Some(found) => match lyrics::load(&found, &ctx.encoding) {
                Ok(text) if !text.is_empty() => {
                    lyric_path = Some(found);
                    lyric_text = Some(text);
                }
                Ok(_) | Err(_) => {
                    warn!(
                        file = %display_name(audio),
                        lyric = %found.display(),
                        "could not read lyric content"
                    );
                    if ctx.cover_dir.is_none() {
                        return None;
                    }
                }
            },
            None => {
                if ctx.cover_dir.is_none() {
                    warn!(file = %display_name(audio), "no matching lyric file, skipping");
                    return None;
                }
            }
        }
    }

    let cover = ctx
        .cover_dir
        .as_deref()
        .and_then(|dir| matcher::find_cover_in_dir(base, dir));

    let payload = match Payload::from_flags(lyric_text.is_some(), cover.is_some()) {
        Some(payload) => payload,
        None => {
            warn!(file = %display_name(audio), "nothing to embed, skipping");
            return None;
        }
    };

    Some(ResolvedFile {
        payload,
        lyric_path,
        lyric_text,
        cover,
    })
}

fn process_file(
    ffmpeg_bin: &str,
    audio: &Path,
    ctx: &RunContext,
    accel: AccelMode,
    opts: &EmbedOptions,
) -> Result<Outcome> {
    let Some(container) = Container::from_path(audio) else {
        return Ok(Outcome::Skipped);
    };
    let Some(resolved) = resolve_file(audio, ctx) else {
        return Ok(Outcome::Skipped);
    };

    // The scratch file lives exactly as long as this function: Drop removes
    // it on every exit path, before the next file starts.
    let scratch = match &resolved.lyric_text {
        Some(text) => Some(
            ScratchLyrics::write(&opts.audio_dir, text)
                .with_context("writing scratch lyric file")?,
        ),
        None => None,
    };

    let plan = mux::plan(&MuxRequest {
        audio,
        container,
        payload: resolved.payload,
        scratch_lyrics: scratch.as_ref().map(|s| s.path()),
        lyrics_text: resolved.lyric_text.as_deref(),
        cover: resolved.cover.as_deref(),
        accel,
    });
    commit::commit(ffmpeg_bin.as_ref(), &plan, audio)?;

    delete_embedded_lyric(&resolved, ctx, opts);
    Ok(Outcome::Embedded(resolved.payload))
}

/// Post-success housekeeping: the matched lyric file is deleted only when
/// lyrics were actually embedded, keeping is not requested, and the lyric
/// came from the audio directory itself. Deletion failure is a warning, not
/// a processing failure.
fn delete_embedded_lyric(resolved: &ResolvedFile, ctx: &RunContext, opts: &EmbedOptions) {
    if !resolved.payload.has_lyrics() || opts.keep_lyrics {
        return;
    }
    if ctx.lyrics_dir.as_deref() != Some(opts.audio_dir.as_path()) {
        return;
    }
    if let Some(lyric_path) = &resolved.lyric_path
        && let Err(e) = fs::remove_file(lyric_path)
    {
        warn!(
            lyric = %lyric_path.display(),
            error = %e,
            "embedded lyrics but could not delete the source lyric file"
        );
    }
}

fn display_name(path: &Path) -> std::path::Display<'_> {
    path.file_name().map(Path::new).unwrap_or(path).display()
}
