//! Mux plan construction.
//!
//! Builds the exact ffmpeg invocation for each combination of container,
//! embedded payload, and negotiated acceleration mode. Plans are pure data:
//! the same request always produces the same plan, and nothing here touches
//! the filesystem or spawns a process; execution belongs to [`crate::commit`].
//!
//! Stream layout invariants:
//! - The audio file is always input 0; the scratch lyric file (MP3 only) and
//!   the cover image follow in that order.
//! - Every plan suppresses tool logging and writes to a staged output path
//!   distinct from the input; the original is never overwritten in place.
//! - MP3 embeds lyrics as a subtitle stream with the `lyrics` disposition and
//!   the cover as an `attached_pic` stream.
//! - FLAC has no separate lyric stream: lyric text rides in a `lyrics=`
//!   container tag and the cover becomes a picture block. ffmpeg cannot
//!   overwrite a file it is simultaneously reading, so FLAC output is staged
//!   into a subdirectory and moved over the original afterwards.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::ffmpeg::AccelMode;

/// Marker substring carried by staged MP3 outputs.
///
/// The audio scan excludes any filename containing this marker so leftovers
/// from an interrupted run are never picked up as input.
pub const TEMP_MARKER: &str = ".tmp-embed.";

/// Staging subdirectory name for FLAC outputs.
pub const STAGING_DIR: &str = ".embed-staging";

// Fixed stream metadata stamped on an attached FLAC picture. The values carry
// literal quotes, matching the invocation the tool contract was written for.
const FLAC_COVER_TITLE: &str = r#"title="Album cover""#;
const FLAC_COVER_COMMENT: &str = r#"comment="Cover (front)""#;

/// Audio container format, dispatched on file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    Mp3,
    Flac,
}

impl Container {
    /// Derive the container from a path's extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_lowercase());
        match ext.as_deref() {
            Some("mp3") => Some(Self::Mp3),
            Some("flac") => Some(Self::Flac),
            _ => None,
        }
    }
}

/// What gets embedded into one file.
///
/// Constructing a `Payload` is the proof that there is something to do:
/// [`Payload::from_flags`] returns `None` when both inputs are absent, and the
/// caller skips the file without ever building a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payload {
    Lyrics,
    Cover,
    Both,
}

impl Payload {
    pub fn from_flags(has_lyrics: bool, has_cover: bool) -> Option<Self> {
        match (has_lyrics, has_cover) {
            (true, true) => Some(Self::Both),
            (true, false) => Some(Self::Lyrics),
            (false, true) => Some(Self::Cover),
            (false, false) => None,
        }
    }

    pub fn has_lyrics(self) -> bool {
        matches!(self, Self::Lyrics | Self::Both)
    }

    pub fn has_cover(self) -> bool {
        matches!(self, Self::Cover | Self::Both)
    }
}

/// Everything the planner needs to know about one audio file.
#[derive(Debug)]
pub struct MuxRequest<'a> {
    pub audio: &'a Path,
    pub container: Container,
    pub payload: Payload,
    /// Scratch lyric file handed to ffmpeg as an input stream (MP3)
    pub scratch_lyrics: Option<&'a Path>,
    /// Decoded lyric text, written as a container tag (FLAC)
    pub lyrics_text: Option<&'a str>,
    pub cover: Option<&'a Path>,
    pub accel: AccelMode,
}

/// One planned ffmpeg invocation plus the artifact bookkeeping around it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MuxPlan {
    /// Arguments for the ffmpeg process, in order
    pub args: Vec<OsString>,
    /// Staged output artifact the tool must produce
    pub output: PathBuf,
    /// FLAC staging subdirectory to remove after the swap
    pub staging_dir: Option<PathBuf>,
}

/// Build the command plan for one file.
pub fn plan(req: &MuxRequest) -> MuxPlan {
    match req.container {
        Container::Mp3 => plan_mp3(req),
        Container::Flac => plan_flac(req),
    }
}

fn plan_mp3(req: &MuxRequest) -> MuxPlan {
    let output = staged_sibling(req.audio);

    let mut args: Vec<OsString> = vec!["-y".into(), "-i".into(), req.audio.into()];
    if let Some(scratch) = req.scratch_lyrics {
        args.push("-i".into());
        args.push(scratch.into());
    }
    if let Some(cover) = req.cover {
        args.push("-i".into());
        args.push(cover.into());
    }

    // Decision table: payload x acceleration. The accelerated rows copy-tag
    // stream types individually; the software rows copy collectively. Both
    // are codec-copy, nothing is ever re-encoded.
    let mapping: &[&str] = match (req.payload, req.accel) {
        (Payload::Both, AccelMode::Hardware) => &[
            "-map", "0:a", "-map", "1", "-map", "2",
            "-c:a", "copy", "-c:s", "copy",
            "-disposition:1", "lyrics", "-disposition:2", "attached_pic",
        ],
        (Payload::Both, AccelMode::Software) => &[
            "-map", "0:a", "-map", "1", "-map", "2",
            "-c", "copy",
            "-disposition:1", "lyrics", "-disposition:2", "attached_pic",
        ],
        (Payload::Lyrics, AccelMode::Hardware) => &[
            "-map", "0:a", "-map", "1",
            "-c:a", "copy", "-c:s", "copy",
            "-disposition:1", "lyrics",
        ],
        (Payload::Lyrics, AccelMode::Software) => &[
            "-map", "0", "-map", "1",
            "-c", "copy",
            "-disposition:1", "lyrics",
        ],
        (Payload::Cover, AccelMode::Hardware) => &[
            "-map", "0:a", "-map", "1",
            "-c:a", "copy", "-c:v", "copy",
            "-disposition:1", "attached_pic",
        ],
        (Payload::Cover, AccelMode::Software) => &[
            "-map", "0", "-map", "1",
            "-c", "copy",
            "-disposition:1", "attached_pic",
        ],
    };
    args.extend(mapping.iter().map(|s| OsString::from(*s)));

    push_tail(&mut args, &output);
    MuxPlan {
        args,
        output,
        staging_dir: None,
    }
}

// FLAC ignores the acceleration mode: every stream is copied and the lyric
// text never becomes a stream of its own.
fn plan_flac(req: &MuxRequest) -> MuxPlan {
    let parent = req.audio.parent().unwrap_or_else(|| Path::new("."));
    let staging = parent.join(STAGING_DIR);
    let output = staging.join(req.audio.file_name().unwrap_or_default());

    let mut args: Vec<OsString> = vec!["-y".into(), "-i".into(), req.audio.into()];
    if let Some(cover) = req.cover {
        args.push("-i".into());
        args.push(cover.into());
    }

    args.push("-c".into());
    args.push("copy".into());

    if req.payload.has_lyrics() {
        args.push("-metadata".into());
        args.push(format!("lyrics={}", req.lyrics_text.unwrap_or_default()).into());
    }
    if req.payload.has_cover() {
        args.push("-metadata:s:v".into());
        args.push(FLAC_COVER_TITLE.into());
        args.push("-metadata:s:v".into());
        args.push(FLAC_COVER_COMMENT.into());
    }

    push_tail(&mut args, &output);
    MuxPlan {
        args,
        output,
        staging_dir: Some(staging),
    }
}

/// Staged sibling path for an MP3: `song.mp3` -> `song.tmp-embed.mp3`.
fn staged_sibling(audio: &Path) -> PathBuf {
    let stem = audio
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    let ext = audio
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("mp3");
    audio.with_file_name(format!("{stem}{TEMP_MARKER}{ext}"))
}

fn push_tail(args: &mut Vec<OsString>, output: &Path) {
    args.push("-loglevel".into());
    args.push("quiet".into());
    args.push(output.into());
}
