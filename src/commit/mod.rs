//! Execution of mux plans and the destructive file swap.
//!
//! The swap follows a verify-then-replace discipline: ffmpeg only ever writes
//! a staged artifact, and the original is touched only after the tool exited
//! cleanly and the artifact exists on disk. A failed run leaves the original
//! unmodified.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, warn};

use crate::error::{Error, Result, ResultExt};
use crate::mux::MuxPlan;

static SCRATCH_SEQ: AtomicU64 = AtomicU64::new(0);

/// Owned handle to the transient lyric file handed to ffmpeg.
///
/// The name is unique per process and per task, so concurrent instances of
/// the tool (or a future parallel pipeline) cannot collide. The file is
/// removed on `Drop`, on every exit path.
pub struct ScratchLyrics {
    path: PathBuf,
}

impl ScratchLyrics {
    /// Write `text` as UTF-8 into a fresh scratch file under `dir`.
    pub fn write(dir: &Path, text: &str) -> std::io::Result<Self> {
        let seq = SCRATCH_SEQ.fetch_add(1, Ordering::Relaxed);
        let path = dir.join(format!(".lyrics-{}-{}.lrc", std::process::id(), seq));
        fs::write(&path, text)?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchLyrics {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            warn!(
                path = %self.path.display(),
                error = %e,
                "failed to remove scratch lyric file"
            );
        }
    }
}

/// Execute `plan` with the given ffmpeg binary and replace `original` with
/// the staged artifact.
///
/// Success requires a zero exit code and an existing output artifact; only
/// then is the original deleted and the staged file moved into its place.
pub fn commit(ffmpeg: &OsStr, plan: &MuxPlan, original: &Path) -> Result<()> {
    // The tool does not create output directories itself
    if let Some(staging) = &plan.staging_dir {
        fs::create_dir_all(staging)
            .with_context(format!("creating staging directory {}", staging.display()))?;
    }

    let output = Command::new(ffmpeg)
        .args(&plan.args)
        .output()
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::ToolMissing,
            _ => Error::Io(e),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::mux(
            original,
            format!("ffmpeg exited with {}: {}", output.status, stderr.trim()),
        ));
    }
    if !plan.output.exists() {
        return Err(Error::mux(
            original,
            format!("expected output {} was not created", plan.output.display()),
        ));
    }

    fs::remove_file(original).with_context(format!("removing original {}", original.display()))?;
    move_file(&plan.output, original)?;

    // Staging directory cleanup is best-effort
    if let Some(staging) = &plan.staging_dir
        && let Err(e) = fs::remove_dir(staging)
    {
        debug!(dir = %staging.display(), error = %e, "could not remove staging directory");
    }

    Ok(())
}

/// Rename `from` onto `to`, falling back to copy + delete for cross-device
/// moves.
fn move_file(from: &Path, to: &Path) -> Result<()> {
    if fs::rename(from, to).is_err() {
        fs::copy(from, to).with_context(format!("copying staged file to {}", to.display()))?;
        fs::remove_file(from)
            .with_context(format!("removing staged file {}", from.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;
    use tempfile::tempdir;

    fn fake_plan(args: Vec<OsString>, output: PathBuf, staging_dir: Option<PathBuf>) -> MuxPlan {
        MuxPlan {
            args,
            output,
            staging_dir,
        }
    }

    #[test]
    fn test_scratch_paths_are_unique() {
        let temp = tempdir().unwrap();
        let a = ScratchLyrics::write(temp.path(), "a").unwrap();
        let b = ScratchLyrics::write(temp.path(), "b").unwrap();
        assert_ne!(a.path(), b.path());
    }

    #[test]
    fn test_scratch_removed_on_drop() {
        let temp = tempdir().unwrap();
        let path;
        {
            let scratch = ScratchLyrics::write(temp.path(), "[00:01.00]line1").unwrap();
            path = scratch.path().to_path_buf();
            assert!(path.exists());
        }
        assert!(!path.exists());
    }

    #[test]
    fn test_scratch_drop_tolerates_missing_file() {
        let temp = tempdir().unwrap();
        let scratch = ScratchLyrics::write(temp.path(), "x").unwrap();
        fs::remove_file(scratch.path()).unwrap();
        // Drop must not panic
    }

    #[test]
    fn test_commit_missing_tool_is_distinct_error() {
        let temp = tempdir().unwrap();
        let original = temp.path().join("song.mp3");
        fs::write(&original, b"audio").unwrap();

        let plan = fake_plan(vec![], temp.path().join("out.mp3"), None);
        let err = commit(OsStr::new("/nonexistent/ffmpeg-binary"), &plan, &original).unwrap_err();
        assert!(matches!(err, Error::ToolMissing));
        assert!(original.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_commit_missing_artifact_fails_and_preserves_original() {
        let temp = tempdir().unwrap();
        let original = temp.path().join("song.mp3");
        fs::write(&original, b"audio").unwrap();

        // Exits cleanly but produces no output artifact
        let plan = fake_plan(vec![], temp.path().join("never-created.mp3"), None);
        let err = commit(OsStr::new("true"), &plan, &original).unwrap_err();
        assert!(matches!(err, Error::Mux { .. }));
        assert_eq!(fs::read(&original).unwrap(), b"audio");
    }

    #[cfg(unix)]
    #[test]
    fn test_commit_nonzero_exit_fails_and_preserves_original() {
        let temp = tempdir().unwrap();
        let original = temp.path().join("song.mp3");
        fs::write(&original, b"audio").unwrap();

        let plan = fake_plan(vec![], temp.path().join("out.mp3"), None);
        let err = commit(OsStr::new("false"), &plan, &original).unwrap_err();
        assert!(matches!(err, Error::Mux { .. }));
        assert_eq!(fs::read(&original).unwrap(), b"audio");
    }

    #[cfg(unix)]
    #[test]
    fn test_commit_swaps_staged_output_over_original() {
        let temp = tempdir().unwrap();
        let original = temp.path().join("song.mp3");
        fs::write(&original, b"old").unwrap();
        let staged = temp.path().join("song.tmp-embed.mp3");

        // Stand-in for ffmpeg: write the staged artifact and exit 0
        let plan = fake_plan(
            vec![
                "-c".into(),
                format!("printf new > '{}'", staged.display()).into(),
            ],
            staged.clone(),
            None,
        );
        commit(OsStr::new("sh"), &plan, &original).unwrap();

        assert_eq!(fs::read(&original).unwrap(), b"new");
        assert!(!staged.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_commit_creates_and_removes_staging_dir() {
        let temp = tempdir().unwrap();
        let original = temp.path().join("track.flac");
        fs::write(&original, b"old").unwrap();
        let staging = temp.path().join(".embed-staging");
        let staged = staging.join("track.flac");

        let plan = fake_plan(
            vec![
                "-c".into(),
                format!("printf new > '{}'", staged.display()).into(),
            ],
            staged.clone(),
            Some(staging.clone()),
        );
        commit(OsStr::new("sh"), &plan, &original).unwrap();

        assert_eq!(fs::read(&original).unwrap(), b"new");
        assert!(!staging.exists());
    }
}
