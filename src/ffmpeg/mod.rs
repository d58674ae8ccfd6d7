//! ffmpeg location and capability probing.
//!
//! This module shells out to the `ffmpeg` command-line tool for all container
//! rewriting. Shelling out is more reliable than FFI bindings and works on
//! every platform where ffmpeg is installed.
//!
//! Install ffmpeg:
//! - Windows: `winget install Gyan.FFmpeg` or download from https://ffmpeg.org
//! - macOS: `brew install ffmpeg`
//! - Linux: `apt install ffmpeg` or equivalent

use std::process::Command;

use tracing::{info, warn};

/// Common installation paths for ffmpeg on Windows
#[cfg(windows)]
const FFMPEG_PATHS: &[&str] = &[
    "ffmpeg", // In PATH
    r"C:\Program Files\ffmpeg\bin\ffmpeg.exe",
    r"C:\ffmpeg\bin\ffmpeg.exe",
];

#[cfg(not(windows))]
const FFMPEG_PATHS: &[&str] = &[
    "ffmpeg", // In PATH
    "/usr/bin/ffmpeg",
    "/usr/local/bin/ffmpeg",
    "/opt/homebrew/bin/ffmpeg",
];

/// Find the ffmpeg executable, checking common installation paths
pub fn locate() -> Option<&'static str> {
    FFMPEG_PATHS
        .iter()
        .find(|&path| {
            Command::new(path)
                .arg("-version")
                .output()
                .map(|o| o.status.success())
                .unwrap_or(false)
        })
        .map(|v| v as _)
}

/// Check if ffmpeg is available on the system
pub fn is_available() -> bool {
    locate().is_some()
}

/// Get the ffmpeg version line (for diagnostics)
pub fn version() -> Option<String> {
    let ffmpeg = locate()?;
    Command::new(ffmpeg)
        .arg("-version")
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| {
            String::from_utf8_lossy(&o.stdout)
                .lines()
                .next()
                .unwrap_or_default()
                .trim()
                .to_string()
        })
}

/// Negotiated acceleration mode for a run.
///
/// Acceleration is an optional optimization, never a hard requirement; a
/// request that the installed ffmpeg cannot honor downgrades to `Software`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccelMode {
    /// NVENC hardware encoders are available and were requested
    Hardware,
    /// CPU-only stream handling
    Software,
}

impl AccelMode {
    pub fn is_hardware(self) -> bool {
        matches!(self, Self::Hardware)
    }
}

/// Check whether the installed ffmpeg supports NVENC hardware encoding.
///
/// Queries `ffmpeg -encoders` and looks for the `nvenc` substring
/// case-insensitively. Any invocation failure (tool missing, non-zero exit)
/// yields `false` rather than an error.
pub fn supports_hw_accel() -> bool {
    let Some(ffmpeg) = locate() else {
        return false;
    };
    Command::new(ffmpeg)
        .arg("-encoders")
        .output()
        .map(|o| {
            o.status.success() && String::from_utf8_lossy(&o.stdout).to_lowercase().contains("nvenc")
        })
        .unwrap_or(false)
}

/// Negotiate the acceleration mode for a run.
///
/// Probes once; callers thread the result through instead of re-checking
/// per file.
pub fn negotiate_accel(requested: bool) -> AccelMode {
    if !requested {
        return AccelMode::Software;
    }
    if supports_hw_accel() {
        info!("NVENC hardware acceleration enabled");
        AccelMode::Hardware
    } else {
        warn!("NVENC hardware acceleration not supported by this ffmpeg, using software mode");
        AccelMode::Software
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_available() {
        // This test just ensures the probe doesn't panic
        let _ = is_available();
    }

    #[test]
    fn test_version_does_not_panic() {
        let _ = version();
    }

    #[test]
    fn test_negotiate_accel_not_requested() {
        assert_eq!(negotiate_accel(false), AccelMode::Software);
    }

    #[test]
    fn test_accel_mode_flags() {
        assert!(AccelMode::Hardware.is_hardware());
        assert!(!AccelMode::Software.is_hardware());
    }
}
