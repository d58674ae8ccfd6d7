//! Filename matching between audio files and their lyric/cover sidecars.
//!
//! Lyric downloads and cover rips usually share the track's basename, with
//! extra decoration on one side or the other ("Artist - Title.lrc",
//! "Artist - Title (scan).jpg"), so matching is deliberately loose:
//!
//! - A lyric candidate matches when its full filename starts with the track
//!   basename.
//! - A cover candidate matches when its own stem equals the track basename,
//!   is a prefix of it, or has it as a prefix.
//!
//! First match wins; there is no scoring among multiple candidates.
//! Candidate lists are sorted lexicographically before matching so the winner
//! is deterministic regardless of filesystem listing order.

use std::path::{Path, PathBuf};

/// Lyric file extension (lowercase for matching)
pub const LYRIC_EXTENSION: &str = "lrc";

/// Image extensions recognized as cover art (lowercase for matching)
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "gif"];

/// Find the lyric filename matching a track basename.
///
/// A candidate matches when its full filename (extension included) starts
/// with `base`. Returns the first match in slice order.
pub fn find_lyrics<'a>(base: &str, candidates: &'a [String]) -> Option<&'a str> {
    candidates
        .iter()
        .map(String::as_str)
        .find(|name| name.starts_with(base))
}

/// Find the cover filename matching a track basename.
///
/// A candidate matches when its stem equals `base`, is a prefix of `base`,
/// or has `base` as a prefix. Returns the first match in slice order.
pub fn find_cover<'a>(base: &str, candidates: &'a [String]) -> Option<&'a str> {
    candidates.iter().map(String::as_str).find(|name| {
        let stem = Path::new(name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(name);
        stem == base || base.starts_with(stem) || stem.starts_with(base)
    })
}

/// List `.lrc` filenames in `dir`, sorted lexicographically.
///
/// Returns an empty list when the directory does not exist or is unreadable.
pub fn lyric_candidates(dir: &Path) -> Vec<String> {
    list_by_extension(dir, &[LYRIC_EXTENSION])
}

/// List image filenames in `dir`, sorted lexicographically.
pub fn cover_candidates(dir: &Path) -> Vec<String> {
    list_by_extension(dir, IMAGE_EXTENSIONS)
}

/// Resolve the lyric file for a track basename in `dir`, if any.
pub fn find_lyrics_in_dir(base: &str, dir: &Path) -> Option<PathBuf> {
    let candidates = lyric_candidates(dir);
    find_lyrics(base, &candidates).map(|name| dir.join(name))
}

/// Resolve the cover image for a track basename in `dir`, if any.
pub fn find_cover_in_dir(base: &str, dir: &Path) -> Option<PathBuf> {
    let candidates = cover_candidates(dir);
    find_cover(base, &candidates).map(|name| dir.join(name))
}

/// List files in `dir` whose extension is in `extensions` (case-insensitive),
/// sorted lexicographically.
fn list_by_extension(dir: &Path, extensions: &[&str]) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut names: Vec<String> = entries
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
        .filter_map(|e| e.file_name().into_string().ok())
        .filter(|name| {
            Path::new(name)
                .extension()
                .and_then(|s| s.to_str())
                .map(|ext| extensions.contains(&ext.to_lowercase().as_str()))
                .unwrap_or(false)
        })
        .collect();
    names.sort_unstable();
    names
}


/// Property-based tests using proptest
#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn basename() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9 _-]{1,12}"
    }

    proptest! {
        /// A lyric match, when found, always starts with the basename
        #[test]
        fn lyric_match_starts_with_base(
            base in basename(),
            mut candidates in prop::collection::vec("[a-zA-Z0-9 _-]{1,12}\\.lrc", 0..8),
        ) {
            candidates.sort_unstable();
            if let Some(found) = find_lyrics(&base, &candidates) {
                prop_assert!(found.starts_with(&base));
            }
        }

        /// If any candidate starts with the basename, a match is returned
        #[test]
        fn lyric_match_found_when_prefix_exists(
            base in basename(),
            suffix in "[a-zA-Z0-9]{0,6}",
        ) {
            let candidate = format!("{base}{suffix}.lrc");
            let candidates = vec![candidate.clone()];
            prop_assert_eq!(find_lyrics(&base, &candidates), Some(candidate.as_str()));
        }

        /// A cover match, when found, satisfies the three-way containment rule
        #[test]
        fn cover_match_obeys_containment(
            base in basename(),
            mut candidates in prop::collection::vec("[a-zA-Z0-9 _-]{1,12}\\.(jpg|png)", 0..8),
        ) {
            candidates.sort_unstable();
            if let Some(found) = find_cover(&base, &candidates) {
                let stem = Path::new(found)
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap();
                prop_assert!(
                    stem == base || base.starts_with(stem) || stem.starts_with(&base),
                    "stem {:?} does not contain-match base {:?}", stem, base
                );
            }
        }

        /// An exact-stem cover candidate is always found
        #[test]
        fn cover_exact_stem_always_matches(base in basename()) {
            let candidates = vec![format!("{base}.jpg")];
            prop_assert!(find_cover(&base, &candidates).is_some());
        }
    }
}
