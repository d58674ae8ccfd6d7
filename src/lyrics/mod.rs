//! Lyric text loading with legacy-encoding tolerance.
//!
//! LRC files in the wild are frequently mislabelled: a user-configured
//! encoding (commonly gb2312 for Chinese lyric downloads) is often wrong for
//! any given file. Loading is therefore two-tier:
//!
//! 1. Decode with the caller's encoding label, dropping undecodable byte
//!    sequences instead of failing.
//! 2. If the label is not a known encoding, sniff the bytes once with
//!    chardetng and decode with the guess, same drop policy.
//!
//! A leading U+FEFF byte-order mark is stripped in either case. Only I/O
//! failures surface as errors; the caller treats those as "no lyrics
//! available" and moves on.

use std::path::Path;

use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Default lyric encoding label (WHATWG label; maps to GBK).
pub const DEFAULT_ENCODING: &str = "gb2312";

/// Load a lyric file as text using `encoding_label`, falling back to
/// auto-detection when the label is unknown.
pub fn load(path: &Path, encoding_label: &str) -> Result<String> {
    let bytes = std::fs::read(path)
        .map_err(|e| Error::decode(path, format!("cannot read lyric file: {e}")))?;

    let encoding = match Encoding::for_label(encoding_label.as_bytes()) {
        Some(encoding) => encoding,
        None => {
            let detected = detect_encoding(&bytes);
            warn!(
                label = encoding_label,
                detected = detected.name(),
                path = %path.display(),
                "unknown encoding label, using detected encoding"
            );
            detected
        }
    };

    Ok(decode_dropping_errors(&bytes, encoding, path))
}

/// Guess the encoding of raw lyric bytes.
pub fn detect_encoding(bytes: &[u8]) -> &'static Encoding {
    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    detector.guess(None, true)
}

/// Decode `bytes`, dropping undecodable sequences and a leading BOM.
///
/// `encoding_rs` substitutes U+FFFD for malformed input; those substitutions
/// are removed so malformed files degrade to readable text instead of
/// replacement-character noise.
fn decode_dropping_errors(bytes: &[u8], encoding: &'static Encoding, path: &Path) -> String {
    let (decoded, actual, had_errors) = encoding.decode(bytes);

    let text = if had_errors {
        debug!(
            encoding = actual.name(),
            path = %path.display(),
            "lyric file contains undecodable byte sequences, dropping them"
        );
        decoded.chars().filter(|c| *c != '\u{FFFD}').collect()
    } else {
        decoded.into_owned()
    };

    match text.strip_prefix('\u{FEFF}') {
        Some(stripped) => stripped.to_string(),
        None => text,
    }
}
