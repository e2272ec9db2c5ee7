//! Utility functions for text cleanup, log truncation, and output directories.
//!
//! This module provides helpers used throughout the crate:
//! - Whitespace collapsing and player-name marker stripping for grammars
//! - String truncation for logging row markup
//! - File system validation for the output directory

use std::error::Error;
use std::fs as stdfs;
use tokio::fs;
use tracing::{info, instrument};

/// Collapse every run of whitespace (including non-breaking spaces) into a
/// single ASCII space and trim both ends.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(collapse_ws("  MS \n Dhoni "), "MS Dhoni");
/// ```
pub fn collapse_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Strip captaincy and wicketkeeper markers from a player name.
///
/// Removes every `(c)` and `†`, then collapses whitespace.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(strip_name_markers("MS Dhoni (c)†"), "MS Dhoni");
/// ```
pub fn strip_name_markers(s: &str) -> String {
    collapse_ws(&s.replace("(c)", "").replace('†', ""))
}

/// Truncate a string for logging purposes.
///
/// Long strings are truncated to at most `max` bytes (on a character
/// boundary) with an ellipsis and byte count indicator appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if it doesn't exist, then performs a write test by
/// creating and immediately deleting a probe file.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or is not writable.
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn ensure_writable_dir(path: &str) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(path).await?;
    let probe_path = format!("{}/..__probe_write__", path.trim_end_matches('/'));
    match stdfs::File::create(&probe_path) {
        Ok(_) => {
            let _ = stdfs::remove_file(&probe_path);
            info!("Output directory is writable");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_ws() {
        assert_eq!(collapse_ws("  MS \n\t Dhoni  "), "MS Dhoni");
        assert_eq!(collapse_ws("a\u{a0}b"), "a b");
        assert_eq!(collapse_ws("   "), "");
    }

    #[test]
    fn test_strip_name_markers() {
        assert_eq!(strip_name_markers("MS Dhoni (c)†"), "MS Dhoni");
        assert_eq!(strip_name_markers("†Q de  Kock"), "Q de Kock");
        assert_eq!(strip_name_markers("RG Sharma"), "RG Sharma");
    }

    #[test]
    fn test_strip_name_markers_inside_text() {
        assert_eq!(strip_name_markers("Jadeja/†Dhoni"), "Jadeja/Dhoni");
        assert_eq!(strip_name_markers("Dhoni(c)/Raina"), "Dhoni/Raina");
        assert_eq!(strip_name_markers("(c) †"), "");
    }

    #[test]
    fn test_truncate_for_log_short_string() {
        assert_eq!(truncate_for_log("Hello, world!", 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[test]
    fn test_truncate_for_log_respects_char_boundary() {
        let s = "††††";
        let result = truncate_for_log(s, 4);
        assert!(result.starts_with('†'));
        assert!(result.contains("bytes)"));
    }

    #[tokio::test]
    async fn test_ensure_writable_dir_creates_directory() {
        let dir = std::env::temp_dir().join(format!("scorecard_scrape_writable_{}", std::process::id()));
        let path = dir.to_string_lossy().to_string();
        ensure_writable_dir(&path).await.unwrap();
        assert!(dir.is_dir());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
