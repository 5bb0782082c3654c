//! Path utilities for naming queued files and locating companion files.
//!
//! Raw paths arrive from the UI as plain strings and may use either `/` or `\`
//! as separators regardless of the host platform, so display names are derived
//! by string splitting rather than through [`std::path::Path`].

use std::path::{Path, PathBuf};

/// List of supported encrypted container extensions.
const NCM_EXTENSIONS: &[&str] = &["ncm"];

/// Extension of the companion lyrics file.
const LYRICS_EXTENSION: &str = "lrc";

fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

/// Derive the name shown for a queued path.
///
/// Trailing separators are stripped first, then the final segment is taken.
/// When no segment remains the raw path is returned unchanged.
///
/// # Examples
///
/// ```
/// use ncm_convert_common::paths::display_name;
///
/// assert_eq!(display_name("/a/b/c/"), "c");
/// assert_eq!(display_name("C:\\a\\b\\"), "b");
/// assert_eq!(display_name("/"), "/");
/// ```
pub fn display_name(raw: &str) -> String {
    raw.trim_end_matches(is_separator)
        .rsplit(is_separator)
        .next()
        .filter(|segment| !segment.is_empty())
        .unwrap_or(raw)
        .to_string()
}

/// Check if a path has an encrypted container extension.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use ncm_convert_common::paths::is_ncm_file;
///
/// assert!(is_ncm_file(Path::new("/music/song.ncm")));
/// assert!(!is_ncm_file(Path::new("/music/song.flac")));
/// ```
pub fn is_ncm_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| NCM_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Path of the lyrics sidecar that may sit next to `path`.
///
/// The file is not required to exist.
#[must_use]
pub fn lyrics_sidecar(path: &Path) -> PathBuf {
    path.with_extension(LYRICS_EXTENSION)
}
