use serde::{Deserialize, Serialize};

/// Pattern used when none is configured.
///
/// Placeholders understood by the engine: `{title}`, `{artist}`, `{album}`.
pub const DEFAULT_FILENAME_PATTERN: &str = "{title}";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Destination directory. Empty means "next to the input file".
    #[serde(default)]
    pub output_dir: String,

    #[serde(default = "default_filename_pattern")]
    pub filename_pattern: String,

    /// Copy a `.lrc` sidecar next to the converted file.
    #[serde(default)]
    pub copy_auxiliary_lyrics: bool,
}

fn default_filename_pattern() -> String {
    DEFAULT_FILENAME_PATTERN.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: String::new(),
            filename_pattern: default_filename_pattern(),
            copy_auxiliary_lyrics: false,
        }
    }
}

impl Config {
    /// Pattern to hand to the engine, falling back to the default when unset.
    pub fn effective_pattern(&self) -> &str {
        if self.filename_pattern.is_empty() {
            DEFAULT_FILENAME_PATTERN
        } else {
            &self.filename_pattern
        }
    }

    /// Fill fields that older or hand-edited files may leave empty.
    pub(crate) fn normalize(&mut self) {
        if self.filename_pattern.is_empty() {
            self.filename_pattern = default_filename_pattern();
        }
    }
}
