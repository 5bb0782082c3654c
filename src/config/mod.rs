//! User configuration: output directory, filename pattern, lyrics copying.
//!
//! [`ConfigView`] is a read-through cache over a [`ConfigStore`]. Loads are
//! best effort; writes go to the store first and only touch memory once the
//! store has acknowledged them.

pub mod persist;
mod types;

pub use persist::{ConfigStore, TomlConfigStore};
pub use types::*;

use ncm_convert_common::Result;
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Locations searched when no config path is given, in order.
const DEFAULT_CONFIG_PATHS: &[&str] = &["./ncm-convert.toml", "~/.config/ncm-convert/config.toml"];

/// Where the config is created when none of the default locations exist.
const USER_CONFIG_PATH: &str = "~/.config/ncm-convert/config.toml";

/// Resolve the config file to use.
///
/// An explicit path always wins. Otherwise the first existing default location
/// is used, falling back to the per-user location (created on first load).
pub fn resolve_config_path(custom_path: Option<&Path>) -> PathBuf {
    if let Some(path) = custom_path {
        return path.to_path_buf();
    }

    for path_str in DEFAULT_CONFIG_PATHS {
        let path = PathBuf::from(shellexpand::tilde(path_str).as_ref());
        if path.exists() {
            return path;
        }
    }

    PathBuf::from(shellexpand::tilde(USER_CONFIG_PATH).as_ref())
}

pub struct ConfigView {
    store: Arc<dyn ConfigStore>,
    current: RwLock<Config>,
}

impl ConfigView {
    /// Create a view holding defaults until [`load`](Self::load) succeeds.
    pub fn new(store: Arc<dyn ConfigStore>) -> Self {
        Self::with_initial(store, Config::default())
    }

    pub fn with_initial(store: Arc<dyn ConfigStore>, config: Config) -> Self {
        Self {
            store,
            current: RwLock::new(config),
        }
    }

    /// Refresh from the store. On failure the last known values are kept.
    pub async fn load(&self) {
        match self.store.fetch().await {
            Ok(config) => {
                tracing::debug!(
                    output_dir = %config.output_dir,
                    pattern = %config.filename_pattern,
                    "Loaded config"
                );
                *self.current.write() = config;
            }
            Err(e) => {
                tracing::warn!("Failed to load config, keeping current values: {}", e);
            }
        }
    }

    pub fn snapshot(&self) -> Config {
        self.current.read().clone()
    }

    pub async fn update_output_dir(&self, dir: impl Into<String>) -> Result<()> {
        let dir = dir.into();
        self.store.persist_output_dir(&dir).await?;
        self.current.write().output_dir = dir;
        Ok(())
    }

    pub async fn update_filename_pattern(&self, pattern: impl Into<String>) -> Result<()> {
        let pattern = pattern.into();
        self.store.persist_filename_pattern(&pattern).await?;
        self.current.write().filename_pattern = pattern;
        Ok(())
    }

    pub async fn update_copy_auxiliary_lyrics(&self, enabled: bool) -> Result<()> {
        self.store.persist_copy_auxiliary_lyrics(enabled).await?;
        self.current.write().copy_auxiliary_lyrics = enabled;
        Ok(())
    }
}
