//! Configuration persistence.
//!
//! [`ConfigStore`] is the storage boundary the [`ConfigView`](super::ConfigView)
//! talks to. [`TomlConfigStore`] keeps the record in a TOML file and rewrites
//! single keys with `toml_edit`, so comments and hand edits survive updates.

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use ncm_convert_common::{Error, Result};
use tokio::sync::Mutex;
use toml_edit::DocumentMut;

use super::Config;

/// Persisted configuration storage.
///
/// Every `persist_*` call returns only after the value is durably stored, so
/// a failure is visible to the caller before any in-memory state changes.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    async fn fetch(&self) -> Result<Config>;
    async fn persist_output_dir(&self, dir: &str) -> Result<()>;
    async fn persist_filename_pattern(&self, pattern: &str) -> Result<()>;
    async fn persist_copy_auxiliary_lyrics(&self, enabled: bool) -> Result<()>;
}

/// TOML file backed configuration store.
pub struct TomlConfigStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl TomlConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Write the whole record, replacing the file.
    pub async fn save(&self, config: &Config) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let content = toml::to_string_pretty(config)
            .map_err(|e| Error::config(format!("Failed to serialize config: {e}")))?;
        self.write(&content).await
    }

    async fn update_key(&self, key: &str, value: toml_edit::Item) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut doc = self.read_document().await?;
        doc[key] = value;
        self.write(&doc.to_string()).await?;
        tracing::debug!("Persisted {} to {:?}", key, self.path);
        Ok(())
    }

    async fn read_document(&self) -> Result<DocumentMut> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => toml::to_string_pretty(&Config::default())
                .map_err(|e| Error::config(format!("Failed to serialize config: {e}")))?,
            Err(e) => return Err(e.into()),
        };

        content.parse().map_err(|e| {
            Error::config(format!("Failed to parse config file {:?}: {e}", self.path))
        })
    }

    async fn write(&self, content: &str) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, content).await?;
        Ok(())
    }
}

#[async_trait]
impl ConfigStore for TomlConfigStore {
    async fn fetch(&self) -> Result<Config> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                // First run: write defaults so the file exists for hand edits.
                let config = Config::default();
                self.save(&config).await?;
                tracing::info!("Created default config at {:?}", self.path);
                return Ok(config);
            }
            Err(e) => return Err(e.into()),
        };

        let mut config: Config = toml::from_str(&content).map_err(|e| {
            Error::config(format!("Failed to parse config file {:?}: {e}", self.path))
        })?;
        config.normalize();
        Ok(config)
    }

    async fn persist_output_dir(&self, dir: &str) -> Result<()> {
        self.update_key("output_dir", toml_edit::value(dir)).await
    }

    async fn persist_filename_pattern(&self, pattern: &str) -> Result<()> {
        self.update_key("filename_pattern", toml_edit::value(pattern)).await
    }

    async fn persist_copy_auxiliary_lyrics(&self, enabled: bool) -> Result<()> {
        self.update_key("copy_auxiliary_lyrics", toml_edit::value(enabled)).await
    }
}
