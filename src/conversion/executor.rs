//! Engine adapter that runs an external converter program.
//!
//! Files of a batch are converted one after another on a spawned task. For
//! every file the program is invoked as
//!
//! ```text
//! <program> [args...] <input> --output-dir <dir> --pattern <pattern>
//! ```
//!
//! and must print the path of the file it wrote as the last line on stdout.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use anyhow::{Context, Result};
use ncm_convert_common::{paths, Error};
use tokio::process::Command;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use super::engine::{ConversionEngine, ConversionRequest, ProgressBus, ProgressEvent};

/// Program looked up on `PATH` when none is configured.
pub const DEFAULT_ENGINE_PROGRAM: &str = "ncm-engine";

/// How to invoke the converter program.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Converter executable.
    pub program: PathBuf,
    /// Arguments placed before the input path.
    pub args: Vec<String>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            program: PathBuf::from(DEFAULT_ENGINE_PROGRAM),
            args: Vec::new(),
        }
    }
}

pub struct CommandEngine {
    settings: EngineSettings,
    bus: ProgressBus,
}

impl CommandEngine {
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            settings,
            bus: ProgressBus::default(),
        }
    }

    /// Find `program` on `PATH`.
    pub fn locate(program: &str) -> ncm_convert_common::Result<PathBuf> {
        which::which(program)
            .map_err(|e| Error::engine(format!("{program} not found on PATH: {e}")))
    }
}

impl ConversionEngine for CommandEngine {
    /// Spawns the batch on the current Tokio runtime and returns immediately.
    fn convert(&self, request: ConversionRequest) {
        let settings = self.settings.clone();
        let bus = self.bus.clone();
        tokio::spawn(run_batch(settings, bus, request));
    }

    fn subscribe(&self) -> broadcast::Receiver<ProgressEvent> {
        self.bus.subscribe()
    }
}

struct ConvertedFile {
    path: PathBuf,
    size: u64,
}

async fn run_batch(settings: EngineSettings, bus: ProgressBus, request: ConversionRequest) {
    info!(
        batch_id = %request.batch_id,
        files = request.paths.len(),
        "Conversion batch started"
    );

    let mut failed = 0usize;
    for input in &request.paths {
        bus.emit(ProgressEvent::converting(input));

        let event = match convert_one(&settings, &request, input).await {
            Ok(converted) => {
                debug!(input = %input, output = ?converted.path, "Converted");
                ProgressEvent::done(
                    input,
                    converted.size,
                    Some(converted.path.display().to_string()),
                )
            }
            Err(e) => {
                failed += 1;
                warn!(input = %input, "Conversion failed: {:#}", e);
                ProgressEvent::error(input, e.to_string())
            }
        };
        bus.emit(event);
    }

    info!(
        batch_id = %request.batch_id,
        failed,
        "Conversion batch finished"
    );
}

async fn convert_one(
    settings: &EngineSettings,
    request: &ConversionRequest,
    input: &str,
) -> Result<ConvertedFile> {
    let output_dir = resolve_output_dir(input, &request.output_dir);

    let output = Command::new(&settings.program)
        .args(&settings.args)
        .arg(input)
        .arg("--output-dir")
        .arg(&output_dir)
        .arg("--pattern")
        .arg(&request.pattern)
        .stdin(Stdio::null())
        .output()
        .await
        .with_context(|| format!("Failed to start {}", settings.program.display()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        match last_line(&stderr) {
            Some(line) => anyhow::bail!("{line}"),
            None => anyhow::bail!("Engine exited with {}", output.status),
        }
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let path = last_line(&stdout)
        .map(PathBuf::from)
        .context("Engine did not report an output file")?;
    let size = tokio::fs::metadata(&path)
        .await
        .map(|m| m.len())
        .unwrap_or(0);

    if request.copy_auxiliary_lyrics {
        copy_lyrics(Path::new(input), &path).await;
    }

    Ok(ConvertedFile { path, size })
}

/// An empty output directory means "next to the input file".
fn resolve_output_dir(input: &str, output_dir: &str) -> PathBuf {
    if !output_dir.is_empty() {
        return PathBuf::from(output_dir);
    }
    match Path::new(input).parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn last_line(text: &str) -> Option<&str> {
    text.lines().map(str::trim).filter(|l| !l.is_empty()).last()
}

/// Copy the input's lyrics sidecar next to the converted file.
///
/// A missing sidecar is normal. A failed copy does not fail the conversion.
async fn copy_lyrics(input: &Path, output: &Path) {
    let source = paths::lyrics_sidecar(input);
    if !tokio::fs::try_exists(&source).await.unwrap_or(false) {
        debug!("No lyrics sidecar at {:?}", source);
        return;
    }

    let target = paths::lyrics_sidecar(output);
    if let Err(e) = tokio::fs::copy(&source, &target).await {
        warn!("Failed to copy lyrics {:?} -> {:?}: {}", source, target, e);
    }
}
