mod cli;

use ncm_convert::{
    config::{self, ConfigView, TomlConfigStore},
    conversion::{CommandEngine, ConversionCoordinator, EngineSettings},
    queue::WorkItem,
    state::{AppState, QueueEvent},
};
use ncm_convert_common::{format_bytes, paths::is_ncm_file, ItemStatus};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, ConfigAction};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use walkdir::WalkDir;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "ncm_convert=trace,ncm_convert_common=debug".to_string()
        } else {
            "ncm_convert=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Convert { inputs } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(convert(&inputs, cli.config.as_deref(), &cli.engine))
        }
        Commands::Config { action } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(configure(action, cli.config.as_deref()))
        }
        Commands::CheckEngine => check_engine(&cli.engine),
        Commands::Version => {
            println!("ncm-convert {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn open_config(config_path: Option<&Path>) -> (PathBuf, ConfigView) {
    let path = config::resolve_config_path(config_path);
    let store = Arc::new(TomlConfigStore::new(&path));
    (path, ConfigView::new(store))
}

async fn convert(inputs: &[PathBuf], config_path: Option<&Path>, engine: &str) -> Result<()> {
    let files = collect_inputs(inputs)?;
    if files.is_empty() {
        anyhow::bail!("No .ncm files found in the given inputs");
    }

    let (_, view) = open_config(config_path);
    view.load().await;

    let program = CommandEngine::locate(engine)
        .context("Conversion engine unavailable (see `ncm-convert check-engine`)")?;
    let engine = Arc::new(CommandEngine::new(EngineSettings {
        program,
        args: Vec::new(),
    }));

    let state = AppState::new(view);
    let coordinator = ConversionCoordinator::new(state.clone(), engine);
    let mut updates = state.subscribe();
    let subscription = coordinator.subscribe();

    let added = state.add_paths(files.iter().map(|p| p.display().to_string()));
    println!("Queued {} file(s)", added.len());
    coordinator.start_conversion();

    loop {
        if state.queue().all_terminal() {
            break;
        }
        if !subscription.is_active() {
            tracing::warn!("Progress listener stopped before the batch finished");
            break;
        }

        tokio::select! {
            result = updates.recv() => match result {
                Ok(QueueEvent::ItemUpdated { item }) => print_item(&item),
                Ok(_) => {}
                Err(RecvError::Lagged(n)) => {
                    tracing::warn!("Missed {} queue updates", n);
                }
                Err(RecvError::Closed) => break,
            },
            _ = tokio::signal::ctrl_c() => {
                tracing::warn!("Interrupted, no longer waiting for the engine");
                break;
            }
        }
    }

    subscription.unsubscribe().await;

    let summary = state.summary();
    println!();
    println!(
        "Converted {} of {} file(s), {} written",
        summary.done,
        summary.total(),
        format_bytes(summary.converted_bytes)
    );

    if summary.failed > 0 {
        anyhow::bail!("{} file(s) failed to convert", summary.failed);
    }
    if summary.pending + summary.converting > 0 {
        anyhow::bail!(
            "{} file(s) did not finish",
            summary.pending + summary.converting
        );
    }
    Ok(())
}

/// Expand inputs into absolute file paths, walking directories in name order.
fn collect_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for input in inputs {
        let input = std::fs::canonicalize(input)
            .with_context(|| format!("Input does not exist: {:?}", input))?;

        if input.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(&input)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|entry| entry.ok())
                .filter(|entry| entry.file_type().is_file() && is_ncm_file(entry.path()))
                .map(|entry| entry.into_path())
                .collect();
            tracing::debug!("Found {} .ncm file(s) in {:?}", found.len(), input);
            files.append(&mut found);
        } else {
            files.push(input);
        }
    }

    Ok(files)
}

fn print_item(item: &WorkItem) {
    match item.status {
        ItemStatus::Converting => println!("… {}", item.display_name),
        ItemStatus::Done => {
            print!("✓ {}", item.display_name);
            if let Some(ref output) = item.output_path {
                print!(" -> {}", output);
            }
            println!(" ({})", format_bytes(item.size_bytes));
        }
        ItemStatus::Error => println!(
            "✗ {}: {}",
            item.display_name,
            item.error_message.as_deref().unwrap_or_default()
        ),
        ItemStatus::Pending => {}
    }
}

async fn configure(action: ConfigAction, config_path: Option<&Path>) -> Result<()> {
    let (path, view) = open_config(config_path);
    view.load().await;

    match action {
        ConfigAction::Show { json } => {
            let config = view.snapshot();
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                println!("Config file: {}", path.display());
                let output_dir = if config.output_dir.is_empty() {
                    "(next to input)"
                } else {
                    config.output_dir.as_str()
                };
                println!("  Output dir: {}", output_dir);
                println!("  Filename pattern: {}", config.effective_pattern());
                println!("  Copy lyrics: {}", config.copy_auxiliary_lyrics);
            }
        }
        ConfigAction::SetOutputDir { dir } => {
            view.update_output_dir(dir.clone())
                .await
                .context("Failed to save output directory")?;
            println!("✓ output_dir = {:?}", dir);
        }
        ConfigAction::SetPattern { pattern } => {
            view.update_filename_pattern(pattern.clone())
                .await
                .context("Failed to save filename pattern")?;
            println!("✓ filename_pattern = {:?}", pattern);
        }
        ConfigAction::SetCopyLyrics { enabled } => {
            view.update_copy_auxiliary_lyrics(enabled)
                .await
                .context("Failed to save lyrics option")?;
            println!("✓ copy_auxiliary_lyrics = {}", enabled);
        }
    }

    Ok(())
}

fn check_engine(program: &str) -> Result<()> {
    println!("Checking conversion engine...\n");

    match CommandEngine::locate(program) {
        Ok(path) => {
            println!("✓ {} - {}", program, path.display());
        }
        Err(e) => {
            println!("✗ {} ({})", program, e);
            println!("\nInstall the engine or pass --engine <program>.");
        }
    }

    Ok(())
}
