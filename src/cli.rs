use clap::{ArgAction, Parser, Subcommand};
use ncm_convert::conversion::DEFAULT_ENGINE_PROGRAM;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ncm-convert")]
#[command(author, version, about = "Convert encrypted .ncm music files into playable audio")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Conversion engine program (looked up on PATH)
    #[arg(long, global = true, default_value = DEFAULT_ENGINE_PROGRAM)]
    pub engine: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert files; directories are searched for .ncm files
    Convert {
        /// Files or directories to convert
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },

    /// Show or change persisted settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Check that the conversion engine is available
    CheckEngine,

    /// Display version information
    Version,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the current settings
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Set the output directory (empty string writes next to the input)
    SetOutputDir { dir: String },

    /// Set the output filename pattern ({title}, {artist}, {album})
    SetPattern { pattern: String },

    /// Enable or disable copying .lrc lyrics next to converted files
    SetCopyLyrics {
        #[arg(action = ArgAction::Set)]
        enabled: bool,
    },
}
