//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for scadex using clap.

pub mod commands;

use clap::Parser;
use std::path::PathBuf;

/// scadex - export annotated OpenSCAD modules, one renderer process each
#[derive(Parser, Debug)]
#[command(name = "scadex")]
#[command(version, about, long_about = None)]
#[command(author = "scadex Contributors")]
pub struct Cli {
    /// Path to configuration file (default: ./scadex.toml if present)
    #[arg(short, long, env = "SCADEX_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "SCADEX_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Export arguments
    #[command(flatten)]
    pub export: commands::export::ExportArgs,
}
