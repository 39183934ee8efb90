//! Export command implementation
//!
//! Merges command-line flags over the loaded configuration, runs the
//! export, and maps the outcome to a process exit code.

use crate::config::ScadexConfig;
use crate::core::export::{ExportCoordinator, ExportOptions, ExportRun};
use crate::domain::{ModuleName, ScadexError};
use crate::log_error_with_context;
use clap::Args;
use std::ffi::OsString;
use std::path::PathBuf;
use tokio::sync::watch;

/// Exit code for invalid invocation or configuration
pub const EXIT_CONFIGURATION: i32 = 2;

/// Exit code for any other fatal error
pub const EXIT_FATAL: i32 = 5;

/// Exit code after SIGINT or SIGTERM (standard Unix convention)
pub const EXIT_INTERRUPTED: i32 = 130;

/// Arguments for the export command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Geometry description file to export from
    #[arg(value_name = "SOURCE_FILE")]
    pub source_file: PathBuf,

    /// Output file type passed to the renderer [default: stl]
    #[arg(long)]
    pub ftype: Option<String>,

    /// Export these modules instead of scanning for '// make me' markers
    #[arg(long, num_args = 1.., value_name = "NAME")]
    pub modules: Vec<ModuleName>,

    /// Additional module search path [default: value of OPENSCADPATH]
    #[arg(long)]
    pub search_path: Option<OsString>,

    /// Wait for every renderer and report results
    #[arg(long)]
    pub block: bool,

    /// Text placed before the module name in output file names
    #[arg(long)]
    pub prefix: Option<String>,

    /// Text placed after the module name in output file names
    #[arg(long)]
    pub suffix: Option<String>,

    /// Print renderer commands without running them
    #[arg(long)]
    pub dry_run: bool,

    /// Renderer program [default: openscad]
    #[arg(long)]
    pub renderer: Option<String>,

    /// Directory output files are written to [default: current directory]
    #[arg(long)]
    pub output_dir: Option<PathBuf>,
}

impl ExportArgs {
    /// Resolves run options: flags first, then configuration
    ///
    /// Without `--search-path`, the search path is read from the
    /// environment variable the renderer itself uses.
    pub fn to_options(&self, config: &ScadexConfig) -> ExportOptions {
        let mut options = ExportOptions::new(&self.source_file);
        options.modules = self.modules.clone();
        options.ftype = self.ftype.clone().unwrap_or_else(|| config.export.ftype.clone());
        options.prefix = self.prefix.clone().unwrap_or_else(|| config.export.prefix.clone());
        options.suffix = self.suffix.clone().unwrap_or_else(|| config.export.suffix.clone());
        options.block = self.block || config.export.block;
        options.dry_run = self.dry_run;
        options.renderer = self
            .renderer
            .clone()
            .unwrap_or_else(|| config.renderer.program.clone());
        options.renderer_args = config.renderer.args.clone();
        options.search_path_var = config.renderer.search_path_var.clone();
        options.search_path = self
            .search_path
            .clone()
            .or_else(|| std::env::var_os(&config.renderer.search_path_var));
        options.output_dir = self
            .output_dir
            .clone()
            .or_else(|| config.export.output_dir.as_ref().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("."));
        options.temp_dir = config.export.temp_dir.as_ref().map(PathBuf::from);
        options.marker = config.export.marker.clone();
        options
    }

    /// Execute the export command
    ///
    /// A shutdown signal received while renderers run does not cut the run
    /// short; the exit code becomes [`EXIT_INTERRUPTED`] once every job has
    /// finished and its unit is removed.
    pub async fn execute(
        &self,
        config: &ScadexConfig,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        let options = self.to_options(config);
        if !options.modules.is_empty() {
            tracing::info!(modules = ?options.modules, "Using module list from CLI");
        }

        let coordinator = match ExportCoordinator::new(options) {
            Ok(c) => c.with_shutdown(shutdown_signal),
            Err(e) => return Ok(report_error(&e)),
        };

        let mut stdout = std::io::stdout();
        let run = match coordinator.execute_export(&mut stdout).await {
            Ok(run) => run,
            Err(e) => return Ok(report_error(&e)),
        };

        match run {
            ExportRun::DryRun { commands } => {
                tracing::debug!(commands, "Dry run finished");
            }
            ExportRun::Reported(summary) => {
                tracing::debug!(failed = summary.failed, "Blocking export finished");
            }
            ExportRun::Detached(pending) => {
                if !pending.is_empty() {
                    tracing::debug!(jobs = pending.len(), "Waiting for detached renderers");
                }
                let summary = pending.settle().await?;
                tracing::debug!(
                    succeeded = summary.succeeded,
                    failed = summary.failed,
                    "Detached renderers finished"
                );
            }
        }

        if coordinator.shutdown_requested() {
            tracing::info!("Export interrupted by user signal");
            return Ok(EXIT_INTERRUPTED);
        }

        // renderer exit codes never become the tool's exit code
        Ok(0)
    }
}

fn report_error(error: &ScadexError) -> i32 {
    log_error_with_context!(error, "Export failed");
    eprintln!("Error: {error}");
    exit_code_for(error)
}

/// Maps a fatal error to the process exit code
pub fn exit_code_for(error: &ScadexError) -> i32 {
    if matches!(error, ScadexError::Interrupted) {
        EXIT_INTERRUPTED
    } else if error.is_configuration() {
        EXIT_CONFIGURATION
    } else {
        EXIT_FATAL
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    fn parse(args: &[&str]) -> ExportArgs {
        let mut argv = vec!["scadex"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap().export
    }

    #[test]
    fn test_export_args_defaults() {
        let args = parse(&["parts.scad"]);
        assert!(!args.block);
        assert!(!args.dry_run);
        assert!(args.modules.is_empty());
        assert!(args.ftype.is_none());

        let options = args.to_options(&ScadexConfig::default());
        assert_eq!(options.ftype, "stl");
        assert_eq!(options.prefix, "");
        assert_eq!(options.suffix, "");
        assert_eq!(options.renderer, "openscad");
        assert_eq!(options.output_dir, PathBuf::from("."));
    }

    #[test]
    fn test_modules_take_several_values() {
        let args = parse(&["--modules", "left", "right", "--block", "parts.scad"]);
        let names: Vec<_> = args.modules.iter().map(|m| m.as_str()).collect();
        assert_eq!(names, vec!["left", "right"]);
        assert!(args.block);
    }

    #[test]
    fn test_invalid_module_name_is_rejected() {
        let result = Cli::try_parse_from(["scadex", "--modules", "bad name", "--", "parts.scad"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_flags_override_config() {
        let mut config = ScadexConfig::default();
        config.export.ftype = "3mf".to_string();
        config.export.prefix = "cfg_".to_string();
        config.export.output_dir = Some("/cfg/out".to_string());

        let args = parse(&[
            "--prefix", "out_", "--suffix", "_v1", "--output-dir", "/cli/out", "parts.scad",
        ]);
        let options = args.to_options(&config);
        assert_eq!(options.ftype, "3mf");
        assert_eq!(options.prefix, "out_");
        assert_eq!(options.suffix, "_v1");
        assert_eq!(options.output_dir, PathBuf::from("/cli/out"));
    }

    #[test]
    fn test_explicit_search_path_wins() {
        let args = parse(&["--search-path", "/libs", "parts.scad"]);
        let options = args.to_options(&ScadexConfig::default());
        assert_eq!(options.search_path, Some(OsString::from("/libs")));
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_code_for(&ScadexError::NoModules { skipped: 0 }), EXIT_CONFIGURATION);
        assert_eq!(
            exit_code_for(&ScadexError::Configuration("x".to_string())),
            EXIT_CONFIGURATION
        );
        assert_eq!(exit_code_for(&ScadexError::Spawn("x".to_string())), EXIT_FATAL);
        assert_eq!(exit_code_for(&ScadexError::Io("x".to_string())), EXIT_FATAL);
        assert_eq!(exit_code_for(&ScadexError::Interrupted), EXIT_INTERRUPTED);
    }
}
