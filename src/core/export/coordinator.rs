//! Export coordinator - drives one run from source file to renderer processes
//!
//! This module wires the pipeline together: load the source, discover
//! tasks, collect includes, synthesize units, launch renderers, and either
//! report (blocking) or hand the jobs back to be settled (detached).

use crate::core::export::command::RenderSettings;
use crate::core::export::orchestrator::{resolve_renderer, ProcessOrchestrator};
use crate::core::export::report::{ExportSummary, PendingJobs, ResultReporter};
use crate::core::export::job::RenderJob;
use crate::core::export::search_path::{absolutize, DEFAULT_SEARCH_PATH_VAR};
use crate::core::includes::collect_includes;
use crate::core::scan::{discover_tasks, AnnotationScanner, DEFAULT_MARKER};
use crate::core::source::SourceFile;
use crate::core::unit::UnitBuilder;
use crate::domain::{ModuleName, Result, ScadexError};
use std::ffi::OsString;
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;
use tokio::sync::watch;

/// Everything one export run needs
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Geometry description file to export from
    pub source_file: PathBuf,

    /// Explicit module list; scanning is skipped when non-empty
    pub modules: Vec<ModuleName>,

    /// Output format
    pub ftype: String,

    /// Output file name prefix
    pub prefix: String,

    /// Output file name suffix
    pub suffix: String,

    /// Wait for every renderer and print a report
    pub block: bool,

    /// Print commands without spawning anything
    pub dry_run: bool,

    /// Renderer program name or path
    pub renderer: String,

    /// Extra renderer arguments, placed before the generated ones
    pub renderer_args: Vec<String>,

    /// Environment variable carrying the search path
    pub search_path_var: String,

    /// Additional search path entries
    pub search_path: Option<OsString>,

    /// Directory output files are written to
    pub output_dir: PathBuf,

    /// Directory for compilation units; the system temp directory if unset
    pub temp_dir: Option<PathBuf>,

    /// Marker comment text
    pub marker: String,
}

impl ExportOptions {
    /// Options with default settings for `source_file`
    pub fn new(source_file: impl Into<PathBuf>) -> Self {
        Self {
            source_file: source_file.into(),
            modules: Vec::new(),
            ftype: "stl".to_string(),
            prefix: String::new(),
            suffix: String::new(),
            block: false,
            dry_run: false,
            renderer: "openscad".to_string(),
            renderer_args: Vec::new(),
            search_path_var: DEFAULT_SEARCH_PATH_VAR.to_string(),
            search_path: None,
            output_dir: PathBuf::from("."),
            temp_dir: None,
            marker: DEFAULT_MARKER.to_string(),
        }
    }

    /// Validate the options
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.ftype.trim().is_empty() {
            return Err("ftype cannot be empty".to_string());
        }
        if self.ftype.contains(['/', '\\']) {
            return Err(format!("ftype '{}' must not contain path separators", self.ftype));
        }
        if self.renderer.trim().is_empty() {
            return Err("renderer cannot be empty".to_string());
        }
        if self.search_path_var.is_empty() || self.search_path_var.contains(['=', '\0']) {
            return Err(format!(
                "search path variable '{}' is not a valid environment variable name",
                self.search_path_var
            ));
        }
        Ok(())
    }
}

/// How a run ended
#[derive(Debug)]
pub enum ExportRun {
    /// Commands were printed; nothing was spawned
    DryRun {
        /// Number of commands printed
        commands: usize,
    },

    /// Renderers are running; the jobs must still be settled
    Detached(PendingJobs),

    /// Every renderer finished and the report was printed
    Reported(ExportSummary),
}

/// Export coordinator
pub struct ExportCoordinator {
    options: ExportOptions,
    scanner: AnnotationScanner,
    shutdown_signal: Option<watch::Receiver<bool>>,
}

impl ExportCoordinator {
    /// Create a new export coordinator
    ///
    /// # Errors
    ///
    /// Returns [`ScadexError::Configuration`] for invalid options.
    pub fn new(options: ExportOptions) -> Result<Self> {
        options.validate().map_err(ScadexError::Configuration)?;
        let scanner = AnnotationScanner::new(&options.marker)?;
        Ok(Self {
            options,
            scanner,
            shutdown_signal: None,
        })
    }

    /// Stops the run before launch once `shutdown_signal` turns true
    ///
    /// A signal that arrives after launch does not stop anything: running
    /// renderers are still awaited so their units are removed.
    pub fn with_shutdown(mut self, shutdown_signal: watch::Receiver<bool>) -> Self {
        self.shutdown_signal = Some(shutdown_signal);
        self
    }

    /// Whether a shutdown signal has been received
    pub fn shutdown_requested(&self) -> bool {
        self.shutdown_signal
            .as_ref()
            .is_some_and(|signal| *signal.borrow())
    }

    /// Execute the export
    ///
    /// Command lines are written to `out` as processes are launched. In
    /// blocking mode the per-task report follows. Must be called within a
    /// tokio runtime.
    ///
    /// # Errors
    ///
    /// Fails before anything is spawned if the source cannot be read, no
    /// modules are found, the renderer cannot be located, a unit cannot be
    /// written, or a shutdown signal arrived. Renderer failures are never
    /// errors. Once renderers are running, a failed report write is only
    /// returned after every job has finished.
    pub async fn execute_export<W: Write>(&self, out: &mut W) -> Result<ExportRun> {
        let started = Instant::now();
        let options = &self.options;

        tracing::info!(
            source = %options.source_file.display(),
            block = options.block,
            dry_run = options.dry_run,
            "Starting export"
        );

        let source = SourceFile::load(&options.source_file)?;
        let tasks = discover_tasks(&source, &options.modules, &self.scanner)?;
        let includes = collect_includes(&source);

        let program = if options.dry_run {
            PathBuf::from(&options.renderer)
        } else {
            resolve_renderer(&options.renderer)?
        };

        let cwd = std::env::current_dir()?;
        let settings = RenderSettings {
            program,
            extra_args: options.renderer_args.clone(),
            ftype: options.ftype.clone(),
            prefix: options.prefix.clone(),
            suffix: options.suffix.clone(),
            output_dir: absolutize(&options.output_dir, &cwd),
            search_path_var: options.search_path_var.clone(),
            user_search_path: options.search_path.clone(),
            cwd,
            source_dir: source.directory().to_path_buf(),
        };

        let mut builder = UnitBuilder::new(&source, includes);
        if let Some(dir) = &options.temp_dir {
            builder = builder.with_temp_dir(dir);
        }
        let units = builder.build_all(tasks)?;
        let orchestrator = ProcessOrchestrator::new(settings);

        if options.dry_run {
            let lines = orchestrator.preview(units)?;
            for line in &lines {
                writeln!(out, "{line}")?;
            }
            tracing::info!(commands = lines.len(), "Dry run complete, nothing spawned");
            return Ok(ExportRun::DryRun {
                commands: lines.len(),
            });
        }

        if self.shutdown_requested() {
            drop(units);
            tracing::warn!("Shutdown requested, no renderer started");
            return Err(ScadexError::Interrupted);
        }

        let jobs = orchestrator.launch(units)?;
        if let Err(e) = write_command_lines(out, &jobs) {
            tracing::warn!(error = %e, "Failed to write command lines");
        }

        if options.block {
            let summary = ResultReporter::new(&mut *out, started).report(jobs).await?;
            Ok(ExportRun::Reported(summary))
        } else {
            Ok(ExportRun::Detached(PendingJobs::new(jobs, started)))
        }
    }
}

fn write_command_lines<W: Write>(out: &mut W, jobs: &[RenderJob]) -> std::io::Result<()> {
    for job in jobs {
        writeln!(out, "{}", job.command_line())?;
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_default_options_are_valid() {
        assert!(ExportOptions::new("a.scad").validate().is_ok());
    }

    #[test_case(|o: &mut ExportOptions| o.ftype = String::new() ; "empty ftype")]
    #[test_case(|o: &mut ExportOptions| o.ftype = "../stl".to_string() ; "ftype with separator")]
    #[test_case(|o: &mut ExportOptions| o.renderer = " ".to_string() ; "blank renderer")]
    #[test_case(|o: &mut ExportOptions| o.search_path_var = "A=B".to_string() ; "bad variable")]
    fn test_invalid_options(change: fn(&mut ExportOptions)) {
        let mut options = ExportOptions::new("a.scad");
        change(&mut options);
        let result = ExportCoordinator::new(options);
        assert!(matches!(result, Err(ScadexError::Configuration(_))));
    }

    #[test]
    fn test_blank_marker_is_rejected() {
        let mut options = ExportOptions::new("a.scad");
        options.marker = "  ".to_string();
        assert!(ExportCoordinator::new(options).is_err());
    }

    #[tokio::test]
    async fn test_missing_source_is_io_error() {
        let coordinator = ExportCoordinator::new(ExportOptions::new("/nonexistent/a.scad")).unwrap();
        let mut out = Vec::new();
        let result = coordinator.execute_export(&mut out).await;
        assert!(matches!(result, Err(ScadexError::Io(_))));
        assert!(out.is_empty());
    }
}
