//! Module task discovery
//!
//! Tasks come from one of two places: an explicit override list, or the
//! marker comments in the source file. An override list bypasses scanning
//! entirely.

pub mod scanner;
pub mod tokenizer;

pub use scanner::{AnnotationScanner, ScanReport, DEFAULT_MARKER};
pub use tokenizer::{parse_statement, Statement, TokenizeError};

use crate::core::source::SourceFile;
use crate::domain::{ModuleName, ModuleTask, Result};

/// Resolves the task list for a run
///
/// Each override becomes a call-form task with empty arguments. When
/// `overrides` is empty the source is scanned.
///
/// # Errors
///
/// Returns [`ScadexError::NoModules`](crate::domain::ScadexError::NoModules)
/// when scanning finds nothing.
pub fn discover_tasks(
    source: &SourceFile,
    overrides: &[ModuleName],
    scanner: &AnnotationScanner,
) -> Result<Vec<ModuleTask>> {
    if !overrides.is_empty() {
        tracing::info!(count = overrides.len(), "Using explicit module list");
        return Ok(overrides
            .iter()
            .map(|name| ModuleTask::call(name.clone(), String::new(), source.path()))
            .collect());
    }

    let report = scanner.scan(source);
    tracing::info!(
        found = report.tasks.len(),
        skipped = report.diagnostics.len(),
        "Scanned source for annotated modules"
    );
    report.into_tasks()
}
