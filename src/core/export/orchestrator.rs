//! Process orchestration
//!
//! Turns compilation units into running renderer processes, one per unit,
//! all launched without waiting on each other.

use super::command::{RenderCommand, RenderSettings};
use super::job::RenderJob;
use crate::core::unit::CompilationUnit;
use crate::domain::{Result, ScadexError};
use std::path::PathBuf;

/// Locates the renderer executable on `PATH`
///
/// Paths containing a separator are checked directly.
///
/// # Errors
///
/// Returns [`ScadexError::Spawn`] if the program cannot be found.
pub fn resolve_renderer(program: &str) -> Result<PathBuf> {
    let resolved = which::which(program).map_err(|e| {
        ScadexError::Spawn(format!("Renderer '{program}' not found: {e}"))
    })?;
    tracing::debug!(program, resolved = %resolved.display(), "Resolved renderer");
    Ok(resolved)
}

/// Spawns renderer processes for compilation units
#[derive(Debug, Clone)]
pub struct ProcessOrchestrator {
    settings: RenderSettings,
}

impl ProcessOrchestrator {
    /// Creates an orchestrator for one run
    pub fn new(settings: RenderSettings) -> Self {
        Self { settings }
    }

    /// Builds the renderer invocation for `unit`
    pub fn command_for(&self, unit: &CompilationUnit) -> Result<RenderCommand> {
        RenderCommand::for_unit(&self.settings, unit)
    }

    /// Launches one renderer per unit, returning jobs in spawn order
    ///
    /// Every command is built before the first process starts, so an error
    /// here means nothing was spawned. Must be called within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Fails if a command cannot be built.
    pub fn launch(&self, units: Vec<CompilationUnit>) -> Result<Vec<RenderJob>> {
        let commands = units
            .iter()
            .map(|unit| self.command_for(unit))
            .collect::<Result<Vec<_>>>()?;

        let jobs: Vec<RenderJob> = commands
            .iter()
            .zip(units)
            .map(|(command, unit)| RenderJob::start(command, unit))
            .collect();

        tracing::info!(count = jobs.len(), "Launched renderer processes");
        Ok(jobs)
    }

    /// Returns the command lines `launch` would run, then removes the units
    ///
    /// # Errors
    ///
    /// Fails if a command cannot be built.
    pub fn preview(&self, units: Vec<CompilationUnit>) -> Result<Vec<String>> {
        let mut lines = Vec::with_capacity(units.len());
        for unit in units {
            lines.push(self.command_for(&unit)?.command_line());
            unit.discard()?;
        }
        Ok(lines)
    }
}
