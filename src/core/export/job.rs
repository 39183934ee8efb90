//! Per-task render jobs
//!
//! A [`RenderJob`] jointly owns one renderer process and the temp file it
//! reads. The cleanup task spawned alongside the process waits for that
//! process alone and then deletes the temp file, so a slow or hung renderer
//! only holds back its own cleanup.

use super::command::RenderCommand;
use crate::core::unit::CompilationUnit;
use crate::domain::{ModuleTask, Result, RunResult, ScadexError};
use std::process::ExitStatus;
use tempfile::TempPath;
use tokio::process::Child;
use tokio::task::JoinHandle;

/// Exit code recorded when the process never ran or could not be waited on
pub const NO_EXIT_CODE: i32 = -1;

/// A running (or finished) renderer process and its temp file
#[derive(Debug)]
pub struct RenderJob {
    task: ModuleTask,
    command_line: String,
    content: String,
    pid: Option<u32>,
    handle: JoinHandle<RunResult>,
}

/// A job after its process exited and its temp file was removed
#[derive(Debug, Clone)]
pub struct CompletedJob {
    /// Outcome of the process
    pub result: RunResult,

    /// Command line the process was started with
    pub command_line: String,

    /// Unit source text the process rendered
    pub content: String,
}

impl RenderJob {
    /// Spawns the renderer for `unit` and registers its cleanup
    ///
    /// Must be called within a tokio runtime. A spawn failure does not
    /// return an error: the temp file is removed at once and the job
    /// resolves to a failed result, leaving sibling jobs untouched.
    pub fn start(command: &RenderCommand, unit: CompilationUnit) -> Self {
        let command_line = command.command_line();
        let content = unit.content().to_string();
        let task = unit.task().clone();

        match command.to_command().spawn() {
            Ok(child) => {
                let pid = child.id();
                let (owned_task, temp_path, _) = unit.into_parts();
                tracing::debug!(module = %task.name(), pid = ?pid, "Spawned renderer");
                Self {
                    task,
                    command_line,
                    content,
                    pid,
                    handle: tokio::spawn(wait_then_cleanup(child, temp_path, owned_task)),
                }
            }
            Err(e) => {
                tracing::error!(
                    module = %task.name(),
                    program = %command.program().display(),
                    error = %e,
                    "Failed to spawn renderer"
                );
                if let Err(e) = unit.discard() {
                    tracing::warn!(error = %e, "Failed to remove compilation unit");
                }
                let failed = RunResult::new(task.clone(), NO_EXIT_CODE);
                Self {
                    task,
                    command_line,
                    content,
                    pid: None,
                    handle: tokio::spawn(async move { failed }),
                }
            }
        }
    }

    /// Task this job renders
    pub fn task(&self) -> &ModuleTask {
        &self.task
    }

    /// Command line the process was started with
    pub fn command_line(&self) -> &str {
        &self.command_line
    }

    /// Unit source text
    pub fn content(&self) -> &str {
        &self.content
    }

    /// OS process id, `None` if the spawn failed
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Whether the process has exited and its temp file was handled
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Waits for the process and its cleanup
    ///
    /// # Errors
    ///
    /// Returns [`ScadexError::Other`] if the cleanup task panicked or was
    /// cancelled.
    pub async fn wait(self) -> Result<CompletedJob> {
        let result = self.handle.await.map_err(|e| {
            ScadexError::Other(format!("Render job for {} failed: {e}", self.task.name()))
        })?;
        Ok(CompletedJob {
            result,
            command_line: self.command_line,
            content: self.content,
        })
    }
}

async fn wait_then_cleanup(mut child: Child, temp_path: TempPath, task: ModuleTask) -> RunResult {
    let exit_code = match child.wait().await {
        Ok(status) => status_code(status),
        Err(e) => {
            tracing::error!(module = %task.name(), error = %e, "Failed to wait for renderer");
            NO_EXIT_CODE
        }
    };

    let unit_path = temp_path.display().to_string();
    match temp_path.close() {
        Ok(()) => tracing::debug!(module = %task.name(), temp_path = %unit_path, "Removed compilation unit"),
        Err(e) => tracing::warn!(
            module = %task.name(),
            temp_path = %unit_path,
            error = %e,
            "Failed to remove compilation unit"
        ),
    }

    tracing::debug!(module = %task.name(), exit_code, "Renderer exited");
    RunResult::new(task, exit_code)
}

/// Exit code of a finished process, or the negated signal number if a
/// signal killed it
fn status_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return -signal;
        }
    }
    NO_EXIT_CODE
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::core::export::command::RenderSettings;
    use crate::core::source::SourceFile;
    use crate::core::unit::UnitBuilder;
    use crate::domain::ModuleName;
    use std::path::PathBuf;
    use std::str::FromStr;
    use tempfile::TempDir;

    fn settings(program: &str, args: &[&str], out: &TempDir) -> RenderSettings {
        RenderSettings {
            program: PathBuf::from(program),
            extra_args: args.iter().map(|a| a.to_string()).collect(),
            ftype: "stl".to_string(),
            prefix: String::new(),
            suffix: String::new(),
            output_dir: out.path().to_path_buf(),
            search_path_var: "OPENSCADPATH".to_string(),
            user_search_path: None,
            cwd: out.path().to_path_buf(),
            source_dir: out.path().to_path_buf(),
        }
    }

    fn unit(dir: &TempDir, name: &str) -> CompilationUnit {
        let source = SourceFile::from_parts(dir.path().join("parts.scad"), "");
        let task = ModuleTask::definition(ModuleName::from_str(name).unwrap(), source.path());
        UnitBuilder::new(&source, vec![])
            .with_temp_dir(dir.path())
            .build(task)
            .unwrap()
    }

    #[tokio::test]
    async fn test_exit_code_and_cleanup() {
        let dir = TempDir::new().unwrap();
        let unit = unit(&dir, "bad");
        let path = unit.path().to_path_buf();
        // `sh -c 'exit 3' -o out file` ignores the trailing arguments
        let settings = settings("sh", &["-c", "exit 3"], &dir);
        let command = RenderCommand::for_unit(&settings, &unit).unwrap();

        let job = RenderJob::start(&command, unit);
        assert!(job.pid().is_some());
        let done = job.wait().await.unwrap();
        assert_eq!(done.result.exit_code, 3);
        assert_eq!(done.result.task.name().as_str(), "bad");
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_spawn_failure_is_isolated() {
        let dir = TempDir::new().unwrap();
        let unit = unit(&dir, "ghost");
        let path = unit.path().to_path_buf();
        let settings = settings("/nonexistent/renderer", &[], &dir);
        let command = RenderCommand::for_unit(&settings, &unit).unwrap();

        let job = RenderJob::start(&command, unit);
        assert!(job.pid().is_none());
        assert!(!path.exists());
        let done = job.wait().await.unwrap();
        assert_eq!(done.result.exit_code, NO_EXIT_CODE);
        assert!(done.content.contains("ghost()"));
    }

    #[tokio::test]
    async fn test_killed_process_reports_negated_signal() {
        let dir = TempDir::new().unwrap();
        let unit = unit(&dir, "killed");
        let path = unit.path().to_path_buf();
        let settings = settings("sh", &["-c", "kill -9 $$"], &dir);
        let command = RenderCommand::for_unit(&settings, &unit).unwrap();

        let done = RenderJob::start(&command, unit).wait().await.unwrap();
        assert_eq!(done.result.exit_code, -9);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_slow_renderer_only_delays_its_own_cleanup() {
        let dir = TempDir::new().unwrap();
        let slow_unit = unit(&dir, "slow");
        let fast_unit = unit(&dir, "fast");
        let slow_path = slow_unit.path().to_path_buf();
        let fast_path = fast_unit.path().to_path_buf();

        let slow_settings = settings("sh", &["-c", "sleep 3"], &dir);
        let fast_settings = settings("sh", &["-c", "exit 0"], &dir);
        let slow_command = RenderCommand::for_unit(&slow_settings, &slow_unit).unwrap();
        let fast_command = RenderCommand::for_unit(&fast_settings, &fast_unit).unwrap();

        let slow = RenderJob::start(&slow_command, slow_unit);
        let fast = RenderJob::start(&fast_command, fast_unit);

        let done = fast.wait().await.unwrap();
        assert_eq!(done.result.exit_code, 0);
        assert!(!fast_path.exists());
        assert!(slow_path.exists());
        assert!(!slow.is_finished());

        let done = slow.wait().await.unwrap();
        assert_eq!(done.result.exit_code, 0);
        assert!(!slow_path.exists());
    }
}
