//! Result reporting
//!
//! Blocking runs await every job and print one line per task, in spawn
//! order, dumping the unit source of each failure. Detached runs hand back
//! a [`PendingJobs`] that the driver settles before exiting.

use super::job::{CompletedJob, RenderJob};
use crate::domain::Result;
use futures::future::join_all;
use std::io::Write;
use std::time::{Duration, Instant};

/// Summary of an export run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportSummary {
    /// Number of renderer processes
    pub total: usize,

    /// Processes that exited with code 0
    pub succeeded: usize,

    /// Processes that exited non-zero, were killed, or never started
    pub failed: usize,

    /// Time from run start until the last process exited
    pub duration: Duration,
}

impl ExportSummary {
    /// Tallies completed jobs
    pub fn from_completed(completed: &[CompletedJob], duration: Duration) -> Self {
        let succeeded = completed.iter().filter(|c| c.result.is_success()).count();
        Self {
            total: completed.len(),
            succeeded,
            failed: completed.len() - succeeded,
            duration,
        }
    }

    /// Check if every renderer succeeded
    pub fn is_successful(&self) -> bool {
        self.failed == 0
    }

    /// Get success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        (self.succeeded as f64 / self.total as f64) * 100.0
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            total = self.total,
            succeeded = self.succeeded,
            failed = self.failed,
            duration_ms = self.duration.as_millis() as u64,
            success_rate = format!("{:.2}%", self.success_rate()),
            "Export completed"
        );

        if !self.is_successful() {
            tracing::warn!(failed = self.failed, "Export completed with failures");
        }
    }
}

/// Awaits every job, returning results in spawn order
pub async fn collect(jobs: Vec<RenderJob>) -> Result<Vec<CompletedJob>> {
    join_all(jobs.into_iter().map(RenderJob::wait))
        .await
        .into_iter()
        .collect()
}

/// Writes the per-task report lines
pub fn write_report<W: Write>(out: &mut W, completed: &[CompletedJob]) -> std::io::Result<()> {
    for job in completed {
        if job.result.is_success() {
            writeln!(out, "Finished: {}, {}", job.command_line, job.result.exit_code)?;
        } else {
            writeln!(out, "FAILED: {}, {}", job.command_line, job.result.exit_code)?;
            writeln!(out, "{}", job.content)?;
        }
    }
    out.flush()
}

/// Blocking-mode reporter
pub struct ResultReporter<W: Write> {
    out: W,
    started: Instant,
}

impl<W: Write> ResultReporter<W> {
    /// Creates a reporter; the run duration is measured from `started`
    pub fn new(out: W, started: Instant) -> Self {
        Self { out, started }
    }

    /// Waits for every job, prints the report, and returns the summary
    pub async fn report(&mut self, jobs: Vec<RenderJob>) -> Result<ExportSummary> {
        let completed = collect(jobs).await?;
        write_report(&mut self.out, &completed)?;

        let summary = ExportSummary::from_completed(&completed, self.started.elapsed());
        summary.log_summary();
        Ok(summary)
    }
}

/// Jobs launched in non-blocking mode that still hold temp files
///
/// Dropping this without calling [`settle`](Self::settle) lets the runtime
/// shut down before the cleanup tasks run.
#[must_use = "pending jobs must be settled so their temp files are removed"]
#[derive(Debug)]
pub struct PendingJobs {
    jobs: Vec<RenderJob>,
    started: Instant,
}

impl PendingJobs {
    /// Wraps launched jobs
    pub fn new(jobs: Vec<RenderJob>, started: Instant) -> Self {
        Self { jobs, started }
    }

    /// Number of jobs
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    /// Whether there are no jobs
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Waits for every job without printing anything
    pub async fn settle(self) -> Result<ExportSummary> {
        let running = self.jobs.iter().filter(|job| !job.is_finished()).count();
        tracing::debug!(running, total = self.jobs.len(), "Settling detached renderers");
        let completed = collect(self.jobs).await?;
        for job in &completed {
            tracing::debug!(
                module = %job.result.task.name(),
                exit_code = job.result.exit_code,
                "Detached renderer finished"
            );
        }
        Ok(ExportSummary::from_completed(
            &completed,
            self.started.elapsed(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ModuleName, ModuleTask, RunResult};
    use std::str::FromStr;

    fn completed(name: &str, exit_code: i32) -> CompletedJob {
        let task = ModuleTask::definition(ModuleName::from_str(name).unwrap(), "/w/a.scad");
        CompletedJob {
            result: RunResult::new(task, exit_code),
            command_line: format!("openscad -o {name}.stl /tmp/{name}_x.scad"),
            content: format!("\nuse </w/a.scad>;\n{name}();\n"),
        }
    }

    #[test]
    fn test_report_lines() {
        let jobs = vec![completed("good", 0), completed("bad", 1)];
        let mut out = Vec::new();
        write_report(&mut out, &jobs).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(
            text,
            "Finished: openscad -o good.stl /tmp/good_x.scad, 0\n\
             FAILED: openscad -o bad.stl /tmp/bad_x.scad, 1\n\
             \nuse </w/a.scad>;\nbad();\n\n"
        );
    }

    #[test]
    fn test_summary_counts() {
        let jobs = vec![completed("a", 0), completed("b", 2), completed("c", -1)];
        let summary = ExportSummary::from_completed(&jobs, Duration::from_secs(1));
        assert_eq!(summary.total, 3);
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 2);
        assert!(!summary.is_successful());
    }

    #[test]
    fn test_empty_summary_is_successful() {
        let summary = ExportSummary::default();
        assert!(summary.is_successful());
        assert_eq!(summary.success_rate(), 100.0);
    }
}
