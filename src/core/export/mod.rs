//! Export orchestration and reporting
//!
//! This module turns compilation units into renderer processes and reports
//! on them:
//! - Search path and command construction for each unit
//! - Per-task jobs that own a process and its temp file together
//! - Blocking and detached reporting
//! - Run coordination

pub mod command;
pub mod coordinator;
pub mod job;
pub mod orchestrator;
pub mod report;
pub mod search_path;

pub use command::{output_file_name, RenderCommand, RenderSettings};
pub use coordinator::{ExportCoordinator, ExportOptions, ExportRun};
pub use job::{CompletedJob, RenderJob};
pub use orchestrator::{resolve_renderer, ProcessOrchestrator};
pub use report::{ExportSummary, PendingJobs, ResultReporter};
pub use search_path::{build_search_path, DEFAULT_SEARCH_PATH_VAR};
