//! Domain models and types for scadex.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Identifiers** ([`ModuleName`])
//! - **Task models** ([`ModuleTask`], [`IncludeDirective`], [`RunResult`])
//! - **Error types** ([`ScadexError`], [`ParseDiagnostic`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, ScadexError>`]:
//!
//! ```rust
//! use scadex::domain::{ModuleName, ModuleTask, Result, ScadexError};
//!
//! fn override_task(name: &str) -> Result<ModuleTask> {
//!     let name = ModuleName::new(name).map_err(ScadexError::Configuration)?;
//!     Ok(ModuleTask::definition(name, "parts.scad"))
//! }
//!
//! assert!(override_task("bracket").is_ok());
//! assert!(override_task("no spaces").is_err());
//! ```

pub mod errors;
pub mod ids;
pub mod result;
pub mod task;

// Re-export commonly used types for convenience
pub use errors::{ParseDiagnostic, ScadexError};
pub use ids::ModuleName;
pub use result::Result;
pub use task::{IncludeDirective, ModuleTask, RunResult};
