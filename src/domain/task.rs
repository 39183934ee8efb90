//! Export task models
//!
//! A [`ModuleTask`] is one unit of work: a module to invoke, with the
//! argument text it should be invoked with. Tasks are created once by the
//! scanner (or from an explicit override list) and never mutated.

use super::ids::ModuleName;
use std::fmt;
use std::path::{Path, PathBuf};

/// One module to export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleTask {
    name: ModuleName,
    args: String,
    source_path: PathBuf,
}

impl ModuleTask {
    /// Task for a bare module definition; it is invoked with no arguments
    pub fn definition(name: ModuleName, source_path: impl Into<PathBuf>) -> Self {
        Self::call(name, String::new(), source_path)
    }

    /// Task for an annotated call site; `args` is kept verbatim
    pub fn call(name: ModuleName, args: impl Into<String>, source_path: impl Into<PathBuf>) -> Self {
        Self {
            name,
            args: args.into(),
            source_path: source_path.into(),
        }
    }

    /// Module name
    pub fn name(&self) -> &ModuleName {
        &self.name
    }

    /// Argument text, empty for definitions and bare overrides
    pub fn args(&self) -> &str {
        &self.args
    }

    /// Source file the module is defined in
    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// Renders the invocation, e.g. `gear(teeth=12)`
    pub fn invocation(&self) -> String {
        format!("{}({})", self.name, self.args)
    }
}

impl fmt::Display for ModuleTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.invocation())
    }
}

/// A raw `include <...>;` or `use <...>;` line from the source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeDirective(String);

impl IncludeDirective {
    /// Wraps a directive line, dropping any trailing line terminator
    pub fn new(line: impl Into<String>) -> Self {
        let line = line.into();
        Self(line.trim_end_matches(['\r', '\n']).to_string())
    }

    /// The directive exactly as it appeared in the source
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IncludeDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of one renderer process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunResult {
    /// Task the process rendered
    pub task: ModuleTask,

    /// Process exit code; the negated signal number when a signal killed
    /// the process, `-1` when it could not be started
    pub exit_code: i32,
}

impl RunResult {
    /// Creates a new run result
    pub fn new(task: ModuleTask, exit_code: i32) -> Self {
        Self { task, exit_code }
    }

    /// Whether the renderer exited cleanly
    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }
}
