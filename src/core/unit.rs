//! Compilation unit synthesis
//!
//! Each task gets a standalone source file that imports the original file,
//! repeats its include directives, and invokes exactly one module:
//!
//! ```text
//! use </abs/path/parts.scad>;
//! include <BOSL2/std.scad>
//! bracket(width=20);
//! ```
//!
//! `use` rather than `include` for the source itself keeps the source's own
//! top-level geometry out of the unit.

use crate::core::source::SourceFile;
use crate::domain::{IncludeDirective, ModuleTask, Result, ScadexError};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempPath;

/// Random characters in each temp file name
const TEMP_RAND_LEN: usize = 10;

/// A synthesized unit, materialized to a temp file
///
/// The unit owns its temp file: dropping the unit (or the [`TempPath`]
/// taken from it with [`into_parts`](Self::into_parts)) deletes the file.
#[derive(Debug)]
pub struct CompilationUnit {
    task: ModuleTask,
    temp_path: TempPath,
    content: String,
}

impl CompilationUnit {
    /// Task this unit renders
    pub fn task(&self) -> &ModuleTask {
        &self.task
    }

    /// Location of the temp file
    pub fn path(&self) -> &Path {
        &self.temp_path
    }

    /// Directory holding the temp file
    pub fn directory(&self) -> &Path {
        self.temp_path.parent().unwrap_or_else(|| Path::new("."))
    }

    /// Unit source text
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Hands ownership of the temp file to the caller
    pub fn into_parts(self) -> (ModuleTask, TempPath, String) {
        (self.task, self.temp_path, self.content)
    }

    /// Deletes the temp file now, reporting any failure
    pub fn discard(self) -> Result<()> {
        let path = self.temp_path.to_path_buf();
        self.temp_path.close().map_err(|e| {
            ScadexError::Io(format!("Failed to remove {}: {e}", path.display()))
        })
    }
}

/// Builds compilation units for one source file
#[derive(Debug, Clone)]
pub struct UnitBuilder {
    source_path: PathBuf,
    extension: String,
    includes: Vec<IncludeDirective>,
    temp_dir: PathBuf,
}

impl UnitBuilder {
    /// Creates a builder writing into the system temp directory
    pub fn new(source: &SourceFile, includes: Vec<IncludeDirective>) -> Self {
        Self {
            source_path: source.path().to_path_buf(),
            extension: source.extension().to_string(),
            includes,
            temp_dir: std::env::temp_dir(),
        }
    }

    /// Writes temp files into `dir` instead of the system temp directory
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = dir.into();
        self
    }

    /// Renders the unit text for `task`
    pub fn render(&self, task: &ModuleTask) -> String {
        let mut content = String::new();
        content.push('\n');
        content.push_str(&format!("use <{}>;\n", self.source_path.display()));
        for directive in &self.includes {
            content.push_str(directive.as_str());
            content.push('\n');
        }
        content.push_str(&task.invocation());
        content.push_str(";\n");
        content
    }

    /// Renders and materializes one unit
    ///
    /// # Errors
    ///
    /// Returns [`ScadexError::Io`] if the temp file cannot be created or written.
    pub fn build(&self, task: ModuleTask) -> Result<CompilationUnit> {
        let content = self.render(&task);
        let prefix = format!("{}_", task.name());
        let suffix = format!(".{}", self.extension);

        let mut file = tempfile::Builder::new()
            .prefix(&prefix)
            .suffix(&suffix)
            .rand_bytes(TEMP_RAND_LEN)
            .tempfile_in(&self.temp_dir)
            .map_err(|e| {
                ScadexError::Io(format!(
                    "Failed to create temp file in {}: {e}",
                    self.temp_dir.display()
                ))
            })?;
        file.write_all(content.as_bytes())?;
        file.flush()?;
        let temp_path = file.into_temp_path();

        tracing::debug!(
            module = %task.name(),
            temp_path = %temp_path.display(),
            "Wrote compilation unit"
        );

        Ok(CompilationUnit {
            task,
            temp_path,
            content,
        })
    }

    /// Builds one unit per task, in order
    ///
    /// Units built before a failure are dropped, removing their temp files.
    pub fn build_all(&self, tasks: Vec<ModuleTask>) -> Result<Vec<CompilationUnit>> {
        tasks.into_iter().map(|task| self.build(task)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ModuleName;
    use std::collections::HashSet;
    use std::str::FromStr;
    use tempfile::TempDir;

    fn task(name: &str, args: &str) -> ModuleTask {
        ModuleTask::call(ModuleName::from_str(name).unwrap(), args, "/work/parts.scad")
    }

    fn builder(dir: &TempDir) -> UnitBuilder {
        let source = SourceFile::from_parts("/work/parts.scad", "");
        let includes = vec![
            IncludeDirective::new("include <BOSL2/std.scad>"),
            IncludeDirective::new("use <gears.scad>;"),
        ];
        UnitBuilder::new(&source, includes).with_temp_dir(dir.path())
    }

    #[test]
    fn test_render_layout() {
        let dir = TempDir::new().unwrap();
        let content = builder(&dir).render(&task("foo", "1,2"));
        assert_eq!(
            content,
            "\nuse </work/parts.scad>;\ninclude <BOSL2/std.scad>\nuse <gears.scad>;\nfoo(1,2);\n"
        );
    }

    #[test]
    fn test_render_definition_has_empty_call() {
        let dir = TempDir::new().unwrap();
        let definition = ModuleTask::definition(ModuleName::from_str("mycyl").unwrap(), "/work/parts.scad");
        let content = builder(&dir).render(&definition);
        assert!(content.ends_with("mycyl();\n"));
    }

    #[test]
    fn test_build_writes_named_temp_file() {
        let dir = TempDir::new().unwrap();
        let unit = builder(&dir).build(task("foo", "1,2")).unwrap();

        let file_name = unit.path().file_name().unwrap().to_string_lossy().to_string();
        assert!(file_name.starts_with("foo_"));
        assert!(file_name.ends_with(".scad"));
        assert_eq!(unit.directory(), dir.path());
        assert_eq!(std::fs::read_to_string(unit.path()).unwrap(), unit.content());
        assert!(unit.content().contains("foo(1,2)"));
    }

    #[test]
    fn test_same_name_never_shares_a_temp_path() {
        let dir = TempDir::new().unwrap();
        let tasks: Vec<_> = (0..25).map(|_| task("twin", "")).collect();
        let units = builder(&dir).build_all(tasks).unwrap();

        let paths: HashSet<_> = units.iter().map(|u| u.path().to_path_buf()).collect();
        assert_eq!(paths.len(), units.len());
    }

    #[test]
    fn test_drop_removes_temp_file() {
        let dir = TempDir::new().unwrap();
        let unit = builder(&dir).build(task("gone", "")).unwrap();
        let path = unit.path().to_path_buf();
        assert!(path.exists());
        drop(unit);
        assert!(!path.exists());
    }

    #[test]
    fn test_discard_removes_temp_file() {
        let dir = TempDir::new().unwrap();
        let unit = builder(&dir).build(task("gone", "")).unwrap();
        let path = unit.path().to_path_buf();
        unit.discard().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_build_in_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        let result = builder(&dir).with_temp_dir(&missing).build(task("x", ""));
        assert!(matches!(result, Err(ScadexError::Io(_))));
    }

    #[test]
    fn test_extension_follows_source() {
        let dir = TempDir::new().unwrap();
        let source = SourceFile::from_parts("/work/part.csg", "");
        let unit = UnitBuilder::new(&source, vec![])
            .with_temp_dir(dir.path())
            .build(task("p", ""))
            .unwrap();
        assert_eq!(unit.path().extension().unwrap(), "csg");
    }
}
