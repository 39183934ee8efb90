//! Source file loading
//!
//! The geometry description file is read exactly once; the scanner and the
//! include collector both work from the loaded lines.

use crate::domain::{Result, ScadexError};
use std::path::{Path, PathBuf};

/// Extension used for compilation units when the source has none
const DEFAULT_EXTENSION: &str = "scad";

/// A loaded geometry description file
#[derive(Debug, Clone)]
pub struct SourceFile {
    path: PathBuf,
    contents: String,
}

impl SourceFile {
    /// Reads `path` and resolves it to an absolute path
    ///
    /// # Errors
    ///
    /// Returns [`ScadexError::Io`] if the file is missing or unreadable.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let absolute = std::path::absolute(path).map_err(|e| {
            ScadexError::Io(format!("Cannot resolve {}: {e}", path.display()))
        })?;
        let contents = std::fs::read_to_string(&absolute).map_err(|e| {
            ScadexError::Io(format!("Cannot read {}: {e}", absolute.display()))
        })?;

        tracing::debug!(
            path = %absolute.display(),
            bytes = contents.len(),
            "Loaded source file"
        );

        Ok(Self::from_parts(absolute, contents))
    }

    /// Builds a source file from an already-resolved path and its contents
    pub fn from_parts(path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            contents: contents.into(),
        }
    }

    /// Absolute path of the source file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lines of the file, without terminators
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.contents.lines()
    }

    /// Directory containing the source file
    pub fn directory(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }

    /// File extension, defaulting to `scad`
    pub fn extension(&self) -> &str {
        self.path
            .extension()
            .and_then(|ext| ext.to_str())
            .filter(|ext| !ext.is_empty())
            .unwrap_or(DEFAULT_EXTENSION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_resolves_absolute_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("parts.scad");
        std::fs::write(&path, "cube(1);\nsphere(2);\n").unwrap();

        let source = SourceFile::load(&path).unwrap();
        assert!(source.path().is_absolute());
        assert_eq!(source.directory(), dir.path());
        assert_eq!(source.extension(), "scad");
        assert_eq!(source.lines().count(), 2);
    }

    #[test]
    fn test_load_missing_file() {
        let result = SourceFile::load("/definitely/not/here.scad");
        assert!(matches!(result, Err(ScadexError::Io(_))));
    }

    #[test]
    fn test_extension_defaults_to_scad() {
        let source = SourceFile::from_parts("/work/Makefile", "");
        assert_eq!(source.extension(), "scad");

        let source = SourceFile::from_parts("/work/part.csg", "");
        assert_eq!(source.extension(), "csg");
    }
}
