//! Annotation scanner
//!
//! Finds every line carrying the marker comment (`// make me` by default)
//! and turns it into a [`ModuleTask`]. Lines that carry the marker but do
//! not classify are skipped with a [`ParseDiagnostic`].

use super::tokenizer::{parse_statement, Statement};
use crate::core::source::SourceFile;
use crate::domain::{ModuleName, ModuleTask, ParseDiagnostic, Result, ScadexError};
use regex::Regex;
use std::path::Path;

/// Marker text used when none is configured
pub const DEFAULT_MARKER: &str = "make me";

/// Tasks and diagnostics produced by one scan
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    /// Tasks in file order
    pub tasks: Vec<ModuleTask>,

    /// Marker lines that were skipped
    pub diagnostics: Vec<ParseDiagnostic>,
}

impl ScanReport {
    /// Returns the tasks, failing when the scan found none
    ///
    /// # Errors
    ///
    /// Returns [`ScadexError::NoModules`] if no task was found.
    pub fn into_tasks(self) -> Result<Vec<ModuleTask>> {
        if self.tasks.is_empty() {
            return Err(ScadexError::NoModules {
                skipped: self.diagnostics.len(),
            });
        }
        Ok(self.tasks)
    }
}

/// Scanner for marker-commented lines
#[derive(Debug, Clone)]
pub struct AnnotationScanner {
    marker: Regex,
}

impl AnnotationScanner {
    /// Creates a scanner for `// <marker>` comments
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the marker is blank.
    pub fn new(marker: &str) -> Result<Self> {
        let marker = marker.trim();
        if marker.is_empty() {
            return Err(ScadexError::Configuration(
                "Marker text cannot be empty".to_string(),
            ));
        }
        let pattern = format!(r"//\s*{}", regex::escape(marker));
        let marker = Regex::new(&pattern)
            .map_err(|e| ScadexError::Configuration(format!("Invalid marker: {e}")))?;
        Ok(Self { marker })
    }

    /// Scans a loaded source file
    pub fn scan(&self, source: &SourceFile) -> ScanReport {
        self.scan_lines(source.path(), source.lines())
    }

    /// Scans `lines`, attributing resulting tasks to `source_path`
    pub fn scan_lines<'a>(
        &self,
        source_path: &Path,
        lines: impl IntoIterator<Item = &'a str>,
    ) -> ScanReport {
        let mut report = ScanReport::default();

        for (index, line) in lines.into_iter().enumerate() {
            let Some(found) = self.marker.find(line) else {
                continue;
            };
            let line_number = index + 1;
            let code = &line[..found.start()];

            match classify(code, source_path) {
                Ok(task) => {
                    tracing::debug!(
                        line = line_number,
                        module = %task.name(),
                        args = %task.args(),
                        "Found annotated module"
                    );
                    report.tasks.push(task);
                }
                Err(reason) => {
                    let diagnostic = ParseDiagnostic::new(line_number, line, reason);
                    tracing::warn!(
                        line = line_number,
                        reason = %diagnostic.reason,
                        text = %line.trim(),
                        "Skipping marker line that could not be parsed"
                    );
                    report.diagnostics.push(diagnostic);
                }
            }
        }

        report
    }
}

fn classify(code: &str, source_path: &Path) -> std::result::Result<ModuleTask, String> {
    let statement = parse_statement(code).map_err(|e| e.to_string())?;
    let task = match statement {
        Statement::Definition { name } => ModuleTask::definition(ModuleName::new(name)?, source_path),
        Statement::Call { name, args } => ModuleTask::call(ModuleName::new(name)?, args, source_path),
    };
    Ok(task)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    const SOURCE: &str = "/work/parts.scad";

    fn scan(text: &str) -> ScanReport {
        AnnotationScanner::new(DEFAULT_MARKER)
            .unwrap()
            .scan_lines(Path::new(SOURCE), text.lines())
    }

    #[test]
    fn test_single_definition_yields_one_task_with_empty_args() {
        let report = scan("module mycyl() { cylinder(r=10,h=1); } // make me\n");
        assert_eq!(report.tasks.len(), 1);
        assert_eq!(report.tasks[0].name().as_str(), "mycyl");
        assert_eq!(report.tasks[0].args(), "");
        assert_eq!(report.tasks[0].source_path(), Path::new(SOURCE));
        assert!(report.diagnostics.is_empty());
    }

    #[test]
    fn test_call_keeps_argument_text() {
        let report = scan("foo(1,2); // make me");
        assert_eq!(report.tasks.len(), 1);
        assert_eq!(report.tasks[0].name().as_str(), "foo");
        assert_eq!(report.tasks[0].args(), "1,2");
    }

    #[test_case("cube(1); //make me" ; "no space")]
    #[test_case("cube(1); //    make me please" ; "extra text after marker")]
    #[test_case("cube(1);// make me" ; "comment glued to statement")]
    fn test_marker_variants(line: &str) {
        let report = scan(line);
        assert_eq!(report.tasks.len(), 1);
        assert_eq!(report.tasks[0].name().as_str(), "cube");
    }

    #[test]
    fn test_unmarked_lines_are_ignored() {
        let text = "\
module a() { cube(1); }
// make me later, this is just a comment on its own line
b(2);
// module c() {}  make me
";
        let report = scan(text);
        assert!(report.tasks.is_empty());
        // only the second line carries the marker, and it has no code
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(report.diagnostics[0].line_number, 2);
    }

    #[test]
    fn test_malformed_line_is_skipped_and_scan_continues() {
        let text = "\
module good() { cube(1); } // make me
x = 3; // make me
other(4); // make me
";
        let report = scan(text);
        let names: Vec<_> = report.tasks.iter().map(|t| t.name().as_str()).collect();
        assert_eq!(names, vec!["good", "other"]);
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(report.diagnostics[0].line_number, 2);
        assert!(report.diagnostics[0].reason.contains("expected '('"));
    }

    #[test]
    fn test_tasks_preserve_file_order_and_duplicates() {
        let text = "\
spacer(1); // make me
spacer(2); // make me
module spacer(h) { cube(h); } // make me
";
        let report = scan(text);
        let invocations: Vec<_> = report.tasks.iter().map(|t| t.invocation()).collect();
        assert_eq!(invocations, vec!["spacer(1)", "spacer(2)", "spacer()"]);
    }

    #[test]
    fn test_custom_marker() {
        let scanner = AnnotationScanner::new("export").unwrap();
        let report = scanner.scan_lines(
            Path::new(SOURCE),
            "a(); // export\nb(); // make me\n".lines(),
        );
        assert_eq!(report.tasks.len(), 1);
        assert_eq!(report.tasks[0].name().as_str(), "a");
    }

    #[test]
    fn test_marker_text_is_escaped() {
        let scanner = AnnotationScanner::new("build (all)").unwrap();
        let report = scanner.scan_lines(Path::new(SOURCE), "a(); // build (all)".lines());
        assert_eq!(report.tasks.len(), 1);
    }

    #[test]
    fn test_blank_marker_is_rejected() {
        assert!(matches!(
            AnnotationScanner::new("  "),
            Err(ScadexError::Configuration(_))
        ));
    }

    #[test]
    fn test_into_tasks_without_modules() {
        let report = scan("cube(1);\n");
        match report.into_tasks() {
            Err(ScadexError::NoModules { skipped }) => assert_eq!(skipped, 0),
            other => panic!("expected NoModules, got {other:?}"),
        }
    }

    #[test]
    fn test_into_tasks_counts_skipped_lines() {
        let report = scan("= // make me\n");
        match report.into_tasks() {
            Err(ScadexError::NoModules { skipped }) => assert_eq!(skipped, 1),
            other => panic!("expected NoModules, got {other:?}"),
        }
    }
}
