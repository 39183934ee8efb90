//! Include collection
//!
//! Every `include <...>;` and `use <...>;` line of the source file is
//! re-emitted into each compilation unit, so libraries the source pulls in
//! stay resolvable from the synthesized file.

use crate::core::source::SourceFile;
use crate::domain::IncludeDirective;
use regex::Regex;
use std::sync::OnceLock;

fn directive_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?:include|use)\s*<[^>]+>\s*;?").expect("include pattern is valid")
    })
}

/// Returns the source's include/use directives in file order
pub fn collect_includes(source: &SourceFile) -> Vec<IncludeDirective> {
    collect_include_lines(source.lines())
}

/// Collects directives from raw lines
pub fn collect_include_lines<'a>(lines: impl IntoIterator<Item = &'a str>) -> Vec<IncludeDirective> {
    let pattern = directive_pattern();
    let directives: Vec<_> = lines
        .into_iter()
        .filter(|line| pattern.is_match(line))
        .map(IncludeDirective::new)
        .collect();

    tracing::debug!(count = directives.len(), "Collected include directives");
    directives
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_collects_in_file_order() {
        let text = "\
include <BOSL2/std.scad>
use <gears.scad>;
module a() { cube(1); } // make me
include <shapes/common.scad>;
";
        let found = collect_include_lines(text.lines());
        let lines: Vec<_> = found.iter().map(|d| d.as_str()).collect();
        assert_eq!(
            lines,
            vec![
                "include <BOSL2/std.scad>",
                "use <gears.scad>;",
                "include <shapes/common.scad>;",
            ]
        );
    }

    #[test_case("  include <x.scad>;" ; "indented")]
    #[test_case("// include <x.scad>;" ; "commented out")]
    #[test_case("included <x.scad>;" ; "different keyword")]
    #[test_case("include x.scad;" ; "missing angle brackets")]
    #[test_case("include <>;" ; "empty path")]
    fn test_rejects(line: &str) {
        assert!(collect_include_lines([line]).is_empty());
    }

    #[test]
    fn test_verbatim_text_is_preserved() {
        let found = collect_include_lines(["use<lib.scad>  ;  // helpers"]);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].as_str(), "use<lib.scad>  ;  // helpers");
    }

    #[test]
    fn test_from_source_file() {
        let source = SourceFile::from_parts("/w/a.scad", "use <a.scad>;\ncube(1);\n");
        assert_eq!(collect_includes(&source).len(), 1);
    }
}
