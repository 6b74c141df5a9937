//! Preprocessor scan of the raw source.
//!
//! The analyzer receives the source text in addition to the AST, and runs
//! its own line-anchored regex scan for `#include` and `#define`. Headers
//! land in the `preprocessor` scope; defines become macro symbols in
//! `global`. Nothing is expanded — macros are recorded, not substituted.

use once_cell::sync::Lazy;
use regex::Regex;

static INCLUDE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^\s*#\s*include\s*(?:<([^>\n]+)>|"([^"\n]+)")"#).expect("include pattern")
});

static DEFINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*#\s*define\s+([A-Za-z_]\w*)[ \t]*([^\n]*)").expect("define pattern")
});

/// One recognized preprocessor line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PreprocessorEntry {
    Include {
        header: String,
        system: bool,
        line: u32,
    },
    Define {
        name: String,
        value: String,
        line: u32,
    },
}

/// Scans `source` for includes and defines, in source order.
pub fn scan(source: &str) -> Vec<PreprocessorEntry> {
    let mut entries = Vec::new();

    for captures in INCLUDE_RE.captures_iter(source) {
        let whole = captures.get(0).unwrap();
        let (header, system) = match (captures.get(1), captures.get(2)) {
            (Some(h), _) => (h.as_str().to_string(), true),
            (_, Some(h)) => (h.as_str().to_string(), false),
            _ => continue,
        };
        entries.push(PreprocessorEntry::Include {
            header,
            system,
            line: line_of(source, whole.start()),
        });
    }

    for captures in DEFINE_RE.captures_iter(source) {
        let whole = captures.get(0).unwrap();
        let name = captures.get(1).unwrap().as_str().to_string();
        let value = captures
            .get(2)
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default();
        entries.push(PreprocessorEntry::Define {
            name,
            value,
            line: line_of(source, whole.start()),
        });
    }

    entries.sort_by_key(|e| match e {
        PreprocessorEntry::Include { line, .. } | PreprocessorEntry::Define { line, .. } => *line,
    });
    entries
}

/// 1-based line of a byte offset.
fn line_of(source: &str, offset: usize) -> u32 {
    source[..offset].bytes().filter(|&b| b == b'\n').count() as u32 + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_include() {
        let entries = scan("#include <stdio.h>\n");
        assert_eq!(
            entries,
            vec![PreprocessorEntry::Include {
                header: "stdio.h".into(),
                system: true,
                line: 1,
            }]
        );
    }

    #[test]
    fn test_local_include() {
        let entries = scan("int x;\n#include \"mylib.h\"\n");
        assert_eq!(
            entries,
            vec![PreprocessorEntry::Include {
                header: "mylib.h".into(),
                system: false,
                line: 2,
            }]
        );
    }

    #[test]
    fn test_define_with_value() {
        let entries = scan("#define MAX 100\n");
        assert_eq!(
            entries,
            vec![PreprocessorEntry::Define {
                name: "MAX".into(),
                value: "100".into(),
                line: 1,
            }]
        );
    }

    #[test]
    fn test_define_without_value() {
        let entries = scan("#define DEBUG\n");
        assert_eq!(
            entries,
            vec![PreprocessorEntry::Define {
                name: "DEBUG".into(),
                value: String::new(),
                line: 1,
            }]
        );
    }

    #[test]
    fn test_mixed_entries_sorted_by_line() {
        let source = "#define A 1\n#include <stdio.h>\n#define B 2\n";
        let entries = scan(source);
        assert_eq!(entries.len(), 3);
        assert!(matches!(entries[0], PreprocessorEntry::Define { .. }));
        assert!(matches!(entries[1], PreprocessorEntry::Include { .. }));
        assert!(matches!(entries[2], PreprocessorEntry::Define { .. }));
    }

    #[test]
    fn test_leading_whitespace_and_hash_spacing() {
        let entries = scan("  #  include <a.h>\n");
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_non_directives_ignored() {
        assert!(scan("int include = 1; // #include <fake.h> in comment text\n").is_empty());
    }
}
