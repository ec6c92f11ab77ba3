//! syntax-errors rule (Z003): surfaces recoverable parse errors as findings.
//!
//! A unit can expose valid declarations next to a non-empty error list;
//! this rule is how that error list reaches lint output.

use crate::lint::{Finding, Rule, RuleMetadata, Severity};
use crate::source::{SemanticSource, SourceFile};

pub struct SyntaxErrors {
    metadata: RuleMetadata,
}

impl SyntaxErrors {
    pub fn new() -> Self {
        Self {
            metadata: RuleMetadata {
                id: "Z003",
                name: "syntax-errors",
                description: "Report recoverable syntax errors found while parsing",
                severity: Severity::Error,
            },
        }
    }
}

impl Default for SyntaxErrors {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for SyntaxErrors {
    fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    fn check(&self, file: &SourceFile) -> Vec<Finding> {
        file.unit()
            .errors()
            .iter()
            .map(|report| Finding {
                rule_id: self.metadata.id,
                severity: self.metadata.severity,
                file: file.path().display().to_string(),
                line: report.line,
                message: report.message.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(source: &str) -> Vec<Finding> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.zig");
        std::fs::write(&path, source).unwrap();
        let file = SourceFile::open(&path).unwrap();
        SyntaxErrors::new().check(&file)
    }

    #[test]
    fn clean_source_has_no_findings() {
        assert!(check("fn f() void {}\n").is_empty());
    }

    #[test]
    fn parse_errors_become_error_findings() {
        let findings = check("const x = 1;\nfn ;\n");

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Error);
        assert_eq!(findings[0].line, 2);
    }
}
