//! function-name-pattern rule (Z001): function names must match a naming
//! pattern, camelCase by default.

use regex::Regex;

use crate::lint::{approximate_line, Finding, Rule, RuleMetadata, Severity};
use crate::source::{SemanticSource, SourceFile};
use crate::syntax::SourceElement;

const DEFAULT_PATTERN: &str = "^[a-z][a-zA-Z0-9]*$";

pub struct FunctionNamePattern {
    metadata: RuleMetadata,
    pattern: Regex,
}

impl FunctionNamePattern {
    pub fn new(pattern: Option<&str>) -> Result<Self, regex::Error> {
        let pattern = Regex::new(pattern.unwrap_or(DEFAULT_PATTERN))?;
        Ok(Self {
            metadata: RuleMetadata {
                id: "Z001",
                name: "function-name-pattern",
                description: "Function names must match the configured naming pattern",
                severity: Severity::Warning,
            },
            pattern,
        })
    }
}

impl Rule for FunctionNamePattern {
    fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    fn check(&self, file: &SourceFile) -> Vec<Finding> {
        let mut findings = Vec::new();
        for element in file.content() {
            let SourceElement::Function(func) = element else {
                continue;
            };
            let name = func.name();
            if self.pattern.is_match(name) {
                continue;
            }
            findings.push(Finding {
                rule_id: self.metadata.id,
                severity: self.metadata.severity,
                file: file.path().display().to_string(),
                line: approximate_line(file.unit().source(), &format!("fn {name}")),
                message: format!(
                    "function name '{name}' does not match pattern '{}'",
                    self.pattern.as_str()
                ),
            });
        }
        findings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(source: &str, pattern: Option<&str>) -> Vec<Finding> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.zig");
        std::fs::write(&path, source).unwrap();
        let file = SourceFile::open(&path).unwrap();
        FunctionNamePattern::new(pattern).unwrap().check(&file)
    }

    #[test]
    fn camel_case_passes_by_default() {
        assert!(check("fn readAll() void {}\nfn f() void {}", None).is_empty());
    }

    #[test]
    fn violations_report_approximate_line() {
        let findings = check("const pad = 1;\nfn Bad_name() void {}\n", None);

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].rule_id, "Z001");
        assert_eq!(findings[0].line, 2);
        assert!(findings[0].message.contains("Bad_name"));
    }

    #[test]
    fn custom_pattern_replaces_default() {
        let findings = check("fn snake_case() void {}", Some("^[a-z_]+$"));
        assert!(findings.is_empty());
    }

    #[test]
    fn non_function_elements_are_ignored() {
        assert!(check("const Bad_Name = 1;\ntest \"X\" {}", None).is_empty());
    }
}
