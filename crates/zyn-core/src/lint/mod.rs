//! Lint tooling built on the semantic model.
//!
//! Rules inspect one parsed file at a time and report findings with an
//! approximate line number, derived by searching the raw source for the
//! declaration's first textual occurrence. The semantic layer does not
//! expose exact positions, so this is a documented precision gap.

pub mod rules;

use std::fmt;
use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::config::Config;
use crate::source::{ModuleError, SourceFile};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Info => write!(f, "info"),
        }
    }
}

/// One reported problem in one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub rule_id: &'static str,
    pub severity: Severity,
    pub file: String,
    pub line: usize,
    pub message: String,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {} [{}] {}",
            self.file, self.line, self.severity, self.rule_id, self.message
        )
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RuleMetadata {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub severity: Severity,
}

/// A lint rule checking one file at a time.
pub trait Rule {
    fn metadata(&self) -> &RuleMetadata;
    fn check(&self, file: &SourceFile) -> Vec<Finding>;
}

#[derive(Debug, thiserror::Error)]
pub enum LintError {
    #[error(transparent)]
    Module(#[from] ModuleError),
    #[error("invalid rule pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Outcome of checking a file or directory.
#[derive(Debug, Default)]
pub struct LintReport {
    pub findings: Vec<Finding>,
    pub files_checked: usize,
}

/// Runs a rule set over files and directories.
pub struct Linter {
    rules: Vec<Box<dyn Rule>>,
    config: Config,
}

impl Linter {
    /// Builds a linter from configuration: the built-in rule set minus
    /// disabled rules, restricted to `enabled` when that list is non-empty.
    pub fn from_config(config: Config) -> Result<Self, LintError> {
        let rules = rules::builtin(&config)?
            .into_iter()
            .filter(|rule| {
                let name = rule.metadata().name;
                if config.rules.disabled.iter().any(|d| d == name) {
                    return false;
                }
                config.rules.enabled.is_empty()
                    || config.rules.enabled.iter().any(|e| e == name)
            })
            .collect();
        Ok(Self { rules, config })
    }

    pub fn rules(&self) -> &[Box<dyn Rule>] {
        &self.rules
    }

    /// Checks a file or a directory tree. Fails when the path does not
    /// exist; per-file failures become findings, not batch aborts.
    pub fn check_path(&self, path: &Path) -> Result<LintReport, LintError> {
        if !path.exists() {
            return Err(LintError::Module(ModuleError::NotFound(
                path.to_path_buf(),
            )));
        }
        let paths = if path.is_file() {
            vec![path.to_path_buf()]
        } else {
            crate::source::discover(path)?
        };

        let mut report = LintReport::default();
        for file_path in paths {
            report.files_checked += 1;
            match SourceFile::open(&file_path) {
                Ok(file) => report.findings.extend(self.check_file(&file)),
                Err(err) => report.findings.push(Finding {
                    rule_id: "Z003",
                    severity: Severity::Error,
                    file: file_path.display().to_string(),
                    line: 1,
                    message: err.to_string(),
                }),
            }
        }
        Ok(report)
    }

    pub fn check_file(&self, file: &SourceFile) -> Vec<Finding> {
        let mut findings = Vec::new();
        for rule in &self.rules {
            debug!(rule = rule.metadata().name, file = %file.path().display(), "running rule");
            findings.extend(rule.check(file).into_iter().map(|f| self.override_severity(f)));
        }
        findings
    }

    fn override_severity(&self, mut finding: Finding) -> Finding {
        for (name, severity) in &self.config.rules.severity {
            let matches_rule = self
                .rules
                .iter()
                .any(|r| r.metadata().name == name && r.metadata().id == finding.rule_id);
            if matches_rule {
                finding.severity = (*severity).into();
            }
        }
        finding
    }
}

/// 1-based line of the first occurrence of `needle` in `source`, falling
/// back to line 1 when the text is not found.
pub(crate) fn approximate_line(source: &str, needle: &str) -> usize {
    source
        .find(needle)
        .map(|index| source[..index].matches('\n').count() + 1)
        .unwrap_or(1)
}
