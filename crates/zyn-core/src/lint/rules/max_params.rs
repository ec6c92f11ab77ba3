//! max-params rule (Z002): functions should not take too many parameters.

use tracing::debug;

use crate::lint::{approximate_line, Finding, Rule, RuleMetadata, Severity};
use crate::source::{SemanticSource, SourceFile};
use crate::syntax::SourceElement;

const DEFAULT_LIMIT: usize = 6;

pub struct MaxParams {
    metadata: RuleMetadata,
    limit: usize,
}

impl MaxParams {
    pub fn new(limit: Option<usize>) -> Self {
        Self {
            metadata: RuleMetadata {
                id: "Z002",
                name: "max-params",
                description: "Functions should not exceed the parameter limit",
                severity: Severity::Warning,
            },
            limit: limit.unwrap_or(DEFAULT_LIMIT),
        }
    }
}

impl Rule for MaxParams {
    fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    fn check(&self, file: &SourceFile) -> Vec<Finding> {
        let mut findings = Vec::new();
        for element in file.content() {
            let SourceElement::Function(func) = element else {
                continue;
            };
            let params = match func.params() {
                Ok(params) => params,
                Err(err) => {
                    // unresolvable parameter type; skip rather than miscount
                    debug!(function = func.name(), %err, "skipping declaration");
                    continue;
                }
            };
            if params.len() <= self.limit {
                continue;
            }
            let name = func.name();
            findings.push(Finding {
                rule_id: self.metadata.id,
                severity: self.metadata.severity,
                file: file.path().display().to_string(),
                line: approximate_line(file.unit().source(), &format!("fn {name}")),
                message: format!(
                    "function '{name}' takes {} parameters, limit is {}",
                    params.len(),
                    self.limit
                ),
            });
        }
        findings
    }
}
