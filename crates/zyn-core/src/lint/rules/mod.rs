//! Built-in lint rules.

pub mod function_name_pattern;
pub mod max_params;
pub mod syntax_errors;

pub use function_name_pattern::FunctionNamePattern;
pub use max_params::MaxParams;
pub use syntax_errors::SyntaxErrors;

use crate::config::Config;

use super::{LintError, Rule};

/// The full built-in rule set, configured but not yet filtered by
/// enable/disable lists.
pub fn builtin(config: &Config) -> Result<Vec<Box<dyn Rule>>, LintError> {
    Ok(vec![
        Box::new(FunctionNamePattern::new(
            config.rules.function_name_pattern.as_deref(),
        )?),
        Box::new(MaxParams::new(config.rules.max_params)),
        Box::new(SyntaxErrors::new()),
    ])
}
