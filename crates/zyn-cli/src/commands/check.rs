//! Check command - lints Zig source files for rule violations.

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use tracing::debug;
use zyn_core::config::{self, Config};
use zyn_core::lint::{Finding, LintReport, Linter, Severity};

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Path to file or directory to check
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Output format for findings (text, json)
    #[arg(short, long, default_value = "text")]
    pub format: String,

    /// Fail on warnings (exit code 1)
    #[arg(long)]
    pub fail_on_warnings: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

impl CheckArgs {
    pub fn run(&self) -> Result<()> {
        self.configure_colors();

        let config = load_nearest_config(&self.path)?;
        let linter = Linter::from_config(config).context("failed to build rule set")?;

        let report = linter
            .check_path(&self.path)
            .with_context(|| format!("failed to check '{}'", self.path.display()))?;
        debug!(
            count = report.findings.len(),
            files = report.files_checked,
            "check complete"
        );

        match self.format.as_str() {
            "json" => output_json(&report)?,
            "text" => output_text(&report),
            other => anyhow::bail!("Invalid format '{other}'. Valid values: text, json"),
        }

        let error_count = count(&report.findings, Severity::Error);
        let warning_count = count(&report.findings, Severity::Warning);
        if error_count > 0 || (warning_count > 0 && self.fail_on_warnings) {
            process::exit(1);
        }
        Ok(())
    }

    fn configure_colors(&self) {
        if self.no_color || std::env::var("NO_COLOR").is_ok() {
            colored::control::set_override(false);
        }
    }
}

fn load_nearest_config(path: &std::path::Path) -> Result<Config> {
    let start = if path.is_dir() {
        path.to_path_buf()
    } else {
        path.parent().map(|p| p.to_path_buf()).unwrap_or_default()
    };
    let Some(config_path) = config::find_config_file(&start) else {
        return Ok(Config::default());
    };
    let result = config::load_config_with_warnings(&config_path)
        .with_context(|| format!("failed to load '{}'", config_path.display()))?;
    for warning in &result.warnings {
        eprintln!("{} {}", "warning:".yellow().bold(), warning);
    }
    Ok(result.config)
}

fn count(findings: &[Finding], severity: Severity) -> usize {
    findings.iter().filter(|f| f.severity == severity).count()
}

fn output_text(report: &LintReport) {
    let findings = &report.findings;
    for finding in findings {
        let severity = match finding.severity {
            Severity::Error => "error".red().bold(),
            Severity::Warning => "warning".yellow().bold(),
            Severity::Info => "info".blue().bold(),
        };
        println!(
            "{}:{}: {} [{}]: {}",
            finding.file,
            finding.line,
            severity,
            finding.rule_id.dimmed(),
            finding.message
        );
    }

    let error_count = count(findings, Severity::Error);
    let warning_count = count(findings, Severity::Warning);
    let file_word = if report.files_checked == 1 {
        "file"
    } else {
        "files"
    };
    if findings.is_empty() {
        println!(
            "{} {} {} checked.",
            "No issues found.".green(),
            report.files_checked,
            file_word
        );
    } else {
        println!(
            "\nFound {} issues ({} errors, {} warnings) in {} {}.",
            findings.len(),
            error_count,
            warning_count,
            report.files_checked,
            file_word
        );
    }
}

fn output_json(report: &LintReport) -> Result<()> {
    let payload = serde_json::json!({
        "findings": report.findings,
        "errors": count(&report.findings, Severity::Error),
        "warnings": count(&report.findings, Severity::Warning),
        "files_checked": report.files_checked,
    });
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}
