//! Print command - reprints Zig source in canonical form.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use zyn_core::config;
use zyn_core::printer::PrinterDispatcher;
use zyn_core::source::{SemanticSource, SourceFile, SourceModule};

#[derive(Args, Debug)]
pub struct PrintArgs {
    /// Path to file or directory to print
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Separator between top-level elements (defaults to a blank line)
    #[arg(short, long)]
    pub separator: Option<String>,
}

impl PrintArgs {
    pub fn run(&self) -> Result<()> {
        let dispatcher = self.build_dispatcher()?;

        if self.path.is_file() {
            let file = SourceFile::open(&self.path)
                .with_context(|| format!("failed to open '{}'", self.path.display()))?;
            let rendered = file
                .print_with(&dispatcher)
                .with_context(|| format!("failed to print '{}'", self.path.display()))?;
            println!("{rendered}");
            return Ok(());
        }

        let module = SourceModule::load_parallel(&self.path)
            .with_context(|| format!("failed to load '{}'", self.path.display()))?;
        for (index, file) in module.files().iter().enumerate() {
            if index > 0 {
                println!();
            }
            println!("// {}", file.path().display());
            let rendered = file
                .print_with(&dispatcher)
                .with_context(|| format!("failed to print '{}'", file.path().display()))?;
            println!("{rendered}");
        }
        Ok(())
    }

    /// Default renderers, with the separator taken from the CLI flag first
    /// and the nearest config file second.
    fn build_dispatcher(&self) -> Result<PrinterDispatcher> {
        let mut dispatcher = PrinterDispatcher::with_defaults();
        if let Some(separator) = &self.separator {
            dispatcher.set_separator(separator.clone());
            return Ok(dispatcher);
        }

        let start = if self.path.is_dir() {
            self.path.clone()
        } else {
            self.path.parent().map(|p| p.to_path_buf()).unwrap_or_default()
        };
        if let Some(config_path) = config::find_config_file(&start) {
            let loaded = config::load_config(&config_path)
                .with_context(|| format!("failed to load '{}'", config_path.display()))?;
            if let Some(separator) = loaded.printer.separator {
                dispatcher.set_separator(separator);
            }
        }
        Ok(dispatcher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_separator_overrides_config() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(config::CONFIG_FILENAME),
            "[printer]\nseparator = \"\\n\"\n",
        )
        .unwrap();
        let source = dir.path().join("a.zig");
        std::fs::write(&source, "const a = 1;").unwrap();

        let args = PrintArgs {
            path: source,
            separator: Some("---".to_string()),
        };
        let dispatcher = args.build_dispatcher().unwrap();
        assert_eq!(dispatcher.separator(), "---");
    }

    #[test]
    fn config_separator_applies_without_flag() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(config::CONFIG_FILENAME),
            "[printer]\nseparator = \"\\n\"\n",
        )
        .unwrap();

        let args = PrintArgs {
            path: dir.path().to_path_buf(),
            separator: None,
        };
        let dispatcher = args.build_dispatcher().unwrap();
        assert_eq!(dispatcher.separator(), "\n");
    }
}
