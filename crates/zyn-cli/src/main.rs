//! zyn CLI - semantic inspection and linting for Zig source trees.

mod commands;

use clap::Parser;
use commands::Commands;

#[derive(Parser, Debug)]
#[command(
    name = "zyn",
    author,
    version,
    about = "Semantic inspection and linting for Zig source trees",
    long_about = "zyn parses Zig source files into a typed semantic model.\n\n\
                  It can lint declarations against configurable rules and\n\
                  reprint source trees in a canonical textual form."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Check(args) => args.run(),
        Commands::Print(args) => args.run(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_parses_check_command() {
        let cli = Cli::try_parse_from(["zyn", "check", "./src"]).unwrap();
        match cli.command {
            Commands::Check(args) => {
                assert_eq!(args.path.to_str().unwrap(), "./src");
            }
            _ => panic!("Expected Check command"),
        }
    }

    #[test]
    fn cli_parses_check_with_format() {
        let cli = Cli::try_parse_from(["zyn", "check", ".", "--format", "json"]).unwrap();
        match cli.command {
            Commands::Check(args) => {
                assert_eq!(args.format, "json");
            }
            _ => panic!("Expected Check command"),
        }
    }

    #[test]
    fn cli_parses_print_with_separator() {
        let cli = Cli::try_parse_from(["zyn", "print", "a.zig", "--separator", "\n"]).unwrap();
        match cli.command {
            Commands::Print(args) => {
                assert_eq!(args.separator.as_deref(), Some("\n"));
            }
            _ => panic!("Expected Print command"),
        }
    }

    #[test]
    fn cli_rejects_missing_path() {
        assert!(Cli::try_parse_from(["zyn", "check"]).is_err());
    }

    #[test]
    fn cli_help_is_well_formed() {
        Cli::command().debug_assert();
    }
}
