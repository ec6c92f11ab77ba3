//! CLI subcommands.

pub mod check;
pub mod print;

use clap::Subcommand;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Lint Zig source files for rule violations
    Check(check::CheckArgs),
    /// Reprint Zig source in canonical form
    Print(print::PrintArgs),
}
