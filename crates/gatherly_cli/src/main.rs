//! `gatherly` command line entry point.
//!
//! # Responsibility
//! - Resolve runtime config, start file logging when configured, and
//!   dispatch one subcommand against the local database.
//! - Print results as JSON on stdout and failures as `code: message` on
//!   stderr.

use clap::Parser;

mod commands;
mod error;

use commands::Cli;

fn main() {
    let cli = Cli::parse();

    if let Err(err) = cli.run() {
        error::print_error(&err);
        std::process::exit(1);
    }
}
