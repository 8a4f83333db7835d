//! Taxonomy CLI: import and normalize taxonomy CSV files.
//!
//! Reads a directory of heterogeneous CSV taxonomies and writes a cleaned
//! CSV, a normalized term table with stable identifiers, a sorted tree
//! (JSON and YAML), and a data quality report.

mod commands;

use std::process::ExitCode;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli)
}
