//! seatctl (seat) - exam room allocation CLI
//!
//! Reads the roster, room, timetable and name workbooks, seats every
//! scheduled course and writes the allocation table and attendance sheets.

use anyhow::Result;
use clap::Parser;

mod commands;
mod config;
mod error;
mod logging;
mod output;
mod prompt;

use commands::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = cli.run() {
        error::print_error(&e);
        std::process::exit(1);
    }

    Ok(())
}
