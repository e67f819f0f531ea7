//! CLI commands.

mod allocate;
mod config;
mod rooms;
mod timetable;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::{config_path, Config};
use crate::logging;
use crate::output::OutputFormat;

/// seat - allocate exam rooms and produce attendance sheets.
#[derive(Debug, Parser)]
#[command(name = "seat")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Config file to use instead of the default location.
    #[arg(long, global = true, env = "SEAT_CONFIG")]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Seat every scheduled course and write the output workbooks.
    Allocate(allocate::AllocateCommand),

    /// Show the room catalog in allocation order.
    Rooms(rooms::RoomsCommand),

    /// Show the normalized timetable.
    Timetable(timetable::TimetableCommand),

    /// Show or change saved defaults.
    Config(config::ConfigCommand),

    /// Show CLI version.
    Version,
}

impl Cli {
    /// Run the CLI command.
    pub fn run(self) -> Result<()> {
        let config_path = config_path(self.config.as_deref())?;
        let config = Config::load(&config_path)?;

        logging::init(config.log_level.as_deref(), self.log_json);

        let ctx = CommandContext {
            config,
            config_path,
            format: self.format,
        };

        match self.command {
            Commands::Allocate(cmd) => cmd.run(ctx),
            Commands::Rooms(cmd) => cmd.run(ctx),
            Commands::Timetable(cmd) => cmd.run(ctx),
            Commands::Config(cmd) => cmd.run(ctx),
            Commands::Version => {
                println!("seat {}", env!("CARGO_PKG_VERSION"));
                Ok(())
            }
        }
    }
}

/// Shared command context.
pub struct CommandContext {
    pub config: Config,
    pub config_path: PathBuf,
    pub format: OutputFormat,
}

impl CommandContext {
    /// Resolve an input path, preferring the flag over config, and check
    /// that the file exists.
    pub fn input(&self, flag: Option<PathBuf>, from_config: PathBuf) -> Result<PathBuf> {
        let path = flag.unwrap_or(from_config);
        if !path.exists() {
            return Err(crate::error::CliError::MissingInput(path.display().to_string()).into());
        }
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_allocate_flags() {
        let cli = Cli::try_parse_from([
            "seat",
            "--format",
            "json",
            "allocate",
            "--buffer",
            "2",
            "--density",
            "sparse",
            "--strict",
        ])
        .unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(matches!(cli.command, Commands::Allocate(_)));
    }

    #[test]
    fn test_missing_input() {
        let dir = tempfile::TempDir::new().unwrap();
        let ctx = CommandContext {
            config: Config::default(),
            config_path: dir.path().join("config.json"),
            format: OutputFormat::Table,
        };
        let err = ctx
            .input(Some(dir.path().join("absent.xlsx")), PathBuf::from("x"))
            .unwrap_err();
        assert!(err.to_string().contains("absent.xlsx"));
    }
}
