//! Config commands (saved defaults).

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::config::Config;
use crate::output::{print_info, print_single, print_success, OutputFormat};

use super::CommandContext;

/// Show or change saved defaults.
#[derive(Debug, Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    command: ConfigSubcommand,
}

#[derive(Debug, Subcommand)]
enum ConfigSubcommand {
    /// Show the saved config.
    Show,

    /// Print the config file location.
    Path,

    /// Save a default (roster, rooms, timetable, names, out_dir, buffer,
    /// density, strict, log_level).
    Set {
        key: String,
        value: String,
    },

    /// Remove every saved default.
    Clear,
}

impl ConfigCommand {
    pub fn run(self, ctx: CommandContext) -> Result<()> {
        match self.command {
            ConfigSubcommand::Show => show(ctx),
            ConfigSubcommand::Path => {
                println!("{}", ctx.config_path.display());
                Ok(())
            }
            ConfigSubcommand::Set { key, value } => set(ctx, &key, &value),
            ConfigSubcommand::Clear => clear(ctx),
        }
    }
}

fn show(ctx: CommandContext) -> Result<()> {
    match ctx.format {
        OutputFormat::Json => print_single(&ctx.config),
        OutputFormat::Table => {
            let c = &ctx.config;
            println!("roster: {}", c.roster_path().display());
            println!("rooms: {}", c.rooms_path().display());
            println!("timetable: {}", c.timetable_path().display());
            println!("names: {}", c.names_path().display());
            println!("out_dir: {}", c.out_dir().display());
            println!("buffer: {}", display(c.buffer));
            println!("density: {}", display(c.density));
            println!("strict: {}", c.strict);
            println!("log_level: {}", c.log_level.as_deref().unwrap_or("-"));
        }
    }
    Ok(())
}

fn display<T: std::fmt::Display>(value: Option<T>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| "(prompt)".to_string())
}

fn set(mut ctx: CommandContext, key: &str, value: &str) -> Result<()> {
    ctx.config.set(key, value)?;
    ctx.config.save(&ctx.config_path)?;

    match ctx.format {
        OutputFormat::Json => print_single(&ctx.config),
        OutputFormat::Table => {
            print_success(&format!("Saved {key} = {value}"));
            print_info(&format!("Config file: {}", ctx.config_path.display()));
        }
    }
    Ok(())
}

fn clear(ctx: CommandContext) -> Result<()> {
    Config::default().save(&ctx.config_path)?;

    match ctx.format {
        OutputFormat::Json => print_single(&serde_json::json!({ "ok": true })),
        OutputFormat::Table => print_success("Cleared saved config"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use seatplan_allocate::Density;
    use tempfile::TempDir;

    fn ctx(dir: &TempDir) -> CommandContext {
        let config_path = dir.path().join("config.json");
        CommandContext {
            config: Config::load(&config_path).unwrap(),
            config_path,
            format: OutputFormat::Json,
        }
    }

    #[test]
    fn test_set_then_clear() {
        let dir = TempDir::new().unwrap();

        set(ctx(&dir), "density", "sparse").unwrap();
        assert_eq!(ctx(&dir).config.density, Some(Density::Sparse));

        clear(ctx(&dir)).unwrap();
        assert_eq!(ctx(&dir).config, Config::default());
    }

    #[test]
    fn test_set_unknown_key_does_not_save() {
        let dir = TempDir::new().unwrap();
        assert!(set(ctx(&dir), "colour", "blue").is_err());
        assert!(!dir.path().join("config.json").exists());
    }
}
