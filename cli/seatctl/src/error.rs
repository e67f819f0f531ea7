//! Error handling and display for the CLI.

use colored::Colorize;
use seatplan_allocate::AllocError;
use seatplan_workbook::WorkbookError;
use thiserror::Error;

use crate::config::KEYS;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Unknown config key '{0}'")]
    UnknownConfigKey(String),

    #[error("Invalid value '{value}' for config key '{key}'")]
    InvalidValue { key: String, value: String },

    #[error("Input ended before a valid {0} was entered")]
    PromptClosed(&'static str),

    #[error("Input file not found: {0}")]
    MissingInput(String),
}

/// Print an error in a user-friendly format.
pub fn print_error(err: &anyhow::Error) {
    eprintln!("{} {:#}", "Error:".red().bold(), err);

    if let Some(hint) = hint_for(err) {
        eprintln!("\n{}", format!("Hint: {hint}").yellow());
    }
}

fn hint_for(err: &anyhow::Error) -> Option<String> {
    if let Some(cli_err) = err.downcast_ref::<CliError>() {
        return match cli_err {
            CliError::UnknownConfigKey(_) => Some(format!("Valid keys: {}.", KEYS.join(", "))),
            CliError::InvalidValue { key, .. } if key == "buffer" => {
                Some("The buffer is a whole number from 0 to 5.".to_string())
            }
            CliError::InvalidValue { key, .. } if key == "strict" => {
                Some("Use `true` or `false`.".to_string())
            }
            CliError::PromptClosed(_) => {
                Some("Pass --buffer and --density to run without prompts.".to_string())
            }
            CliError::MissingInput(_) => Some(
                "Pass the path with a flag or save it with `seat config set <key> <path>`."
                    .to_string(),
            ),
            _ => None,
        };
    }

    if let Some(alloc_err) = err.downcast_ref::<AllocError>() {
        return match alloc_err {
            AllocError::BufferExceedsCapacity { .. } => {
                Some("Lower --buffer or fix the room's Exam Capacity.".to_string())
            }
            AllocError::MalformedDate(_) => {
                Some("Dates may be written as YYYY-MM-DD, DD-MM-YYYY or DD/MM/YYYY.".to_string())
            }
            AllocError::UnderCapacity { .. } => Some(
                "Add rooms, lower the buffer, or drop --strict to write a partial plan."
                    .to_string(),
            ),
            AllocError::RoomUnavailable => {
                Some("The rooms table has no usable rooms.".to_string())
            }
            _ => None,
        };
    }

    if let Some(wb_err) = err.downcast_ref::<WorkbookError>() {
        if wb_err.is_schema_error() {
            return Some("Check the header row of the input workbook.".to_string());
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use seatplan_codes::RoomNo;

    #[test]
    fn test_hints() {
        let err = anyhow::Error::from(CliError::UnknownConfigKey("x".to_string()));
        assert!(hint_for(&err).unwrap().contains("buffer"));

        let err = anyhow::Error::from(AllocError::BufferExceedsCapacity {
            room: RoomNo::parse("101").unwrap(),
            capacity: 2,
            buffer: 3,
        });
        assert!(hint_for(&err).is_some());

        let err = anyhow::Error::from(WorkbookError::SchemaMismatch {
            table: "rooms",
            column: "Room No.",
        });
        assert!(hint_for(&err).unwrap().contains("header"));

        assert!(hint_for(&anyhow::anyhow!("plain")).is_none());
    }

    #[test]
    fn test_hint_survives_context() {
        use anyhow::Context;

        let result: Result<(), AllocError> = Err(AllocError::RoomUnavailable);
        let err = result.context("Failed to allocate").unwrap_err();
        assert!(hint_for(&err).is_some());
    }
}
