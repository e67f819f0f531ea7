//! Interactive prompts for values not given by flag or config.

use std::io::{BufRead, Write};

use anyhow::Result;
use seatplan_allocate::{Buffer, Density};
use tracing::debug;

use crate::error::CliError;

pub const BUFFER_PROMPT: &str = "Enter a buffer value (0-5): ";
pub const DENSITY_PROMPT: &str = "Enter '1' for dense or '2' for sparse: ";

/// Asks until `parse` accepts an answer. Rejected answers print the parse
/// message and ask again; end of input is an error.
pub fn ask<R, W, T>(
    input: &mut R,
    output: &mut W,
    question: &str,
    what: &'static str,
    parse: impl Fn(&str) -> Result<T, String>,
) -> Result<T>
where
    R: BufRead,
    W: Write,
{
    let mut line = String::new();
    loop {
        write!(output, "{question}")?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            return Err(CliError::PromptClosed(what).into());
        }

        match parse(line.trim()) {
            Ok(value) => return Ok(value),
            Err(message) => {
                debug!(answer = line.trim(), what, "Rejected prompt answer");
                writeln!(output, "{message}")?;
            }
        }
    }
}

pub fn ask_buffer<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<Buffer> {
    ask(input, output, BUFFER_PROMPT, "buffer", |answer| {
        let value: i64 = answer
            .parse()
            .map_err(|_| "Please enter a whole number.".to_string())?;
        Buffer::new(value).map_err(|e| e.to_string())
    })
}

pub fn ask_density<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<Density> {
    ask(input, output, DENSITY_PROMPT, "density", |answer| {
        answer
            .parse::<Density>()
            .map_err(|_| "Invalid choice. Please enter '1' or '2'.".to_string())
    })
}
