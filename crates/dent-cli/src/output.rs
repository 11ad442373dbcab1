//! Output formatting for command results.
//!
//! Text output is written by each command; JSON output is a single
//! pretty-printed document on stdout so it can be piped.

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;

use crate::OutputFormat;

/// Print `value` as JSON when the JSON format is selected.
pub fn print<T: Serialize>(value: &T, format: OutputFormat, quiet: bool) -> Result<()> {
    if quiet {
        return Ok(());
    }
    if let OutputFormat::Json = format {
        let json = serde_json::to_string_pretty(value).context("Failed to serialize result")?;
        println!("{}", json);
    }
    Ok(())
}

/// Print a success line in text mode.
pub fn success(msg: &str, format: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    if let OutputFormat::Text = format {
        println!("{} {}", "✓".green().bold(), msg);
    }
}

/// Print a progress line in text mode.
pub fn info(msg: &str, format: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    if let OutputFormat::Text = format {
        println!("{}", msg);
    }
}

/// Print a warning to stderr in text mode.
pub fn warning(msg: &str, format: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    if let OutputFormat::Text = format {
        eprintln!("{} {}", "⚠".yellow().bold(), msg);
    }
}
