//! Shared rendering helpers for command output.

use anyhow::{anyhow, Result};
use colored::{ColoredString, Colorize};
use serde::Serialize;

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    /// Parses an output format from string.
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(anyhow!(
                "Unknown format: '{}'. Valid formats: text, json",
                s
            )),
        }
    }
}

/// Coefficient formatted to four places, coloured by sign and strength.
pub fn coefficient(value: f64) -> ColoredString {
    let text = format!("{value:>8.4}");
    if value.abs() >= 0.5 {
        if value > 0.0 {
            text.green().bold()
        } else {
            text.red().bold()
        }
    } else if value.abs() >= 0.2 {
        if value > 0.0 {
            text.green()
        } else {
            text.red()
        }
    } else {
        text.normal()
    }
}

/// Prints any serializable value as pretty JSON on stdout.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_formats() {
        assert_eq!(OutputFormat::parse("text").unwrap(), OutputFormat::Text);
        assert_eq!(OutputFormat::parse("TXT").unwrap(), OutputFormat::Text);
        assert_eq!(OutputFormat::parse("Json").unwrap(), OutputFormat::Json);

        let err = OutputFormat::parse("yaml").unwrap_err();
        assert!(err.to_string().contains("Valid formats"));
    }

    #[test]
    fn coefficient_keeps_value_text() {
        colored::control::set_override(false);
        assert_eq!(coefficient(-0.85106).to_string(), " -0.8511");
        assert_eq!(coefficient(0.0).to_string(), "  0.0000");
    }
}
