//! Terminal output utilities
//!
//! Status lines go to stderr so stdout stays clean for machine-readable
//! output such as `resolve --format env`.

use buildstamp_core::error::Error;
use owo_colors::OwoColorize;
use serde::Serialize;

/// Status message helpers
pub struct Status;

impl Status {
    /// Print a success message
    pub fn success(message: &str) {
        eprintln!("{} {}", "✓".green(), message);
    }

    /// Print an error message
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Print a warning message
    pub fn warning(message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Print an info message
    pub fn info(message: &str) {
        eprintln!("{} {}", "ℹ".blue(), message);
    }

    /// Print a header
    pub fn header(message: &str) {
        println!();
        println!("{}", message.bold());
        println!("{}", "─".repeat(message.chars().count()));
    }
}

/// Print an aligned `label: value` line
pub fn field(label: &str, value: impl std::fmt::Display) {
    println!("  {:<16} {}", format!("{}:", label).dimmed(), value);
}

/// Print a value as pretty JSON on stdout
pub fn print_json<T: Serialize>(value: &T) -> Result<(), Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Report an error, as JSON when `json` is set
pub fn report_error(err: &Error, json: bool) {
    if json {
        match serde_json::to_string_pretty(&err.to_report()) {
            Ok(rendered) => eprintln!("{}", rendered),
            Err(_) => Status::error(&err.to_string()),
        }
    } else {
        Status::error(&err.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use buildstamp_core::error::ErrorCode;

    #[test]
    fn test_error_report_renders_as_json() {
        let err = Error::new(ErrorCode::ConfigParseError, "bad toml");
        let rendered = serde_json::to_string(&err.to_report()).unwrap();
        assert!(rendered.contains("\"code_str\":\"E3002\""));
    }
}
