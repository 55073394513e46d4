//! Process execution utilities
//!
//! Used to hand a resolved identity to external packaging tools.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::debug;

/// Run a command in a directory with output streamed to the terminal
pub fn run_command_streaming_in_dir(program: &str, args: &[&str], dir: &Path) -> Result<i32> {
    debug!(program, ?args, dir = %dir.display(), "running command");

    let status = Command::new(program)
        .args(args)
        .current_dir(dir)
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .map_err(|e| Error::io(format!("Failed to execute {}", program)).with_source(e))?;

    Ok(status.code().unwrap_or(-1))
}

/// Check if a command exists in PATH
pub fn command_exists(program: &str) -> bool {
    which_command(program).is_some()
}

/// Get the path to a command
pub fn which_command(program: &str) -> Option<PathBuf> {
    which::which(program).ok()
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_command_exists_sh() {
        assert!(command_exists("sh"));
    }

    #[test]
    fn test_command_exists_nonexistent() {
        assert!(!command_exists("nonexistent_command_12345"));
    }

    #[test]
    fn test_streaming_reports_exit_code() {
        let dir = std::env::temp_dir();
        let code = run_command_streaming_in_dir("sh", &["-c", "exit 3"], &dir).unwrap();
        assert_eq!(code, 3);
    }

    #[test]
    fn test_streaming_missing_program_is_error() {
        let dir = std::env::temp_dir();
        assert!(run_command_streaming_in_dir("nonexistent_command_12345", &[], &dir).is_err());
    }
}
