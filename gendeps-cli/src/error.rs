//! Error types for the bootstrap library
//!
//! The binary wraps these in `anyhow` at the wiring points.

use snafu::Snafu;
use std::path::PathBuf;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum BootstrapError {
    /// The program could not be started at all (missing from PATH, permission denied)
    #[snafu(display("Failed to execute: {command}"))]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    /// The program ran but did not exit successfully
    #[snafu(display("Command failed ({}): {command}", describe_code(*code)))]
    CommandFailed { command: String, code: Option<i32> },

    #[snafu(display("Failed to read from the terminal"))]
    Prompt { source: std::io::Error },

    #[snafu(display("Failed to read {}", path.display()))]
    ReadConfig {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("Failed to parse {}", path.display()))]
    ParseConfig {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[snafu(display("Invalid configuration: {message}"))]
    InvalidConfig { message: String },

    #[snafu(display("Failed to determine the current directory"))]
    CurrentDir { source: std::io::Error },

    #[snafu(display("Failed to write run report to {}", path.display()))]
    WriteReport {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("Failed to serialize run report"))]
    SerializeReport { source: toml::ser::Error },
}

fn describe_code(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "terminated by signal".to_string(),
    }
}

pub type Result<T, E = BootstrapError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_failed_display() {
        let err = BootstrapError::CommandFailed {
            command: "premake5 vs2019".to_string(),
            code: Some(2),
        };
        assert_eq!(err.to_string(), "Command failed (exit code 2): premake5 vs2019");

        let err = BootstrapError::CommandFailed {
            command: "conan install".to_string(),
            code: None,
        };
        assert!(err.to_string().contains("terminated by signal"));
    }
}
