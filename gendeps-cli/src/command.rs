//! External command execution
//!
//! Every external tool call goes through [`CommandRunner`] and comes back as a
//! [`CommandResult`], so callers decide whether a failure stops the run.

use crate::error::{Result, SpawnSnafu};
use snafu::ResultExt;
use std::fmt;
use std::path::PathBuf;
use tracing::debug;

/// A program with its arguments and the directory it runs in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }
}

/// Renders like a shell line; arguments with whitespace are double-quoted
impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.chars().any(char::is_whitespace) {
                write!(f, " \"{arg}\"")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// Outcome of a finished external command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    /// Exit code; `None` when the child was terminated by a signal
    pub code: Option<i32>,
    pub success: bool,
    /// Empty unless output capture was enabled
    pub stdout: String,
    pub stderr: String,
}

impl CommandResult {
    pub fn succeeded() -> Self {
        Self::from_code(0)
    }

    pub fn from_code(code: i32) -> Self {
        Self {
            code: Some(code),
            success: code == 0,
            stdout: String::new(),
            stderr: String::new(),
        }
    }

    pub fn success(&self) -> bool {
        self.success
    }

    /// Last `max_lines` non-empty lines of captured stderr, if any were captured
    pub fn stderr_tail(&self, max_lines: usize) -> Option<String> {
        let lines: Vec<&str> = self
            .stderr
            .lines()
            .filter(|line| !line.trim().is_empty())
            .collect();
        if lines.is_empty() {
            return None;
        }
        let start = lines.len().saturating_sub(max_lines);
        Some(lines[start..].join("\n"))
    }
}

/// Capability for running external programs
pub trait CommandRunner {
    /// Run to completion. `Err` only when the program could not be started.
    fn run(&mut self, invocation: &Invocation) -> Result<CommandResult>;
}

impl<T: CommandRunner + ?Sized> CommandRunner for &mut T {
    fn run(&mut self, invocation: &Invocation) -> Result<CommandResult> {
        (**self).run(invocation)
    }
}

impl<T: CommandRunner + ?Sized> CommandRunner for Box<T> {
    fn run(&mut self, invocation: &Invocation) -> Result<CommandResult> {
        (**self).run(invocation)
    }
}

/// Runs programs for real, blocking until each exits
#[derive(Debug, Default)]
pub struct ShellRunner {
    capture: bool,
}

impl ShellRunner {
    /// With `capture` the child's output is collected instead of streamed to the terminal
    pub fn new(capture: bool) -> Self {
        Self { capture }
    }
}

impl CommandRunner for ShellRunner {
    fn run(&mut self, invocation: &Invocation) -> Result<CommandResult> {
        debug!(command = %invocation, cwd = ?invocation.cwd, "running");

        let mut expression = duct::cmd(invocation.program.as_str(), invocation.args.iter()).unchecked();
        if let Some(dir) = &invocation.cwd {
            expression = expression.dir(dir.clone());
        }
        if self.capture {
            expression = expression.stdout_capture().stderr_capture();
        }

        let output = expression.run().context(SpawnSnafu {
            command: invocation.to_string(),
        })?;

        let result = CommandResult {
            code: output.status.code(),
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        if self.capture {
            debug!(stdout = %result.stdout, stderr = %result.stderr, "captured output");
        }

        Ok(result)
    }
}

/// Prints each invocation instead of running it
#[derive(Debug, Default)]
pub struct DryRunRunner;

impl CommandRunner for DryRunRunner {
    fn run(&mut self, invocation: &Invocation) -> Result<CommandResult> {
        match &invocation.cwd {
            Some(dir) => println!("[dry-run] {invocation}  (in {})", dir.display()),
            None => println!("[dry-run] {invocation}"),
        }
        Ok(CommandResult::succeeded())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BootstrapError;

    #[test]
    fn test_display_quotes_whitespace() {
        let invocation = Invocation::new("conan")
            .args(["install", "-s", "compiler=Visual Studio", "--build=*", "tools"]);
        assert_eq!(
            invocation.to_string(),
            "conan install -s \"compiler=Visual Studio\" --build=* tools"
        );
    }

    #[test]
    fn test_stderr_tail() {
        let mut result = CommandResult::from_code(1);
        assert_eq!(result.stderr_tail(2), None);

        result.stderr = "one\n\ntwo\nthree\n".to_string();
        assert_eq!(result.stderr_tail(2), Some("two\nthree".to_string()));
        assert_eq!(result.stderr_tail(10), Some("one\ntwo\nthree".to_string()));
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let mut runner = ShellRunner::new(true);
        let err = runner
            .run(&Invocation::new("gendeps-no-such-tool-7f3a").arg("--version"))
            .unwrap_err();
        assert!(matches!(err, BootstrapError::Spawn { .. }));
        assert!(err.to_string().contains("gendeps-no-such-tool-7f3a --version"));
    }

    #[cfg(unix)]
    #[test]
    fn test_exit_code_and_capture() {
        let mut runner = ShellRunner::new(true);
        let result = runner
            .run(&Invocation::new("sh").args(["-c", "echo out; echo err >&2; exit 3"]))
            .unwrap();
        assert!(!result.success());
        assert_eq!(result.code, Some(3));
        assert_eq!(result.stdout.trim(), "out");
        assert_eq!(result.stderr_tail(5), Some("err".to_string()));
    }

    #[cfg(unix)]
    #[test]
    fn test_runs_in_given_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut runner = ShellRunner::new(true);
        let result = runner
            .run(&Invocation::new("pwd").current_dir(dir.path()))
            .unwrap();
        assert!(result.success());
        let reported = std::fs::canonicalize(result.stdout.trim()).unwrap();
        assert_eq!(reported, std::fs::canonicalize(dir.path()).unwrap());
    }
}
