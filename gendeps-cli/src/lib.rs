//! gendeps: prepares the native build environment
//!
//! Detects the host platform, optionally installs native dependencies (Conan on
//! Windows, the system package manager on Linux) and generates the IDE solution with
//! premake5. All interaction goes through [`Prompter`] and all external tools through
//! [`CommandRunner`], so the dispatch logic in [`Orchestrator`] runs without a terminal.

pub mod command;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod plan;
pub mod platform;
pub mod prompt;
pub mod report;

pub use command::{CommandResult, CommandRunner, DryRunRunner, Invocation, ShellRunner};
pub use config::{BootstrapConfig, BuildConfiguration, FailurePolicy, locate_root};
pub use error::BootstrapError;
pub use orchestrator::Orchestrator;
pub use platform::Platform;
pub use prompt::{Prompter, TerminalPrompter};
pub use report::RunReport;

use error::CurrentDirSnafu;
use snafu::ResultExt;
use std::path::Path;

/// Interactive bootstrap with everything detected from the environment
pub fn run() -> Result<RunReport, BootstrapError> {
    let cwd = std::env::current_dir().context(CurrentDirSnafu)?;
    run_from(&cwd, Platform::detect(), TerminalPrompter::stdio())
}

/// Locate the repository root from `cwd`, load its config and run real commands
pub fn run_from<P: Prompter>(
    cwd: &Path,
    platform: Platform,
    prompter: P,
) -> Result<RunReport, BootstrapError> {
    let root = locate_root(cwd, &config::WindowsConfig::default().recipe);
    let config = BootstrapConfig::load(None, &root)?;
    let runner = ShellRunner::new(config.run.capture_output);

    Orchestrator::new(prompter, runner, config, root).run(platform)
}
