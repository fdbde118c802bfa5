//! Bootstrap orchestrator
//!
//! Branches on the detected platform, asks before installing anything, runs the fixed
//! command sequences and always ends on the exit prompt.

use crate::command::CommandRunner;
use crate::config::{BootstrapConfig, FailurePolicy};
use crate::error::{BootstrapError, Result};
use crate::plan::{self, Step};
use crate::platform::Platform;
use crate::prompt::Prompter;
use crate::report::{RunReport, STDERR_TAIL_LINES, StepOutcome, StepStatus, render_summary};
use std::path::PathBuf;
use tracing::{debug, info, warn};

pub const WINDOWS_DEPENDENCY_PROMPT: &str = "Run dependency installation? (y/n)";
pub const CONTINUE_PROMPT: &str = "Press Enter to continue";
pub const LINUX_DEPENDENCY_PROMPT: &str = "Install dependencies? (y/N)";
pub const EXIT_PROMPT: &str = "Press Enter to exit...";
pub const UNSUPPORTED_NOTICE: &str =
    "Unsupported platform: bootstrap steps exist only for Windows and Linux";

/// Drives one bootstrap run through injected prompt and command capabilities
pub struct Orchestrator<P, R> {
    prompter: P,
    runner: R,
    config: BootstrapConfig,
    root: PathBuf,
}

impl<P: Prompter, R: CommandRunner> Orchestrator<P, R> {
    /// `root` is the repository root the command working directories derive from
    pub fn new(prompter: P, runner: R, config: BootstrapConfig, root: impl Into<PathBuf>) -> Self {
        Self {
            prompter,
            runner,
            config,
            root: root.into(),
        }
    }

    /// Run the branch for `platform`, then show the summary and the exit prompt.
    ///
    /// The exit prompt is shown even when a step aborted the run; the abort error is
    /// returned afterwards.
    pub fn run(&mut self, platform: Platform) -> Result<RunReport> {
        info!(%platform, root = %self.root.display(), "bootstrap starting");
        let mut report = RunReport::new(platform, self.root.clone());

        let outcome = match platform {
            Platform::Windows => self.run_windows(&mut report),
            Platform::Linux => self.run_linux(&mut report),
            Platform::Other => self.run_unsupported(),
        };

        // Prompt I/O failures mean the terminal is gone; nothing left to ask
        if let Err(BootstrapError::Prompt { .. }) = &outcome {
            return outcome.map(|()| report);
        }

        let summary = render_summary(&report);
        if !summary.is_empty() {
            self.prompter.say(&summary)?;
        }
        self.prompter.acknowledge(EXIT_PROMPT)?;

        outcome.map(|()| report)
    }

    fn run_windows(&mut self, report: &mut RunReport) -> Result<()> {
        self.prompter.clear()?;

        if self.prompter.confirm(WINDOWS_DEPENDENCY_PROMPT)? {
            let before = report.failures().len();
            for step in plan::windows_dependency_steps(&self.config, &self.root) {
                self.execute(step, report)?;
            }

            let failed = report.failures().len() - before;
            if failed == 0 {
                self.prompter.say("Dependency installation finished")?;
            } else {
                self.prompter.say(&format!(
                    "Dependency installation finished with {failed} failed step(s)"
                ))?;
            }
        } else {
            debug!("dependency installation declined");
        }

        self.prompter.acknowledge(CONTINUE_PROMPT)?;

        let step = plan::solution_generation(&self.config, &self.root);
        self.execute(step, report)
    }

    fn run_linux(&mut self, report: &mut RunReport) -> Result<()> {
        self.prompter.clear()?;

        if !self.prompter.confirm(LINUX_DEPENDENCY_PROMPT)? {
            debug!("dependency installation declined");
            return Ok(());
        }

        for step in plan::linux_package_steps(&self.config, &self.root) {
            self.execute(step, report)?;
        }
        Ok(())
    }

    fn run_unsupported(&mut self) -> Result<()> {
        warn!(platform = %Platform::Other, "unsupported platform, nothing to do");
        self.prompter.say(UNSUPPORTED_NOTICE)
    }

    /// Run one step and record it. Failures only propagate under the abort policy.
    fn execute(&mut self, step: Step, report: &mut RunReport) -> Result<()> {
        let command = step.invocation.to_string();
        debug!(label = %step.label, %command, "executing step");

        let (status, error) = match self.runner.run(&step.invocation) {
            Ok(result) if result.success() => (StepStatus::Succeeded, None),
            Ok(result) => {
                warn!(label = %step.label, %command, code = ?result.code, "step failed");
                let status = StepStatus::Failed {
                    code: result.code,
                    stderr_tail: result.stderr_tail(STDERR_TAIL_LINES),
                };
                let error = BootstrapError::CommandFailed {
                    command: command.clone(),
                    code: result.code,
                };
                (status, Some(error))
            }
            Err(error) => {
                warn!(label = %step.label, %command, %error, "step could not be started");
                let reason = match &error {
                    BootstrapError::Spawn { source, .. } => source.to_string(),
                    other => other.to_string(),
                };
                (StepStatus::SpawnFailed { reason }, Some(error))
            }
        };

        report.steps.push(StepOutcome {
            label: step.label,
            command,
            status,
        });

        match (error, self.config.run.on_failure) {
            (Some(error), FailurePolicy::Abort) => Err(error),
            _ => Ok(()),
        }
    }
}
