//! Run report: what was executed and how it went
//!
//! Rendered as a short summary before the exit prompt, and optionally written to disk
//! as TOML with `--report`.

use crate::error::{Result, SerializeReportSnafu, WriteReportSnafu};
use crate::platform::Platform;
use serde::Serialize;
use snafu::ResultExt;
use std::fs;
use std::path::{Path, PathBuf};

/// Lines of captured stderr kept for a failed step
pub const STDERR_TAIL_LINES: usize = 20;

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub timestamp: String,
    pub platform: Platform,
    pub root: PathBuf,
    pub steps: Vec<StepOutcome>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StepOutcome {
    pub label: String,
    pub command: String,
    #[serde(flatten)]
    pub status: StepStatus,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepStatus {
    Succeeded,
    Failed {
        #[serde(skip_serializing_if = "Option::is_none")]
        code: Option<i32>,
        #[serde(skip_serializing_if = "Option::is_none")]
        stderr_tail: Option<String>,
    },
    SpawnFailed {
        reason: String,
    },
}

impl StepOutcome {
    pub fn is_success(&self) -> bool {
        self.status == StepStatus::Succeeded
    }
}

impl RunReport {
    pub fn new(platform: Platform, root: PathBuf) -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            platform,
            root,
            steps: Vec::new(),
        }
    }

    pub fn failures(&self) -> Vec<&StepOutcome> {
        self.steps.iter().filter(|step| !step.is_success()).collect()
    }

    pub fn all_succeeded(&self) -> bool {
        self.steps.iter().all(StepOutcome::is_success)
    }
}

/// Human-readable summary; empty when nothing was executed
pub fn render_summary(report: &RunReport) -> String {
    if report.steps.is_empty() {
        return String::new();
    }

    let mut out = String::new();
    out.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
    out.push_str(&format!("Bootstrap summary ({})\n", report.platform));

    for step in &report.steps {
        match &step.status {
            StepStatus::Succeeded => {
                out.push_str(&format!("  ✅ {}\n", step.label));
            }
            StepStatus::Failed { code, .. } => {
                let code = code.map_or_else(|| "signal".to_string(), |c| c.to_string());
                out.push_str(&format!("  ❌ {} (exit: {code})\n", step.label));
                out.push_str(&format!("     {}\n", step.command));
            }
            StepStatus::SpawnFailed { reason } => {
                out.push_str(&format!("  ❌ {} (not started: {reason})\n", step.label));
                out.push_str(&format!("     {}\n", step.command));
            }
        }
    }

    let failed = report.failures().len();
    if failed == 0 {
        out.push_str("✅ All steps succeeded\n");
    } else {
        out.push_str(&format!(
            "⚠️  {failed} of {} steps failed\n",
            report.steps.len()
        ));
    }
    out
}

fn serialize_report(report: &RunReport) -> Result<String> {
    let body = toml::to_string_pretty(report).context(SerializeReportSnafu)?;
    Ok(format!("# gendeps run report\n{body}"))
}

/// Write the report as TOML, creating parent directories; `~` is expanded
pub fn write_report(report: &RunReport, output_path: &Path) -> Result<PathBuf> {
    let content = serialize_report(report)?;

    let expanded = shellexpand::tilde(&output_path.to_string_lossy()).into_owned();
    let final_path = PathBuf::from(expanded);

    if let Some(parent) = final_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).context(WriteReportSnafu { path: parent })?;
    }

    fs::write(&final_path, content).context(WriteReportSnafu { path: &final_path })?;
    Ok(final_path)
}
