use anyhow::{Context, Result};
use clap::Parser;
use gendeps_cli::config::WindowsConfig;
use gendeps_cli::report::write_report;
use gendeps_cli::{
    BootstrapConfig, CommandRunner, DryRunRunner, FailurePolicy, Orchestrator, Platform,
    ShellRunner, TerminalPrompter, locate_root,
};
use std::path::{Path, PathBuf};

/// Prepare the native build environment: install dependencies and generate the solution
#[derive(Debug, Parser)]
#[clap(name = "gendeps", version, about)]
struct Cli {
    /// Platform branch to run (default: detected from the host)
    #[clap(long, value_enum)]
    platform: Option<Platform>,

    /// Repository root (default: nearest directory with tools/conanfile.*)
    #[clap(long, env = "GENDEPS_ROOT")]
    root: Option<PathBuf>,

    /// Config file (default: <root>/gendeps.toml when present)
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Answer yes to every yes/no question
    #[clap(short = 'y', long)]
    yes: bool,

    /// Do not wait for Enter between steps and before exiting
    #[clap(long)]
    no_pause: bool,

    /// Print the commands instead of running them
    #[clap(long)]
    dry_run: bool,

    /// Stop at the first failed command
    #[clap(long)]
    abort_on_failure: bool,

    /// Capture command output instead of streaming it (shown in the report on failure)
    #[clap(long)]
    capture: bool,

    /// Write a TOML run report to this path
    #[clap(long)]
    report: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[clap(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let default_filter = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

/// Expand a leading `~` to the home directory
fn expand_path(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned())
}

fn resolve(cli: &Cli, cwd: &Path) -> Result<(PathBuf, BootstrapConfig)> {
    let explicit_root = cli.root.as_deref().map(expand_path);

    match cli.config.as_deref().map(expand_path) {
        Some(config_path) => {
            let config = BootstrapConfig::from_file(&config_path)
                .with_context(|| format!("Failed to load config {}", config_path.display()))?;
            let root = explicit_root
                .unwrap_or_else(|| locate_root(cwd, &config.windows.recipe));
            Ok((root, config))
        }
        None => {
            let root = explicit_root
                .unwrap_or_else(|| locate_root(cwd, &WindowsConfig::default().recipe));
            let config = BootstrapConfig::load(None, &root).context("Failed to load config")?;
            Ok((root, config))
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let cwd = std::env::current_dir().context("Failed to determine current directory")?;
    let (root, mut config) = resolve(&cli, &cwd)?;

    if cli.abort_on_failure {
        config.run.on_failure = FailurePolicy::Abort;
    }
    if cli.capture {
        config.run.capture_output = true;
    }

    let runner: Box<dyn CommandRunner> = if cli.dry_run {
        Box::new(DryRunRunner)
    } else {
        Box::new(ShellRunner::new(config.run.capture_output))
    };
    let prompter = TerminalPrompter::stdio()
        .assume_yes(cli.yes)
        .pause(!cli.no_pause);

    let platform = cli.platform.unwrap_or_else(Platform::detect);
    let report = Orchestrator::new(prompter, runner, config, root)
        .run(platform)
        .context("Bootstrap aborted")?;

    if let Some(path) = &cli.report {
        let written = write_report(&report, path).context("Failed to write run report")?;
        println!("📄 Report written to: {}", written.display());
    }

    Ok(())
}
