//! Fixed command sequences for each platform branch

use crate::command::Invocation;
use crate::config::{BootstrapConfig, BuildConfiguration, WindowsConfig};
use std::path::Path;

/// Labelled invocation, as executed and reported by the orchestrator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub label: String,
    pub invocation: Invocation,
}

/// `conan install` for one build configuration
pub fn dependency_install(
    windows: &WindowsConfig,
    configuration: BuildConfiguration,
    root: &Path,
) -> Step {
    // Joined with '/' on every host
    let install_dir = format!(
        "{}/{}",
        windows.install_dir.to_string_lossy().trim_end_matches(['/', '\\']),
        configuration
    );

    let invocation = Invocation::new(&windows.dependency_manager)
        .args(["install", "-if"])
        .arg(install_dir)
        .arg("-s")
        .arg(format!("build_type={configuration}"))
        .arg("-s")
        .arg(format!("compiler={}", windows.compiler))
        .arg("-s")
        .arg(format!("compiler.runtime={}", configuration.runtime()))
        .arg(format!("--build={}", windows.build))
        .arg(&windows.recipe)
        .current_dir(root);

    Step {
        label: format!("dependencies ({configuration})"),
        invocation,
    }
}

/// One install step per configured build configuration, in order
pub fn windows_dependency_steps(config: &BootstrapConfig, root: &Path) -> Vec<Step> {
    config
        .windows
        .configurations
        .iter()
        .map(|configuration| dependency_install(&config.windows, *configuration, root))
        .collect()
}

/// Solution generation, e.g. `premake5 vs2019`, run inside the recipe directory where
/// `premake5.lua` lives
pub fn solution_generation(config: &BootstrapConfig, root: &Path) -> Step {
    let windows = &config.windows;
    Step {
        label: "solution".to_string(),
        invocation: Invocation::new(&windows.generator)
            .arg(&windows.generator_target)
            .current_dir(root.join(&windows.recipe)),
    }
}

/// Package-manager calls for Linux
pub fn linux_package_steps(config: &BootstrapConfig, root: &Path) -> Vec<Step> {
    config
        .linux
        .install
        .iter()
        .filter_map(|group| {
            let (program, rest) = group.command.split_first()?;
            Some(Step {
                label: format!("packages ({})", group.command.join(" ")),
                invocation: Invocation::new(program)
                    .args(rest.iter().cloned())
                    .args(group.packages.iter().cloned())
                    .current_dir(root),
            })
        })
        .collect()
}
