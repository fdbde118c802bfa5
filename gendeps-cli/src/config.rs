//! Bootstrap configuration
//!
//! Built-in defaults describe the project's toolchain. An optional `gendeps.toml` in the
//! repository root (or a file given with `--config`) overrides any subset of them.

use crate::error::{InvalidConfigSnafu, ParseConfigSnafu, ReadConfigSnafu, Result};
use serde::Deserialize;
use snafu::{ResultExt, ensure};
use std::fmt;
use std::path::{Path, PathBuf};

/// File looked up in the repository root when no explicit config is given
pub const CONFIG_FILE_NAME: &str = "gendeps.toml";

/// Files that mark the recipe directory of a repository root
const RECIPE_MARKERS: [&str; 2] = ["conanfile.txt", "conanfile.py"];

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct BootstrapConfig {
    pub windows: WindowsConfig,
    pub linux: LinuxConfig,
    pub run: RunConfig,
}

/// Dependency manager and solution generator settings for Windows
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct WindowsConfig {
    pub dependency_manager: String,
    /// Per-configuration install folders are created below this, relative to the root
    pub install_dir: PathBuf,
    pub compiler: String,
    /// Value of `--build=`; `*` rebuilds every package from source
    pub build: String,
    /// Directory holding the dependency recipe, relative to the root
    pub recipe: String,
    pub configurations: Vec<BuildConfiguration>,
    pub generator: String,
    pub generator_target: String,
}

impl Default for WindowsConfig {
    fn default() -> Self {
        Self {
            dependency_manager: "conan".to_string(),
            install_dir: PathBuf::from("build/deps"),
            compiler: "Visual Studio".to_string(),
            build: "*".to_string(),
            recipe: "tools".to_string(),
            configurations: BuildConfiguration::ALL.to_vec(),
            generator: "premake5".to_string(),
            generator_target: "vs2019".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct LinuxConfig {
    pub install: Vec<PackageGroup>,
}

impl Default for LinuxConfig {
    fn default() -> Self {
        Self {
            install: vec![
                PackageGroup::new(
                    ["sudo", "apt", "install"],
                    [
                        "build-essential",
                        "libglew-dev",
                        "libglfw3",
                        "libglfw3-dev",
                        "freeglut3",
                        "freeglut3-dev",
                    ],
                ),
                PackageGroup::new(["sudo", "apt-get", "install"], ["libopenal-dev"]),
            ],
        }
    }
}

/// One package-manager call: `command...` followed by the package names
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PackageGroup {
    pub command: Vec<String>,
    #[serde(default)]
    pub packages: Vec<String>,
}

impl PackageGroup {
    pub fn new<C, P>(command: C, packages: P) -> Self
    where
        C: IntoIterator,
        C::Item: Into<String>,
        P: IntoIterator,
        P::Item: Into<String>,
    {
        Self {
            command: command.into_iter().map(Into::into).collect(),
            packages: packages.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    pub on_failure: FailurePolicy,
    pub capture_output: bool,
}

/// What to do when an external command fails or cannot be started
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Record the failure and carry on with the next step
    #[default]
    Continue,
    /// Stop at the first failure
    Abort,
}

/// Named build profile; decides the MSVC runtime the dependencies link against
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Hash)]
pub enum BuildConfiguration {
    Release,
    RelWithDebInfo,
    Debug,
}

impl BuildConfiguration {
    pub const ALL: [BuildConfiguration; 3] = [
        BuildConfiguration::Release,
        BuildConfiguration::RelWithDebInfo,
        BuildConfiguration::Debug,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BuildConfiguration::Release => "Release",
            BuildConfiguration::RelWithDebInfo => "RelWithDebInfo",
            BuildConfiguration::Debug => "Debug",
        }
    }

    /// Compiler runtime: debug CRT only for Debug builds
    pub fn runtime(&self) -> &'static str {
        match self {
            BuildConfiguration::Debug => "MDd",
            BuildConfiguration::Release | BuildConfiguration::RelWithDebInfo => "MD",
        }
    }
}

impl fmt::Display for BuildConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl BootstrapConfig {
    /// Parse and validate a TOML document
    pub fn from_toml(content: &str, origin: &Path) -> Result<Self> {
        let config: BootstrapConfig =
            toml::from_str(content).context(ParseConfigSnafu { path: origin })?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).context(ReadConfigSnafu { path })?;
        Self::from_toml(&content, path)
    }

    /// Explicit path first, then `<root>/gendeps.toml`, then built-in defaults
    pub fn load(explicit: Option<&Path>, root: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let candidate = root.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            Self::from_file(&candidate)
        } else {
            Ok(Self::default())
        }
    }

    fn validate(&self) -> Result<()> {
        for (index, group) in self.linux.install.iter().enumerate() {
            ensure!(
                !group.command.is_empty(),
                InvalidConfigSnafu {
                    message: format!("linux.install[{index}].command must not be empty"),
                }
            );
        }

        let windows = &self.windows;
        for (field, value) in [
            ("windows.dependency_manager", &windows.dependency_manager),
            ("windows.generator", &windows.generator),
        ] {
            ensure!(
                !value.trim().is_empty(),
                InvalidConfigSnafu {
                    message: format!("{field} must not be empty"),
                }
            );
        }

        Ok(())
    }
}

/// Nearest ancestor of `start` holding `<recipe>/conanfile.{txt,py}`, else `start`
pub fn locate_root(start: &Path, recipe: &str) -> PathBuf {
    start
        .ancestors()
        .find(|dir| {
            RECIPE_MARKERS
                .iter()
                .any(|marker| dir.join(recipe).join(marker).is_file())
        })
        .unwrap_or(start)
        .to_path_buf()
}
