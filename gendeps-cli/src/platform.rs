// Host platform detection
// Decides which bootstrap branch applies; detected once and passed down explicitly

use serde::Serialize;
use std::fmt;

/// Operating system family the bootstrap knows how to handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Windows,
    Linux,
    Other,
}

impl Platform {
    /// Detect the platform of the running process
    pub fn detect() -> Self {
        Self::from_os_name(std::env::consts::OS)
    }

    /// Map an OS name as reported by `std::env::consts::OS`
    pub fn from_os_name(os: &str) -> Self {
        match os {
            "windows" => Platform::Windows,
            "linux" => Platform::Linux,
            _ => Platform::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Windows => "windows",
            Platform::Linux => "linux",
            Platform::Other => "other",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
