//! Package ecosystem classification from PURL types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Ecosystem/package manager type extracted from a package-manager locator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ecosystem {
    Npm,
    PyPi,
    Cargo,
    Maven,
    Golang,
    Nuget,
    RubyGems,
    Unknown(String),
}

impl Ecosystem {
    /// Parse ecosystem from PURL type
    pub fn from_purl_type(purl_type: &str) -> Self {
        match purl_type.to_lowercase().as_str() {
            "npm" => Self::Npm,
            "pypi" => Self::PyPi,
            "cargo" => Self::Cargo,
            "maven" => Self::Maven,
            "golang" | "go" => Self::Golang,
            "nuget" => Self::Nuget,
            "gem" => Self::RubyGems,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Whether a public registry lookup is available for this ecosystem.
    pub fn has_registry(&self) -> bool {
        matches!(self, Self::Npm | Self::PyPi | Self::Cargo)
    }
}

impl fmt::Display for Ecosystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Npm => write!(f, "npm"),
            Self::PyPi => write!(f, "pypi"),
            Self::Cargo => write!(f, "cargo"),
            Self::Maven => write!(f, "maven"),
            Self::Golang => write!(f, "golang"),
            Self::Nuget => write!(f, "nuget"),
            Self::RubyGems => write!(f, "gem"),
            Self::Unknown(s) => write!(f, "{s}"),
        }
    }
}
