//! Output handling: console rendering and machine-readable report output.

mod console;

pub use console::ConsoleObserver;

use crate::audit::AuditOutcome;
use crate::error::{AuditError, Result};
use serde_json::json;
use std::path::{Path, PathBuf};

/// Target for output - either stdout or a file
#[derive(Debug, Clone)]
pub enum OutputTarget {
    /// Write to stdout
    Stdout,
    /// Write to a file
    File(PathBuf),
}

impl OutputTarget {
    /// Create output target from optional path
    pub fn from_option(path: Option<PathBuf>) -> Self {
        match path {
            Some(p) => OutputTarget::File(p),
            None => OutputTarget::Stdout,
        }
    }
}

/// Determine if color should be used based on flags and environment
pub fn should_use_color(no_color_flag: bool) -> bool {
    !no_color_flag && std::env::var("NO_COLOR").is_err()
}

/// Write output to the target (stdout or file)
pub fn write_output(content: &str, target: &OutputTarget) -> Result<()> {
    match target {
        OutputTarget::Stdout => {
            println!("{content}");
            Ok(())
        }
        OutputTarget::File(path) => {
            std::fs::write(path, content).map_err(|e| AuditError::io(path.clone(), e))?;
            tracing::info!(path = %path.display(), "audit report written");
            Ok(())
        }
    }
}

/// Serialize an audit outcome as the machine-readable report document.
pub fn render_json(outcome: &AuditOutcome, source: &Path) -> Result<String> {
    let output = json!({
        "tool": "sbom-audit",
        "version": env!("CARGO_PKG_VERSION"),
        "sbom": source.file_name().unwrap_or_default().to_string_lossy(),
        "compliant": outcome.compliant,
        "checks": outcome.checks,
        "policy_checks": outcome.policy_checks,
        "report": outcome.report,
    });
    serde_json::to_string_pretty(&output).map_err(|e| AuditError::Report(e.to_string()))
}
