//! Input adapters: SBOM JSON documents to audit records.
//!
//! These adapters fill the parser-collaborator role for the CLI. They are
//! deliberately thin: CycloneDX JSON and SPDX JSON only, extracting exactly
//! the record shapes the auditors consume. Schema-complete SBOM parsing is
//! out of scope.

mod cyclonedx;
mod spdx;

pub use cyclonedx::parse_cyclonedx;
pub use spdx::parse_spdx;

use crate::error::{AuditError, ParseErrorKind, Result};
use crate::model::{SbomContents, SbomKind};
use std::path::Path;

/// Detect the SBOM format from content markers.
pub fn detect_format(content: &str) -> Option<SbomKind> {
    let json: serde_json::Value = serde_json::from_str(content).ok()?;
    if json.get("bomFormat").and_then(|f| f.as_str()) == Some("CycloneDX") {
        return Some(SbomKind::CycloneDx);
    }
    if json.get("spdxVersion").is_some() {
        return Some(SbomKind::Spdx);
    }
    None
}

/// Read and parse an SBOM file, auto-detecting the format.
pub fn parse_sbom(path: &Path) -> Result<SbomContents> {
    let content = std::fs::read_to_string(path).map_err(|e| AuditError::io(path, e))?;
    parse_sbom_str(&content).map_err(|err| match err {
        AuditError::Parse { source, .. } => {
            AuditError::parse(format!("at {}", path.display()), source)
        }
        other => other,
    })
}

/// Parse SBOM content, auto-detecting the format.
pub fn parse_sbom_str(content: &str) -> Result<SbomContents> {
    match detect_format(content) {
        Some(SbomKind::CycloneDx) => parse_cyclonedx(content),
        Some(SbomKind::Spdx) => parse_spdx(content),
        None => Err(AuditError::parse("input", ParseErrorKind::UnknownFormat)),
    }
}
