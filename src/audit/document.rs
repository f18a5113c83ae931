//! Document-level metadata checks.

use crate::audit::recorder::CheckRecorder;
use crate::model::{SbomDocument, SbomKind};

/// Format versions considered current for each SBOM kind.
const SPDX_VERSIONS: &[&str] = &["SPDX-2.2", "SPDX-2.3"];
const CYCLONEDX_VERSIONS: &[&str] = &["1.3", "1.4", "1.5"];

/// Document facts threaded into the final verdict.
#[derive(Debug, Clone, Copy)]
pub struct DocumentFindings {
    pub format_known: bool,
    pub creator_identified: bool,
    pub creation_time_valid: bool,
}

/// Validate SBOM-format-level metadata.
///
/// An undetermined format records a single hard failure and forces every
/// downstream document boolean to false.
pub fn audit_document(document: &SbomDocument, recorder: &mut CheckRecorder<'_>) -> DocumentFindings {
    recorder.heading("SBOM Format Summary");
    let failures_before = recorder.failures();

    let findings = match document.kind {
        None => {
            recorder.check_detail("SBOM Format", false, "INVALID");
            DocumentFindings {
                format_known: false,
                creator_identified: false,
                creation_time_valid: false,
            }
        }
        Some(kind) => {
            let (label, accepted) = match kind {
                SbomKind::Spdx => ("Up to date SPDX Version", SPDX_VERSIONS),
                SbomKind::CycloneDx => ("Up to date CycloneDX Version", CYCLONEDX_VERSIONS),
            };
            recorder.check_detail(
                label,
                accepted.contains(&document.version.as_str()),
                document.version.clone(),
            );

            let creator_identified = !document.creators.is_empty();
            let creation_time_valid = document.created.is_some();
            recorder.check("SBOM Creator identified", creator_identified);
            recorder.check("SBOM Creation time defined", creation_time_valid);

            DocumentFindings {
                format_known: true,
                creator_identified,
                creation_time_valid,
            }
        }
    };

    recorder.section_metadata();
    recorder.confirm_section("SBOM Format", failures_before);
    findings
}
