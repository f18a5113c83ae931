//! Relationship coverage checks.

use crate::audit::recorder::CheckRecorder;
use crate::model::{FileRecord, PackageRecord, Relationship};

/// Validate that dependency relationships exist and that every named file
/// and package participates in at least one.
///
/// Subjects without a name cannot be matched against relationship
/// endpoints and are skipped. Returns the relationships-valid flag used by
/// the aggregator.
pub fn audit_relationships(
    relationships: &[Relationship],
    files: &[FileRecord],
    packages: &[PackageRecord],
    format_known: bool,
    recorder: &mut CheckRecorder<'_>,
) -> bool {
    recorder.heading("Relationships Summary");
    let failures_before = recorder.failures();

    let relationships_valid = format_known && !relationships.is_empty();
    recorder.check(
        "Dependency relationships provided for NTIA compliance",
        relationships_valid,
    );

    let file_names = files.iter().filter_map(|f| f.name.as_deref());
    let package_names = packages.iter().filter_map(|p| p.name.as_deref());
    for name in file_names.chain(package_names) {
        let related = relationships.iter().any(|r| r.involves(name));
        recorder.check_detail(format!("Relationship found for {name}"), related, "NOT FOUND");
    }

    recorder.section_relationships();
    recorder.confirm_section("Relationships Summary", failures_before);
    relationships_valid
}
