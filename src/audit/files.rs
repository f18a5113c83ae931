//! Per-file record checks.

use crate::audit::recorder::CheckRecorder;
use crate::audit::AuditOptions;
use crate::model::{FileRecord, LicenseClassifier};
use crate::policy::{categories, PolicyStore};

/// Validate every file record in declaration order.
///
/// Returns the file-set NTIA validity: false as soon as any file lacks an
/// identifier or a name.
pub fn audit_files(
    files: &[FileRecord],
    policy: &PolicyStore,
    classifier: &dyn LicenseClassifier,
    options: &AuditOptions,
    recorder: &mut CheckRecorder<'_>,
) -> bool {
    recorder.heading("File Summary");
    let failures_before = recorder.failures();

    let allow_licenses = policy.allowed(categories::LICENSE);
    let deny_licenses = policy.denied(categories::LICENSE);
    let mut files_valid = true;

    for file in files {
        if file.id.is_none() {
            recorder.check("File id missing", false);
        } else {
            // Checks are keyed by name when present, identifier otherwise.
            let key = file.subject().unwrap_or("UNKNOWN").to_string();
            recorder.check(format!("File name specified - {key}"), file.name.is_some());

            if file.file_types.is_empty() {
                recorder.check(format!("File type identified - {key}"), false);
            } else {
                recorder.check(
                    format!("File type identified - {key} : {}", file.file_types.join(", ")),
                    true,
                );
            }

            recorder.check_quiet(
                format!("Licence specified - {key} : {}", file.license),
                file.license.is_known(),
            );

            if options.license_check {
                if let Some(expr) = file.license.value() {
                    recorder.check_detail(
                        format!("SPDX Compatible License id included for {key}"),
                        classifier.normalize(expr).is_some(),
                        expr,
                    );
                    recorder.check_detail(
                        format!("OSI Approved License for {key}"),
                        classifier.is_osi_approved(expr),
                        expr,
                    );
                    recorder.check_detail(
                        format!("Non-deprecated License for {key}"),
                        !classifier.is_deprecated(expr),
                        expr,
                    );
                }
            }

            if let Some(allowed) = allow_licenses {
                let passed = file.license.value().is_some_and(|l| allowed.contains(l));
                recorder.policy_check_detail(
                    format!("Allowed License check for {key}"),
                    passed,
                    format!("{} not allowed", file.license),
                );
            }
            if let Some(denied) = deny_licenses {
                let passed = !file.license.value().is_some_and(|l| denied.contains(l));
                recorder.policy_check_detail(
                    format!("Denied License check for {key}"),
                    passed,
                    format!("{} not allowed", file.license),
                );
            }

            recorder.check_quiet(
                format!("Copyright defined - {key} : {}", file.copyright),
                file.copyright.is_known(),
            );
        }

        if file.id.is_none() || file.name.is_none() {
            files_valid = false;
        }

        let label = file.subject().unwrap_or("UNKNOWN").to_string();
        recorder.section_file(label, file.id.clone());
    }

    recorder.summary_check_detail("Files NTIA compliant", files_valid, "FAILED");
    recorder.confirm_section("File Summary", failures_before);
    files_valid
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Assertion, SpdxLicenses};

    fn complete_file() -> FileRecord {
        FileRecord {
            id: Some("SPDXRef-File-1".into()),
            name: Some("src/main.c".into()),
            file_types: vec!["SOURCE".into()],
            license: Assertion::Value("MIT".into()),
            copyright: Assertion::Value("Copyright ACME".into()),
        }
    }

    fn run(files: &[FileRecord], options: &AuditOptions) -> (bool, CheckRecorder<'static>) {
        let policy = PolicyStore::new();
        let classifier = SpdxLicenses::new();
        let mut recorder = CheckRecorder::new(false);
        let valid = audit_files(files, &policy, &classifier, options, &mut recorder);
        (valid, recorder)
    }

    #[test]
    fn test_complete_file_is_valid() {
        let (valid, rec) = run(&[complete_file()], &AuditOptions::default());
        assert!(valid);
        assert_eq!(rec.counts().failed, 0);
        // name, type, license, trio, copyright, set-level
        assert_eq!(rec.counts().passed, 8);
    }

    #[test]
    fn test_missing_id_records_single_failure() {
        let file = FileRecord {
            id: None,
            name: Some("orphan.c".into()),
            ..Default::default()
        };
        let (valid, rec) = run(&[file], &AuditOptions::default());
        assert!(!valid);
        // "File id missing" plus the failed set-level check
        assert_eq!(rec.counts().failed, 2);
    }

    #[test]
    fn test_missing_name_keys_checks_by_id() {
        let file = FileRecord {
            id: Some("SPDXRef-File-9".into()),
            name: None,
            ..Default::default()
        };
        let (valid, rec) = run(&[file], &AuditOptions::default());
        assert!(!valid);
        let report = rec.into_report();
        assert_eq!(report.files.len(), 1);
        assert_eq!(report.files[0].name, "SPDXRef-File-9");
        assert!(report.files[0]
            .reports
            .iter()
            .any(|e| e.text.contains("File name specified - SPDXRef-File-9")));
    }

    #[test]
    fn test_noassertion_license_fails_presence_quietly() {
        let file = FileRecord {
            license: Assertion::NoAssertion,
            ..complete_file()
        };
        let (_, rec) = run(&[file], &AuditOptions::default());
        let report = rec.into_report();
        let entry = report.files[0]
            .reports
            .iter()
            .find(|e| e.text.starts_with("Licence specified"))
            .expect("license entry");
        // Quiet failure: no MISSING suffix, the sentinel is in the subject
        assert_eq!(entry.text, "Licence specified - src/main.c : NOASSERTION");
    }

    #[test]
    fn test_license_quality_trio_skipped_when_disabled() {
        let options = AuditOptions {
            license_check: false,
            ..AuditOptions::default()
        };
        let (_, rec) = run(&[complete_file()], &options);
        assert_eq!(rec.counts().passed, 5);
    }

    #[test]
    fn test_license_quality_trio_skipped_without_value() {
        let file = FileRecord {
            license: Assertion::Missing,
            ..complete_file()
        };
        let (_, rec) = run(&[file], &AuditOptions::default());
        // license-presence fails, trio is suppressed rather than failed
        assert_eq!(rec.counts().failed, 1);
        assert_eq!(rec.counts().passed, 4);
    }

    #[test]
    fn test_allow_and_deny_are_policy_tier() {
        let mut policy = PolicyStore::new();
        let dir = tempfile::tempdir().expect("tempdir");
        let allow_path = dir.path().join("allow.txt");
        let deny_path = dir.path().join("deny.txt");
        std::fs::write(&allow_path, "[license]\nApache-2.0\n").expect("write allow");
        std::fs::write(&deny_path, "[license]\nMIT\n").expect("write deny");
        policy.load(&allow_path, true);
        policy.load(&deny_path, false);

        let classifier = SpdxLicenses::new();
        let mut recorder = CheckRecorder::new(false);
        audit_files(
            &[complete_file()],
            &policy,
            &classifier,
            &AuditOptions::default(),
            &mut recorder,
        );

        // MIT: not in allow list (fail), in deny list (fail)
        assert_eq!(recorder.policy_counts().failed, 2);
        assert_eq!(recorder.policy_counts().passed, 0);
        // Ordinary license-presence still passes: the tiers are orthogonal
        assert_eq!(recorder.counts().failed, 0);

        let report = recorder.into_report();
        assert_eq!(report.policy.len(), 2);
        assert!(report.policy[0].text.contains("MIT not allowed"));
    }
}
