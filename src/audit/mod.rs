//! The audit engine.
//!
//! Auditors run sequentially in a fixed section order (document, files,
//! packages, relationships, aggregate). All audit state lives in a
//! [`CheckRecorder`] created at the start of [`SbomAuditor::audit`] and
//! returned inside the [`AuditOutcome`], so repeated audits never share
//! mutable state.

mod document;
mod files;
mod packages;
mod recorder;
mod relationships;

pub use document::{audit_document, DocumentFindings};
pub use files::audit_files;
pub use packages::audit_packages;
pub use recorder::{
    AuditReport, CheckCounts, CheckEntry, CheckObserver, CheckRecorder, CheckState, CheckTier,
    SubjectReport,
};
pub use relationships::audit_relationships;

use crate::model::{LicenseClassifier, SbomContents, SpdxLicenses};
use crate::policy::PolicyStore;
use crate::registry::MetadataLookup;
use chrono::Utc;
use serde::Serialize;

/// Switches controlling which checks run.
#[derive(Debug, Clone)]
pub struct AuditOptions {
    /// Show and store passing outcomes, not only failures
    pub verbose: bool,
    /// Hard switch: skip every registry lookup
    pub offline: bool,
    /// Require a CPE identifier on each package
    pub cpe_check: bool,
    /// Require a PURL on each package
    pub purl_check: bool,
    /// Run the SPDX license-quality checks
    pub license_check: bool,
}

impl Default for AuditOptions {
    fn default() -> Self {
        Self {
            verbose: false,
            offline: false,
            cpe_check: false,
            purl_check: false,
            license_check: true,
        }
    }
}

/// Result of one audit run.
#[derive(Debug, Clone, Serialize)]
pub struct AuditOutcome {
    /// The NTIA minimum-elements verdict
    pub compliant: bool,
    /// Ordinary-tier tallies
    pub checks: CheckCounts,
    /// Policy-tier tallies
    pub policy_checks: CheckCounts,
    /// The structured report tree
    pub report: AuditReport,
}

/// Audits parsed SBOM records against the rule set and loaded policy.
pub struct SbomAuditor {
    options: AuditOptions,
    policy: PolicyStore,
    classifier: Box<dyn LicenseClassifier>,
    lookup: Option<Box<dyn MetadataLookup>>,
    observer: Option<Box<dyn CheckObserver>>,
}

impl SbomAuditor {
    pub fn new(options: AuditOptions, policy: PolicyStore) -> Self {
        Self {
            options,
            policy,
            classifier: Box::new(SpdxLicenses::new()),
            lookup: None,
            observer: None,
        }
    }

    /// Attach a registry lookup. Without one (or with `offline` set) every
    /// freshness check is omitted.
    #[must_use]
    pub fn with_lookup(mut self, lookup: Box<dyn MetadataLookup>) -> Self {
        self.lookup = Some(lookup);
        self
    }

    /// Attach a console/report observer for human-facing output.
    #[must_use]
    pub fn with_observer(mut self, observer: Box<dyn CheckObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Replace the license classifier (defaults to the SPDX license list).
    #[must_use]
    pub fn with_classifier(mut self, classifier: Box<dyn LicenseClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    /// Run the full audit over one set of SBOM records.
    pub fn audit(&mut self, sbom: &SbomContents) -> AuditOutcome {
        let now = Utc::now();
        let mut recorder = CheckRecorder::new(self.options.verbose);
        if let Some(observer) = self.observer.as_deref_mut() {
            recorder = recorder.with_observer(observer);
        }
        let lookup = if self.options.offline {
            None
        } else {
            self.lookup.as_deref_mut()
        };

        let doc = audit_document(&sbom.document, &mut recorder);

        // Empty sections default to valid: nothing to find fault with.
        let files_valid = if sbom.files.is_empty() {
            true
        } else {
            audit_files(
                &sbom.files,
                &self.policy,
                &*self.classifier,
                &self.options,
                &mut recorder,
            )
        };

        let packages_valid = if sbom.packages.is_empty() {
            true
        } else {
            audit_packages(
                &sbom.packages,
                &self.policy,
                &*self.classifier,
                lookup,
                &self.options,
                now,
                &mut recorder,
            )
        };

        let relationships_valid = audit_relationships(
            &sbom.relationships,
            &sbom.files,
            &sbom.packages,
            doc.format_known,
            &mut recorder,
        );

        recorder.heading("NTIA Summary");
        let failures_before = recorder.failures();
        let compliant = files_valid
            && packages_valid
            && doc.creator_identified
            && doc.creation_time_valid
            && relationships_valid;
        recorder.summary_check_detail("NTIA conformant", compliant, "FAILED");
        recorder.confirm_section("NTIA Summary", failures_before);

        recorder.heading("SBOM Audit Summary");
        let checks = recorder.counts().clone();
        let policy_checks = recorder.policy_counts().clone();
        recorder.summary_note(format!("Checks passed {}", checks.passed));
        recorder.summary_note(format!("Checks failed {}", checks.failed));
        recorder.summary_note(format!("Policy checks passed {}", policy_checks.passed));
        recorder.summary_note(format!("Policy checks failed {}", policy_checks.failed));

        AuditOutcome {
            compliant,
            checks,
            policy_checks,
            report: recorder.into_report(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Assertion, PackageRecord, Relationship, SbomDocument, SbomKind};
    use chrono::Utc;

    fn document() -> SbomDocument {
        SbomDocument {
            kind: Some(SbomKind::Spdx),
            version: "SPDX-2.3".to_string(),
            creators: vec!["Tool: example".to_string()],
            created: Some(Utc::now()),
        }
    }

    fn package(name: &str) -> PackageRecord {
        PackageRecord {
            id: Some(format!("SPDXRef-{name}")),
            name: Some(name.to_string()),
            version: Some("1.0".to_string()),
            supplier: Assertion::Value("ACME".to_string()),
            license: Assertion::Value("MIT".to_string()),
            external_refs: Vec::new(),
        }
    }

    #[test]
    fn test_empty_sections_default_to_valid() {
        let sbom = SbomContents {
            document: document(),
            relationships: vec![Relationship::new("a", "b", "DEPENDS_ON")],
            ..Default::default()
        };
        let mut auditor = SbomAuditor::new(AuditOptions::default(), PolicyStore::new());
        let outcome = auditor.audit(&sbom);
        assert!(outcome.compliant);
    }

    #[test]
    fn test_missing_relationships_fail_verdict() {
        let sbom = SbomContents {
            document: document(),
            packages: vec![package("foo")],
            ..Default::default()
        };
        let mut auditor = SbomAuditor::new(AuditOptions::default(), PolicyStore::new());
        let outcome = auditor.audit(&sbom);
        assert!(!outcome.compliant);
        assert!(outcome.checks.failed >= 1);
    }

    #[test]
    fn test_repeated_audits_do_not_share_state() {
        let sbom = SbomContents {
            document: document(),
            packages: vec![package("foo")],
            relationships: vec![Relationship::new("foo", "bar", "DEPENDS_ON")],
            ..Default::default()
        };
        let mut auditor = SbomAuditor::new(AuditOptions::default(), PolicyStore::new());
        let first = auditor.audit(&sbom);
        let second = auditor.audit(&sbom);
        assert_eq!(first.checks, second.checks);
        assert_eq!(first.policy_checks, second.policy_checks);
    }

    #[test]
    fn test_summary_carries_verdict_and_tally() {
        let sbom = SbomContents {
            document: document(),
            relationships: vec![Relationship::new("a", "b", "DEPENDS_ON")],
            ..Default::default()
        };
        let mut auditor = SbomAuditor::new(AuditOptions::default(), PolicyStore::new());
        let outcome = auditor.audit(&sbom);
        let texts: Vec<&str> = outcome.report.summary.iter().map(|e| e.text.as_str()).collect();
        // Verdict passed and is suppressed in non-verbose mode; the tally
        // always appears.
        assert!(texts.contains(&"Checks passed 4"));
        assert!(texts.contains(&"Checks failed 0"));
        assert!(texts.contains(&"Policy checks passed 0"));
        assert!(texts.contains(&"Policy checks failed 0"));
    }
}
