//! End-to-end tests: SBOM document in, verdict and report out.

use sbom_audit::reports::{render_json, OutputTarget};
use sbom_audit::{
    exit_codes, parse_sbom, parse_sbom_str, reports, AuditOptions, PolicyStore, SbomAuditor,
    SbomKind,
};
use std::io::Write as _;
use std::path::Path;

const SPDX_COMPLIANT: &str = r#"{
    "spdxVersion": "SPDX-2.3",
    "SPDXID": "SPDXRef-DOCUMENT",
    "name": "example",
    "creationInfo": {
        "created": "2024-03-01T12:00:00Z",
        "creators": ["Tool: example-tool"]
    },
    "packages": [
        {
            "SPDXID": "SPDXRef-Package-app",
            "name": "app",
            "versionInfo": "1.0.0",
            "supplier": "Organization: ACME",
            "licenseConcluded": "MIT"
        },
        {
            "SPDXID": "SPDXRef-Package-lodash",
            "name": "lodash",
            "versionInfo": "4.17.21",
            "supplier": "Organization: Lodash Team",
            "licenseConcluded": "MIT"
        }
    ],
    "relationships": [
        {
            "spdxElementId": "SPDXRef-Package-app",
            "relatedSpdxElement": "SPDXRef-Package-lodash",
            "relationshipType": "DEPENDS_ON"
        }
    ]
}"#;

const CDX_INCOMPLETE: &str = r#"{
    "bomFormat": "CycloneDX",
    "specVersion": "1.4",
    "metadata": {
        "timestamp": "2024-03-01T12:00:00Z",
        "tools": [{"name": "cdx-tool"}]
    },
    "components": [
        {
            "bom-ref": "pkg-left-pad",
            "type": "library",
            "name": "left-pad",
            "purl": "pkg:npm/left-pad@1.3.0"
        }
    ]
}"#;

fn offline_options() -> AuditOptions {
    AuditOptions {
        offline: true,
        ..AuditOptions::default()
    }
}

#[test]
fn test_compliant_spdx_document() {
    let sbom = parse_sbom_str(SPDX_COMPLIANT).expect("parse");
    assert_eq!(sbom.document.kind, Some(SbomKind::Spdx));

    let mut auditor = SbomAuditor::new(offline_options(), PolicyStore::new());
    let outcome = auditor.audit(&sbom);
    assert!(outcome.compliant);
    assert_eq!(outcome.checks.failed, 0);
}

#[test]
fn test_incomplete_cyclonedx_document() {
    let sbom = parse_sbom_str(CDX_INCOMPLETE).expect("parse");
    assert_eq!(sbom.document.kind, Some(SbomKind::CycloneDx));

    let mut auditor = SbomAuditor::new(offline_options(), PolicyStore::new());
    let outcome = auditor.audit(&sbom);
    // left-pad has no version, supplier, or license, and there are no
    // dependency relationships
    assert!(!outcome.compliant);
    assert!(outcome.checks.failed >= 4);
}

#[test]
fn test_parse_from_file_and_report_roundtrip() {
    let dir = tempfile::tempdir().expect("tempdir");
    let sbom_path = dir.path().join("example.spdx.json");
    std::fs::write(&sbom_path, SPDX_COMPLIANT).expect("write sbom");

    let sbom = parse_sbom(&sbom_path).expect("parse from file");
    let mut auditor = SbomAuditor::new(offline_options(), PolicyStore::new());
    let outcome = auditor.audit(&sbom);

    let rendered = render_json(&outcome, &sbom_path).expect("render");
    let report_path = dir.path().join("audit.json");
    reports::write_output(&rendered, &OutputTarget::File(report_path.clone())).expect("write");

    let parsed: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(report_path).expect("read back"))
            .expect("valid json");
    assert_eq!(parsed["tool"], "sbom-audit");
    assert_eq!(parsed["compliant"], true);
    assert_eq!(parsed["sbom"], "example.spdx.json");
    assert!(parsed["report"]["summary"]
        .as_array()
        .expect("summary array")
        .iter()
        .any(|e| e["text"].as_str().is_some_and(|t| t.starts_with("Checks passed"))));
}

#[test]
fn test_missing_input_yields_no_report() {
    let err = parse_sbom(Path::new("/no/such/sbom.json")).expect_err("must fail");
    assert!(err.to_string().contains("IO error"));
}

#[test]
fn test_policy_file_drives_package_denial() {
    let dir = tempfile::tempdir().expect("tempdir");
    let deny_path = dir.path().join("deny.txt");
    let mut deny_file = std::fs::File::create(&deny_path).expect("create deny list");
    writeln!(deny_file, "# banned packages").expect("write");
    writeln!(deny_file, "[package]").expect("write");
    writeln!(deny_file, "lodash").expect("write");

    let mut policy = PolicyStore::new();
    policy.load(&deny_path, false);

    let sbom = parse_sbom_str(SPDX_COMPLIANT).expect("parse");
    let mut auditor = SbomAuditor::new(offline_options(), policy);
    let outcome = auditor.audit(&sbom);

    // lodash is denied; app is not
    assert_eq!(outcome.policy_checks.failed, 1);
    assert_eq!(outcome.policy_checks.passed, 1);
    assert!(outcome
        .report
        .policy
        .iter()
        .any(|e| e.text == "Denied Package check for package lodash: lodash not allowed"));
    // Policy failures do not affect the NTIA verdict
    assert!(outcome.compliant);
}

#[test]
fn test_verbose_report_contains_passes() {
    let sbom = parse_sbom_str(SPDX_COMPLIANT).expect("parse");
    let options = AuditOptions {
        verbose: true,
        offline: true,
        ..AuditOptions::default()
    };
    let mut auditor = SbomAuditor::new(options, PolicyStore::new());
    let outcome = auditor.audit(&sbom);

    assert!(!outcome.report.metadata.is_empty());
    assert_eq!(outcome.report.packages.len(), 2);
    assert!(outcome.report.packages.iter().all(|p| !p.reports.is_empty()));
}

#[test]
fn test_exit_code_convention() {
    // Compliant SBOMs map to success, per the documented convention
    let sbom = parse_sbom_str(SPDX_COMPLIANT).expect("parse");
    let mut auditor = SbomAuditor::new(offline_options(), PolicyStore::new());
    let outcome = auditor.audit(&sbom);
    let code = if outcome.compliant {
        exit_codes::COMPLIANT
    } else {
        exit_codes::NOT_COMPLIANT
    };
    assert_eq!(code, 0);
}
