//! SPDX JSON adapter.

use crate::error::{AuditError, ParseErrorKind, Result};
use crate::model::{
    Assertion, ExternalRef, FileRecord, PackageRecord, Relationship, SbomContents, SbomDocument,
    SbomKind,
};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;

fn str_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(Value::as_str)
}

fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|d| d.with_timezone(&Utc))
}

/// Strip the SPDX actor prefix ("Organization: ", "Person: ") from a
/// supplier string, keeping the raw value when no prefix is present.
fn strip_actor_prefix(raw: &str) -> &str {
    for prefix in ["Organization:", "Person:", "Tool:"] {
        if let Some(rest) = raw.strip_prefix(prefix) {
            return rest.trim_start();
        }
    }
    raw
}

fn parse_supplier(raw: Option<&str>) -> Assertion {
    match raw.map(str::trim) {
        Some(s) if s.eq_ignore_ascii_case("NOASSERTION") => Assertion::NoAssertion,
        Some(s) => Assertion::from_raw(Some(strip_actor_prefix(s))),
        None => Assertion::Missing,
    }
}

fn parse_package(value: &Value) -> PackageRecord {
    let external_refs = value
        .get("externalRefs")
        .and_then(Value::as_array)
        .map(|refs| {
            refs.iter()
                .filter_map(|r| {
                    Some(ExternalRef::new(
                        str_field(r, "referenceCategory")?,
                        str_field(r, "referenceType")?,
                        str_field(r, "referenceLocator")?,
                    ))
                })
                .collect()
        })
        .unwrap_or_default();

    PackageRecord {
        id: str_field(value, "SPDXID").map(String::from),
        name: str_field(value, "name").map(String::from),
        version: str_field(value, "versionInfo").map(String::from),
        supplier: parse_supplier(str_field(value, "supplier")),
        license: Assertion::from_raw(str_field(value, "licenseConcluded")),
        external_refs,
    }
}

fn parse_file(value: &Value) -> FileRecord {
    FileRecord {
        id: str_field(value, "SPDXID").map(String::from),
        name: str_field(value, "fileName").map(String::from),
        file_types: value
            .get("fileTypes")
            .and_then(Value::as_array)
            .map(|types| {
                types
                    .iter()
                    .filter_map(Value::as_str)
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default(),
        license: Assertion::from_raw(str_field(value, "licenseConcluded")),
        copyright: Assertion::from_raw(str_field(value, "copyrightText")),
    }
}

/// Parse an SPDX JSON document into audit records.
///
/// Relationship endpoints are SPDXIDs in the document; they are resolved to
/// element names where possible so the relationship auditor can match them
/// against file and package names.
pub fn parse_spdx(content: &str) -> Result<SbomContents> {
    let json: Value = serde_json::from_str(content)
        .map_err(|e| AuditError::parse("SPDX document", ParseErrorKind::InvalidJson(e.to_string())))?;

    let creation_info = json.get("creationInfo");
    let document = SbomDocument {
        kind: Some(SbomKind::Spdx),
        version: str_field(&json, "spdxVersion").unwrap_or_default().to_string(),
        creators: creation_info
            .and_then(|c| c.get("creators"))
            .and_then(Value::as_array)
            .map(|creators| {
                creators
                    .iter()
                    .filter_map(Value::as_str)
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default(),
        created: parse_timestamp(creation_info.and_then(|c| str_field(c, "created"))),
    };

    let packages: Vec<PackageRecord> = json
        .get("packages")
        .and_then(Value::as_array)
        .map(|pkgs| pkgs.iter().map(parse_package).collect())
        .unwrap_or_default();

    let files: Vec<FileRecord> = json
        .get("files")
        .and_then(Value::as_array)
        .map(|files| files.iter().map(parse_file).collect())
        .unwrap_or_default();

    let mut names_by_id: HashMap<&str, &str> = HashMap::new();
    for package in &packages {
        if let (Some(id), Some(name)) = (package.id.as_deref(), package.name.as_deref()) {
            names_by_id.insert(id, name);
        }
    }
    for file in &files {
        if let (Some(id), Some(name)) = (file.id.as_deref(), file.name.as_deref()) {
            names_by_id.insert(id, name);
        }
    }
    let resolve = |id: &str| names_by_id.get(id).copied().unwrap_or(id).to_string();

    let relationships = json
        .get("relationships")
        .and_then(Value::as_array)
        .map(|rels| {
            rels.iter()
                .filter_map(|r| {
                    Some(Relationship::new(
                        resolve(str_field(r, "spdxElementId")?),
                        resolve(str_field(r, "relatedSpdxElement")?),
                        str_field(r, "relationshipType").unwrap_or("RELATES_TO"),
                    ))
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(SbomContents {
        document,
        files,
        packages,
        relationships,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{
        "spdxVersion": "SPDX-2.3",
        "SPDXID": "SPDXRef-DOCUMENT",
        "creationInfo": {
            "created": "2024-03-01T12:00:00Z",
            "creators": ["Tool: example-tool"]
        },
        "packages": [
            {
                "SPDXID": "SPDXRef-Package-requests",
                "name": "requests",
                "versionInfo": "2.31.0",
                "supplier": "Organization: Python Software Foundation",
                "licenseConcluded": "Apache-2.0",
                "externalRefs": [
                    {
                        "referenceCategory": "PACKAGE-MANAGER",
                        "referenceType": "purl",
                        "referenceLocator": "pkg:pypi/requests@2.31.0"
                    }
                ]
            },
            {
                "SPDXID": "SPDXRef-Package-urllib3",
                "name": "urllib3",
                "versionInfo": "2.2.0",
                "supplier": "NOASSERTION",
                "licenseConcluded": "NOASSERTION"
            }
        ],
        "files": [
            {
                "SPDXID": "SPDXRef-File-setup",
                "fileName": "setup.py",
                "fileTypes": ["SOURCE"],
                "licenseConcluded": "MIT",
                "copyrightText": "NOASSERTION"
            }
        ],
        "relationships": [
            {
                "spdxElementId": "SPDXRef-Package-requests",
                "relatedSpdxElement": "SPDXRef-Package-urllib3",
                "relationshipType": "DEPENDS_ON"
            }
        ]
    }"#;

    #[test]
    fn test_parse_document_metadata() {
        let sbom = parse_spdx(MINIMAL).expect("parse");
        assert_eq!(sbom.document.kind, Some(SbomKind::Spdx));
        assert_eq!(sbom.document.version, "SPDX-2.3");
        assert_eq!(sbom.document.creators, vec!["Tool: example-tool"]);
        assert!(sbom.document.created.is_some());
    }

    #[test]
    fn test_parse_packages() {
        let sbom = parse_spdx(MINIMAL).expect("parse");
        assert_eq!(sbom.packages.len(), 2);

        let requests = &sbom.packages[0];
        assert_eq!(requests.name.as_deref(), Some("requests"));
        assert_eq!(requests.version.as_deref(), Some("2.31.0"));
        assert_eq!(
            requests.supplier,
            Assertion::Value("Python Software Foundation".into())
        );
        assert_eq!(requests.purl_locator(), Some("pkg:pypi/requests@2.31.0"));

        let urllib3 = &sbom.packages[1];
        assert_eq!(urllib3.supplier, Assertion::NoAssertion);
        assert_eq!(urllib3.license, Assertion::NoAssertion);
    }

    #[test]
    fn test_parse_files() {
        let sbom = parse_spdx(MINIMAL).expect("parse");
        assert_eq!(sbom.files.len(), 1);
        let file = &sbom.files[0];
        assert_eq!(file.name.as_deref(), Some("setup.py"));
        assert_eq!(file.file_types, vec!["SOURCE"]);
        assert_eq!(file.license, Assertion::Value("MIT".into()));
        assert_eq!(file.copyright, Assertion::NoAssertion);
    }

    #[test]
    fn test_relationships_resolved_to_names() {
        let sbom = parse_spdx(MINIMAL).expect("parse");
        assert_eq!(sbom.relationships.len(), 1);
        let rel = &sbom.relationships[0];
        assert_eq!(rel.source, "requests");
        assert_eq!(rel.target, "urllib3");
        assert_eq!(rel.kind, "DEPENDS_ON");
    }

    #[test]
    fn test_unresolvable_relationship_keeps_raw_id() {
        let content = r#"{
            "spdxVersion": "SPDX-2.3",
            "relationships": [
                {
                    "spdxElementId": "SPDXRef-DOCUMENT",
                    "relatedSpdxElement": "SPDXRef-Unknown",
                    "relationshipType": "DESCRIBES"
                }
            ]
        }"#;
        let sbom = parse_spdx(content).expect("parse");
        assert_eq!(sbom.relationships[0].source, "SPDXRef-DOCUMENT");
    }

    #[test]
    fn test_invalid_json_errors() {
        assert!(parse_spdx("{not json").is_err());
    }
}
