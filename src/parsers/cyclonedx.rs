//! CycloneDX JSON adapter.

use crate::error::{AuditError, ParseErrorKind, Result};
use crate::model::{
    Assertion, ExternalRef, PackageRecord, Relationship, SbomContents, SbomDocument, SbomKind,
};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;

fn str_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(Value::as_str)
}

/// First concluded license expression from a CycloneDX `licenses` array.
fn parse_license(component: &Value) -> Assertion {
    let Some(licenses) = component.get("licenses").and_then(Value::as_array) else {
        return Assertion::Missing;
    };
    let raw = licenses.iter().find_map(|entry| {
        entry
            .get("expression")
            .and_then(Value::as_str)
            .or_else(|| {
                let license = entry.get("license")?;
                str_field(license, "id").or_else(|| str_field(license, "name"))
            })
    });
    Assertion::from_raw(raw)
}

fn parse_component(component: &Value) -> PackageRecord {
    let mut external_refs = Vec::new();
    if let Some(purl) = str_field(component, "purl") {
        external_refs.push(ExternalRef::new("PACKAGE-MANAGER", "purl", purl));
    }
    if let Some(cpe) = str_field(component, "cpe") {
        external_refs.push(ExternalRef::new("SECURITY", "cpe23Type", cpe));
    }

    PackageRecord {
        id: str_field(component, "bom-ref").map(String::from),
        name: str_field(component, "name").map(String::from),
        version: str_field(component, "version").map(String::from),
        supplier: Assertion::from_raw(
            component
                .get("supplier")
                .and_then(|s| str_field(s, "name"))
                .or_else(|| str_field(component, "author")),
        ),
        license: parse_license(component),
        external_refs,
    }
}

/// Creators from metadata tools and authors.
fn parse_creators(metadata: Option<&Value>) -> Vec<String> {
    let Some(metadata) = metadata else {
        return Vec::new();
    };
    let mut creators = Vec::new();

    // tools can be a plain array (<=1.4) or an object with components (1.5+)
    let tools = metadata.get("tools");
    let tool_entries = tools
        .and_then(Value::as_array)
        .map(|t| t.to_vec())
        .or_else(|| {
            tools
                .and_then(|t| t.get("components"))
                .and_then(Value::as_array)
                .map(|t| t.to_vec())
        })
        .unwrap_or_default();
    for tool in &tool_entries {
        if let Some(name) = str_field(tool, "name") {
            creators.push(format!("Tool: {name}"));
        }
    }

    if let Some(authors) = metadata.get("authors").and_then(Value::as_array) {
        for author in authors {
            if let Some(name) = str_field(author, "name") {
                creators.push(format!("Person: {name}"));
            }
        }
    }

    creators
}

/// Parse a CycloneDX JSON document into audit records.
///
/// CycloneDX carries no file records; dependency entries are resolved from
/// bom-refs to component names for the relationship auditor.
pub fn parse_cyclonedx(content: &str) -> Result<SbomContents> {
    let json: Value = serde_json::from_str(content).map_err(|e| {
        AuditError::parse("CycloneDX document", ParseErrorKind::InvalidJson(e.to_string()))
    })?;

    let metadata = json.get("metadata");
    let document = SbomDocument {
        kind: Some(SbomKind::CycloneDx),
        version: str_field(&json, "specVersion").unwrap_or_default().to_string(),
        creators: parse_creators(metadata),
        created: metadata
            .and_then(|m| str_field(m, "timestamp"))
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|d| d.with_timezone(&Utc)),
    };

    let packages: Vec<PackageRecord> = json
        .get("components")
        .and_then(Value::as_array)
        .map(|components| components.iter().map(parse_component).collect())
        .unwrap_or_default();

    let mut names_by_ref: HashMap<&str, &str> = HashMap::new();
    for package in &packages {
        if let (Some(id), Some(name)) = (package.id.as_deref(), package.name.as_deref()) {
            names_by_ref.insert(id, name);
        }
    }
    // The root component participates in dependencies too
    if let Some(root) = metadata.and_then(|m| m.get("component")) {
        if let (Some(id), Some(name)) = (str_field(root, "bom-ref"), str_field(root, "name")) {
            names_by_ref.insert(id, name);
        }
    }
    let resolve = |id: &str| names_by_ref.get(id).copied().unwrap_or(id).to_string();

    let mut relationships = Vec::new();
    if let Some(dependencies) = json.get("dependencies").and_then(Value::as_array) {
        for dependency in dependencies {
            let Some(source) = str_field(dependency, "ref") else {
                continue;
            };
            let Some(targets) = dependency.get("dependsOn").and_then(Value::as_array) else {
                continue;
            };
            for target in targets.iter().filter_map(Value::as_str) {
                relationships.push(Relationship::new(
                    resolve(source),
                    resolve(target),
                    "DEPENDS_ON",
                ));
            }
        }
    }

    Ok(SbomContents {
        document,
        files: Vec::new(),
        packages,
        relationships,
    })
}
