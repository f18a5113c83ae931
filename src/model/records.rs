//! Core SBOM record structures.
//!
//! These are the shapes the audit engine expects from the parser
//! collaborator: one document snapshot plus flat lists of file, package,
//! and relationship records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw strings that mean "declared as unknown" in SBOM documents.
const NO_ASSERTION_MARKERS: &[&str] = &["NOASSERTION", "NOT KNOWN"];

/// SBOM format type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SbomKind {
    Spdx,
    CycloneDx,
}

impl fmt::Display for SbomKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spdx => write!(f, "SPDX"),
            Self::CycloneDx => write!(f, "CycloneDX"),
        }
    }
}

/// Tri-state value for fields where "never declared" and "declared as
/// unknown" must stay distinguishable.
///
/// SBOM documents conflate three states behind string sentinels: a real
/// value, an explicit `NOASSERTION`, and a field that was simply omitted.
/// Collapsing them loses information the auditors need, so the distinction
/// is kept in the type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Assertion {
    /// A concrete declared value
    Value(String),
    /// The document explicitly declared the value as unknown
    NoAssertion,
    /// The field was never declared
    #[default]
    Missing,
}

impl Assertion {
    /// Build from a raw optional string, mapping no-assertion sentinels.
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None => Self::Missing,
            Some("") => Self::Missing,
            Some(s) if NO_ASSERTION_MARKERS.contains(&s) => Self::NoAssertion,
            Some(s) => Self::Value(s.to_string()),
        }
    }

    /// The declared value, if one exists
    pub fn value(&self) -> Option<&str> {
        match self {
            Self::Value(s) => Some(s),
            _ => None,
        }
    }

    /// True only for a concrete declared value
    pub fn is_known(&self) -> bool {
        matches!(self, Self::Value(_))
    }

    /// True if the field was never declared at all
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }
}

impl fmt::Display for Assertion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(s) => write!(f, "{s}"),
            Self::NoAssertion => write!(f, "NOASSERTION"),
            Self::Missing => write!(f, "MISSING"),
        }
    }
}

/// Document-level metadata, snapshotted once per audit run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SbomDocument {
    /// Detected format, `None` when the format could not be determined
    pub kind: Option<SbomKind>,
    /// Format version string (e.g. "SPDX-2.3" or "1.5")
    pub version: String,
    /// Creators/authors; an empty list means no creator was identified
    pub creators: Vec<String>,
    /// Creation timestamp
    pub created: Option<DateTime<Utc>>,
}

/// A file record from the SBOM.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileRecord {
    /// Format-level identifier (e.g. an SPDXID)
    pub id: Option<String>,
    /// File name
    pub name: Option<String>,
    /// File type tags; empty means none were declared
    pub file_types: Vec<String>,
    /// Concluded license
    pub license: Assertion,
    /// Copyright text
    pub copyright: Assertion,
}

impl FileRecord {
    /// Key used in check subjects: name when present, identifier otherwise.
    pub fn subject(&self) -> Option<&str> {
        self.name.as_deref().or(self.id.as_deref())
    }
}

/// External reference categories that carry a package-manager locator.
const PACKAGE_MANAGER_CATEGORIES: &[&str] = &["PACKAGE-MANAGER", "PACKAGE_MANAGER"];

/// External reference subtypes that carry a CPE identifier.
const CPE_TYPES: &[&str] = &["cpe22Type", "cpe23Type"];

/// One external reference triple on a package.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalRef {
    /// Reference kind (e.g. "PACKAGE-MANAGER", "SECURITY")
    pub category: String,
    /// Reference subtype (e.g. "purl", "cpe23Type")
    pub ref_type: String,
    /// Reference locator
    pub locator: String,
}

impl ExternalRef {
    pub fn new(
        category: impl Into<String>,
        ref_type: impl Into<String>,
        locator: impl Into<String>,
    ) -> Self {
        Self {
            category: category.into(),
            ref_type: ref_type.into(),
            locator: locator.into(),
        }
    }
}

/// A package record from the SBOM.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PackageRecord {
    /// Format-level identifier (e.g. an SPDXID or bom-ref)
    pub id: Option<String>,
    /// Package name
    pub name: Option<String>,
    /// Declared version
    pub version: Option<String>,
    /// Supplier; `NOASSERTION` is equivalent to absent for validity
    pub supplier: Assertion,
    /// Concluded license
    pub license: Assertion,
    /// External references in declaration order
    pub external_refs: Vec<ExternalRef>,
}

impl PackageRecord {
    /// The first package-manager locator, if any reference declares one.
    pub fn purl_locator(&self) -> Option<&str> {
        self.external_refs
            .iter()
            .find(|r| PACKAGE_MANAGER_CATEGORIES.contains(&r.category.as_str()))
            .map(|r| r.locator.as_str())
    }

    /// Whether any external reference carries a CPE identifier.
    pub fn has_cpe(&self) -> bool {
        self.external_refs
            .iter()
            .any(|r| CPE_TYPES.contains(&r.ref_type.as_str()))
    }
}

/// A relationship between two SBOM elements, by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    /// Source element name
    pub source: String,
    /// Target element name
    pub target: String,
    /// Relationship kind (e.g. "DEPENDS_ON")
    pub kind: String,
}

impl Relationship {
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        kind: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            kind: kind.into(),
        }
    }

    /// Membership is symmetric: a subject participates when it appears as
    /// either endpoint.
    pub fn involves(&self, name: &str) -> bool {
        self.source == name || self.target == name
    }
}

/// The full set of records produced by the parser for one audit run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SbomContents {
    pub document: SbomDocument,
    pub files: Vec<FileRecord>,
    pub packages: Vec<PackageRecord>,
    pub relationships: Vec<Relationship>,
}
