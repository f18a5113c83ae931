//! Record types consumed by the audit engine.
//!
//! All types in this module are read-only views produced by an SBOM parser.
//! The auditors never mutate them; audit state accumulates in the check
//! recorder instead.

mod ecosystem;
mod license;
mod records;

pub use ecosystem::Ecosystem;
pub use license::{LicenseClassifier, SpdxLicenses};
pub use records::{
    Assertion, ExternalRef, FileRecord, PackageRecord, Relationship, SbomContents, SbomDocument,
    SbomKind,
};
