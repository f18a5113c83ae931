//! **SBOM quality, compliance, and policy auditing.**
//!
//! `sbom-audit` evaluates a parsed Software Bill of Materials against a
//! fixed catalogue of quality and compliance rules plus organization
//! policy, producing a structured report tree and a boolean
//! NTIA-minimum-elements verdict.
//!
//! ## Core Concepts & Modules
//!
//! - **[`model`]**: the record shapes the auditors consume — document
//!   metadata, file, package, and relationship records — with tri-state
//!   [`Assertion`] fields that keep "never declared" distinguishable from
//!   "declared as unknown".
//! - **[`audit`]**: the engine. A [`SbomAuditor`] runs the document, file,
//!   package, and relationship auditors in order, accumulating outcomes in
//!   a [`CheckRecorder`](audit::CheckRecorder) with separate ordinary and
//!   policy tallies, and aggregates the final verdict.
//! - **[`policy`]**: allow/deny list files and the two package-age
//!   thresholds.
//! - **[`registry`]**: blocking metadata lookups against npm, PyPI, and
//!   crates.io for the freshness checks; lookup failures degrade to
//!   "no data", never to audit failures.
//! - **[`parsers`]**: thin CycloneDX JSON / SPDX JSON adapters feeding the
//!   record model.
//! - **[`reports`]**: console rendering and JSON report output.
//!
//! ## Auditing an SBOM
//!
//! ```no_run
//! use std::path::Path;
//! use sbom_audit::{parse_sbom, AuditOptions, PolicyStore, SbomAuditor};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let sbom = parse_sbom(Path::new("path/to/sbom.json"))?;
//!
//!     let mut auditor = SbomAuditor::new(AuditOptions::default(), PolicyStore::new());
//!     let outcome = auditor.audit(&sbom);
//!
//!     println!(
//!         "compliant: {} ({} checks passed, {} failed)",
//!         outcome.compliant, outcome.checks.passed, outcome.checks.failed
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Policy lists
//!
//! Allow and deny lists are plain text files: `#` lines are comments,
//! `[category]` lines open a category (`license`, `package`), and the
//! remaining lines are entries. A category that is never declared produces
//! no checks at all.
//!
//! ## Feature Flags
//!
//! - `registry` (default): enables the `reqwest`-backed registry clients
//!   used by the freshness checks. Without it, lookups answer nothing and
//!   audits behave as if offline.

// Lint to discourage unwrap() in production code - prefer explicit error handling
#![warn(clippy::unwrap_used)]
#![allow(
    // State structs legitimately use many bools for toggle flags
    clippy::struct_excessive_bools,
    // Doc completeness: # Errors / # Panics sections are aspirational
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod audit;
pub mod error;
pub mod model;
pub mod parsers;
pub mod policy;
pub mod registry;
pub mod reports;

// Re-export main types for convenience
pub use audit::{AuditOptions, AuditOutcome, AuditReport, CheckCounts, SbomAuditor};
pub use error::{AuditError, Result};
pub use model::{
    Assertion, Ecosystem, ExternalRef, FileRecord, LicenseClassifier, PackageRecord, Relationship,
    SbomContents, SbomDocument, SbomKind, SpdxLicenses,
};
pub use parsers::{parse_sbom, parse_sbom_str};
pub use policy::PolicyStore;
pub use registry::{MetadataLookup, NoopLookup, RegistryClient, RegistryConfig};
pub use reports::ConsoleObserver;

/// Exit codes for CI/CD integration.
///
/// Historical versions of this kind of tool returned the verdict boolean
/// directly (1 for compliant). That inverts shell conventions, so the
/// mapping here is deliberate: success means compliant.
pub mod exit_codes {
    /// The SBOM meets the NTIA minimum elements
    pub const COMPLIANT: i32 = 0;
    /// The audit completed and the SBOM is not compliant
    pub const NOT_COMPLIANT: i32 = 1;
    /// The input could not be read or parsed; no report was produced
    pub const ERROR: i32 = 2;
}
