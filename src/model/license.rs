//! License classification backed by the SPDX license list.
//!
//! Uses the `spdx` crate for identifier lookup and expression parsing, with
//! lax parsing mode to accept common non-standard expressions (e.g.
//! "Apache2" instead of "Apache-2.0").

/// License classifier collaborator.
///
/// The auditors only ask three questions of a license expression; answers
/// for unparseable expressions degrade to "not recognized" rather than
/// erroring.
pub trait LicenseClassifier {
    /// Normalize an expression to a canonical SPDX form, `None` when the
    /// expression is not recognizable.
    fn normalize(&self, expr: &str) -> Option<String>;

    /// Whether every license term in the expression is OSI approved.
    fn is_osi_approved(&self, expr: &str) -> bool;

    /// Whether any license term in the expression is a deprecated SPDX id.
    fn is_deprecated(&self, expr: &str) -> bool;
}

/// Classifier backed by the `spdx` crate's bundled license list.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpdxLicenses;

impl SpdxLicenses {
    pub fn new() -> Self {
        Self
    }
}

impl LicenseClassifier for SpdxLicenses {
    fn normalize(&self, expr: &str) -> Option<String> {
        let expr = expr.trim();
        if let Some(id) = spdx::license_id(expr) {
            return Some(id.name.to_string());
        }
        if spdx::Expression::parse_mode(expr, spdx::ParseMode::LAX).is_ok() {
            return Some(expr.to_string());
        }
        spdx::imprecise_license_id(expr).map(|(id, _)| id.name.to_string())
    }

    fn is_osi_approved(&self, expr: &str) -> bool {
        let expr = expr.trim();
        if let Some(id) = spdx::license_id(expr) {
            return id.is_osi_approved();
        }
        match spdx::Expression::parse_mode(expr, spdx::ParseMode::LAX) {
            Ok(parsed) => parsed.requirements().all(|req| {
                matches!(
                    req.req.license,
                    spdx::LicenseItem::Spdx { id, .. } if id.is_osi_approved()
                )
            }),
            Err(_) => false,
        }
    }

    fn is_deprecated(&self, expr: &str) -> bool {
        let expr = expr.trim();
        if let Some(id) = spdx::license_id(expr) {
            return id.is_deprecated();
        }
        match spdx::Expression::parse_mode(expr, spdx::ParseMode::LAX) {
            Ok(parsed) => parsed.requirements().any(|req| {
                matches!(
                    req.req.license,
                    spdx::LicenseItem::Spdx { id, .. } if id.is_deprecated()
                )
            }),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_known_id() {
        let licenses = SpdxLicenses::new();
        assert_eq!(licenses.normalize("MIT"), Some("MIT".to_string()));
        assert_eq!(licenses.normalize(" Apache-2.0 "), Some("Apache-2.0".to_string()));
    }

    #[test]
    fn test_normalize_expression() {
        let licenses = SpdxLicenses::new();
        assert_eq!(
            licenses.normalize("MIT OR Apache-2.0"),
            Some("MIT OR Apache-2.0".to_string())
        );
    }

    #[test]
    fn test_normalize_unrecognized() {
        let licenses = SpdxLicenses::new();
        assert_eq!(licenses.normalize("Totally Made Up License 9000"), None);
    }

    #[test]
    fn test_osi_approval() {
        let licenses = SpdxLicenses::new();
        assert!(licenses.is_osi_approved("MIT"));
        assert!(licenses.is_osi_approved("Apache-2.0"));
        // CC-BY-4.0 is a valid SPDX id but not OSI approved
        assert!(!licenses.is_osi_approved("CC-BY-4.0"));
        assert!(!licenses.is_osi_approved("not a license"));
    }

    #[test]
    fn test_deprecated_ids() {
        let licenses = SpdxLicenses::new();
        // GPL-3.0 was deprecated in favor of GPL-3.0-only / GPL-3.0-or-later
        assert!(licenses.is_deprecated("GPL-3.0"));
        assert!(!licenses.is_deprecated("GPL-3.0-only"));
        assert!(!licenses.is_deprecated("MIT"));
    }
}
