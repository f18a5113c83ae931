//! Per-package record checks: identity, completeness, license policy, and
//! registry freshness.

use crate::audit::recorder::CheckRecorder;
use crate::audit::AuditOptions;
use crate::model::{Ecosystem, LicenseClassifier, PackageRecord};
use crate::policy::{categories, PolicyStore};
use crate::registry::MetadataLookup;
use chrono::{DateTime, Utc};
use packageurl::PackageUrl;
use std::str::FromStr;

/// Identity facts extracted from a package's external references.
#[derive(Debug, Default)]
struct ExternalIdentity {
    purl_used: bool,
    cpe_used: bool,
    purl_name: Option<String>,
    ecosystem: Option<Ecosystem>,
}

/// Locator parsing is best-effort: an unparsable PURL demotes `purl_used`
/// instead of raising.
fn extract_identity(package: &PackageRecord) -> ExternalIdentity {
    let mut identity = ExternalIdentity {
        cpe_used: package.has_cpe(),
        ..Default::default()
    };
    if let Some(locator) = package.purl_locator() {
        match PackageUrl::from_str(locator) {
            Ok(purl) => {
                identity.purl_used = true;
                identity.purl_name = Some(purl.name().to_string());
                identity.ecosystem = Some(Ecosystem::from_purl_type(purl.ty()));
            }
            Err(err) => {
                tracing::debug!(locator, %err, "unparsable package-manager locator");
            }
        }
    }
    identity
}

/// Registry answers for one package; any field may be unavailable.
#[derive(Debug, Default)]
struct FreshnessData {
    latest_version: Option<String>,
    latest_release: Option<DateTime<Utc>>,
    current_release: Option<DateTime<Utc>>,
}

fn resolve_freshness(
    identity: &ExternalIdentity,
    name: &str,
    version: Option<&str>,
    lookup: Option<&mut (dyn MetadataLookup + '_)>,
) -> FreshnessData {
    let mut data = FreshnessData::default();
    let Some(lookup) = lookup else {
        return data;
    };
    let Some(ecosystem) = identity.ecosystem.as_ref().filter(|e| e.has_registry()) else {
        return data;
    };

    data.latest_version = lookup.latest_version(ecosystem, name);
    if let Some(latest) = &data.latest_version {
        data.latest_release = lookup.release_timestamp(ecosystem, name, latest);
    }
    if let Some(version) = version {
        data.current_release = lookup.release_timestamp(ecosystem, name, version);
    }
    data
}

/// Validate every package record in declaration order.
///
/// Returns the package-set NTIA validity: false as soon as any package
/// lacks an identifier, name, version, or known supplier.
#[allow(clippy::too_many_lines)]
pub fn audit_packages(
    packages: &[PackageRecord],
    policy: &PolicyStore,
    classifier: &dyn LicenseClassifier,
    mut lookup: Option<&mut (dyn MetadataLookup + '_)>,
    options: &AuditOptions,
    now: DateTime<Utc>,
    recorder: &mut CheckRecorder<'_>,
) -> bool {
    recorder.heading("Package Summary");
    let failures_before = recorder.failures();

    let allow_licenses = policy.allowed(categories::LICENSE);
    let deny_licenses = policy.denied(categories::LICENSE);
    let allow_packages = policy.allowed(categories::PACKAGE);
    let deny_packages = policy.denied(categories::PACKAGE);
    let mut packages_valid = true;

    for package in packages {
        if package.id.is_none() {
            recorder.check("Package id missing", false);
        } else if let Some(name) = package.name.as_deref() {
            let identity = extract_identity(package);
            let freshness =
                resolve_freshness(&identity, name, package.version.as_deref(), lookup.as_deref_mut());

            if let Some(allowed) = allow_packages {
                recorder.policy_check_detail(
                    format!("Allowed Package check for package {name}"),
                    allowed.contains(name),
                    format!("{name} not allowed"),
                );
            }
            if let Some(denied) = deny_packages {
                recorder.policy_check_detail(
                    format!("Denied Package check for package {name}"),
                    !denied.contains(name),
                    format!("{name} not allowed"),
                );
            }

            recorder.check(
                format!("Supplier included for package {name}"),
                package.supplier.is_known(),
            );
            recorder.check(
                format!("Version included for package {name}"),
                package.version.is_some(),
            );
            recorder.check(
                format!("License included for package {name}"),
                package.license.is_known(),
            );

            if options.license_check {
                if let Some(expr) = package.license.value() {
                    recorder.check_detail(
                        format!("SPDX Compatible License id included for package {name}"),
                        classifier.normalize(expr).is_some(),
                        expr,
                    );
                    recorder.check_detail(
                        format!("OSI Approved License for package {name}"),
                        classifier.is_osi_approved(expr),
                        expr,
                    );
                    recorder.check_detail(
                        format!("Non-deprecated License for package {name}"),
                        !classifier.is_deprecated(expr),
                        expr,
                    );
                }
            }

            if let Some(allowed) = allow_licenses {
                let passed = package.license.value().is_some_and(|l| allowed.contains(l));
                recorder.policy_check_detail(
                    format!("Allowed License check for package {name}"),
                    passed,
                    format!("{} not allowed", package.license),
                );
            }
            if let Some(denied) = deny_licenses {
                let passed = !package.license.value().is_some_and(|l| denied.contains(l));
                recorder.policy_check_detail(
                    format!("Denied License check for package {name}"),
                    passed,
                    format!("{} not allowed", package.license),
                );
            }

            if let Some(latest) = &freshness.latest_version {
                let up_to_date = package.version.as_deref() == Some(latest.as_str());
                let mut detail = format!(
                    "Version is {}; latest is {latest}",
                    package.version.as_deref().unwrap_or("MISSING")
                );
                if let Some(released) = freshness.latest_release {
                    detail.push_str(&format!(" (released {})", released.format("%Y-%m-%d")));
                }
                recorder.policy_check_detail(
                    format!("Using latest version of package {name}"),
                    up_to_date,
                    detail,
                );
            }

            if let Some(released) = freshness.current_release {
                let age_days = (now - released).num_days();
                // Evaluated whenever a timestamp is known, even for the
                // latest version: a release can be too new to trust.
                recorder.policy_check_detail(
                    format!("Mature version of package {name}"),
                    age_days > policy.min_age_days,
                    format!("{age_days} days old, minimum age {} days", policy.min_age_days),
                );

                if let Some(latest) = &freshness.latest_version {
                    if package.version.as_deref() != Some(latest.as_str()) {
                        recorder.policy_check_detail(
                            format!("Not stale version of package {name}"),
                            age_days < policy.max_age_days,
                            format!(
                                "{age_days} days old, maximum age {} days",
                                policy.max_age_days
                            ),
                        );
                    }
                }
            }

            if options.cpe_check {
                recorder.check(
                    format!("CPE name included for package {name}"),
                    identity.cpe_used,
                );
            }
            if options.purl_check {
                recorder.check(
                    format!("PURL included for package {name}"),
                    identity.purl_used,
                );
                if identity.purl_used {
                    let purl_name = identity.purl_name.as_deref().unwrap_or_default();
                    recorder.check_detail(
                        format!("PURL name compatible with package {name}"),
                        purl_name == name,
                        purl_name,
                    );
                }
            }
        } else {
            let id = package.id.as_deref().unwrap_or_default();
            recorder.check(format!("Package name missing for {id}"), false);
        }

        if package.id.is_none()
            || package.name.is_none()
            || package.version.is_none()
            || !package.supplier.is_known()
        {
            packages_valid = false;
        }

        let label = package
            .name
            .clone()
            .or_else(|| package.id.clone())
            .unwrap_or_else(|| "UNKNOWN".to_string());
        recorder.section_package(label, package.version.clone());
    }

    recorder.summary_check_detail("Packages NTIA compliant", packages_valid, "FAILED");
    recorder.confirm_section("Package Summary", failures_before);
    packages_valid
}
