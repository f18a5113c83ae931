//! Package registry clients for freshness lookups.
//!
//! The package auditor asks two questions per package: what is the latest
//! published version, and when was a given version released. Answers come
//! from the public npm, PyPI, and crates.io registries. Every failure mode
//! (network error, unknown package, unexpected payload) degrades to "no
//! data" at the trait boundary; the audit itself never fails on a lookup.

use crate::model::Ecosystem;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

/// Metadata lookup collaborator.
///
/// Implementations must absorb their own failures and answer `None`.
pub trait MetadataLookup {
    /// Latest published version of a package, if resolvable.
    fn latest_version(&mut self, ecosystem: &Ecosystem, name: &str) -> Option<String>;

    /// Release timestamp of a specific version, if resolvable.
    fn release_timestamp(
        &mut self,
        ecosystem: &Ecosystem,
        name: &str,
        version: &str,
    ) -> Option<DateTime<Utc>>;
}

/// Lookup that never answers. Used for offline audits and as a test stand-in.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLookup;

impl MetadataLookup for NoopLookup {
    fn latest_version(&mut self, _ecosystem: &Ecosystem, _name: &str) -> Option<String> {
        None
    }

    fn release_timestamp(
        &mut self,
        _ecosystem: &Ecosystem,
        _name: &str,
        _version: &str,
    ) -> Option<DateTime<Utc>> {
        None
    }
}

/// Internal lookup failures; logged and converted to `None` at the trait
/// boundary.
#[derive(Debug, Error)]
enum LookupError {
    #[error("API request failed: {0}")]
    Api(String),

    #[error("invalid response format: {0}")]
    Parse(String),
}

/// Registry client configuration
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Request timeout
    pub timeout: Duration,
    /// User agent sent to registries (crates.io requires one)
    pub user_agent: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            user_agent: format!("sbom-audit/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Everything learned about one package from a single registry fetch.
#[derive(Debug, Clone, Default)]
struct RegistryEntry {
    latest_version: Option<String>,
    release_times: HashMap<String, DateTime<Utc>>,
}

/// Multi-registry client answering lookups for npm, PyPI, and crates.io.
///
/// One HTTP fetch per package is memoized for the lifetime of the client,
/// including negative results, so both lookup questions for a package cost
/// a single request.
pub struct RegistryClient {
    config: RegistryConfig,
    cache: HashMap<String, Option<RegistryEntry>>,
}

impl RegistryClient {
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            config,
            cache: HashMap::new(),
        }
    }

    fn cache_key(ecosystem: &Ecosystem, name: &str) -> String {
        format!("{ecosystem}:{name}")
    }

    fn entry(&mut self, ecosystem: &Ecosystem, name: &str) -> Option<&RegistryEntry> {
        let key = Self::cache_key(ecosystem, name);
        if !self.cache.contains_key(&key) {
            let fetched = match self.fetch(ecosystem, name) {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::debug!(package = name, %ecosystem, %err, "registry lookup failed");
                    None
                }
            };
            self.cache.insert(key.clone(), fetched);
        }
        self.cache.get(&key).and_then(Option::as_ref)
    }

    fn fetch(&self, ecosystem: &Ecosystem, name: &str) -> Result<Option<RegistryEntry>, LookupError> {
        match ecosystem {
            Ecosystem::Npm => self.fetch_npm(name),
            Ecosystem::PyPi => self.fetch_pypi(name),
            Ecosystem::Cargo => self.fetch_crates_io(name),
            _ => Ok(None),
        }
    }

    #[cfg(feature = "registry")]
    fn get_json(&self, url: &str) -> Result<Option<Value>, LookupError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.config.timeout)
            .user_agent(self.config.user_agent.clone())
            .build()
            .map_err(|e| LookupError::Api(e.to_string()))?;

        match client.get(url).send() {
            Ok(resp) if resp.status().is_success() => {
                let json = resp.json().map_err(|e| LookupError::Parse(e.to_string()))?;
                Ok(Some(json))
            }
            Ok(resp) if resp.status() == reqwest::StatusCode::NOT_FOUND => Ok(None),
            Ok(resp) => Err(LookupError::Api(format!(
                "registry returned {}",
                resp.status()
            ))),
            Err(e) => Err(LookupError::Api(e.to_string())),
        }
    }

    #[cfg(feature = "registry")]
    fn fetch_npm(&self, name: &str) -> Result<Option<RegistryEntry>, LookupError> {
        let url = format!("https://registry.npmjs.org/{name}");
        Ok(self.get_json(&url)?.map(|json| npm_entry(&json)))
    }

    #[cfg(feature = "registry")]
    fn fetch_pypi(&self, name: &str) -> Result<Option<RegistryEntry>, LookupError> {
        let url = format!("https://pypi.org/pypi/{name}/json");
        Ok(self.get_json(&url)?.map(|json| pypi_entry(&json)))
    }

    #[cfg(feature = "registry")]
    fn fetch_crates_io(&self, name: &str) -> Result<Option<RegistryEntry>, LookupError> {
        let url = format!("https://crates.io/api/v1/crates/{name}");
        Ok(self.get_json(&url)?.map(|json| crates_io_entry(&json)))
    }

    /// Stub implementations for builds without the registry feature
    #[cfg(not(feature = "registry"))]
    fn fetch_npm(&self, _name: &str) -> Result<Option<RegistryEntry>, LookupError> {
        Ok(None)
    }

    #[cfg(not(feature = "registry"))]
    fn fetch_pypi(&self, _name: &str) -> Result<Option<RegistryEntry>, LookupError> {
        Ok(None)
    }

    #[cfg(not(feature = "registry"))]
    fn fetch_crates_io(&self, _name: &str) -> Result<Option<RegistryEntry>, LookupError> {
        Ok(None)
    }
}

impl MetadataLookup for RegistryClient {
    fn latest_version(&mut self, ecosystem: &Ecosystem, name: &str) -> Option<String> {
        if !ecosystem.has_registry() {
            return None;
        }
        self.entry(ecosystem, name)?.latest_version.clone()
    }

    fn release_timestamp(
        &mut self,
        ecosystem: &Ecosystem,
        name: &str,
        version: &str,
    ) -> Option<DateTime<Utc>> {
        if !ecosystem.has_registry() {
            return None;
        }
        self.entry(ecosystem, name)?.release_times.get(version).copied()
    }
}

fn parse_rfc3339(value: &Value) -> Option<DateTime<Utc>> {
    value
        .as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|d| d.with_timezone(&Utc))
}

/// Extract registry data from an npm package document.
fn npm_entry(json: &Value) -> RegistryEntry {
    let latest_version = json
        .get("dist-tags")
        .and_then(|d| d.get("latest"))
        .and_then(|l| l.as_str())
        .map(std::string::ToString::to_string);

    let release_times = json
        .get("time")
        .and_then(|t| t.as_object())
        .map(|times| {
            times
                .iter()
                .filter(|(version, _)| *version != "created" && *version != "modified")
                .filter_map(|(version, time)| parse_rfc3339(time).map(|t| (version.clone(), t)))
                .collect()
        })
        .unwrap_or_default();

    RegistryEntry {
        latest_version,
        release_times,
    }
}

/// Extract registry data from a PyPI package document.
fn pypi_entry(json: &Value) -> RegistryEntry {
    let latest_version = json
        .get("info")
        .and_then(|i| i.get("version"))
        .and_then(|v| v.as_str())
        .map(std::string::ToString::to_string);

    let release_times = json
        .get("releases")
        .and_then(|r| r.as_object())
        .map(|releases| {
            releases
                .iter()
                .filter_map(|(version, uploads)| {
                    // A release has one upload per artifact; the newest one
                    // stands in for the release time.
                    uploads
                        .as_array()?
                        .iter()
                        .filter_map(|u| parse_rfc3339(u.get("upload_time_iso_8601")?))
                        .max()
                        .map(|t| (version.clone(), t))
                })
                .collect()
        })
        .unwrap_or_default();

    RegistryEntry {
        latest_version,
        release_times,
    }
}

/// Extract registry data from a crates.io crate document.
fn crates_io_entry(json: &Value) -> RegistryEntry {
    let latest_version = json
        .get("crate")
        .and_then(|c| c.get("newest_version"))
        .and_then(|v| v.as_str())
        .map(std::string::ToString::to_string);

    let release_times = json
        .get("versions")
        .and_then(|v| v.as_array())
        .map(|versions| {
            versions
                .iter()
                .filter_map(|v| {
                    let num = v.get("num")?.as_str()?.to_string();
                    parse_rfc3339(v.get("created_at")?).map(|t| (num, t))
                })
                .collect()
        })
        .unwrap_or_default();

    RegistryEntry {
        latest_version,
        release_times,
    }
}
