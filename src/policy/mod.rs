//! Organization policy: allow/deny lists and package-age thresholds.
//!
//! List files are plain text: `#` lines are comments, `[category]` lines
//! open a category, and every other non-blank line is a trimmed entry in
//! the most recently opened category. A missing or unreadable file means
//! "no restriction", not an error.

use indexmap::{IndexMap, IndexSet};
use std::path::Path;

/// Well-known policy categories.
pub mod categories {
    pub const LICENSE: &str = "license";
    pub const PACKAGE: &str = "package";
}

/// Default maximum package age in years.
const DEFAULT_MAX_AGE_YEARS: i64 = 2;

/// A set of categorized name lists parsed from a policy file.
#[derive(Debug, Clone, Default)]
pub struct AllowDenyList {
    categories: IndexMap<String, IndexSet<String>>,
}

impl AllowDenyList {
    /// Parse list content. Entries appearing before any `[category]` header
    /// have no category to belong to and are skipped with a warning.
    pub fn parse(content: &str) -> Self {
        let mut list = Self::default();
        let mut current: Option<String> = None;

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some(header) = line.strip_prefix('[') {
                let name = header.trim_end_matches(']').trim().to_string();
                list.categories.entry(name.clone()).or_default();
                current = Some(name);
            } else if let Some(category) = &current {
                if let Some(entries) = list.categories.get_mut(category) {
                    entries.insert(line.to_string());
                }
            } else {
                tracing::warn!(entry = line, "policy entry before any [category] header, skipped");
            }
        }

        list
    }

    /// Merge content into this list (later files can extend earlier ones).
    pub fn extend_from(&mut self, content: &str) {
        let parsed = Self::parse(content);
        for (category, entries) in parsed.categories {
            self.categories.entry(category).or_default().extend(entries);
        }
    }

    /// Entries for a category. `None` means the category was never
    /// declared, which is different from an empty category.
    pub fn category(&self, name: &str) -> Option<&IndexSet<String>> {
        self.categories.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

/// Loaded policy configuration for one audit run: allow list, deny list,
/// and the two freshness thresholds.
#[derive(Debug, Clone)]
pub struct PolicyStore {
    allow: AllowDenyList,
    deny: AllowDenyList,
    /// Minimum acceptable release age in days ("too new to trust" guard)
    pub min_age_days: i64,
    /// Maximum acceptable release age in days for non-latest versions
    pub max_age_days: i64,
}

impl Default for PolicyStore {
    fn default() -> Self {
        Self {
            allow: AllowDenyList::default(),
            deny: AllowDenyList::default(),
            min_age_days: 0,
            max_age_days: DEFAULT_MAX_AGE_YEARS * 365,
        }
    }
}

impl PolicyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set thresholds from CLI values: minimum age in days, maximum age in
    /// years.
    pub fn with_age_limits(min_age_days: i64, max_age_years: i64) -> Self {
        Self {
            min_age_days,
            max_age_days: max_age_years * 365,
            ..Self::default()
        }
    }

    /// Load a list file into the allow or deny side. A file that does not
    /// exist or cannot be read is a no-op.
    pub fn load(&mut self, path: &Path, as_allow: bool) {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::debug!(path = %path.display(), %err, "policy list not loaded");
                return;
            }
        };
        if as_allow {
            self.allow.extend_from(&content);
        } else {
            self.deny.extend_from(&content);
        }
    }

    /// Allowed entries for a category; `None` skips the allow checks.
    pub fn allowed(&self, category: &str) -> Option<&IndexSet<String>> {
        self.allow.category(category)
    }

    /// Denied entries for a category; `None` skips the deny checks.
    pub fn denied(&self, category: &str) -> Option<&IndexSet<String>> {
        self.deny.category(category)
    }
}
