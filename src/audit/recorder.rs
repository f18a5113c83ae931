//! Pass/fail bookkeeping and the structured audit report tree.
//!
//! Every auditor finding flows through [`CheckRecorder::record`]-family
//! methods. Each outcome increments exactly one pass/fail counter in
//! exactly one tier, and lands in exactly one report section. Console
//! output is delegated to an optional [`CheckObserver`] and never affects
//! counter state, so the recorder is usable headlessly.

use serde::Serialize;

/// Outcome state of a single check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckState {
    Pass,
    Fail,
}

/// Which counter family a check belongs to.
///
/// Ordinary checks measure baseline SBOM quality; policy checks are
/// governed by organization-configurable rules (allow/deny lists and
/// freshness thresholds) and are tallied separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckTier {
    Ordinary,
    Policy,
}

/// One recorded outcome as it appears in the report tree.
#[derive(Debug, Clone, Serialize)]
pub struct CheckEntry {
    pub text: String,
    pub state: CheckState,
}

/// Pass/fail tallies for one tier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CheckCounts {
    pub passed: usize,
    pub failed: usize,
}

impl CheckCounts {
    pub fn total(&self) -> usize {
        self.passed + self.failed
    }
}

/// Outcomes for one file or package subject.
#[derive(Debug, Clone, Serialize)]
pub struct SubjectReport {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub reports: Vec<CheckEntry>,
}

/// The audit report tree, built incrementally section by section and never
/// restructured after a section is appended.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AuditReport {
    pub metadata: Vec<CheckEntry>,
    pub files: Vec<SubjectReport>,
    pub packages: Vec<SubjectReport>,
    pub relationships: Vec<CheckEntry>,
    pub policy: Vec<CheckEntry>,
    pub summary: Vec<CheckEntry>,
}

/// Sink for human-facing audit output.
///
/// Implementations render; they hold no audit state.
pub trait CheckObserver {
    fn heading(&mut self, title: &str);
    fn passed(&mut self, text: &str);
    fn failed(&mut self, text: &str);
}

/// How a failed check is annotated in prose.
enum FailureNote {
    /// Default "MISSING" marker
    Missing,
    /// Bare subject: counted, but no annotation in prose
    Silent,
    /// Explicit annotation (usually the offending value)
    Detail(String),
}

/// Where an ordinary-tier entry is stored.
enum Sink {
    /// Buffer until the next section boundary
    Section,
    /// Straight into the flat policy section
    Policy,
    /// Straight into the summary section
    Summary,
}

/// Accumulates check outcomes for one audit run.
pub struct CheckRecorder<'a> {
    verbose: bool,
    checks: CheckCounts,
    policy_checks: CheckCounts,
    pending: Vec<CheckEntry>,
    report: AuditReport,
    observer: Option<&'a mut dyn CheckObserver>,
}

impl<'a> CheckRecorder<'a> {
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            checks: CheckCounts::default(),
            policy_checks: CheckCounts::default(),
            pending: Vec::new(),
            report: AuditReport::default(),
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: &'a mut dyn CheckObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Announce a section heading to the observer.
    pub fn heading(&mut self, title: &str) {
        if let Some(observer) = self.observer.as_deref_mut() {
            observer.heading(title);
        }
    }

    /// Ordinary check; failures carry the default "MISSING" marker.
    pub fn check(&mut self, text: impl Into<String>, passed: bool) {
        self.record(CheckTier::Ordinary, Sink::Section, text.into(), passed, FailureNote::Missing);
    }

    /// Ordinary check that fails silently in prose but is still counted.
    pub fn check_quiet(&mut self, text: impl Into<String>, passed: bool) {
        self.record(CheckTier::Ordinary, Sink::Section, text.into(), passed, FailureNote::Silent);
    }

    /// Ordinary check annotated with the offending value on failure.
    pub fn check_detail(&mut self, text: impl Into<String>, passed: bool, detail: impl Into<String>) {
        self.record(
            CheckTier::Ordinary,
            Sink::Section,
            text.into(),
            passed,
            FailureNote::Detail(detail.into()),
        );
    }

    /// Policy-tier check; stored in the flat policy section.
    pub fn policy_check(&mut self, text: impl Into<String>, passed: bool) {
        self.record(CheckTier::Policy, Sink::Policy, text.into(), passed, FailureNote::Missing);
    }

    /// Policy-tier check annotated with the offending value on failure.
    pub fn policy_check_detail(
        &mut self,
        text: impl Into<String>,
        passed: bool,
        detail: impl Into<String>,
    ) {
        self.record(
            CheckTier::Policy,
            Sink::Policy,
            text.into(),
            passed,
            FailureNote::Detail(detail.into()),
        );
    }

    /// Ordinary check recorded directly into the summary section (set-level
    /// validity and the final verdict).
    pub fn summary_check_detail(
        &mut self,
        text: impl Into<String>,
        passed: bool,
        detail: impl Into<String>,
    ) {
        self.record(
            CheckTier::Ordinary,
            Sink::Summary,
            text.into(),
            passed,
            FailureNote::Detail(detail.into()),
        );
    }

    /// Informational summary line: always shown, always stored, never
    /// counted. Used for the final tally, which is exempt from verbose
    /// suppression.
    pub fn summary_note(&mut self, text: impl Into<String>) {
        let text = text.into();
        if let Some(observer) = self.observer.as_deref_mut() {
            observer.passed(&text);
        }
        self.report.summary.push(CheckEntry {
            text,
            state: CheckState::Pass,
        });
    }

    fn record(&mut self, tier: CheckTier, sink: Sink, text: String, passed: bool, note: FailureNote) {
        let entry_text = if passed {
            text
        } else {
            match note {
                FailureNote::Missing => format!("{text}: MISSING"),
                FailureNote::Silent => text,
                FailureNote::Detail(detail) => format!("{text}: {detail}"),
            }
        };

        let counts = match tier {
            CheckTier::Ordinary => &mut self.checks,
            CheckTier::Policy => &mut self.policy_checks,
        };
        if passed {
            counts.passed += 1;
        } else {
            counts.failed += 1;
        }

        if let Some(observer) = self.observer.as_deref_mut() {
            if passed {
                if self.verbose {
                    observer.passed(&entry_text);
                }
            } else {
                observer.failed(&entry_text);
            }
        }

        // Passing outcomes only enter the report tree in verbose mode;
        // failures always do.
        if passed && !self.verbose {
            return;
        }
        let entry = CheckEntry {
            text: entry_text,
            state: if passed { CheckState::Pass } else { CheckState::Fail },
        };
        match sink {
            Sink::Section => self.pending.push(entry),
            Sink::Policy => self.report.policy.push(entry),
            Sink::Summary => self.report.summary.push(entry),
        }
    }

    /// Snapshot accumulated outcomes into the metadata section.
    pub fn section_metadata(&mut self) {
        let entries = std::mem::take(&mut self.pending);
        self.report.metadata.extend(entries);
    }

    /// Snapshot accumulated outcomes as one file's sub-list.
    pub fn section_file(&mut self, name: impl Into<String>, id: Option<String>) {
        self.report.files.push(SubjectReport {
            name: name.into(),
            id,
            version: None,
            reports: std::mem::take(&mut self.pending),
        });
    }

    /// Snapshot accumulated outcomes as one package's sub-list.
    pub fn section_package(&mut self, name: impl Into<String>, version: Option<String>) {
        self.report.packages.push(SubjectReport {
            name: name.into(),
            id: None,
            version,
            reports: std::mem::take(&mut self.pending),
        });
    }

    /// Snapshot accumulated outcomes into the relationships section.
    pub fn section_relationships(&mut self) {
        let entries = std::mem::take(&mut self.pending);
        self.report.relationships.extend(entries);
    }

    /// Total failures across both tiers, for section confirmations.
    pub fn failures(&self) -> usize {
        self.checks.failed + self.policy_checks.failed
    }

    /// In non-verbose mode, confirm a section that finished without new
    /// failures with a single green line.
    pub fn confirm_section(&mut self, label: &str, failures_before: usize) {
        if self.verbose || self.failures() != failures_before {
            return;
        }
        if let Some(observer) = self.observer.as_deref_mut() {
            observer.passed(label);
        }
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    pub fn counts(&self) -> &CheckCounts {
        &self.checks
    }

    pub fn policy_counts(&self) -> &CheckCounts {
        &self.policy_checks
    }

    pub fn into_report(self) -> AuditReport {
        self.report
    }
}
