//! Result aggregation and reporting.
//!
//! Concatenates rule findings in run order and summarizes them by severity.

use crate::{RuleCategory, Severity, ValidationFinding};
use serde::{Deserialize, Serialize};

/// Finding counts by severity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub errors: u32,
    pub warnings: u32,
    pub infos: u32,
    pub total: u32,
}

impl ReportSummary {
    fn of(findings: &[ValidationFinding]) -> Self {
        let mut summary = ReportSummary::default();
        for finding in findings {
            summary.total += 1;
            match finding.severity {
                Severity::Error => summary.errors += 1,
                Severity::Warning => summary.warnings += 1,
                Severity::Info => summary.infos += 1,
            }
        }
        summary
    }
}

/// Ordered findings of one run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_id: Option<String>,
    pub findings: Vec<ValidationFinding>,
    pub duration_ms: u64,
}

impl ValidationReport {
    /// Calculate summary statistics
    pub fn summary(&self) -> ReportSummary {
        ReportSummary::of(&self.findings)
    }

    pub fn has_errors(&self) -> bool {
        self.findings.iter().any(|f| f.severity == Severity::Error)
    }

    pub fn has_warnings(&self) -> bool {
        self.findings.iter().any(|f| f.severity == Severity::Warning)
    }

    /// Findings grouped by category, categories in first-seen order
    pub fn grouped(&self) -> Vec<(RuleCategory, Vec<&ValidationFinding>)> {
        let mut groups: Vec<(RuleCategory, Vec<&ValidationFinding>)> = Vec::new();
        for finding in &self.findings {
            match groups.iter_mut().find(|(c, _)| *c == finding.category) {
                Some((_, group)) => group.push(finding),
                None => groups.push((finding.category, vec![finding])),
            }
        }
        groups
    }
}

/// Result aggregator for collecting rule findings
#[derive(Debug, Default)]
pub struct ResultAggregator {
    findings: Vec<ValidationFinding>,
    plan_id: Option<String>,
    duration_ms: u64,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_plan_id(&mut self, plan_id: String) {
        self.plan_id = Some(plan_id);
    }

    pub fn set_duration_ms(&mut self, duration_ms: u64) {
        self.duration_ms = duration_ms;
    }

    /// Append one rule's findings, keeping their order
    pub fn add_findings(&mut self, findings: Vec<ValidationFinding>) {
        self.findings.extend(findings);
    }

    pub fn has_errors(&self) -> bool {
        self.findings.iter().any(|f| f.severity == Severity::Error)
    }

    pub fn summary(&self) -> ReportSummary {
        ReportSummary::of(&self.findings)
    }

    pub fn by_category(&self, category: RuleCategory) -> Vec<&ValidationFinding> {
        self.findings
            .iter()
            .filter(|f| f.category == category)
            .collect()
    }

    /// Create final validation report
    pub fn to_report(&self) -> ValidationReport {
        ValidationReport {
            plan_id: self.plan_id.clone(),
            findings: self.findings.clone(),
            duration_ms: self.duration_ms,
        }
    }
}
