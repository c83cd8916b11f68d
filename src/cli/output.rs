//! Output formatting for rtplan-preflight.
//!
//! Provides plain text and JSON report formatters.
//!
//! # Graceful Degradation
//!
//! - Empty reports: produce valid output with zero findings
//! - Serialization failure: the JSON formatter falls back to an error object
//!
//! No function in this module will panic.

use crate::cli::args::OutputFormat;
use crate::engine::result::{ReportSummary, ValidationReport};
use crate::{Severity, ValidationFinding};
use serde::Serialize;

const RULE: &str = "--------------------------------------------------------------------------------";

/// Trait for output formatters
pub trait OutputFormatter {
    /// Format a validation report into a string
    fn format(&self, report: &ValidationReport) -> String;
}

/// Plain text formatter, grouped by category in run order
pub struct TextFormatter {
    quiet: bool,
}

impl TextFormatter {
    pub fn new(quiet: bool) -> Self {
        TextFormatter { quiet }
    }

    fn shown(&self, finding: &ValidationFinding) -> bool {
        !self.quiet || finding.severity != Severity::Info
    }
}

impl OutputFormatter for TextFormatter {
    fn format(&self, report: &ValidationReport) -> String {
        let mut output = String::new();

        output.push_str(RULE);
        output.push('\n');
        output.push_str("rtplan-preflight validation report\n");
        if let Some(ref plan_id) = report.plan_id {
            output.push_str(&format!("Plan: {}\n", plan_id));
        }
        output.push_str(RULE);
        output.push_str("\n\n");

        for (category, findings) in report.grouped() {
            let shown: Vec<_> = findings.into_iter().filter(|f| self.shown(f)).collect();
            if shown.is_empty() {
                continue;
            }
            output.push_str(&format!("{}\n", category.to_string().to_uppercase()));
            for finding in shown {
                output.push_str(&format!("  [{}] {}\n", finding.severity, finding.message));
            }
            output.push('\n');
        }

        let summary = report.summary();
        output.push_str(RULE);
        output.push('\n');
        output.push_str(&format!(
            "SUMMARY: {} errors, {} warnings, {} info\n",
            summary.errors, summary.warnings, summary.infos
        ));
        output.push_str(&format!(
            "Total time: {:.1}s\n",
            report.duration_ms as f64 / 1000.0
        ));
        output.push_str(&format!(
            "Exit code: {} ({})\n",
            exit_code(&summary),
            exit_description(&summary)
        ));
        output.push_str(RULE);

        output
    }
}

/// JSON formatter
pub struct JsonFormatter {
    pretty: bool,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    #[serde(flatten)]
    report: &'a ValidationReport,
    summary: ReportSummary,
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        JsonFormatter { pretty }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format(&self, report: &ValidationReport) -> String {
        let doc = JsonReport {
            report,
            summary: report.summary(),
        };
        let result = if self.pretty {
            serde_json::to_string_pretty(&doc)
        } else {
            serde_json::to_string(&doc)
        };
        result.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "report serialization failed");
            serde_json::json!({ "error": "report serialization failed" }).to_string()
        })
    }
}

/// Process exit code for a summary: 1 errors, 2 warnings only, 0 otherwise
pub fn exit_code(summary: &ReportSummary) -> u8 {
    if summary.errors > 0 {
        1
    } else if summary.warnings > 0 {
        2
    } else {
        0
    }
}

fn exit_description(summary: &ReportSummary) -> &'static str {
    match exit_code(summary) {
        1 => "errors detected",
        2 => "warnings detected",
        _ => "all rules passed",
    }
}

/// Get the appropriate formatter for the output format
pub fn get_formatter(format: OutputFormat, quiet: bool) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::Text => Box::new(TextFormatter::new(quiet)),
        OutputFormat::Json => Box::new(JsonFormatter::new(true)),
    }
}
