//! rtplan-preflight library
//!
//! Rule-based quality assurance for radiotherapy treatment plans.
//!
//! Given a snapshot of a plan's structures, their contour geometry and the
//! clinical goals attached to them, the engine checks:
//! - Structure naming against DICOM types
//! - Clinical goal coverage of every eligible structure
//! - Target containment (CTV/GTV inside PTV)
//! - Target/OAR dose conflicts on overlapping structures
//! - Contouring resolution of small targets
//! - Dose units of simultaneously integrated boost (SIB) plans
//! - Target proximity to the body surface
//!
//! and returns severity-tagged findings.
//!
//! # Example
//!
//! ```no_run
//! use rtplan_preflight::{run_validation, ValidationConfig};
//! use rtplan_preflight::model::PlanSnapshot;
//!
//! let json = std::fs::read_to_string("plan.json").unwrap();
//! let plan: PlanSnapshot = serde_json::from_str(&json).unwrap();
//! let report = run_validation(Some(&plan), &ValidationConfig::default());
//! println!("Errors: {}", report.summary().errors);
//! ```

pub mod catalog;
pub mod cli;
pub mod config;
pub mod engine;
pub mod geometry;
pub mod goals;
pub mod model;
pub mod rules;

use engine::orchestrator::RuleOrchestrator;
use model::PlanSnapshot;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// Re-exports for public API
pub use config::ValidationConfig;
pub use engine::result::{ReportSummary, ResultAggregator, ValidationReport};

/// Finding severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Warning => write!(f, "WARNING"),
            Severity::Info => write!(f, "INFO"),
        }
    }
}

/// Rule category for grouping findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleCategory {
    /// Every eligible structure has a clinical goal
    Coverage,
    /// CTV/GTV lie inside their PTV
    Containment,
    /// Target lower goals vs. overlapping OAR Dmax goals
    OverlapConflict,
    /// High-resolution contouring of small targets
    Resolution,
    /// Target name prefix matches DICOM type
    StructureType,
    /// Absolute dose units in SIB plans
    SibDoseUnits,
    /// Target distance to the body surface
    BodyProximity,
}

impl RuleCategory {
    pub const ALL: [RuleCategory; 7] = [
        RuleCategory::StructureType,
        RuleCategory::Coverage,
        RuleCategory::Containment,
        RuleCategory::Resolution,
        RuleCategory::OverlapConflict,
        RuleCategory::SibDoseUnits,
        RuleCategory::BodyProximity,
    ];

    /// Stable command-line / config name.
    pub fn key(&self) -> &'static str {
        match self {
            RuleCategory::Coverage => "coverage",
            RuleCategory::Containment => "containment",
            RuleCategory::OverlapConflict => "overlap-conflict",
            RuleCategory::Resolution => "resolution",
            RuleCategory::StructureType => "structure-type",
            RuleCategory::SibDoseUnits => "sib-dose-units",
            RuleCategory::BodyProximity => "body-proximity",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        RuleCategory::ALL
            .into_iter()
            .find(|c| c.key().eq_ignore_ascii_case(key.trim()))
    }
}

impl fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleCategory::Coverage => write!(f, "Clinical Goal Coverage"),
            RuleCategory::Containment => write!(f, "Target Containment"),
            RuleCategory::OverlapConflict => write!(f, "Target/OAR Dose Conflicts"),
            RuleCategory::Resolution => write!(f, "Contour Resolution"),
            RuleCategory::StructureType => write!(f, "Structure Types"),
            RuleCategory::SibDoseUnits => write!(f, "SIB Dose Units"),
            RuleCategory::BodyProximity => write!(f, "Body Proximity"),
        }
    }
}

/// One result of a rule.
///
/// Messages name structures by id only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationFinding {
    pub category: RuleCategory,
    pub message: String,
    pub severity: Severity,
    /// Presentation hint for hosts that collapse per-field results
    #[serde(default)]
    pub is_field_result: bool,
}

impl ValidationFinding {
    pub fn new(category: RuleCategory, severity: Severity, message: impl Into<String>) -> Self {
        ValidationFinding {
            category,
            message: message.into(),
            severity,
            is_field_result: false,
        }
    }

    pub fn error(category: RuleCategory, message: impl Into<String>) -> Self {
        Self::new(category, Severity::Error, message)
    }

    pub fn warning(category: RuleCategory, message: impl Into<String>) -> Self {
        Self::new(category, Severity::Warning, message)
    }

    pub fn info(category: RuleCategory, message: impl Into<String>) -> Self {
        Self::new(category, Severity::Info, message)
    }
}

impl fmt::Display for ValidationFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)
    }
}

/// Error types for loading inputs.
///
/// Validation itself never fails; these only cover the host boundary.
#[derive(Debug, Error)]
pub enum PreflightError {
    #[error("I/O error while {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Config {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("invalid plan snapshot {path}: {source}")]
    Snapshot {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Load a plan snapshot from a JSON file.
pub fn load_snapshot(path: impl AsRef<std::path::Path>) -> Result<PlanSnapshot, PreflightError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| PreflightError::Io {
        context: format!("reading snapshot {}", path.display()),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| PreflightError::Snapshot {
        path: path.display().to_string(),
        source,
    })
}

/// Run every enabled validator against a plan.
///
/// This is the main entry point. It always completes: a missing plan yields
/// an empty report, and a failing validator contributes a single sanitized
/// warning instead of aborting the run.
///
/// # Example
///
/// ```
/// use rtplan_preflight::{run_validation, ValidationConfig};
///
/// let report = run_validation(None, &ValidationConfig::default());
/// assert!(report.findings.is_empty());
/// ```
pub fn run_validation(plan: Option<&PlanSnapshot>, config: &ValidationConfig) -> ValidationReport {
    RuleOrchestrator::with_all_rules(config).run(plan)
}
