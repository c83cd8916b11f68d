//! Validation configuration.
//!
//! Clinic differences are expressed as data: every threshold, prefix and
//! exclusion set lives here and is passed explicitly into each validator.
//! A JSON file only needs to name the keys it overrides.

use crate::{PreflightError, RuleCategory};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name prefixes identifying target volumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetPrefixes {
    pub ptv: String,
    pub ctv: String,
    pub gtv: String,
}

impl Default for TargetPrefixes {
    fn default() -> Self {
        TargetPrefixes {
            ptv: "PTV".to_string(),
            ctv: "CTV".to_string(),
            gtv: "GTV".to_string(),
        }
    }
}

impl TargetPrefixes {
    pub fn all(&self) -> [&str; 3] {
        [&self.ptv, &self.ctv, &self.gtv]
    }
}

/// How the suffix left after stripping a target prefix is compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SuffixConvention {
    /// Leading `_`, `-` and spaces are trimmed, so `PTV_1` matches `CTV1`
    #[default]
    TrimSeparator,
    /// Suffix compared as-is, so `PTV_1` only matches `CTV_1`
    Raw,
}

/// Which `%` value a goal's text yields when no structured dose is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PercentDoseReading {
    /// First number followed by `%`, so `D2% < 107%` reads 2
    #[default]
    First,
    /// Value next to the comparison operator, so `D2% < 107%` reads 107.
    /// Volume goals still read their first percentage.
    OperatorAdjacent,
}

/// Validation thresholds and exclusion sets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub target_prefixes: TargetPrefixes,
    /// Id of the external contour; an EXTERNAL-typed structure is used when no id matches
    pub body_structure_id: String,
    /// Exact ids never checked for goal coverage (case-insensitive)
    pub excluded_structure_ids: Vec<String>,
    /// `abc*` prefix, `*abc` suffix, `*abc*` substring, otherwise exact
    pub excluded_name_patterns: Vec<String>,
    pub body_proximity_threshold_mm: f64,
    pub resolution_critical_volume_cc: f64,
    pub resolution_warning_volume_cc: f64,
    pub sib_dose_difference_percent: f64,
    pub suffix_convention: SuffixConvention,
    pub percent_dose_reading: PercentDoseReading,
    /// Per-validator time budget
    pub validator_timeout_ms: u64,
    pub parallel: bool,
    pub skip_categories: Vec<RuleCategory>,
    /// Vertex-pair count above which nearest-vertex search uses an R-tree
    pub spatial_index_threshold: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        ValidationConfig {
            target_prefixes: TargetPrefixes::default(),
            body_structure_id: "BODY".to_string(),
            excluded_structure_ids: vec!["BODY".to_string(), "External".to_string()],
            excluded_name_patterns: vec![
                "z_*".to_string(),
                "*wire*".to_string(),
                "Implant*".to_string(),
            ],
            body_proximity_threshold_mm: 4.0,
            resolution_critical_volume_cc: 5.0,
            resolution_warning_volume_cc: 10.0,
            sib_dose_difference_percent: 6.0,
            suffix_convention: SuffixConvention::TrimSeparator,
            percent_dose_reading: PercentDoseReading::First,
            validator_timeout_ms: 30000,
            parallel: false,
            skip_categories: Vec::new(),
            spatial_index_threshold: 250_000,
        }
    }
}

impl ValidationConfig {
    /// Load a configuration file and validate it.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, PreflightError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| PreflightError::Io {
            context: format!("reading config {}", path.display()),
            source,
        })?;
        let config: ValidationConfig =
            serde_json::from_str(&content).map_err(|source| PreflightError::Config {
                path: path.display().to_string(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject thresholds that would make the rules meaningless.
    pub fn validate(&self) -> Result<(), PreflightError> {
        let thresholds = [
            ("body_proximity_threshold_mm", self.body_proximity_threshold_mm),
            ("resolution_critical_volume_cc", self.resolution_critical_volume_cc),
            ("resolution_warning_volume_cc", self.resolution_warning_volume_cc),
            ("sib_dose_difference_percent", self.sib_dose_difference_percent),
        ];
        for (name, value) in thresholds {
            if !value.is_finite() || value < 0.0 {
                return Err(PreflightError::InvalidConfig(format!(
                    "{} must be a finite non-negative number",
                    name
                )));
            }
        }
        if self.resolution_critical_volume_cc > self.resolution_warning_volume_cc {
            return Err(PreflightError::InvalidConfig(
                "resolution_critical_volume_cc exceeds resolution_warning_volume_cc".to_string(),
            ));
        }
        if self.target_prefixes.all().iter().any(|p| p.is_empty()) {
            return Err(PreflightError::InvalidConfig(
                "target prefixes must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn is_category_enabled(&self, category: RuleCategory) -> bool {
        !self.skip_categories.contains(&category)
    }
}
