//! Command line arguments.

use crate::config::ValidationConfig;
use crate::RuleCategory;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "rtplan-preflight",
    version,
    about = "Rule-based QA of radiotherapy plan snapshots",
    after_help = "EXIT CODES:\n    0   No errors or warnings\n    1   One or more errors\n    2   Warnings only (no errors)\n    3   Runtime error"
)]
pub struct Args {
    /// Plan snapshot (JSON)
    #[arg(long)]
    pub snapshot: PathBuf,

    /// Clinic configuration (JSON); defaults apply to missing keys
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Run validators in parallel
    #[arg(long, default_value_t = false)]
    pub parallel: bool,

    /// Per-validator time budget in milliseconds (0 disables it)
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Skip a rule category (repeatable)
    #[arg(long, value_name = "CATEGORY", value_parser = parse_category)]
    pub skip: Vec<RuleCategory>,

    /// Only print errors and warnings
    #[arg(long, short)]
    pub quiet: bool,

    /// Debug logging to stderr
    #[arg(long, short)]
    pub verbose: bool,

    /// Log as JSON lines
    #[arg(long)]
    pub log_json: bool,
}

fn parse_category(s: &str) -> Result<RuleCategory, String> {
    RuleCategory::from_key(s).ok_or_else(|| {
        let valid: Vec<&str> = RuleCategory::ALL.iter().map(|c| c.key()).collect();
        format!("unknown category '{}' (expected one of: {})", s, valid.join(", "))
    })
}

impl Args {
    /// Apply command line overrides on top of a loaded config
    pub fn apply_to(&self, config: &mut ValidationConfig) {
        if self.parallel {
            config.parallel = true;
        }
        if let Some(ms) = self.timeout_ms {
            config.validator_timeout_ms = ms;
        }
        for category in &self.skip {
            if !config.skip_categories.contains(category) {
                config.skip_categories.push(*category);
            }
        }
    }
}
