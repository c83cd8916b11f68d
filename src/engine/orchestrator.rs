//! Rule execution orchestrator.
//!
//! Builds the shared validation context once, then runs every enabled rule
//! against it, either sequentially or one scoped thread per rule.
//!
//! # Graceful Degradation
//!
//! This module handles errors gracefully:
//! - Missing plan, structure set or image: the rule contributes no findings
//! - Rule panics: caught via std::panic::catch_unwind, converted to one
//!   sanitized Warning
//! - Rule errors: converted to the same sanitized Warning, raw text is logged
//! - Deadline expiry: the rule is skipped with an Info finding
//! - Empty rule list: returns an empty report (not an error)
//!
//! Findings are always reported in registration order, whichever execution
//! mode ran. No function in this module will panic.

use crate::catalog::StructureCatalog;
use crate::config::ValidationConfig;
use crate::engine::deadline::Deadline;
use crate::engine::result::{ResultAggregator, ValidationReport};
use crate::goals::{ConstraintIndex, DoseConstraintParser};
use crate::model::PlanSnapshot;
use crate::rules::{all_validators, RuleError, RuleValidator, ValidationContext};
use crate::{RuleCategory, ValidationFinding};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::{Duration, Instant};

/// Orchestrator configuration
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub parallel: bool,
    /// Per-rule time budget; 0 disables the deadline
    pub timeout_ms: u64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        OrchestratorConfig {
            parallel: false,
            timeout_ms: 30000,
        }
    }
}

impl From<&ValidationConfig> for OrchestratorConfig {
    fn from(config: &ValidationConfig) -> Self {
        OrchestratorConfig {
            parallel: config.parallel,
            timeout_ms: config.validator_timeout_ms,
        }
    }
}

/// Rule orchestrator
pub struct RuleOrchestrator<'c> {
    config: OrchestratorConfig,
    validation: &'c ValidationConfig,
    rules: Vec<Box<dyn RuleValidator>>,
}

impl<'c> RuleOrchestrator<'c> {
    /// Create an orchestrator with no rules registered
    pub fn new(validation: &'c ValidationConfig) -> Self {
        RuleOrchestrator {
            config: OrchestratorConfig::from(validation),
            validation,
            rules: Vec::new(),
        }
    }

    /// Create an orchestrator with the standard rule set
    pub fn with_all_rules(validation: &'c ValidationConfig) -> Self {
        let mut orchestrator = Self::new(validation);
        orchestrator.register_rules(all_validators());
        orchestrator
    }

    /// Override execution settings taken from the validation config
    pub fn with_config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn register_rules(&mut self, rules: Vec<Box<dyn RuleValidator>>) {
        self.rules.extend(rules);
    }

    pub fn register_rule(&mut self, rule: Box<dyn RuleValidator>) {
        self.rules.push(rule);
    }

    /// Categories that will run, in order
    pub fn enabled_categories(&self) -> Vec<RuleCategory> {
        self.enabled_rules().iter().map(|r| r.category()).collect()
    }

    fn enabled_rules(&self) -> Vec<&dyn RuleValidator> {
        self.rules
            .iter()
            .filter(|r| self.validation.is_category_enabled(r.category()))
            .map(|r| r.as_ref() as &dyn RuleValidator)
            .collect()
    }

    /// Run all enabled rules against `plan`
    pub fn run(&self, plan: Option<&PlanSnapshot>) -> ValidationReport {
        let start = Instant::now();
        let empty = PlanSnapshot::default();

        let constraints = match plan {
            Some(p) => {
                let parser = DoseConstraintParser::new(p.total_dose_gy)
                    .with_percent_reading(self.validation.percent_dose_reading);
                ConstraintIndex::build(parser.parse_all(&p.goals))
            }
            None => ConstraintIndex::default(),
        };
        let ctx = ValidationContext {
            plan,
            catalog: StructureCatalog::build(plan.unwrap_or(&empty), self.validation),
            constraints,
            config: self.validation,
        };

        let rules = self.enabled_rules();
        let outcomes = if self.config.parallel {
            self.run_parallel(&rules, &ctx)
        } else {
            self.run_sequential(&rules, &ctx)
        };

        let mut aggregator = ResultAggregator::new();
        for findings in outcomes {
            aggregator.add_findings(findings);
        }
        aggregator.set_duration_ms(start.elapsed().as_millis() as u64);
        if let Some(p) = plan {
            aggregator.set_plan_id(p.plan_id.clone());
        }
        aggregator.to_report()
    }

    fn run_sequential(
        &self,
        rules: &[&dyn RuleValidator],
        ctx: &ValidationContext<'_>,
    ) -> Vec<Vec<ValidationFinding>> {
        rules.iter().map(|rule| self.execute_rule(*rule, ctx)).collect()
    }

    fn run_parallel(
        &self,
        rules: &[&dyn RuleValidator],
        ctx: &ValidationContext<'_>,
    ) -> Vec<Vec<ValidationFinding>> {
        use std::thread;

        thread::scope(|s| {
            let handles: Vec<_> = rules
                .iter()
                .map(|rule| {
                    let rule = *rule;
                    (rule.category(), s.spawn(move || self.execute_rule(rule, ctx)))
                })
                .collect();

            // Join in registration order so output matches sequential runs
            handles
                .into_iter()
                .map(|(category, handle)| match handle.join() {
                    Ok(findings) => findings,
                    Err(_) => vec![fault_finding(category)],
                })
                .collect()
        })
    }

    /// Execute a single rule inside its fault boundary
    fn execute_rule(
        &self,
        rule: &dyn RuleValidator,
        ctx: &ValidationContext<'_>,
    ) -> Vec<ValidationFinding> {
        let category = rule.category();
        let deadline = if self.config.timeout_ms == 0 {
            Deadline::none()
        } else {
            Deadline::after(Duration::from_millis(self.config.timeout_ms))
        };

        tracing::debug!(category = category.key(), "rule started");
        let start = Instant::now();
        let result = catch_unwind(AssertUnwindSafe(|| rule.validate(ctx, deadline)));
        let elapsed_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(Ok(findings)) => {
                tracing::debug!(
                    category = category.key(),
                    findings = findings.len(),
                    elapsed_ms,
                    "rule finished"
                );
                findings
            }
            Ok(Err(RuleError::MissingPrerequisite(what))) => {
                tracing::debug!(category = category.key(), missing = what, "rule not applicable");
                Vec::new()
            }
            Ok(Err(RuleError::DeadlineExceeded)) => {
                tracing::warn!(
                    category = category.key(),
                    elapsed_ms,
                    budget_ms = self.config.timeout_ms,
                    "rule exceeded time budget"
                );
                vec![ValidationFinding::info(
                    category,
                    format!("{} skipped: exceeded time budget", category),
                )]
            }
            Ok(Err(RuleError::Internal(detail))) => {
                tracing::warn!(category = category.key(), error = %detail, "rule failed");
                vec![fault_finding(category)]
            }
            Err(payload) => {
                let detail = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                tracing::warn!(category = category.key(), panic = %detail, "rule panicked");
                vec![fault_finding(category)]
            }
        }
    }
}

/// The sanitized stand-in for a faulted rule.
fn fault_finding(category: RuleCategory) -> ValidationFinding {
    ValidationFinding::warning(
        category,
        format!("Validation error occurred for category {}", category),
    )
}
