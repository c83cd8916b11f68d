//! Full run integration tests.
//!
//! Tests for complete validation runs, including orchestration, fault
//! isolation, deadlines and result aggregation.

use crate::mocks::*;
use rtplan_preflight::engine::deadline::Deadline;
use rtplan_preflight::engine::orchestrator::{OrchestratorConfig, RuleOrchestrator};
use rtplan_preflight::model::DicomType;
use rtplan_preflight::rules::{all_validators, RuleResult, RuleValidator, ValidationContext};
use rtplan_preflight::{run_validation, RuleCategory, Severity, ValidationConfig, ValidationFinding};
use std::time::Duration;

/// A rule that always panics
struct PanickingRule(RuleCategory);

impl RuleValidator for PanickingRule {
    fn category(&self) -> RuleCategory {
        self.0
    }

    fn validate(&self, ctx: &ValidationContext<'_>, _deadline: Deadline) -> RuleResult {
        let plan = ctx.require_plan()?;
        panic!("patient {} leaked", plan.plan_id);
    }
}

/// A rule that outlives its budget and then checks it
struct SlowRule;

impl RuleValidator for SlowRule {
    fn category(&self) -> RuleCategory {
        RuleCategory::OverlapConflict
    }

    fn validate(&self, _ctx: &ValidationContext<'_>, deadline: Deadline) -> RuleResult {
        std::thread::sleep(Duration::from_millis(20));
        deadline.check()?;
        Ok(vec![ValidationFinding::info(self.category(), "finished")])
    }
}

#[test]
fn test_clean_plan_has_only_info() {
    let plan = clean_plan();
    let report = run_validation(Some(&plan), &ValidationConfig::default());

    let summary = report.summary();
    assert_eq!(summary.errors, 0, "{:#?}", report.findings);
    assert_eq!(summary.warnings, 0, "{:#?}", report.findings);
    assert_eq!(report.plan_id.as_deref(), Some("TestPlan"));

    // One summary line per category, SIB is silent when not SIB
    let categories: Vec<_> = report.findings.iter().map(|f| f.category).collect();
    assert_eq!(
        categories,
        vec![
            RuleCategory::StructureType,
            RuleCategory::Coverage,
            RuleCategory::Containment,
            RuleCategory::Resolution,
            RuleCategory::OverlapConflict,
            RuleCategory::BodyProximity,
        ]
    );
}

#[test]
fn test_idempotent() {
    let plan = clean_plan();
    let config = ValidationConfig::default();
    let first = run_validation(Some(&plan), &config);
    let second = run_validation(Some(&plan), &config);
    assert_eq!(first.findings, second.findings);
}

#[test]
fn test_parallel_matches_sequential() {
    let plan = PlanBuilder::new()
        .total_dose(70.0)
        .structure(MockStructure::body().circles(0.0, 0.0, 100.0, 90, 0..60))
        .prescribed(MockStructure::ptv("PTV_70").volume(4.0).squares(0.0, 0.0, 20.0, 10..30))
        .prescribed(MockStructure::ctv("CTV_70").squares(5.0, 0.0, 20.0, 12..28))
        .prescribed(MockStructure::ptv("PTV_54").volume(8.0).squares(0.0, 90.0, 5.0, 10..30))
        .structure(MockStructure::oar("Cord").circles(0.0, 15.0, 8.0, 24, 0..60))
        .structure(MockStructure::oar("Parotid_R"))
        .goal("PTV_70", "D95% ≥ 70 Gy")
        .goal("PTV_54", "D95% ≥ 54 Gy")
        .goal("Cord", "Dmax < 45 Gy")
        .goal("CTV_70", "D98% > 95%")
        .build();

    let sequential = run_validation(Some(&plan), &ValidationConfig::default());
    let parallel = run_validation(
        Some(&plan),
        &ValidationConfig {
            parallel: true,
            ..ValidationConfig::default()
        },
    );

    assert_eq!(sequential.findings, parallel.findings);
    let summary = sequential.summary();
    assert!(summary.errors >= 3, "{:#?}", sequential.findings);
    assert!(summary.warnings >= 2, "{:#?}", sequential.findings);
}

#[test]
fn test_missing_plan_is_empty() {
    let report = run_validation(None, &ValidationConfig::default());
    assert!(report.findings.is_empty());
}

#[test]
fn test_missing_structure_set_is_empty() {
    let plan = PlanBuilder::new()
        .without_structure_set()
        .goal("PTV_1", "D95% ≥ 60 Gy")
        .build();
    let report = run_validation(Some(&plan), &ValidationConfig::default());
    assert!(report.findings.is_empty());
}

#[test]
fn test_missing_image_skips_geometry_rules_only() {
    let plan = PlanBuilder::new()
        .without_image()
        .prescribed(MockStructure::ptv("PTV_1").volume(20.0).squares(0.0, 0.0, 20.0, 5..25))
        .prescribed(MockStructure::ctv("CTV_1").squares(0.0, 0.0, 30.0, 5..25))
        .goal("PTV_1", "D95% ≥ 60 Gy")
        .goal("CTV_1", "D95% ≥ 60 Gy")
        .build();
    let report = run_validation(Some(&plan), &ValidationConfig::default());

    assert!(report
        .findings
        .iter()
        .all(|f| {
            f.category != RuleCategory::Containment && f.category != RuleCategory::OverlapConflict
        }));
    assert!(report.findings.iter().any(|f| f.category == RuleCategory::Coverage));
}

#[test]
fn test_panicking_rule_is_isolated() {
    let plan = clean_plan();
    let config = ValidationConfig::default();
    let mut orchestrator = RuleOrchestrator::new(&config);
    orchestrator.register_rule(Box::new(PanickingRule(RuleCategory::Resolution)));
    orchestrator.register_rules(all_validators());
    let report = orchestrator.run(Some(&plan));

    let first = &report.findings[0];
    assert_eq!(first.severity, Severity::Warning);
    assert_eq!(first.message, "Validation error occurred for category Contour Resolution");
    assert!(report.findings.iter().all(|f| !f.message.contains("patient")));
    assert!(report
        .findings
        .iter()
        .any(|f| f.category == RuleCategory::BodyProximity));
}

#[test]
fn test_panicking_rule_is_isolated_in_parallel() {
    let plan = clean_plan();
    let config = ValidationConfig::default();
    let mut orchestrator = RuleOrchestrator::new(&config).with_config(OrchestratorConfig {
        parallel: true,
        timeout_ms: 0,
    });
    orchestrator.register_rules(all_validators());
    orchestrator.register_rule(Box::new(PanickingRule(RuleCategory::Coverage)));
    let report = orchestrator.run(Some(&plan));

    let last = report.findings.last().unwrap();
    assert_eq!(last.severity, Severity::Warning);
    assert_eq!(last.category, RuleCategory::Coverage);
}

#[test]
fn test_deadline_skips_rule_with_info() {
    let plan = clean_plan();
    let config = ValidationConfig::default();
    let mut orchestrator = RuleOrchestrator::new(&config).with_config(OrchestratorConfig {
        parallel: false,
        timeout_ms: 1,
    });
    orchestrator.register_rule(Box::new(SlowRule));
    let report = orchestrator.run(Some(&plan));

    assert_eq!(report.findings.len(), 1);
    assert_eq!(report.findings[0].severity, Severity::Info);
    assert!(report.findings[0].message.contains("skipped: exceeded time budget"));
}

#[test]
fn test_skip_categories() {
    let plan = clean_plan();
    let config = ValidationConfig {
        skip_categories: vec![RuleCategory::BodyProximity, RuleCategory::Coverage],
        ..ValidationConfig::default()
    };
    let report = run_validation(Some(&plan), &config);
    assert!(report.findings.iter().all(|f| {
        f.category != RuleCategory::BodyProximity && f.category != RuleCategory::Coverage
    }));
    assert!(!report.findings.is_empty());
}

#[test]
fn test_report_grouping_follows_run_order() {
    let plan = PlanBuilder::new()
        .prescribed(MockStructure::new("PTV_1", DicomType::Oar).volume(3.0))
        .structure(MockStructure::oar("Lens_L"))
        .build();
    let report = run_validation(Some(&plan), &ValidationConfig::default());
    let groups = report.grouped();

    assert_eq!(groups[0].0, RuleCategory::StructureType);
    assert_eq!(groups[1].0, RuleCategory::Coverage);
    assert!(report.has_errors());
}
