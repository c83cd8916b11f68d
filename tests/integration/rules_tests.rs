//! Rule-level integration tests.
//!
//! Each test runs one rule category against a synthetic plan.

use crate::mocks::*;
use rtplan_preflight::catalog::StructureCatalog;
use rtplan_preflight::config::{PercentDoseReading, SuffixConvention};
use rtplan_preflight::engine::deadline::Deadline;
use rtplan_preflight::geometry::SpatialEngine;
use rtplan_preflight::goals::{ConstraintIndex, DoseConstraintParser};
use rtplan_preflight::model::{ClinicalGoalRecord, DicomType, DoseUnit, PlanSnapshot};
use rtplan_preflight::rules::containment::ContainmentRule;
use rtplan_preflight::rules::overlap_conflict::conflict_candidates;
use rtplan_preflight::rules::{RuleError, RuleValidator, ValidationContext};
use rtplan_preflight::{
    run_validation, RuleCategory, Severity, ValidationConfig, ValidationFinding,
};
use std::time::Duration;

fn only(category: RuleCategory) -> ValidationConfig {
    ValidationConfig {
        skip_categories: RuleCategory::ALL
            .into_iter()
            .filter(|c| *c != category)
            .collect(),
        ..ValidationConfig::default()
    }
}

fn run_only(category: RuleCategory, plan: &PlanSnapshot) -> Vec<ValidationFinding> {
    run_only_with(only(category), plan)
}

fn run_only_with(config: ValidationConfig, plan: &PlanSnapshot) -> Vec<ValidationFinding> {
    run_validation(Some(plan), &config).findings
}

fn count(findings: &[ValidationFinding], severity: Severity) -> usize {
    findings.iter().filter(|f| f.severity == severity).count()
}

fn context<'a>(plan: &'a PlanSnapshot, config: &'a ValidationConfig) -> ValidationContext<'a> {
    let parser = DoseConstraintParser::new(plan.total_dose_gy)
        .with_percent_reading(config.percent_dose_reading);
    ValidationContext {
        plan: Some(plan),
        catalog: StructureCatalog::build(plan, config),
        constraints: ConstraintIndex::build(parser.parse_all(&plan.goals)),
        config,
    }
}

// ---------------------------------------------------------------------------
// Geometry defaults
// ---------------------------------------------------------------------------

#[test]
fn test_missing_segment_defaults() {
    let grid = standard_grid();
    let engine = SpatialEngine::new(&grid);
    let ghost = MockStructure::ptv("PTV_1")
        .squares(0.0, 0.0, 50.0, 0..10)
        .without_segment()
        .build();
    let other = MockStructure::oar("Cord").squares(0.0, 0.0, 10.0, 0..10).build();
    let far = MockStructure::oar("Far").squares(90.0, 90.0, 5.0, 0..10).build();

    for s in [&other, &far] {
        assert!(engine.is_contained(&ghost, s).unwrap());
        assert!(engine.is_contained(s, &ghost).unwrap());
        assert!(!engine.overlaps(&ghost, s).unwrap());
        assert!(!engine.overlaps(s, &ghost).unwrap());
    }
}

#[test]
fn test_percent_dose_without_total_is_null() {
    let parser = DoseConstraintParser::new(None);
    for objective in ["D95% ≥ 95%", "Dmax < 107 %", "Mean dose at most 50%"] {
        let c = parser.parse(&ClinicalGoalRecord::new("PTV_1", objective), 0);
        assert_eq!(c.dose_gy, None, "{}", objective);
    }
}

// ---------------------------------------------------------------------------
// Coverage
// ---------------------------------------------------------------------------

#[test]
fn test_coverage_warns_only_for_uncovered() {
    let plan = PlanBuilder::new()
        .prescribed(MockStructure::ptv("PTV_1"))
        .structure(MockStructure::oar("OAR_A"))
        .goal("PTV_1", "D95% ≥ 60 Gy")
        .build();
    let findings = run_only(RuleCategory::Coverage, &plan);

    assert_eq!(count(&findings, Severity::Warning), 1);
    assert!(findings[0].message.contains("OAR_A"));
    assert!(!findings.iter().any(|f| f.message.contains("PTV_1")));
}

#[test]
fn test_coverage_ignores_excluded_structures() {
    let plan = PlanBuilder::new()
        .structure(MockStructure::body())
        .structure(MockStructure::new("Couch", DicomType::Support))
        .structure(MockStructure::oar("z_opt_ring"))
        .structure(MockStructure::oar("Guidewire_2"))
        .structure(MockStructure::ptv("PTV_unprescribed"))
        .structure(MockStructure::oar("Parotid_L"))
        .goal("Parotid_L", "Mean < 26 Gy")
        .build();
    let findings = run_only(RuleCategory::Coverage, &plan);

    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].severity, Severity::Info);
    assert!(findings[0].message.contains("All 1 eligible"));
}

#[test]
fn test_coverage_unparseable_goal_does_not_count() {
    let plan = PlanBuilder::new()
        .structure(MockStructure::oar("Lens_R"))
        .goal("Lens_R", "keep it low")
        .build();
    let findings = run_only(RuleCategory::Coverage, &plan);
    assert_eq!(count(&findings, Severity::Warning), 1);
}

// ---------------------------------------------------------------------------
// Containment
// ---------------------------------------------------------------------------

fn containment_plan(ctv_id: &str, ctv_half: f64) -> PlanSnapshot {
    PlanBuilder::new()
        .prescribed(MockStructure::ptv("PTV_1").squares(0.0, 0.0, 20.0, 5..25))
        .prescribed(MockStructure::ctv(ctv_id).squares(0.0, 0.0, ctv_half, 8..22))
        .build()
}

#[test]
fn test_containment_violation() {
    let plan = containment_plan("CTV_1", 25.0);
    let findings = run_only(RuleCategory::Containment, &plan);
    assert_eq!(count(&findings, Severity::Error), 1);
    assert!(findings[0].message.contains("CTV_1"));
    assert!(findings[0].message.contains("PTV_1"));
}

#[test]
fn test_containment_pass() {
    let plan = containment_plan("CTV_1", 10.0);
    let findings = run_only(RuleCategory::Containment, &plan);
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].severity, Severity::Info);
}

#[test]
fn test_suffix_convention_trim_separator() {
    // "PTV_1" and "CTV1" share suffix "1" once separators are trimmed
    let plan = containment_plan("CTV1", 25.0);
    let findings = run_only(RuleCategory::Containment, &plan);
    assert_eq!(count(&findings, Severity::Error), 1);
}

#[test]
fn test_suffix_convention_raw() {
    let plan = containment_plan("CTV1", 25.0);
    let config = ValidationConfig {
        suffix_convention: SuffixConvention::Raw,
        ..only(RuleCategory::Containment)
    };
    let findings = run_only_with(config, &plan);
    assert_eq!(count(&findings, Severity::Error), 0);
    assert!(findings[0].message.contains("No PTV"));
}

#[test]
fn test_containment_needs_image() {
    let plan = PlanBuilder::new()
        .without_image()
        .prescribed(MockStructure::ptv("PTV_1").squares(0.0, 0.0, 20.0, 5..25))
        .prescribed(MockStructure::ctv("CTV_1").squares(0.0, 0.0, 25.0, 8..22))
        .build();
    assert!(run_only(RuleCategory::Containment, &plan).is_empty());
}

#[test]
fn test_containment_expired_deadline() {
    let plan = containment_plan("CTV_1", 10.0);
    let config = ValidationConfig::default();
    let ctx = context(&plan, &config);
    let result = ContainmentRule.validate(&ctx, Deadline::after(Duration::ZERO));
    assert_eq!(result, Err(RuleError::DeadlineExceeded));
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

fn resolution_findings(volume_cc: f64, high_res: bool) -> Vec<ValidationFinding> {
    let mut ptv = MockStructure::ptv("PTV_small").volume(volume_cc);
    if high_res {
        ptv = ptv.high_resolution();
    }
    let plan = PlanBuilder::new().prescribed(ptv).build();
    run_only(RuleCategory::Resolution, &plan)
}

#[test]
fn test_resolution_boundaries() {
    let critical = resolution_findings(4.9, false);
    assert_eq!(count(&critical, Severity::Error), 1);
    assert_eq!(count(&critical, Severity::Warning), 0);

    let warning = resolution_findings(7.0, false);
    assert_eq!(count(&warning, Severity::Error), 0);
    assert_eq!(count(&warning, Severity::Warning), 1);

    for high_res in [false, true] {
        let large = resolution_findings(10.0, high_res);
        assert_eq!(count(&large, Severity::Error), 0);
        assert_eq!(count(&large, Severity::Warning), 0);
        assert!(large[0].message.contains("10.00 cc"));
    }
}

#[test]
fn test_resolution_checks_matched_inner_targets() {
    let plan = PlanBuilder::new()
        .prescribed(MockStructure::ptv("PTV_boost").volume(3.0).high_resolution())
        .prescribed(MockStructure::gtv("GTV_boost").volume(1.0))
        .prescribed(MockStructure::ctv("CTV_other").volume(2.0))
        .build();
    let findings = run_only(RuleCategory::Resolution, &plan);

    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].severity, Severity::Error);
    assert!(findings[0].message.contains("GTV_boost"));
    assert!(!findings[0].message.contains("CTV_other"));
}

#[test]
fn test_resolution_high_res_triplet_passes() {
    let findings = resolution_findings(2.0, true);
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].severity, Severity::Info);
}

// ---------------------------------------------------------------------------
// Overlap conflicts
// ---------------------------------------------------------------------------

fn overlap_plan(cord_max: &str) -> PlanSnapshot {
    PlanBuilder::new()
        .prescribed(MockStructure::ptv("PTV_A").squares(0.0, 0.0, 20.0, 10..30))
        .structure(MockStructure::oar("Cord").circles(0.0, 15.0, 8.0, 24, 0..60))
        .goal("PTV_A", "D95% ≥ 70 Gy")
        .goal("Cord", cord_max)
        .build()
}

#[test]
fn test_overlap_conflict_found() {
    let plan = overlap_plan("Dmax < 45 Gy");
    let findings = run_only(RuleCategory::OverlapConflict, &plan);

    assert_eq!(findings.len(), 2);
    assert_eq!(findings[0].severity, Severity::Warning);
    assert!(findings[0].message.contains("PTV_A"));
    assert!(findings[0].message.contains("Cord"));
    assert!(findings[0].message.contains("70.00 Gy"));
    assert_eq!(findings[1].severity, Severity::Info);
}

#[test]
fn test_overlap_no_dose_conflict_skips_geometry() {
    let plan = overlap_plan("Dmax < 80 Gy");
    let config = ValidationConfig::default();
    assert!(conflict_candidates(&context(&plan, &config)).is_empty());

    let findings = run_only(RuleCategory::OverlapConflict, &plan);
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].severity, Severity::Info);
    assert!(findings[0].message.contains("No dose conflicts"));
}

#[test]
fn test_overlap_dose_conflict_without_overlap() {
    let plan = PlanBuilder::new()
        .prescribed(MockStructure::ptv("PTV_A").squares(0.0, 0.0, 20.0, 10..30))
        .structure(MockStructure::oar("Cord").circles(0.0, -70.0, 6.0, 24, 0..60))
        .goal("PTV_A", "D95% ≥ 70 Gy")
        .goal("Cord", "Dmax < 45 Gy")
        .build();
    let config = ValidationConfig::default();
    assert_eq!(conflict_candidates(&context(&plan, &config)).len(), 1);

    let findings = run_only(RuleCategory::OverlapConflict, &plan);
    assert_eq!(count(&findings, Severity::Warning), 0);
}

// ---------------------------------------------------------------------------
// Structure types
// ---------------------------------------------------------------------------

#[test]
fn test_structure_type_mismatch() {
    let plan = PlanBuilder::new()
        .prescribed(MockStructure::ptv("PTV_1"))
        .prescribed(MockStructure::oar("CTV_1"))
        .structure(MockStructure::new("GTV_old", DicomType::Other))
        .build();
    let findings = run_only(RuleCategory::StructureType, &plan);

    assert_eq!(count(&findings, Severity::Error), 2);
    assert!(findings.iter().any(|f| f.message.contains("CTV_1")));
    assert!(findings.iter().any(|f| f.message.contains("GTV_old")));
}

#[test]
fn test_structure_type_all_match() {
    let plan = PlanBuilder::new()
        .prescribed(MockStructure::ptv("ptv_high"))
        .prescribed(MockStructure::gtv("GTV"))
        .structure(MockStructure::oar("Brainstem"))
        .build();
    let findings = run_only(RuleCategory::StructureType, &plan);
    assert_eq!(findings.len(), 1);
    assert!(findings[0].message.contains("All 2 target structures"));
}

// ---------------------------------------------------------------------------
// SIB dose units
// ---------------------------------------------------------------------------

fn sib_plan() -> PlanBuilder {
    PlanBuilder::new()
        .total_dose(70.0)
        .prescribed(MockStructure::ptv("PTV_70"))
        .prescribed(MockStructure::ptv("PTV_54"))
        .structure(MockStructure::oar("Cord"))
        .structure(MockStructure::oar("Mandible"))
        .goal("PTV_70", "D95% ≥ 70 Gy")
        .goal("PTV_54", "D95% ≥ 54 Gy")
}

#[test]
fn test_sib_percentage_goals_flagged() {
    let plan = sib_plan()
        .goal("Cord", "Dmax < 64%")
        .goal("Mandible", "D2% < 107%")
        .goal("Mandible", "V60Gy < 5%")
        .build();
    let findings = run_only(RuleCategory::SibDoseUnits, &plan);

    assert_eq!(findings.len(), 2);
    assert!(findings.iter().all(|f| f.severity == Severity::Error));
    assert!(findings[0].message.contains("Cord"));
    assert!(findings[1].message.contains("Mandible"));
}

#[test]
fn test_sib_structured_dose_follows_goal_text() {
    let plan = sib_plan()
        .goal_with_dose("PTV_70", "V 95% > 98%", 95.0, DoseUnit::Percent)
        .build();
    assert!(run_only(RuleCategory::SibDoseUnits, &plan).is_empty());

    let plan = sib_plan()
        .goal_with_dose("Cord", "Dmax < 107%", 74.9, DoseUnit::Gy)
        .build();
    let findings = run_only(RuleCategory::SibDoseUnits, &plan);
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].severity, Severity::Error);
    assert!(findings[0].message.starts_with("Clinical goal #3 for 'Cord'"));
}

#[test]
fn test_percent_dose_reading_modes() {
    let mut plan = PlanBuilder::new()
        .total_dose(70.0)
        .prescribed(MockStructure::ptv("PTV_70"))
        .structure(MockStructure::oar("Mandible"))
        .build();
    plan.goals
        .push(ClinicalGoalRecord::new("Mandible", "D2% < 107%").with_measure_type("MaxDose"));

    let first = ValidationConfig::default();
    assert_eq!(
        context(&plan, &first).constraints.min_upper_dose("Mandible"),
        Some(1.4)
    );

    let adjacent = ValidationConfig {
        percent_dose_reading: PercentDoseReading::OperatorAdjacent,
        ..ValidationConfig::default()
    };
    assert_eq!(
        context(&plan, &adjacent).constraints.min_upper_dose("Mandible"),
        Some(74.9)
    );
}

#[test]
fn test_sib_all_gy_is_silent() {
    let plan = sib_plan()
        .goal("Cord", "Dmax < 45 Gy")
        .goal("Mandible", "D2% < 72 Gy")
        .build();
    assert!(run_only(RuleCategory::SibDoseUnits, &plan).is_empty());
}

#[test]
fn test_non_sib_percentage_is_silent() {
    let plan = PlanBuilder::new()
        .total_dose(60.0)
        .prescribed(MockStructure::ptv("PTV_60"))
        .prescribed(MockStructure::ptv("PTV_58"))
        .structure(MockStructure::oar("Cord"))
        .goal("PTV_60", "D95% ≥ 60 Gy")
        .goal("PTV_58", "D95% ≥ 58 Gy")
        .goal("Cord", "Dmax < 75%")
        .build();
    assert!(run_only(RuleCategory::SibDoseUnits, &plan).is_empty());
}

// ---------------------------------------------------------------------------
// Body proximity
// ---------------------------------------------------------------------------

#[test]
fn test_body_proximity_warning() {
    let plan = PlanBuilder::new()
        .structure(MockStructure::body().circles(0.0, 0.0, 100.0, 360, 0..60))
        .prescribed(MockStructure::ptv("PTV_skin").squares(0.0, 97.0, 1.0, 20..30))
        .prescribed(MockStructure::ptv("PTV_deep").squares(0.0, 0.0, 10.0, 20..30))
        .build();
    let findings = run_only(RuleCategory::BodyProximity, &plan);

    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].severity, Severity::Warning);
    assert!(findings[0].message.contains("PTV_skin"));
}

#[test]
fn test_body_proximity_reports_closest() {
    let plan = PlanBuilder::new()
        .structure(
            MockStructure::new("Outline", DicomType::External).squares(0.0, 0.0, 100.0, 0..60),
        )
        .prescribed(MockStructure::ptv("PTV_a").squares(0.0, 0.0, 50.0, 20..30))
        .prescribed(MockStructure::ptv("PTV_b").squares(0.0, 0.0, 80.0, 20..30))
        .build();
    let findings = run_only(RuleCategory::BodyProximity, &plan);

    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].severity, Severity::Info);
    assert!(findings[0].message.contains("PTV_b"));
    // Nearest vertices are the square corners
    assert!(findings[0].message.contains("28.3 mm"));
}

#[test]
fn test_body_proximity_without_body() {
    let plan = PlanBuilder::new()
        .prescribed(MockStructure::ptv("PTV_1").squares(0.0, 0.0, 10.0, 0..5))
        .build();
    assert!(run_only(RuleCategory::BodyProximity, &plan).is_empty());
}
