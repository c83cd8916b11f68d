//! Targets whose lower dose goal exceeds an overlapping OAR's Dmax.
//!
//! Two phases: a cheap numeric filter over target/OAR goal pairs, then the
//! sampled overlap test only for the surviving candidates.

use crate::engine::deadline::Deadline;
use crate::model::Structure;
use crate::rules::{gy, RuleResult, RuleValidator, ValidationContext};
use crate::{RuleCategory, ValidationFinding};

/// A target/OAR pair whose goals contradict if the structures overlap.
#[derive(Debug, Clone, Copy)]
pub struct ConflictCandidate<'a> {
    pub target: &'a Structure,
    pub target_lower_gy: f64,
    pub oar: &'a Structure,
    pub oar_max_gy: f64,
}

/// Phase one: pairs with `target lower dose > OAR Dmax`.
pub fn conflict_candidates<'a>(ctx: &ValidationContext<'a>) -> Vec<ConflictCandidate<'a>> {
    let targets: Vec<(&'a Structure, f64)> = ctx
        .catalog
        .all_targets()
        .filter_map(|t| ctx.constraints.max_lower_dose(&t.id).map(|d| (t, d)))
        .collect();
    let oars: Vec<(&'a Structure, f64)> = ctx
        .catalog
        .organs_at_risk()
        .filter_map(|o| ctx.constraints.min_upper_dose(&o.id).map(|d| (o, d)))
        .collect();

    let mut candidates = Vec::new();
    for &(target, target_lower_gy) in &targets {
        for &(oar, oar_max_gy) in &oars {
            if target_lower_gy > oar_max_gy {
                candidates.push(ConflictCandidate {
                    target,
                    target_lower_gy,
                    oar,
                    oar_max_gy,
                });
            }
        }
    }
    tracing::debug!(
        targets = targets.len(),
        oars = oars.len(),
        candidates = candidates.len(),
        "dose conflict candidates"
    );
    candidates
}

pub struct OverlapConflictRule;

impl RuleValidator for OverlapConflictRule {
    fn category(&self) -> RuleCategory {
        RuleCategory::OverlapConflict
    }

    fn validate(&self, ctx: &ValidationContext<'_>, deadline: Deadline) -> RuleResult {
        let engine = ctx.spatial_engine(deadline)?;

        let mut findings = Vec::new();
        for c in conflict_candidates(ctx) {
            if engine.overlaps(c.target, c.oar)? {
                findings.push(ValidationFinding::warning(
                    self.category(),
                    format!(
                        "Target '{}' (lower goal {}) overlaps OAR '{}' (Dmax {})",
                        c.target.id,
                        gy(c.target_lower_gy),
                        c.oar.id,
                        gy(c.oar_max_gy)
                    ),
                ));
            }
        }

        if findings.is_empty() {
            findings.push(ValidationFinding::info(
                self.category(),
                "No dose conflicts between overlapping targets and OARs",
            ));
        } else {
            findings.push(ValidationFinding::info(
                self.category(),
                "Review goal priorities for the overlapping pairs above, or add an optimization \
                 structure that excludes the overlap region",
            ));
        }
        Ok(findings)
    }
}
