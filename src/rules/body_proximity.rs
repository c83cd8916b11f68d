//! PTVs too close to the body surface.

use crate::catalog::TargetKind;
use crate::engine::deadline::Deadline;
use crate::geometry::min_distance;
use crate::model::Structure;
use crate::rules::{RuleError, RuleResult, RuleValidator, ValidationContext};
use crate::{RuleCategory, ValidationFinding};

pub struct BodyProximityRule;

impl RuleValidator for BodyProximityRule {
    fn category(&self) -> RuleCategory {
        RuleCategory::BodyProximity
    }

    fn validate(&self, ctx: &ValidationContext<'_>, deadline: Deadline) -> RuleResult {
        ctx.require_structure_set()?;
        let body = ctx
            .catalog
            .body(&ctx.config.body_structure_id)
            .ok_or(RuleError::MissingPrerequisite("body structure"))?;
        let threshold = ctx.config.body_proximity_threshold_mm;

        let mut findings = Vec::new();
        let mut closest: Option<(&Structure, f64)> = None;
        for ptv in ctx.catalog.targets_of(TargetKind::Ptv) {
            let Some(nearest) =
                min_distance(ptv, body, ctx.config.spatial_index_threshold, &deadline)?
            else {
                continue;
            };
            let d = nearest.distance_mm;
            if closest.map_or(true, |(_, best)| d < best) {
                closest = Some((ptv, d));
            }
            if d < threshold {
                findings.push(ValidationFinding::warning(
                    self.category(),
                    format!(
                        "PTV '{}' is {:.1} mm from the body surface (threshold {} mm)",
                        ptv.id, d, threshold
                    ),
                ));
            }
        }

        if findings.is_empty() {
            let message = match closest {
                Some((ptv, d)) => format!(
                    "Closest PTV '{}' is {:.1} mm from the body surface",
                    ptv.id, d
                ),
                None => "No PTV shares a slice with the body contour".to_string(),
            };
            findings.push(ValidationFinding::info(self.category(), message));
        }
        Ok(findings)
    }
}
