//! CTV and GTV must lie inside the PTV sharing their suffix.

use crate::catalog::TargetKind;
use crate::engine::deadline::Deadline;
use crate::rules::{RuleResult, RuleValidator, ValidationContext};
use crate::{RuleCategory, ValidationFinding};

pub struct ContainmentRule;

impl RuleValidator for ContainmentRule {
    fn category(&self) -> RuleCategory {
        RuleCategory::Containment
    }

    fn validate(&self, ctx: &ValidationContext<'_>, deadline: Deadline) -> RuleResult {
        let engine = ctx.spatial_engine(deadline)?;

        let mut findings = Vec::new();
        let mut checked = 0;
        for ptv in ctx.catalog.targets_of(TargetKind::Ptv) {
            for inner in ctx.catalog.matched_inner_targets(ptv) {
                checked += 1;
                if !engine.is_contained(inner, ptv)? {
                    findings.push(ValidationFinding::error(
                        self.category(),
                        format!("'{}' is not fully contained in '{}'", inner.id, ptv.id),
                    ));
                }
            }
        }

        if findings.is_empty() {
            let message = if checked == 0 {
                "No PTV with a matching CTV/GTV to check".to_string()
            } else {
                format!("All {} CTV/GTV structures are contained in their PTV", checked)
            };
            findings.push(ValidationFinding::info(self.category(), message));
        }
        Ok(findings)
    }
}
