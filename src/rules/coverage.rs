//! Every eligible structure needs at least one usable clinical goal.

use crate::engine::deadline::Deadline;
use crate::rules::{RuleResult, RuleValidator, ValidationContext};
use crate::{RuleCategory, ValidationFinding};

pub struct CoverageRule;

impl RuleValidator for CoverageRule {
    fn category(&self) -> RuleCategory {
        RuleCategory::Coverage
    }

    fn validate(&self, ctx: &ValidationContext<'_>, _deadline: Deadline) -> RuleResult {
        ctx.require_structure_set()?;

        let mut findings = Vec::new();
        let mut eligible = 0;
        for entry in ctx.catalog.eligible() {
            eligible += 1;
            let id = &entry.structure.id;
            if ctx.constraints.usable_count(id) == 0 {
                findings.push(ValidationFinding::warning(
                    self.category(),
                    format!("Structure '{}' has no clinical goal", id),
                ));
            }
        }

        if findings.is_empty() {
            findings.push(ValidationFinding::info(
                self.category(),
                format!("All {} eligible structures have clinical goals", eligible),
            ));
        }
        Ok(findings)
    }
}
