//! In SIB plans every goal must state its dose in Gy.
//!
//! A plan counts as SIB when two targets' lower goal doses differ by more
//! than the configured percentage of the larger one.

use crate::engine::deadline::Deadline;
use crate::rules::{gy, RuleResult, RuleValidator, ValidationContext};
use crate::{RuleCategory, ValidationFinding};

/// Largest pairwise lower-dose difference, as percent of the larger dose.
///
/// `None` with fewer than two target doses.
pub fn max_dose_difference_percent(doses: &[f64]) -> Option<f64> {
    if doses.len() < 2 {
        return None;
    }
    let max = doses.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = doses.iter().copied().fold(f64::INFINITY, f64::min);
    if max <= 0.0 {
        return None;
    }
    Some((max - min) / max * 100.0)
}

pub struct SibDoseUnitsRule;

impl RuleValidator for SibDoseUnitsRule {
    fn category(&self) -> RuleCategory {
        RuleCategory::SibDoseUnits
    }

    fn validate(&self, ctx: &ValidationContext<'_>, _deadline: Deadline) -> RuleResult {
        ctx.require_structure_set()?;

        let doses: Vec<f64> = ctx
            .catalog
            .all_targets()
            .filter_map(|t| ctx.constraints.max_lower_dose(&t.id))
            .collect();
        let Some(difference) = max_dose_difference_percent(&doses) else {
            return Ok(Vec::new());
        };
        if difference <= ctx.config.sib_dose_difference_percent {
            return Ok(Vec::new());
        }
        tracing::debug!(
            difference_percent = difference,
            max_dose = %gy(doses.iter().copied().fold(f64::NEG_INFINITY, f64::max)),
            "plan flagged as SIB"
        );

        let findings = ctx
            .constraints
            .all()
            .iter()
            .filter(|c| c.is_percentage_dose)
            .map(|c| {
                ValidationFinding::error(
                    self.category(),
                    format!(
                        "Clinical goal #{} for '{}' uses a percentage dose; SIB plans require absolute dose in Gy",
                        c.goal_index + 1,
                        c.structure_id
                    ),
                )
            })
            .collect();
        Ok(findings)
    }
}
