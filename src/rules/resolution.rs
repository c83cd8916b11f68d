//! Small PTVs and their CTV/GTV should be contoured in high resolution.
//!
//! Below the critical volume a low-resolution triplet is an error, between
//! critical and warning volume a warning. The warning bound is exclusive.

use crate::catalog::TargetKind;
use crate::engine::deadline::Deadline;
use crate::model::Structure;
use crate::rules::{RuleResult, RuleValidator, ValidationContext};
use crate::{RuleCategory, ValidationFinding};

pub struct ResolutionRule;

impl RuleValidator for ResolutionRule {
    fn category(&self) -> RuleCategory {
        RuleCategory::Resolution
    }

    fn validate(&self, ctx: &ValidationContext<'_>, _deadline: Deadline) -> RuleResult {
        ctx.require_structure_set()?;
        let critical = ctx.config.resolution_critical_volume_cc;
        let warning = ctx.config.resolution_warning_volume_cc;

        let mut findings = Vec::new();
        let mut smallest: Option<&Structure> = None;
        for ptv in ctx.catalog.targets_of(TargetKind::Ptv) {
            if smallest.map_or(true, |s| ptv.volume_cc < s.volume_cc) {
                smallest = Some(ptv);
            }
            if ptv.volume_cc >= warning {
                continue;
            }

            let low_res: Vec<&str> = std::iter::once(ptv)
                .chain(ctx.catalog.matched_inner_targets(ptv))
                .filter(|s| !s.is_high_resolution)
                .map(|s| s.id.as_str())
                .collect();
            if low_res.is_empty() {
                continue;
            }

            if ptv.volume_cc < critical {
                findings.push(ValidationFinding::error(
                    self.category(),
                    format!(
                        "PTV '{}' is {:.2} cc (< {} cc); high resolution required for: {}",
                        ptv.id,
                        ptv.volume_cc,
                        critical,
                        low_res.join(", ")
                    ),
                ));
            } else {
                findings.push(ValidationFinding::warning(
                    self.category(),
                    format!(
                        "PTV '{}' is {:.2} cc (< {} cc); high resolution recommended for: {}",
                        ptv.id,
                        ptv.volume_cc,
                        warning,
                        low_res.join(", ")
                    ),
                ));
            }
        }

        if findings.is_empty() {
            let message = match smallest {
                Some(s) => format!("Smallest PTV '{}' is {:.2} cc", s.id, s.volume_cc),
                None => "No PTV structures found".to_string(),
            };
            findings.push(ValidationFinding::info(self.category(), message));
        }
        Ok(findings)
    }
}
