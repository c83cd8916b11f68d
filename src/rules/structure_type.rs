//! Target name prefix must agree with the DICOM type.

use crate::engine::deadline::Deadline;
use crate::rules::{RuleResult, RuleValidator, ValidationContext};
use crate::{RuleCategory, ValidationFinding};

pub struct StructureTypeRule;

impl RuleValidator for StructureTypeRule {
    fn category(&self) -> RuleCategory {
        RuleCategory::StructureType
    }

    fn validate(&self, ctx: &ValidationContext<'_>, _deadline: Deadline) -> RuleResult {
        ctx.require_structure_set()?;

        let mut findings = Vec::new();
        let mut checked = 0;
        for entry in ctx.catalog.entries() {
            let Some(kind) = entry.target_kind else {
                continue;
            };
            checked += 1;
            let expected = kind.expected_dicom_type();
            if entry.structure.dicom_type != expected {
                findings.push(ValidationFinding::error(
                    self.category(),
                    format!(
                        "Structure '{}' is named as {} but has DICOM type {}",
                        entry.structure.id, expected, entry.structure.dicom_type
                    ),
                ));
            }
        }

        if findings.is_empty() {
            findings.push(ValidationFinding::info(
                self.category(),
                format!("All {} target structures have matching DICOM types", checked),
            ));
        }
        Ok(findings)
    }
}
