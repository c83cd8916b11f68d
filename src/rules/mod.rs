//! Rule validators.
//!
//! Each validator is an independent, stateless rule over a shared read-only
//! `ValidationContext`. Validators never see each other's output, so they can
//! run in any order or in parallel.
//!
//! # Failure semantics
//!
//! - Missing plan, structure set or image: `RuleError::MissingPrerequisite`,
//!   which the orchestrator turns into zero findings
//! - Time budget spent inside a geometry primitive: `RuleError::DeadlineExceeded`
//! - Anything else: `RuleError::Internal`, reported as one sanitized warning

pub mod body_proximity;
pub mod containment;
pub mod coverage;
pub mod overlap_conflict;
pub mod resolution;
pub mod sib_dose_units;
pub mod structure_type;

use crate::catalog::StructureCatalog;
use crate::config::ValidationConfig;
use crate::engine::deadline::{Deadline, DeadlineExceeded};
use crate::geometry::SpatialEngine;
use crate::goals::ConstraintIndex;
use crate::model::PlanSnapshot;
use crate::{RuleCategory, ValidationFinding};
use thiserror::Error;

/// Why a validator produced no regular findings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error("missing prerequisite: {0}")]
    MissingPrerequisite(&'static str),

    #[error("time budget exceeded")]
    DeadlineExceeded,

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<DeadlineExceeded> for RuleError {
    fn from(_: DeadlineExceeded) -> Self {
        RuleError::DeadlineExceeded
    }
}

pub type RuleResult = Result<Vec<ValidationFinding>, RuleError>;

/// Everything a validator may read. Built once per run.
pub struct ValidationContext<'a> {
    pub plan: Option<&'a PlanSnapshot>,
    pub catalog: StructureCatalog<'a>,
    pub constraints: ConstraintIndex,
    pub config: &'a ValidationConfig,
}

impl<'a> ValidationContext<'a> {
    /// The plan, or `MissingPrerequisite`.
    pub fn require_plan(&self) -> Result<&'a PlanSnapshot, RuleError> {
        self.plan.ok_or(RuleError::MissingPrerequisite("plan"))
    }

    /// Fails when the plan has no structure set.
    pub fn require_structure_set(&self) -> Result<&'a PlanSnapshot, RuleError> {
        let plan = self.require_plan()?;
        if plan.structure_set.is_none() {
            return Err(RuleError::MissingPrerequisite("structure set"));
        }
        Ok(plan)
    }

    /// A geometry engine over the plan image, bounded by `deadline`.
    pub fn spatial_engine(&self, deadline: Deadline) -> Result<SpatialEngine<'a>, RuleError> {
        let plan = self.require_structure_set()?;
        let grid = plan
            .image()
            .ok_or(RuleError::MissingPrerequisite("image grid"))?;
        Ok(SpatialEngine::new(grid)
            .with_deadline(deadline)
            .with_index_threshold(self.config.spatial_index_threshold))
    }
}

/// One independent rule.
pub trait RuleValidator: Send + Sync {
    fn category(&self) -> RuleCategory;

    /// Evaluate the rule. `deadline` bounds geometry work.
    fn validate(&self, ctx: &ValidationContext<'_>, deadline: Deadline) -> RuleResult;
}

/// All validators in reporting order.
pub fn all_validators() -> Vec<Box<dyn RuleValidator>> {
    vec![
        Box::new(structure_type::StructureTypeRule),
        Box::new(coverage::CoverageRule),
        Box::new(containment::ContainmentRule),
        Box::new(resolution::ResolutionRule),
        Box::new(overlap_conflict::OverlapConflictRule),
        Box::new(sib_dose_units::SibDoseUnitsRule),
        Box::new(body_proximity::BodyProximityRule),
    ]
}

/// Format a dose for messages.
pub(crate) fn gy(dose: f64) -> String {
    format!("{:.2} Gy", dose)
}
