//! Plan snapshot as handed over by the host.

use crate::model::grid::GeometryGrid;
use crate::model::structure::Structure;
use serde::{Deserialize, Serialize};

/// Review state of a prescription target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrescriptionStatus {
    Reviewed,
    #[serde(other)]
    Other,
}

/// A target referenced by the plan's prescription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrescriptionTarget {
    pub target_id: String,
    pub status: PrescriptionStatus,
}

/// Unit of a structured dose field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DoseUnit {
    #[serde(rename = "Gy")]
    Gy,
    #[serde(rename = "cGy")]
    CGy,
    #[serde(rename = "%")]
    Percent,
}

/// Structured dose value exposed by some hosts alongside the goal text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DoseValue {
    pub value: f64,
    pub unit: DoseUnit,
}

/// Raw clinical goal as the host exposes it.
///
/// Only `DoseConstraintParser` reads this type; everything downstream works
/// on the parsed `DoseConstraint`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClinicalGoalRecord {
    pub structure_id: String,
    /// Textual form, e.g. "D95% >= 66.5 Gy" or "Dmax < 45 Gy"
    pub objective: String,
    /// Measure type tag, e.g. "MaxDose" or "DoseAtVolume"
    #[serde(default)]
    pub measure_type: Option<String>,
    #[serde(default)]
    pub dose: Option<DoseValue>,
}

impl ClinicalGoalRecord {
    pub fn new(structure_id: impl Into<String>, objective: impl Into<String>) -> Self {
        ClinicalGoalRecord {
            structure_id: structure_id.into(),
            objective: objective.into(),
            measure_type: None,
            dose: None,
        }
    }

    pub fn with_measure_type(mut self, measure_type: impl Into<String>) -> Self {
        self.measure_type = Some(measure_type.into());
        self
    }

    pub fn with_dose(mut self, value: f64, unit: DoseUnit) -> Self {
        self.dose = Some(DoseValue { value, unit });
        self
    }
}

/// Structures plus the image they were contoured on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureSet {
    pub structures: Vec<Structure>,
    #[serde(default)]
    pub image: Option<GeometryGrid>,
}

/// Everything one validation run needs, materialized in memory by the host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanSnapshot {
    #[serde(default)]
    pub plan_id: String,
    /// Total prescribed dose, used for percentage-to-Gy conversion
    #[serde(default)]
    pub total_dose_gy: Option<f64>,
    #[serde(default)]
    pub structure_set: Option<StructureSet>,
    #[serde(default)]
    pub goals: Vec<ClinicalGoalRecord>,
    #[serde(default)]
    pub prescription_targets: Vec<PrescriptionTarget>,
}

impl PlanSnapshot {
    /// Structures of the structure set, empty when there is none.
    pub fn structures(&self) -> &[Structure] {
        self.structure_set
            .as_ref()
            .map(|s| s.structures.as_slice())
            .unwrap_or(&[])
    }

    pub fn image(&self) -> Option<&GeometryGrid> {
        self.structure_set.as_ref().and_then(|s| s.image.as_ref())
    }

    /// Case-insensitive structure lookup.
    pub fn find_structure(&self, id: &str) -> Option<&Structure> {
        self.structures().iter().find(|s| s.id_eq(id))
    }

    /// Ids of prescription targets in `Reviewed` state.
    pub fn reviewed_target_ids(&self) -> Vec<String> {
        self.prescription_targets
            .iter()
            .filter(|t| t.status == PrescriptionStatus::Reviewed)
            .map(|t| t.target_id.clone())
            .collect()
    }
}
