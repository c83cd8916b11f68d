//! Plan snapshot data model.
//!
//! Everything here is constructed once from the host-supplied snapshot and
//! never mutated during a validation run.

pub mod grid;
pub mod plan;
pub mod structure;

pub use grid::{GeometryGrid, GridSize, Point3, Vector3};
pub use plan::{
    ClinicalGoalRecord, DoseUnit, DoseValue, PlanSnapshot, PrescriptionStatus, PrescriptionTarget,
    StructureSet,
};
pub use structure::{Contour, DicomType, Structure};
