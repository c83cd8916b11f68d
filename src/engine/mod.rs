//! Validation engine module.
//!
//! Provides rule orchestration, per-rule deadlines and result aggregation.

pub mod deadline;
pub mod orchestrator;
pub mod result;
