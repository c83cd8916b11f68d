//! Clinical goal ingestion.
//!
//! Raw host goals are converted into `DoseConstraint` values exactly once,
//! then grouped per structure in a `ConstraintIndex`.

pub mod constraint;
pub mod index;
pub mod parser;

pub use constraint::{Direction, DoseConstraint};
pub use index::ConstraintIndex;
pub use parser::DoseConstraintParser;
