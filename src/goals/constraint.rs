//! Normalized dose-constraint representation.

use serde::Serialize;
use std::fmt;

/// Which side of the dose a goal bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Direction {
    /// Minimum dose to be reached (target coverage)
    Lower,
    /// Maximum dose not to be exceeded (Dmax)
    Upper,
    /// Neither pattern recognized; unusable for direction-dependent rules
    Unknown,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Lower => write!(f, "lower"),
            Direction::Upper => write!(f, "upper"),
            Direction::Unknown => write!(f, "unknown"),
        }
    }
}

/// A clinical goal after parsing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DoseConstraint {
    pub structure_id: String,
    pub direction: Direction,
    /// Dose in Gy; `None` when unparsable, never a stand-in zero
    pub dose_gy: Option<f64>,
    /// Dose side of the comparison is expressed in percent
    pub is_percentage_dose: bool,
    /// Position of the goal in the snapshot's goal list
    pub goal_index: usize,
}

impl DoseConstraint {
    /// Usable for coverage: at least direction or dose was recognized.
    pub fn is_usable(&self) -> bool {
        self.direction != Direction::Unknown || self.dose_gy.is_some()
    }

    /// Dose of a Lower goal, if both are known.
    pub fn lower_dose(&self) -> Option<f64> {
        match self.direction {
            Direction::Lower => self.dose_gy,
            _ => None,
        }
    }

    /// Dose of an Upper goal, if both are known.
    pub fn upper_dose(&self) -> Option<f64> {
        match self.direction {
            Direction::Upper => self.dose_gy,
            _ => None,
        }
    }
}
