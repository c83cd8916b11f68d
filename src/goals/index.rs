//! Structure id -> parsed constraints.

use crate::goals::constraint::DoseConstraint;
use std::collections::HashMap;

/// Parsed goals grouped by structure, keyed case-insensitively.
///
/// Built once per run and shared read-only by all validators.
#[derive(Debug, Clone, Default)]
pub struct ConstraintIndex {
    by_structure: HashMap<String, Vec<DoseConstraint>>,
    all: Vec<DoseConstraint>,
}

impl ConstraintIndex {
    pub fn build(constraints: Vec<DoseConstraint>) -> Self {
        let mut by_structure: HashMap<String, Vec<DoseConstraint>> = HashMap::new();
        for c in &constraints {
            by_structure
                .entry(c.structure_id.to_lowercase())
                .or_default()
                .push(c.clone());
        }
        ConstraintIndex {
            by_structure,
            all: constraints,
        }
    }

    /// Constraints for a structure, in goal order.
    pub fn for_structure(&self, id: &str) -> &[DoseConstraint] {
        self.by_structure
            .get(&id.to_lowercase())
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Every constraint, in goal order.
    pub fn all(&self) -> &[DoseConstraint] {
        &self.all
    }

    pub fn usable_count(&self, id: &str) -> usize {
        self.for_structure(id).iter().filter(|c| c.is_usable()).count()
    }

    /// Highest Lower-goal dose of a structure.
    pub fn max_lower_dose(&self, id: &str) -> Option<f64> {
        self.for_structure(id)
            .iter()
            .filter_map(|c| c.lower_dose())
            .fold(None, |acc, d| Some(acc.map_or(d, |a: f64| a.max(d))))
    }

    /// Lowest Upper/Dmax dose of a structure.
    pub fn min_upper_dose(&self, id: &str) -> Option<f64> {
        self.for_structure(id)
            .iter()
            .filter_map(|c| c.upper_dose())
            .fold(None, |acc, d| Some(acc.map_or(d, |a: f64| a.min(d))))
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }
}
