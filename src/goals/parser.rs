//! Clinical goal parsing.
//!
//! Direction comes from the goal's textual form. Dose comes from the
//! structured dose field when the host provides one, otherwise from the text.
//! Anything unrecognized yields `Direction::Unknown` or `dose_gy: None`; a
//! missing dose is never reported as zero.

use crate::config::PercentDoseReading;
use crate::goals::constraint::{Direction, DoseConstraint};
use crate::model::{ClinicalGoalRecord, DoseUnit, DoseValue};
use regex::Regex;
use std::sync::LazyLock;

static DMAX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)d ?max").expect("static regex"));

static GY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(cgy|gy)\b").expect("static regex"));

static PERCENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*%").expect("static regex"));

/// Comparison operator followed by a number and an optional unit.
static OPERATOR_VALUE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(≥|≤|>=|<=|>|<|=)\s*(\d+(?:\.\d+)?)\s*(%|cgy|gy)?").expect("static regex")
});

static VOLUME_GOAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*V(\s|\d)").expect("static regex"));

/// Classify the bound direction of a goal.
///
/// `>` is treated like `≥`, which may over-match strict bounds.
pub fn classify_direction(objective: &str, measure_type: Option<&str>) -> Direction {
    if objective.contains('≥') || objective.contains('>') {
        return Direction::Lower;
    }
    if DMAX_RE.is_match(objective) {
        return Direction::Upper;
    }
    let max_measure = measure_type
        .map(|m| m.to_ascii_lowercase().contains("max"))
        .unwrap_or(false);
    if max_measure && (objective.contains('<') || objective.contains('≤')) {
        return Direction::Upper;
    }
    Direction::Unknown
}

/// Volume goals (`V20Gy < 30%`, `V 95% > 98%`) bound a volume, not a dose.
pub fn is_volume_goal(objective: &str) -> bool {
    VOLUME_GOAL_RE.is_match(objective)
}

/// True when the value next to the comparison operator is a percentage and
/// the goal is not a volume goal.
pub fn has_percentage_dose(objective: &str) -> bool {
    if is_volume_goal(objective) {
        return false;
    }
    OPERATOR_VALUE_RE
        .captures(objective)
        .and_then(|caps| caps.get(3))
        .map(|unit| unit.as_str() == "%")
        .unwrap_or(false)
}

fn parse_number(text: &str) -> Option<f64> {
    text.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn percent_to_gy(percent: f64, plan_total_dose_gy: Option<f64>) -> Option<f64> {
    plan_total_dose_gy
        .filter(|t| t.is_finite())
        .map(|total| total * percent / 100.0)
}

/// Normalize a structured dose field to Gy.
pub fn normalize_dose(dose: &DoseValue, plan_total_dose_gy: Option<f64>) -> Option<f64> {
    if !dose.value.is_finite() {
        return None;
    }
    match dose.unit {
        DoseUnit::Gy => Some(dose.value),
        DoseUnit::CGy => Some(dose.value / 100.0),
        DoseUnit::Percent => percent_to_gy(dose.value, plan_total_dose_gy),
    }
}

/// Dose side percentage value from the text.
///
/// `First` takes the first number followed by `%`. `OperatorAdjacent` takes
/// the value next to the comparison operator, so `D2% < 107%` reads 107, and
/// falls back to the first percentage. Volume goals always read the first
/// percentage, which is their dose parameter (`V95%`).
fn text_percent(objective: &str, reading: PercentDoseReading) -> Option<f64> {
    let first = || {
        PERCENT_RE
            .captures(objective)
            .and_then(|caps| parse_number(&caps[1]))
    };
    if reading == PercentDoseReading::First || is_volume_goal(objective) {
        return first();
    }
    OPERATOR_VALUE_RE
        .captures_iter(objective)
        .find(|caps| caps.get(3).map(|u| u.as_str() == "%").unwrap_or(false))
        .and_then(|caps| parse_number(&caps[2]))
        .or_else(first)
}

/// Extract a dose from the goal text.
pub fn text_dose(
    objective: &str,
    plan_total_dose_gy: Option<f64>,
    reading: PercentDoseReading,
) -> Option<f64> {
    if let Some(caps) = GY_RE.captures(objective) {
        let value = parse_number(&caps[1])?;
        return if caps[2].eq_ignore_ascii_case("cgy") {
            Some(value / 100.0)
        } else {
            Some(value)
        };
    }
    text_percent(objective, reading).and_then(|pct| percent_to_gy(pct, plan_total_dose_gy))
}

/// Whether a goal carries a percentage dose.
///
/// True when the text has an operator-adjacent `%` value, or when the
/// structured field is in percent. Volume goals never qualify.
pub fn is_percentage_goal(goal: &ClinicalGoalRecord) -> bool {
    if is_volume_goal(&goal.objective) {
        return false;
    }
    has_percentage_dose(&goal.objective)
        || goal
            .dose
            .as_ref()
            .map(|dose| dose.unit == DoseUnit::Percent)
            .unwrap_or(false)
}

/// Converts raw host goals into `DoseConstraint` values.
#[derive(Debug, Clone, Copy, Default)]
pub struct DoseConstraintParser {
    plan_total_dose_gy: Option<f64>,
    percent_reading: PercentDoseReading,
}

impl DoseConstraintParser {
    pub fn new(plan_total_dose_gy: Option<f64>) -> Self {
        DoseConstraintParser {
            plan_total_dose_gy,
            percent_reading: PercentDoseReading::default(),
        }
    }

    pub fn with_percent_reading(mut self, reading: PercentDoseReading) -> Self {
        self.percent_reading = reading;
        self
    }

    /// Parse one goal. `goal_index` is its position in the snapshot.
    pub fn parse(&self, goal: &ClinicalGoalRecord, goal_index: usize) -> DoseConstraint {
        let direction = classify_direction(&goal.objective, goal.measure_type.as_deref());

        let dose_gy = match &goal.dose {
            Some(dose) => normalize_dose(dose, self.plan_total_dose_gy),
            None => text_dose(&goal.objective, self.plan_total_dose_gy, self.percent_reading),
        };

        if direction == Direction::Unknown && dose_gy.is_none() {
            tracing::trace!(structure = %goal.structure_id, goal_index, "goal not recognized");
        }

        DoseConstraint {
            structure_id: goal.structure_id.clone(),
            direction,
            dose_gy,
            is_percentage_dose: is_percentage_goal(goal),
            goal_index,
        }
    }

    pub fn parse_all(&self, goals: &[ClinicalGoalRecord]) -> Vec<DoseConstraint> {
        goals
            .iter()
            .enumerate()
            .map(|(i, goal)| self.parse(goal, i))
            .collect()
    }
}
