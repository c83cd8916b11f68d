//! Structure role classification.
//!
//! Each structure is classified once per run. Exclusion rules are applied in
//! order and the first match wins:
//! 1. DICOM type SUPPORT or MARKER
//! 2. Id matches a configured exclusion pattern
//! 3. Id is in the explicit exclusion set
//! 4. Id carries a target prefix but is not a reviewed prescription target
//!
//! Rule 4 only removes a structure from goal-coverage checking. Geometry
//! rules still see every target-prefixed structure through `targets_of`.

use crate::config::{SuffixConvention, TargetPrefixes, ValidationConfig};
use crate::model::{DicomType, PlanSnapshot, Structure};

/// Target volume class derived from the id prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    Ptv,
    Ctv,
    Gtv,
}

impl TargetKind {
    /// DICOM type a structure with this prefix must carry.
    pub fn expected_dicom_type(&self) -> DicomType {
        match self {
            TargetKind::Ptv => DicomType::Ptv,
            TargetKind::Ctv => DicomType::Ctv,
            TargetKind::Gtv => DicomType::Gtv,
        }
    }
}

/// Why a structure was excluded from coverage checking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExclusionReason {
    SupportOrMarker,
    NamePattern(String),
    ExplicitId,
    NonPrescribedTarget,
}

/// Role of an eligible structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructureRole {
    Target(TargetKind),
    OrganAtRisk,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Excluded(ExclusionReason),
    Eligible(StructureRole),
}

impl Classification {
    pub fn is_eligible(&self) -> bool {
        matches!(self, Classification::Eligible(_))
    }
}

/// Case-insensitive ASCII prefix test that never panics on char boundaries.
fn starts_with_ignore_case(id: &str, prefix: &str) -> bool {
    id.len() >= prefix.len()
        && id.is_char_boundary(prefix.len())
        && id[..prefix.len()].eq_ignore_ascii_case(prefix)
}

/// Target class of an id, from its prefix.
pub fn target_kind_of(id: &str, prefixes: &TargetPrefixes) -> Option<TargetKind> {
    if starts_with_ignore_case(id, &prefixes.ptv) {
        Some(TargetKind::Ptv)
    } else if starts_with_ignore_case(id, &prefixes.ctv) {
        Some(TargetKind::Ctv)
    } else if starts_with_ignore_case(id, &prefixes.gtv) {
        Some(TargetKind::Gtv)
    } else {
        None
    }
}

/// Remainder of `id` after removing `prefix` (case-insensitive).
///
/// Returns `None` when `id` does not start with `prefix`. Under
/// `TrimSeparator` leading `_`, `-` and spaces are dropped from the
/// remainder.
pub fn suffix_of<'a>(id: &'a str, prefix: &str, convention: SuffixConvention) -> Option<&'a str> {
    if !starts_with_ignore_case(id, prefix) {
        return None;
    }
    let rest = &id[prefix.len()..];
    Some(match convention {
        SuffixConvention::TrimSeparator => rest.trim_start_matches(['_', '-', ' ']),
        SuffixConvention::Raw => rest,
    })
}

/// Whether `id` matches one exclusion pattern.
pub fn matches_pattern(id: &str, pattern: &str) -> bool {
    let id = id.to_lowercase();
    let pattern = pattern.to_lowercase();
    let leading = pattern.starts_with('*');
    let trailing = pattern.len() > 1 && pattern.ends_with('*');
    let core = pattern.trim_matches('*');
    if core.is_empty() {
        return leading;
    }
    match (leading, trailing) {
        (true, true) => id.contains(core),
        (true, false) => id.ends_with(core),
        (false, true) => id.starts_with(core),
        (false, false) => id == core,
    }
}

/// Classify a single structure.
pub fn classify(
    structure: &Structure,
    reviewed_target_ids: &[String],
    config: &ValidationConfig,
) -> Classification {
    if structure.dicom_type.is_support_or_marker() {
        return Classification::Excluded(ExclusionReason::SupportOrMarker);
    }

    if let Some(pattern) = config
        .excluded_name_patterns
        .iter()
        .find(|p| matches_pattern(&structure.id, p))
    {
        return Classification::Excluded(ExclusionReason::NamePattern(pattern.clone()));
    }

    if config
        .excluded_structure_ids
        .iter()
        .any(|id| structure.id_eq(id))
    {
        return Classification::Excluded(ExclusionReason::ExplicitId);
    }

    match target_kind_of(&structure.id, &config.target_prefixes) {
        Some(kind) => {
            if reviewed_target_ids.iter().any(|t| structure.id_eq(t)) {
                Classification::Eligible(StructureRole::Target(kind))
            } else {
                Classification::Excluded(ExclusionReason::NonPrescribedTarget)
            }
        }
        None => Classification::Eligible(StructureRole::OrganAtRisk),
    }
}

/// One classified structure.
#[derive(Debug, Clone)]
pub struct CatalogEntry<'a> {
    pub structure: &'a Structure,
    pub classification: Classification,
    /// Prefix-derived class, independent of prescription membership
    pub target_kind: Option<TargetKind>,
    /// Excluded by support type, pattern or explicit id
    pub hard_excluded: bool,
}

/// Classification of every structure in a snapshot, built once per run.
#[derive(Debug, Clone)]
pub struct StructureCatalog<'a> {
    entries: Vec<CatalogEntry<'a>>,
    suffix_convention: SuffixConvention,
    prefixes: TargetPrefixes,
}

impl<'a> StructureCatalog<'a> {
    pub fn build(plan: &'a PlanSnapshot, config: &ValidationConfig) -> Self {
        let reviewed = plan.reviewed_target_ids();
        let entries = plan
            .structures()
            .iter()
            .map(|structure| {
                let classification = classify(structure, &reviewed, config);
                let hard_excluded = matches!(
                    classification,
                    Classification::Excluded(
                        ExclusionReason::SupportOrMarker
                            | ExclusionReason::NamePattern(_)
                            | ExclusionReason::ExplicitId
                    )
                );
                CatalogEntry {
                    structure,
                    classification,
                    target_kind: target_kind_of(&structure.id, &config.target_prefixes),
                    hard_excluded,
                }
            })
            .collect();

        StructureCatalog {
            entries,
            suffix_convention: config.suffix_convention,
            prefixes: config.target_prefixes.clone(),
        }
    }

    pub fn entries(&self) -> &[CatalogEntry<'a>] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Structures that require goal coverage.
    pub fn eligible(&self) -> impl Iterator<Item = &CatalogEntry<'a>> {
        self.entries.iter().filter(|e| e.classification.is_eligible())
    }

    /// Every target-prefixed structure, prescribed or not, except those
    /// removed by support type, pattern or explicit id.
    pub fn targets_of(&self, kind: TargetKind) -> impl Iterator<Item = &'a Structure> + '_ {
        self.entries
            .iter()
            .filter(move |e| e.target_kind == Some(kind) && !e.hard_excluded)
            .map(|e| e.structure)
    }

    /// All target-prefixed structures that are not hard-excluded.
    pub fn all_targets(&self) -> impl Iterator<Item = &'a Structure> + '_ {
        self.entries
            .iter()
            .filter(|e| e.target_kind.is_some() && !e.hard_excluded)
            .map(|e| e.structure)
    }

    /// Eligible organs at risk.
    pub fn organs_at_risk(&self) -> impl Iterator<Item = &'a Structure> + '_ {
        self.entries
            .iter()
            .filter(|e| e.classification == Classification::Eligible(StructureRole::OrganAtRisk))
            .map(|e| e.structure)
    }

    pub fn prefix_for(&self, kind: TargetKind) -> &str {
        match kind {
            TargetKind::Ptv => &self.prefixes.ptv,
            TargetKind::Ctv => &self.prefixes.ctv,
            TargetKind::Gtv => &self.prefixes.gtv,
        }
    }

    /// Suffix of a structure id under its own target prefix.
    pub fn suffix(&self, structure: &'a Structure, kind: TargetKind) -> Option<&'a str> {
        suffix_of(&structure.id, self.prefix_for(kind), self.suffix_convention)
    }

    /// CTV and GTV structures whose suffix equals the given PTV's suffix.
    pub fn matched_inner_targets(&self, ptv: &'a Structure) -> Vec<&'a Structure> {
        let Some(ptv_suffix) = self.suffix(ptv, TargetKind::Ptv) else {
            return Vec::new();
        };
        [TargetKind::Ctv, TargetKind::Gtv]
            .into_iter()
            .flat_map(|kind| {
                self.targets_of(kind)
                    .filter(move |s| {
                        self.suffix(*s, kind)
                            .map(|sfx| sfx.eq_ignore_ascii_case(ptv_suffix))
                            .unwrap_or(false)
                    })
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    /// The body contour: configured id first, then the first EXTERNAL-typed structure.
    pub fn body(&self, body_id: &str) -> Option<&'a Structure> {
        self.entries
            .iter()
            .map(|e| e.structure)
            .find(|s| s.id_eq(body_id))
            .or_else(|| {
                self.entries
                    .iter()
                    .map(|e| e.structure)
                    .find(|s| s.dicom_type == DicomType::External)
            })
    }
}
