//! Anatomical structures and their contour geometry.

use crate::model::grid::Point3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A closed planar polygon on one image slice.
pub type Contour = Vec<Point3>;

/// DICOM RT structure type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DicomType {
    Ptv,
    Ctv,
    Gtv,
    #[serde(alias = "ORGAN", alias = "AVOIDANCE")]
    Oar,
    Support,
    Marker,
    #[serde(alias = "BODY")]
    External,
    #[serde(other)]
    Other,
}

impl DicomType {
    /// Support and marker structures never take part in goal checks.
    pub fn is_support_or_marker(&self) -> bool {
        matches!(self, DicomType::Support | DicomType::Marker)
    }
}

impl fmt::Display for DicomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DicomType::Ptv => write!(f, "PTV"),
            DicomType::Ctv => write!(f, "CTV"),
            DicomType::Gtv => write!(f, "GTV"),
            DicomType::Oar => write!(f, "OAR"),
            DicomType::Support => write!(f, "SUPPORT"),
            DicomType::Marker => write!(f, "MARKER"),
            DicomType::External => write!(f, "EXTERNAL"),
            DicomType::Other => write!(f, "OTHER"),
        }
    }
}

/// One structure from the plan's structure set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Structure {
    /// Structure id, unique case-insensitively within a snapshot
    pub id: String,
    pub dicom_type: DicomType,
    /// Required; a snapshot without it is rejected at load time
    pub volume_cc: f64,
    #[serde(default)]
    pub is_high_resolution: bool,
    /// False when the host has no segment model; geometry queries then
    /// fall back to their conservative defaults
    #[serde(default = "default_true")]
    pub has_segment: bool,
    /// Slice index -> closed polygons on that slice
    #[serde(default)]
    pub contours_by_slice: BTreeMap<u32, Vec<Contour>>,
}

fn default_true() -> bool {
    true
}

impl Structure {
    pub fn new(id: impl Into<String>, dicom_type: DicomType) -> Self {
        Structure {
            id: id.into(),
            dicom_type,
            volume_cc: 0.0,
            is_high_resolution: false,
            has_segment: true,
            contours_by_slice: BTreeMap::new(),
        }
    }

    /// True when no slice carries a contour point.
    pub fn is_empty(&self) -> bool {
        self.contours_by_slice
            .values()
            .all(|polys| polys.iter().all(|p| p.is_empty()))
    }

    /// Polygons on a slice, empty when the slice is not contoured.
    pub fn contours_on(&self, slice: u32) -> &[Contour] {
        self.contours_by_slice
            .get(&slice)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Case-insensitive id comparison.
    pub fn id_eq(&self, other: &str) -> bool {
        self.id.eq_ignore_ascii_case(other)
    }
}
