use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Diabetic retinopathy grade, ordered by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DrGrade {
    NoDR,
    MildNPDR,
    ModerateNPDR,
    SevereNPDR,
    ProliferativeDR,
}

impl DrGrade {
    pub const ALL: [DrGrade; 5] = [
        DrGrade::NoDR,
        DrGrade::MildNPDR,
        DrGrade::ModerateNPDR,
        DrGrade::SevereNPDR,
        DrGrade::ProliferativeDR,
    ];

    pub fn from_severity(severity: u8) -> Option<Self> {
        Self::ALL.get(severity as usize).copied()
    }

    pub fn severity(&self) -> u8 {
        match self {
            DrGrade::NoDR => 0,
            DrGrade::MildNPDR => 1,
            DrGrade::ModerateNPDR => 2,
            DrGrade::SevereNPDR => 3,
            DrGrade::ProliferativeDR => 4,
        }
    }

    /// Human-readable diagnosis used in reports.
    pub fn display_name(&self) -> &'static str {
        match self {
            DrGrade::NoDR => "No DR",
            DrGrade::MildNPDR => "Mild NPDR",
            DrGrade::ModerateNPDR => "Moderate NPDR",
            DrGrade::SevereNPDR => "Severe NPDR",
            DrGrade::ProliferativeDR => "Proliferative DR",
        }
    }
}

impl std::fmt::Display for DrGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Colour band a presentation layer uses for a grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisplayTier {
    Normal,
    Mild,
    Moderate,
    Severe,
    Urgent,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetinalFeatures {
    pub microaneurysms: bool,
    pub hemorrhages: bool,
    pub exudates: bool,
    pub cotton_wool_spots: bool,
    pub neovascularization: bool,
}

impl RetinalFeatures {
    /// Report labels paired with their flags, in report order.
    pub fn lines(&self) -> [(&'static str, bool); 5] {
        [
            ("Microaneurysms", self.microaneurysms),
            ("Hemorrhages", self.hemorrhages),
            ("Hard Exudates", self.exudates),
            ("Cotton Wool Spots", self.cotton_wool_spots),
            ("Neovascularization", self.neovascularization),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    pub label: DrGrade,
    pub confidence: f32,
    pub severity: u8,
    pub description: String,
    pub recommendation: String,
    pub features: RetinalFeatures,
    pub timestamp: DateTime<Utc>,
}

impl ClassificationResult {
    pub fn display_tier(&self) -> DisplayTier {
        crate::services::classifier::grading::grade_info(self.label).tier
    }
}
