//! The fixed severity table every engine reports against.

use crate::error::EngineError;
use crate::models::classify_types::{ClassificationResult, DisplayTier, DrGrade, RetinalFeatures};
use chrono::{DateTime, Utc};

#[derive(Debug)]
pub struct GradeInfo {
    pub grade: DrGrade,
    pub description: &'static str,
    pub recommendation: &'static str,
    pub tier: DisplayTier,
    /// Confidence the mock engine reports for this grade.
    pub base_confidence: f32,
}

pub static GRADES: [GradeInfo; 5] = [
    GradeInfo {
        grade: DrGrade::NoDR,
        description: "No signs of diabetic retinopathy detected",
        recommendation: "Continue routine eye exams annually",
        tier: DisplayTier::Normal,
        base_confidence: 0.92,
    },
    GradeInfo {
        grade: DrGrade::MildNPDR,
        description: "Early microaneurysms, minimal impact",
        recommendation: "Recheck in 6–12 months, manage blood sugar",
        tier: DisplayTier::Mild,
        base_confidence: 0.87,
    },
    GradeInfo {
        grade: DrGrade::ModerateNPDR,
        description: "Hemorrhages and exudates present",
        recommendation: "Ophthalmologist visit in 3–6 months",
        tier: DisplayTier::Moderate,
        base_confidence: 0.83,
    },
    GradeInfo {
        grade: DrGrade::SevereNPDR,
        description: "Extensive hemorrhages, cotton-wool spots",
        recommendation: "Retinal specialist consult within 1–3 months",
        tier: DisplayTier::Severe,
        base_confidence: 0.89,
    },
    GradeInfo {
        grade: DrGrade::ProliferativeDR,
        description: "Abnormal vessel growth, retinal damage",
        recommendation: "Immediate referral and treatment",
        tier: DisplayTier::Urgent,
        base_confidence: 0.94,
    },
];

pub fn grade_info(grade: DrGrade) -> &'static GradeInfo {
    &GRADES[grade.severity() as usize]
}

pub fn grade_for_severity(severity: u8) -> Option<&'static GradeInfo> {
    GRADES.get(severity as usize)
}

/// Assemble a result whose label, severity and texts all come from one table row.
pub fn build_result(
    grade: DrGrade,
    confidence: f32,
    features: RetinalFeatures,
    timestamp: DateTime<Utc>,
) -> ClassificationResult {
    let info = grade_info(grade);
    ClassificationResult {
        label: grade,
        confidence,
        severity: grade.severity(),
        description: info.description.to_string(),
        recommendation: info.recommendation.to_string(),
        features,
        timestamp,
    }
}

/// Check a result against the engine contract.
pub fn check_result(result: &ClassificationResult) -> Result<(), EngineError> {
    if !(0.0..=1.0).contains(&result.confidence) {
        return Err(EngineError::Failure(format!(
            "confidence {} outside [0, 1]",
            result.confidence
        )));
    }
    let info = grade_for_severity(result.severity).ok_or_else(|| {
        EngineError::Failure(format!("severity {} outside 0..=4", result.severity))
    })?;
    if info.grade != result.label {
        return Err(EngineError::Failure(format!(
            "label {:?} does not match severity {}",
            result.label, result.severity
        )));
    }
    if result.features.neovascularization && result.severity != 4 {
        return Err(EngineError::Failure(format!(
            "neovascularization reported at severity {}",
            result.severity
        )));
    }
    Ok(())
}
