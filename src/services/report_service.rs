//! Plain-text screening report.

use crate::models::classify_types::ClassificationResult;
use crate::models::report_types::{Report, ReportMetadata};
use chrono::{DateTime, Local};
use std::fmt::Write;

pub const DISCLAIMER: &str = "This AI screening tool is for educational purposes and should not replace professional medical diagnosis. Please consult with a qualified ophthalmologist for definitive diagnosis and treatment.";

const PATIENT_ID_LEN: usize = 9;

/// Fresh opaque identifier for the patient line and file name.
pub fn new_patient_id() -> String {
    let mut id = uuid::Uuid::new_v4().simple().to_string();
    id.truncate(PATIENT_ID_LEN);
    id
}

pub fn report_file_name(patient_id: &str) -> String {
    format!("DR_Report_{}.txt", patient_id)
}

/// Render a report with a new patient id stamped at the current local time.
pub fn render(result: &ClassificationResult, meta: &ReportMetadata) -> Report {
    render_with(result, meta, new_patient_id(), Local::now())
}

/// Render with an explicit id and time; the output is a pure function of its inputs.
pub fn render_with(
    result: &ClassificationResult,
    meta: &ReportMetadata,
    patient_id: String,
    generated_at: DateTime<Local>,
) -> Report {
    let mut text = String::new();
    let _ = write_report(&mut text, result, meta, &patient_id, &generated_at);

    Report {
        file_name: report_file_name(&patient_id),
        patient_id,
        generated_at,
        text,
    }
}

fn write_report(
    out: &mut String,
    result: &ClassificationResult,
    meta: &ReportMetadata,
    patient_id: &str,
    generated_at: &DateTime<Local>,
) -> std::fmt::Result {
    writeln!(out, "DIABETIC RETINOPATHY SCREENING REPORT")?;
    writeln!(out, "=====================================")?;
    writeln!(out)?;
    writeln!(out, "Patient: Patient ID: {}", patient_id)?;
    writeln!(out, "Date: {}", generated_at.format("%Y-%m-%d %H:%M:%S"))?;
    writeln!(out, "Analysis: {}", meta.analysis_type)?;
    if let Some(name) = &meta.image_name {
        writeln!(out, "Image: {}", name)?;
    }
    writeln!(out)?;

    writeln!(out, "RESULTS:")?;
    writeln!(out, "--------")?;
    writeln!(out, "Diagnosis: {}", result.label.display_name())?;
    writeln!(out, "Confidence: {:.1}%", result.confidence * 100.0)?;
    writeln!(out, "Severity Level: {}/4", result.severity)?;
    writeln!(out)?;

    writeln!(out, "DETECTED FEATURES:")?;
    writeln!(out, "-----------------")?;
    for (name, present) in result.features.lines() {
        let status = if present { "Present" } else { "Not detected" };
        writeln!(out, "• {}: {}", name, status)?;
    }
    writeln!(out)?;

    writeln!(out, "RECOMMENDATION:")?;
    writeln!(out, "---------------")?;
    writeln!(out, "{}", result.recommendation)?;
    writeln!(out)?;

    writeln!(out, "DISCLAIMER:")?;
    writeln!(out, "-----------")?;
    writeln!(out, "{}", DISCLAIMER)
}

/// One-line summary for the share action.
pub fn share_summary(result: &ClassificationResult) -> String {
    format!(
        "DR screening result: {} ({:.1}% confidence, severity {}/4). {}",
        result.label.display_name(),
        result.confidence * 100.0,
        result.severity,
        result.recommendation
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::classify_types::{DrGrade, RetinalFeatures};
    use crate::services::classifier::grading::build_result;
    use chrono::{TimeZone, Utc};

    fn fixed_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 0).unwrap()
    }

    #[test]
    fn renders_the_fixed_layout() {
        let features = RetinalFeatures {
            microaneurysms: true,
            hemorrhages: true,
            ..Default::default()
        };
        let result = build_result(DrGrade::ModerateNPDR, 0.83, features, Utc::now());
        let report = render_with(&result, &ReportMetadata::default(), "abc123xyz".into(), fixed_time());

        let expected = "\
DIABETIC RETINOPATHY SCREENING REPORT
=====================================

Patient: Patient ID: abc123xyz
Date: 2024-03-09 14:05:00
Analysis: AI-Assisted Screening

RESULTS:
--------
Diagnosis: Moderate NPDR
Confidence: 83.0%
Severity Level: 2/4

DETECTED FEATURES:
-----------------
• Microaneurysms: Present
• Hemorrhages: Present
• Hard Exudates: Not detected
• Cotton Wool Spots: Not detected
• Neovascularization: Not detected

RECOMMENDATION:
---------------
Ophthalmologist visit in 3–6 months

DISCLAIMER:
-----------
This AI screening tool is for educational purposes and should not replace professional medical diagnosis. Please consult with a qualified ophthalmologist for definitive diagnosis and treatment.
";
        assert_eq!(report.text, expected);
        assert_eq!(report.file_name, "DR_Report_abc123xyz.txt");
    }

    #[test]
    fn same_inputs_same_text() {
        let result = build_result(DrGrade::NoDR, 0.92, RetinalFeatures::default(), Utc::now());
        let meta = ReportMetadata::default();
        let a = render_with(&result, &meta, "id".into(), fixed_time());
        let b = render_with(&result, &meta, "id".into(), fixed_time());
        assert_eq!(a.text, b.text);
    }

    #[test]
    fn fresh_ids_differ() {
        let result = build_result(DrGrade::NoDR, 0.92, RetinalFeatures::default(), Utc::now());
        let a = render(&result, &ReportMetadata::default());
        let b = render(&result, &ReportMetadata::default());
        assert_eq!(a.patient_id.len(), 9);
        assert_ne!(a.patient_id, b.patient_id);
        assert!(a.file_name.contains(&a.patient_id));
    }

    #[test]
    fn confidence_rounds_to_one_decimal() {
        let result = build_result(DrGrade::MildNPDR, 0.8768, RetinalFeatures::default(), Utc::now());
        let report = render_with(&result, &ReportMetadata::default(), "x".into(), fixed_time());
        assert!(report.text.contains("Confidence: 87.7%\n"));
    }

    #[test]
    fn image_name_line_is_optional() {
        let result = build_result(DrGrade::NoDR, 0.92, RetinalFeatures::default(), Utc::now());
        let meta = ReportMetadata {
            image_name: Some("fundus.png".into()),
            ..Default::default()
        };
        let report = render_with(&result, &meta, "x".into(), fixed_time());
        assert!(report.text.contains("Analysis: AI-Assisted Screening\nImage: fundus.png\n"));
    }

    #[test]
    fn share_summary_names_grade() {
        let result = build_result(
            DrGrade::ProliferativeDR,
            0.94,
            RetinalFeatures {
                neovascularization: true,
                ..Default::default()
            },
            Utc::now(),
        );
        assert_eq!(
            share_summary(&result),
            "DR screening result: Proliferative DR (94.0% confidence, severity 4/4). Immediate referral and treatment"
        );
    }
}
