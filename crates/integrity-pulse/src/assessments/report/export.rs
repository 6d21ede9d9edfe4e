use super::super::scoring::round_display;
use super::summary::{ReportWindow, ScoredAssessment};
use serde::{Deserialize, Serialize};

/// Download format requested by the reporting caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    Json,
    Csv,
}

/// One flattened assessment row, already rounded for display so the export
/// layer does not re-derive business rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRow {
    #[serde(rename = "Department")]
    pub department: String,
    #[serde(rename = "Subject")]
    pub subject: String,
    #[serde(rename = "Overall Score")]
    pub overall_score: u8,
    #[serde(rename = "Risk Level")]
    pub risk_level: &'static str,
    #[serde(rename = "Moral Level")]
    pub moral_level: String,
    #[serde(rename = "Completed On")]
    pub completed_on: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("csv writer failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("csv buffer flush failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv output was not valid utf-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Shape the window's assessments for download, ordered by department then
/// subject.
pub fn export_rows(rows: &[ScoredAssessment], window: &ReportWindow) -> Vec<ExportRow> {
    let mut shaped: Vec<ExportRow> = rows
        .iter()
        .filter(|row| window.contains(row.completed_on))
        .map(|row| ExportRow {
            department: row.department.clone(),
            subject: row.subject_id.clone(),
            overall_score: round_display(row.overall_score),
            risk_level: row.risk_level.label(),
            moral_level: row
                .moral_level
                .map(|level| level.label().to_string())
                .unwrap_or_else(|| "n/a".to_string()),
            completed_on: row.completed_on.format("%Y-%m-%d").to_string(),
        })
        .collect();

    shaped.sort_by(|a, b| {
        a.department
            .cmp(&b.department)
            .then_with(|| a.subject.cmp(&b.subject))
    });
    shaped
}

pub fn to_csv(rows: &[ExportRow]) -> Result<String, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| ExportError::Io(err.into_error()))?;
    Ok(String::from_utf8(bytes)?)
}
