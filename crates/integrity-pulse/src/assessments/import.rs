//! CSV ingestion of already-scored assessment rows so the roll-up reports
//! can run offline against an HRIS export.

use super::instrument::{Dimension, MoralLevel, RiskLevel};
use super::report::ScoredAssessment;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::io::Read;

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("csv parse failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row}: '{value}' is not a YYYY-MM-DD date")]
    InvalidDate { row: usize, value: String },
    #[error("row {row}: unknown risk level '{value}'")]
    UnknownRiskLevel { row: usize, value: String },
    #[error("row {row}: unknown moral level '{value}'")]
    UnknownMoralLevel { row: usize, value: String },
    #[error("row {row}: score {value} is outside the 0-100 scale")]
    ScoreOutOfRange { row: usize, value: f64 },
}

/// Read scored assessments from a delimited export. Dimension columns are
/// optional; rows missing them still feed the overall-score reports.
pub fn read_scored_csv<R: Read>(reader: R) -> Result<Vec<ScoredAssessment>, ImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut rows = Vec::new();

    for (index, record) in csv_reader.deserialize::<ScoredRow>().enumerate() {
        let row_number = index + 2; // header occupies line one
        let raw = record?;
        rows.push(raw.into_scored(row_number)?);
    }

    Ok(rows)
}

#[derive(Debug, Deserialize)]
struct ScoredRow {
    #[serde(rename = "Subject")]
    subject: String,
    #[serde(rename = "Department")]
    department: String,
    #[serde(rename = "Overall Score")]
    overall_score: f64,
    #[serde(rename = "Risk Level")]
    risk_level: String,
    #[serde(rename = "Moral Level", default, deserialize_with = "empty_string_as_none")]
    moral_level: Option<String>,
    #[serde(rename = "Completed On")]
    completed_on: String,
    #[serde(rename = "HON", default)]
    hon: Option<f64>,
    #[serde(rename = "CON", default)]
    con: Option<f64>,
    #[serde(rename = "RES", default)]
    res: Option<f64>,
    #[serde(rename = "RSP", default)]
    rsp: Option<f64>,
    #[serde(rename = "JUS", default)]
    jus: Option<f64>,
    #[serde(rename = "COR", default)]
    cor: Option<f64>,
}

impl ScoredRow {
    fn into_scored(self, row: usize) -> Result<ScoredAssessment, ImportError> {
        if !(0.0..=100.0).contains(&self.overall_score) {
            return Err(ImportError::ScoreOutOfRange {
                row,
                value: self.overall_score,
            });
        }

        let completed_on = NaiveDate::parse_from_str(&self.completed_on, "%Y-%m-%d")
            .map_err(|_| ImportError::InvalidDate {
                row,
                value: self.completed_on.clone(),
            })?;

        let risk_level = parse_risk(&self.risk_level).ok_or_else(|| {
            ImportError::UnknownRiskLevel {
                row,
                value: self.risk_level.clone(),
            }
        })?;

        let moral_level = match &self.moral_level {
            None => None,
            Some(value) if value.eq_ignore_ascii_case("n/a") => None,
            Some(value) => Some(parse_moral(value).ok_or_else(|| {
                ImportError::UnknownMoralLevel {
                    row,
                    value: value.clone(),
                }
            })?),
        };

        let mut dimension_scores = BTreeMap::new();
        for (dimension, value) in [
            (Dimension::Honesty, self.hon),
            (Dimension::Reliability, self.con),
            (Dimension::EthicalResilience, self.res),
            (Dimension::Responsibility, self.rsp),
            (Dimension::Justice, self.jus),
            (Dimension::MoralCourage, self.cor),
        ] {
            if let Some(score) = value {
                if !(0.0..=100.0).contains(&score) {
                    return Err(ImportError::ScoreOutOfRange { row, value: score });
                }
                dimension_scores.insert(dimension, score);
            }
        }

        Ok(ScoredAssessment {
            subject_id: self.subject,
            department: self.department,
            completed_on,
            overall_score: self.overall_score,
            dimension_scores,
            risk_level,
            moral_level,
        })
    }
}

fn parse_risk(value: &str) -> Option<RiskLevel> {
    match value.to_ascii_lowercase().as_str() {
        "low" => Some(RiskLevel::Low),
        "moderate" => Some(RiskLevel::Moderate),
        "high" => Some(RiskLevel::High),
        "critical" => Some(RiskLevel::Critical),
        _ => None,
    }
}

fn parse_moral(value: &str) -> Option<MoralLevel> {
    match value.to_ascii_lowercase().as_str() {
        "pre_conventional" => Some(MoralLevel::PreConventional),
        "conventional" => Some(MoralLevel::Conventional),
        "post_conventional" => Some(MoralLevel::PostConventional),
        _ => None,
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
