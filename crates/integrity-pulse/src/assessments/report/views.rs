use super::super::instrument::{MoralLevel, RiskLevel};
use serde::Serialize;
use std::collections::BTreeMap;

/// Count of assessments per risk bucket.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RiskDistribution {
    pub low: usize,
    pub moderate: usize,
    pub high: usize,
    pub critical: usize,
}

impl RiskDistribution {
    pub fn add(&mut self, level: RiskLevel) {
        match level {
            RiskLevel::Low => self.low += 1,
            RiskLevel::Moderate => self.moderate += 1,
            RiskLevel::High => self.high += 1,
            RiskLevel::Critical => self.critical += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.low + self.moderate + self.high + self.critical
    }

    pub fn percentages(&self) -> RiskPercentages {
        let total = self.total();
        RiskPercentages {
            low: percentage(self.low, total),
            moderate: percentage(self.moderate, total),
            high: percentage(self.high, total),
            critical: percentage(self.critical, total),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RiskPercentages {
    pub low: u8,
    pub moderate: u8,
    pub high: u8,
    pub critical: u8,
}

/// Count of assessments per moral development level.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MoralDistribution {
    pub pre_conventional: usize,
    pub conventional: usize,
    pub post_conventional: usize,
}

impl MoralDistribution {
    pub fn add(&mut self, level: MoralLevel) {
        match level {
            MoralLevel::PreConventional => self.pre_conventional += 1,
            MoralLevel::Conventional => self.conventional += 1,
            MoralLevel::PostConventional => self.post_conventional += 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepartmentSummary {
    pub department: String,
    pub avg_score: u8,
    pub min_score: u8,
    pub max_score: u8,
    pub total_assessments: usize,
    pub distinct_subjects: usize,
    pub risk_distribution: RiskDistribution,
    pub risk_percentage: RiskPercentages,
    /// Signed difference from the organization average over the same window.
    pub compared_to_org: i16,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepartmentComparison {
    pub departments: Vec<DepartmentSummary>,
    /// `None` when no assessments fall inside the window; zero is a real
    /// score and must stay distinguishable from "no data".
    pub organization_average: Option<u8>,
    pub total_assessments: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DimensionCell {
    pub avg_score: u8,
    pub min_score: u8,
    pub max_score: u8,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepartmentDimensionRow {
    pub department: String,
    /// Keyed by dimension code (HON, CON, ...).
    pub dimensions: BTreeMap<&'static str, DimensionCell>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DimensionInfo {
    pub code: &'static str,
    pub name: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionComparison {
    pub dimensions: Vec<DimensionInfo>,
    pub departments: Vec<DepartmentDimensionRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingEntry {
    pub position: usize,
    pub department: String,
    pub avg_score: u8,
    pub total_assessments: usize,
    pub low_risk_percentage: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    /// Calendar month in YYYY-MM form.
    pub month: String,
    pub avg_score: u8,
    pub total_assessments: usize,
    pub low_risk_percentage: u8,
    /// High and critical buckets combined.
    pub high_risk_percentage: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DimensionAverage {
    pub code: &'static str,
    pub name: &'static str,
    pub avg_score: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrganizationMetrics {
    pub avg_score: u8,
    pub total_assessments: usize,
    pub total_subjects: usize,
    pub total_departments: usize,
    pub risk_distribution: RiskDistribution,
    pub moral_distribution: MoralDistribution,
    pub dimension_averages: Vec<DimensionAverage>,
    pub health_index: u8,
}

pub(crate) fn percentage(count: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    ((count as f64 / total as f64) * 100.0).round() as u8
}
