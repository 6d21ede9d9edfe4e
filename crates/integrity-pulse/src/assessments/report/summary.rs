use super::super::instrument::{Dimension, MoralLevel, RiskLevel};
use super::super::scoring::round_display;
use super::views::{
    percentage, DepartmentComparison, DepartmentDimensionRow, DepartmentSummary, DimensionAverage,
    DimensionCell, DimensionComparison, DimensionInfo, MoralDistribution, OrganizationMetrics,
    RankingEntry, RiskDistribution, TrendPoint,
};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One already-scored assessment flattened for roll-up reporting. The
/// subject-to-department resolution has happened upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredAssessment {
    pub subject_id: String,
    pub department: String,
    pub completed_on: NaiveDate,
    pub overall_score: f64,
    pub dimension_scores: BTreeMap<Dimension, f64>,
    pub risk_level: RiskLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moral_level: Option<MoralLevel>,
}

/// Inclusive date window; open on either end.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportWindow {
    #[serde(default)]
    pub start: Option<NaiveDate>,
    #[serde(default)]
    pub end: Option<NaiveDate>,
}

impl ReportWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        if let Some(start) = self.start {
            if date < start {
                return false;
            }
        }
        if let Some(end) = self.end {
            if date > end {
                return false;
            }
        }
        true
    }
}

/// Metric used to order the department ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingMetric {
    AverageScore,
    LowRiskPercentage,
}

/// Weights applied to risk-bucket counts when collapsing the distribution
/// into the single organizational health number.
pub const HEALTH_INDEX_WEIGHTS: [(RiskLevel, u32); 4] = [
    (RiskLevel::Low, 100),
    (RiskLevel::Moderate, 70),
    (RiskLevel::High, 30),
    (RiskLevel::Critical, 0),
];

/// Weighted health proxy over a risk distribution; `None` when there is no
/// data rather than a fabricated zero.
pub fn health_index(distribution: &RiskDistribution) -> Option<u8> {
    let total = distribution.total();
    if total == 0 {
        return None;
    }

    let weighted: u64 = HEALTH_INDEX_WEIGHTS
        .iter()
        .map(|(level, weight)| {
            let count = match level {
                RiskLevel::Low => distribution.low,
                RiskLevel::Moderate => distribution.moderate,
                RiskLevel::High => distribution.high,
                RiskLevel::Critical => distribution.critical,
            };
            count as u64 * u64::from(*weight)
        })
        .sum();

    Some((weighted as f64 / total as f64).round() as u8)
}

struct DepartmentAccumulator {
    sum: f64,
    min: f64,
    max: f64,
    count: usize,
    subjects: BTreeSet<String>,
    risks: RiskDistribution,
}

impl DepartmentAccumulator {
    fn new() -> Self {
        Self {
            sum: 0.0,
            min: f64::MAX,
            max: f64::MIN,
            count: 0,
            subjects: BTreeSet::new(),
            risks: RiskDistribution::default(),
        }
    }

    fn push(&mut self, row: &ScoredAssessment) {
        self.sum += row.overall_score;
        self.min = self.min.min(row.overall_score);
        self.max = self.max.max(row.overall_score);
        self.count += 1;
        self.subjects.insert(row.subject_id.clone());
        self.risks.add(row.risk_level);
    }

    fn average(&self) -> f64 {
        self.sum / self.count as f64
    }
}

/// Group scored assessments by department and compare each against the
/// organization average over the same window. Departments with no
/// assessments in the window simply do not appear.
pub fn department_comparison(
    rows: &[ScoredAssessment],
    window: &ReportWindow,
) -> DepartmentComparison {
    let mut groups: BTreeMap<&str, DepartmentAccumulator> = BTreeMap::new();
    let mut org_sum = 0.0;
    let mut org_count = 0usize;

    for row in rows.iter().filter(|row| window.contains(row.completed_on)) {
        groups
            .entry(row.department.as_str())
            .or_insert_with(DepartmentAccumulator::new)
            .push(row);
        org_sum += row.overall_score;
        org_count += 1;
    }

    if org_count == 0 {
        return DepartmentComparison {
            departments: Vec::new(),
            organization_average: None,
            total_assessments: 0,
        };
    }

    let organization_average = round_display(org_sum / org_count as f64);

    let mut departments: Vec<DepartmentSummary> = groups
        .into_iter()
        .map(|(department, acc)| {
            let avg_score = round_display(acc.average());
            DepartmentSummary {
                department: department.to_string(),
                avg_score,
                min_score: round_display(acc.min),
                max_score: round_display(acc.max),
                total_assessments: acc.count,
                distinct_subjects: acc.subjects.len(),
                risk_percentage: acc.risks.percentages(),
                risk_distribution: acc.risks,
                compared_to_org: i16::from(avg_score) - i16::from(organization_average),
            }
        })
        .collect();

    departments.sort_by(|a, b| b.avg_score.cmp(&a.avg_score));

    DepartmentComparison {
        departments,
        organization_average: Some(organization_average),
        total_assessments: org_count,
    }
}

/// Department x dimension matrix of average scores.
pub fn dimension_comparison(
    rows: &[ScoredAssessment],
    window: &ReportWindow,
) -> DimensionComparison {
    struct Cell {
        sum: f64,
        min: f64,
        max: f64,
        count: usize,
    }

    let mut groups: BTreeMap<&str, BTreeMap<Dimension, Cell>> = BTreeMap::new();

    for row in rows.iter().filter(|row| window.contains(row.completed_on)) {
        let dept = groups.entry(row.department.as_str()).or_default();
        for (dimension, score) in &row.dimension_scores {
            let cell = dept.entry(*dimension).or_insert(Cell {
                sum: 0.0,
                min: f64::MAX,
                max: f64::MIN,
                count: 0,
            });
            cell.sum += score;
            cell.min = cell.min.min(*score);
            cell.max = cell.max.max(*score);
            cell.count += 1;
        }
    }

    let departments = groups
        .into_iter()
        .map(|(department, cells)| DepartmentDimensionRow {
            department: department.to_string(),
            dimensions: cells
                .into_iter()
                .map(|(dimension, cell)| {
                    (
                        dimension.code(),
                        DimensionCell {
                            avg_score: round_display(cell.sum / cell.count as f64),
                            min_score: round_display(cell.min),
                            max_score: round_display(cell.max),
                            count: cell.count,
                        },
                    )
                })
                .collect(),
        })
        .collect();

    DimensionComparison {
        dimensions: Dimension::ordered()
            .into_iter()
            .map(|dimension| DimensionInfo {
                code: dimension.code(),
                name: dimension.name(),
            })
            .collect(),
        departments,
    }
}

/// Rank departments by the chosen metric, descending, with 1-based positions
/// truncated to `limit`. The underlying sort is stable, so equal keys keep
/// their department-name order across repeated runs.
pub fn department_ranking(
    rows: &[ScoredAssessment],
    window: &ReportWindow,
    metric: RankingMetric,
    limit: usize,
) -> Vec<RankingEntry> {
    let comparison = department_comparison(rows, window);

    let mut entries: Vec<RankingEntry> = comparison
        .departments
        .into_iter()
        .map(|summary| RankingEntry {
            position: 0,
            low_risk_percentage: summary.risk_percentage.low,
            department: summary.department,
            avg_score: summary.avg_score,
            total_assessments: summary.total_assessments,
        })
        .collect();

    entries.sort_by(|a, b| match metric {
        RankingMetric::AverageScore => b.avg_score.cmp(&a.avg_score),
        RankingMetric::LowRiskPercentage => b.low_risk_percentage.cmp(&a.low_risk_percentage),
    });

    entries.truncate(limit);
    for (index, entry) in entries.iter_mut().enumerate() {
        entry.position = index + 1;
    }
    entries
}

/// Monthly aggregates over a look-back window ending at `today`, oldest
/// month first. Months with no assessments are omitted.
pub fn monthly_trend(
    rows: &[ScoredAssessment],
    months: u32,
    today: NaiveDate,
    department: Option<&str>,
) -> Vec<TrendPoint> {
    let start = months_back(today, months.saturating_sub(1));

    struct MonthAccumulator {
        sum: f64,
        count: usize,
        risks: RiskDistribution,
    }

    let mut buckets: BTreeMap<String, MonthAccumulator> = BTreeMap::new();

    for row in rows {
        if row.completed_on < start || row.completed_on > today {
            continue;
        }
        if let Some(department) = department {
            if row.department != department {
                continue;
            }
        }
        let key = format!(
            "{:04}-{:02}",
            row.completed_on.year(),
            row.completed_on.month()
        );
        let bucket = buckets.entry(key).or_insert(MonthAccumulator {
            sum: 0.0,
            count: 0,
            risks: RiskDistribution::default(),
        });
        bucket.sum += row.overall_score;
        bucket.count += 1;
        bucket.risks.add(row.risk_level);
    }

    buckets
        .into_iter()
        .map(|(month, acc)| TrendPoint {
            month,
            avg_score: round_display(acc.sum / acc.count as f64),
            total_assessments: acc.count,
            low_risk_percentage: percentage(acc.risks.low, acc.count),
            high_risk_percentage: percentage(acc.risks.high + acc.risks.critical, acc.count),
        })
        .collect()
}

/// Organization-wide consolidated metrics; `None` when the window is empty.
pub fn organization_metrics(
    rows: &[ScoredAssessment],
    window: &ReportWindow,
) -> Option<OrganizationMetrics> {
    let mut sum = 0.0;
    let mut count = 0usize;
    let mut subjects = BTreeSet::new();
    let mut departments = BTreeSet::new();
    let mut risks = RiskDistribution::default();
    let mut morals = MoralDistribution::default();
    let mut dimension_sums: BTreeMap<Dimension, (f64, usize)> = BTreeMap::new();

    for row in rows.iter().filter(|row| window.contains(row.completed_on)) {
        sum += row.overall_score;
        count += 1;
        subjects.insert(row.subject_id.as_str());
        departments.insert(row.department.as_str());
        risks.add(row.risk_level);
        if let Some(level) = row.moral_level {
            morals.add(level);
        }
        for (dimension, score) in &row.dimension_scores {
            let entry = dimension_sums.entry(*dimension).or_insert((0.0, 0));
            entry.0 += score;
            entry.1 += 1;
        }
    }

    if count == 0 {
        return None;
    }

    let health = health_index(&risks)?;

    Some(OrganizationMetrics {
        avg_score: round_display(sum / count as f64),
        total_assessments: count,
        total_subjects: subjects.len(),
        total_departments: departments.len(),
        risk_distribution: risks,
        moral_distribution: morals,
        dimension_averages: dimension_sums
            .into_iter()
            .map(|(dimension, (total, entries))| DimensionAverage {
                code: dimension.code(),
                name: dimension.name(),
                avg_score: round_display(total / entries as f64),
            })
            .collect(),
        health_index: health,
    })
}

/// First day of the month `months` calendar months before `date`.
fn months_back(date: NaiveDate, months: u32) -> NaiveDate {
    let total = date.year() * 12 + date.month0() as i32 - months as i32;
    let year = total.div_euclid(12);
    let month = total.rem_euclid(12) as u32 + 1;
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(date)
}
