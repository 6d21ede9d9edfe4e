pub mod export;
mod summary;
pub mod views;

pub use summary::{
    department_comparison, department_ranking, dimension_comparison, health_index, monthly_trend,
    organization_metrics, RankingMetric, ReportWindow, ScoredAssessment, HEALTH_INDEX_WEIGHTS,
};
