use crate::infra::{
    default_scoring_config, InMemoryAssessmentRepository, InMemoryNotificationPublisher,
};
use chrono::{Duration, Local, NaiveDate};
use clap::Args;
use integrity_pulse::assessments::import::read_scored_csv;
use integrity_pulse::assessments::report::export::{export_rows, to_csv};
use integrity_pulse::assessments::report::{
    department_comparison, department_ranking, monthly_trend, organization_metrics,
    RankingMetric, ReportWindow, ScoredAssessment,
};
use integrity_pulse::assessments::{
    Answer, AssessmentService, QuestionBank, QuestionKind, ResponseInput,
};
use integrity_pulse::error::AppError;
use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Completion date for the simulated assessments (defaults to today).
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) completed_on: Option<NaiveDate>,
    /// Print each participant's full score report.
    #[arg(long)]
    pub(crate) verbose_scores: bool,
}

#[derive(Args, Debug)]
pub(crate) struct RollupReportArgs {
    /// Scored assessment CSV (Subject, Department, Overall Score, Risk Level,
    /// Moral Level, Completed On, plus optional dimension columns).
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Window start date (YYYY-MM-DD), inclusive
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) start: Option<NaiveDate>,
    /// Window end date (YYYY-MM-DD), inclusive
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) end: Option<NaiveDate>,
    /// Look-back for the monthly trend, in months
    #[arg(long, default_value_t = 6)]
    pub(crate) trend_months: u32,
    /// Evaluation date for the trend (defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Emit the shaped export as CSV instead of the printed report
    #[arg(long)]
    pub(crate) export_csv: bool,
}

pub(crate) fn run_rollup_report(args: RollupReportArgs) -> Result<(), AppError> {
    let RollupReportArgs {
        input,
        start,
        end,
        trend_months,
        today,
        export_csv,
    } = args;

    let file = File::open(&input)?;
    let rows = read_scored_csv(file)?;
    let window = ReportWindow { start, end };

    if export_csv {
        let shaped = export_rows(&rows, &window);
        print!("{}", to_csv(&shaped)?);
        return Ok(());
    }

    let today = today.unwrap_or_else(|| Local::now().date_naive());
    render_rollup(&rows, &window, trend_months, today);
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        completed_on,
        verbose_scores,
    } = args;

    let completed_on = completed_on.unwrap_or_else(|| Local::now().date_naive());
    let started_on = completed_on - Duration::days(1);

    println!("Integrity assessment demo");
    println!("Scoring window ends {completed_on}\n");

    let repository = Arc::new(InMemoryAssessmentRepository::default());
    let notifications = Arc::new(InMemoryNotificationPublisher::default());
    let bank = Arc::new(QuestionBank::standard_integrity());
    let service = Arc::new(AssessmentService::new(
        repository,
        notifications.clone(),
        default_scoring_config(),
        bank,
    ));

    // Fixed answer profiles so the demo output is stable across runs.
    let participants: [(&str, &str, &str, u8); 6] = [
        ("emp-101", "Finance", "a", 5),
        ("emp-102", "Finance", "b", 4),
        ("emp-103", "Finance", "c", 3),
        ("emp-104", "Sales", "b", 4),
        ("emp-105", "Sales", "d", 2),
        ("emp-106", "Support", "a", 4),
    ];

    for (subject, department, choice, scale) in participants {
        let record = match service.start(subject.to_string(), department.to_string(), started_on) {
            Ok(record) => record,
            Err(err) => {
                println!("  Could not start assessment for {subject}: {err}");
                continue;
            }
        };

        let responses: Vec<ResponseInput> = service
            .question_bank()
            .questions()
            .map(|question| ResponseInput {
                question_id: question.id,
                answer: match question.kind {
                    QuestionKind::ForcedChoice => Answer::Choice(choice.to_string()),
                    QuestionKind::LikertScale => Answer::Scale(scale),
                },
                justification: None,
                time_spent_secs: Some(22),
            })
            .collect();
        for response in responses {
            if let Err(err) = service.save_response(&record.id, response) {
                println!("  Could not record response for {subject}: {err}");
            }
        }

        match service.complete(&record.id, completed_on) {
            Ok(report) => {
                let view = report.view();
                println!(
                    "- {subject} ({department}): overall {} -> {} risk",
                    view.overall_score,
                    report.risk_level.label()
                );
                if verbose_scores {
                    match serde_json::to_string_pretty(&view) {
                        Ok(json) => println!("{json}"),
                        Err(err) => println!("  score payload unavailable: {err}"),
                    }
                }
            }
            Err(err) => println!("- {subject} ({department}): not scored ({err})"),
        }
    }

    let rows = match service.scored_assessments() {
        Ok(rows) => rows,
        Err(err) => {
            println!("Roll-up unavailable: {err}");
            return Ok(());
        }
    };
    println!();
    render_rollup(&rows, &ReportWindow::default(), 3, completed_on);

    let events = notifications.events();
    if events.is_empty() {
        println!("\nNotifications: none dispatched");
    } else {
        println!("\nNotifications");
        for alert in events {
            println!("- template={} -> {}", alert.template, alert.assessment_id.0);
        }
    }

    Ok(())
}

fn render_rollup(
    rows: &[ScoredAssessment],
    window: &ReportWindow,
    trend_months: u32,
    today: NaiveDate,
) {
    let comparison = department_comparison(rows, window);
    match comparison.organization_average {
        Some(average) => println!(
            "Department comparison (org average {average}, {} assessments)",
            comparison.total_assessments
        ),
        None => println!("Department comparison: no assessments in the window"),
    }
    for summary in &comparison.departments {
        println!(
            "- {}: avg {} ({:+} vs org) | {} assessments | risk L/M/H/C {}/{}/{}/{}",
            summary.department,
            summary.avg_score,
            summary.compared_to_org,
            summary.total_assessments,
            summary.risk_distribution.low,
            summary.risk_distribution.moderate,
            summary.risk_distribution.high,
            summary.risk_distribution.critical,
        );
    }

    println!("\nRanking by average score");
    for entry in department_ranking(rows, window, RankingMetric::AverageScore, 10) {
        println!(
            "{}. {} (avg {}, {}% low risk)",
            entry.position, entry.department, entry.avg_score, entry.low_risk_percentage
        );
    }

    let trend = monthly_trend(rows, trend_months, today, None);
    if trend.is_empty() {
        println!("\nMonthly trend: no assessments in the look-back window");
    } else {
        println!("\nMonthly trend (last {trend_months} months)");
        for point in &trend {
            println!(
                "- {}: avg {} over {} assessments | {}% low risk | {}% high risk",
                point.month,
                point.avg_score,
                point.total_assessments,
                point.low_risk_percentage,
                point.high_risk_percentage
            );
        }
    }

    match organization_metrics(rows, window) {
        Some(metrics) => {
            println!(
                "\nOrganization: avg {} | {} subjects across {} departments | health index {}",
                metrics.avg_score,
                metrics.total_subjects,
                metrics.total_departments,
                metrics.health_index
            );
            for average in &metrics.dimension_averages {
                println!("- {} ({}): avg {}", average.code, average.name, average.avg_score);
            }
        }
        None => println!("\nOrganization: no scored assessments in the window"),
    }
}
