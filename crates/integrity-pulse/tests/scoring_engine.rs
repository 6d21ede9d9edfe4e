use integrity_pulse::assessments::scoring::{
    Answer, IndicatorSeverity, MismatchReason, MoralTieBreak, ResponseInput, RiskIndicatorKind,
    ScoreBand, ScoringConfig, ScoringEngine, ScoringError, ThresholdTable,
};
use integrity_pulse::assessments::{
    AnswerOption, Dimension, MoralLevel, Question, QuestionBank, QuestionId, QuestionKind,
    RiskLevel,
};

fn option(value: &str, score: u8, moral_level: Option<MoralLevel>) -> AnswerOption {
    AnswerOption {
        value: value.to_string(),
        label: format!("option {value}"),
        score,
        moral_level,
    }
}

fn forced_choice(id: u32, dimension: Dimension, options: Vec<AnswerOption>) -> Question {
    Question {
        id: QuestionId(id),
        dimension,
        display_order: id as u16,
        kind: QuestionKind::ForcedChoice,
        prompt: format!("scenario {id}"),
        options,
    }
}

fn likert(id: u32, dimension: Dimension) -> Question {
    Question {
        id: QuestionId(id),
        dimension,
        display_order: id as u16,
        kind: QuestionKind::LikertScale,
        prompt: format!("statement {id}"),
        options: Vec::new(),
    }
}

/// One forced-choice question per dimension, each with options worth
/// 10 through 90 so tests can dial in exact dimension scores.
fn three_dimension_bank() -> QuestionBank {
    let options = || {
        vec![
            option("a", 90, Some(MoralLevel::PostConventional)),
            option("b", 80, Some(MoralLevel::Conventional)),
            option("c", 60, Some(MoralLevel::Conventional)),
            option("d", 40, Some(MoralLevel::PreConventional)),
            option("e", 10, Some(MoralLevel::PreConventional)),
        ]
    };
    QuestionBank::new(vec![
        forced_choice(1, Dimension::Honesty, options()),
        forced_choice(2, Dimension::Reliability, options()),
        forced_choice(3, Dimension::EthicalResilience, options()),
    ])
    .expect("valid bank")
}

fn choice(question_id: u32, value: &str) -> ResponseInput {
    ResponseInput {
        question_id: QuestionId(question_id),
        answer: Answer::Choice(value.to_string()),
        justification: None,
        time_spent_secs: Some(20),
    }
}

fn engine() -> ScoringEngine {
    ScoringEngine::new(ScoringConfig::standard_integrity())
}

#[test]
fn overall_score_is_the_unweighted_mean_of_dimension_means() {
    let bank = three_dimension_bank();
    let responses = vec![choice(1, "d"), choice(2, "c"), choice(3, "b")];

    let report = engine().score(&responses, &bank).expect("scored");

    assert_eq!(report.dimension_scores[&Dimension::Honesty], 40.0);
    assert_eq!(report.dimension_scores[&Dimension::Reliability], 60.0);
    assert_eq!(report.dimension_scores[&Dimension::EthicalResilience], 80.0);
    assert_eq!(report.overall_score, 60.0);
    assert_eq!(report.risk_level, RiskLevel::Moderate);
    assert_eq!(report.dominant_dimension, Dimension::EthicalResilience);
    assert_eq!(report.weakest_dimension, Dimension::Honesty);
    assert_eq!(report.scored_responses, 3);
    assert!(report.excluded.is_empty());
}

#[test]
fn dimension_mean_averages_multiple_answers_in_one_dimension() {
    let options = vec![
        option("p40", 40, None),
        option("p60", 60, None),
        option("p80", 80, None),
    ];
    let bank = QuestionBank::new(vec![
        forced_choice(1, Dimension::Honesty, options.clone()),
        forced_choice(2, Dimension::Honesty, options.clone()),
        forced_choice(3, Dimension::Honesty, options),
    ])
    .expect("valid bank");
    let responses = vec![choice(1, "p40"), choice(2, "p60"), choice(3, "p80")];

    let report = engine().score(&responses, &bank).expect("scored");

    assert_eq!(report.dimension_scores[&Dimension::Honesty], 60.0);
    assert_eq!(report.overall_score, 60.0);
    assert_eq!(report.risk_level, RiskLevel::Moderate);
}

#[test]
fn scoring_is_deterministic_across_runs() {
    let bank = three_dimension_bank();
    let responses = vec![choice(1, "a"), choice(2, "e"), choice(3, "c")];

    let first = engine().score(&responses, &bank).expect("scored");
    let second = engine().score(&responses, &bank).expect("scored");

    assert_eq!(first, second);
}

#[test]
fn unanswered_dimensions_are_omitted_not_zeroed() {
    let bank = three_dimension_bank();
    let responses = vec![choice(1, "b"), choice(3, "b")];

    let report = engine().score(&responses, &bank).expect("scored");

    assert_eq!(report.dimension_scores.len(), 2);
    assert!(!report.dimension_scores.contains_key(&Dimension::Reliability));
    assert_eq!(report.overall_score, 80.0);
}

#[test]
fn unmatched_option_is_excluded_and_reported() {
    let bank = three_dimension_bank();
    let responses = vec![choice(1, "a"), choice(2, "Z"), choice(3, "c")];

    let report = engine().score(&responses, &bank).expect("scored");

    assert_eq!(report.scored_responses, 2);
    assert_eq!(report.excluded.len(), 1);
    assert_eq!(report.excluded[0].question_id, QuestionId(2));
    assert_eq!(report.excluded[0].answer, "Z");
    assert_eq!(report.excluded[0].reason, MismatchReason::UnmatchedOption);
    assert!(!report.dimension_scores.contains_key(&Dimension::Reliability));
}

#[test]
fn unknown_question_is_excluded() {
    let bank = three_dimension_bank();
    let responses = vec![choice(1, "a"), choice(99, "a")];

    let report = engine().score(&responses, &bank).expect("scored");

    assert_eq!(report.excluded.len(), 1);
    assert_eq!(report.excluded[0].reason, MismatchReason::UnknownQuestion);
}

#[test]
fn nothing_scorable_is_an_error_not_a_zero_score() {
    let bank = three_dimension_bank();
    let responses = vec![choice(1, "Z"), choice(2, "Z")];

    let error = engine().score(&responses, &bank).expect_err("unscorable");
    match error {
        ScoringError::InsufficientData { excluded } => assert_eq!(excluded.len(), 2),
    }
}

#[test]
fn likert_answers_map_onto_the_score_range() {
    let bank = QuestionBank::new(vec![
        likert(1, Dimension::Honesty),
        likert(2, Dimension::Reliability),
    ])
    .expect("valid bank");
    let responses = vec![
        ResponseInput {
            question_id: QuestionId(1),
            answer: Answer::Scale(5),
            justification: None,
            time_spent_secs: Some(20),
        },
        ResponseInput {
            question_id: QuestionId(2),
            answer: Answer::Scale(2),
            justification: None,
            time_spent_secs: Some(20),
        },
    ];

    let report = engine().score(&responses, &bank).expect("scored");

    assert_eq!(report.dimension_scores[&Dimension::Honesty], 100.0);
    assert_eq!(report.dimension_scores[&Dimension::Reliability], 40.0);
    // Likert answers carry no moral-level tags.
    assert_eq!(report.moral_level, None);
}

#[test]
fn out_of_range_scale_answer_is_excluded() {
    let bank = QuestionBank::new(vec![likert(1, Dimension::Honesty)]).expect("valid bank");
    let responses = vec![ResponseInput {
        question_id: QuestionId(1),
        answer: Answer::Scale(9),
        justification: None,
        time_spent_secs: Some(20),
    }];

    let error = engine().score(&responses, &bank).expect_err("unscorable");
    match error {
        ScoringError::InsufficientData { excluded } => {
            assert_eq!(excluded[0].reason, MismatchReason::ScaleOutOfRange);
        }
    }
}

#[test]
fn moral_level_is_decided_by_plurality() {
    let bank = three_dimension_bank();
    // Two pre-conventional picks against one post-conventional.
    let responses = vec![choice(1, "d"), choice(2, "e"), choice(3, "a")];

    let report = engine().score(&responses, &bank).expect("scored");

    assert_eq!(report.moral_level, Some(MoralLevel::PreConventional));
}

#[test]
fn plurality_ties_prefer_the_higher_stage() {
    let bank = three_dimension_bank();
    // One pre-conventional, one conventional: tied at one apiece alongside
    // one post-conventional, so the highest stage wins.
    let responses = vec![choice(1, "e"), choice(2, "b"), choice(3, "a")];

    let report = engine().score(&responses, &bank).expect("scored");
    assert_eq!(report.moral_level, Some(MoralLevel::PostConventional));

    let config = ScoringConfig {
        thresholds: ThresholdTable::standard(),
        moral_tie_break: MoralTieBreak::PreferLowerStage,
    };
    let report = ScoringEngine::new(config)
        .score(&responses, &bank)
        .expect("scored");
    assert_eq!(report.moral_level, Some(MoralLevel::PreConventional));
}

#[test]
fn dimension_bands_follow_the_fixed_cutoffs() {
    let bank = three_dimension_bank();
    let responses = vec![choice(1, "a"), choice(2, "c"), choice(3, "e")];

    let report = engine().score(&responses, &bank).expect("scored");

    assert_eq!(report.dimension_bands[&Dimension::Honesty], ScoreBand::High);
    assert_eq!(
        report.dimension_bands[&Dimension::Reliability],
        ScoreBand::Medium
    );
    assert_eq!(
        report.dimension_bands[&Dimension::EthicalResilience],
        ScoreBand::Low
    );
}

#[test]
fn fast_responses_raise_a_time_anomaly_indicator() {
    let bank = three_dimension_bank();
    let mut responses = vec![choice(1, "a"), choice(2, "a"), choice(3, "a")];
    responses[0].time_spent_secs = Some(2);
    responses[1].time_spent_secs = Some(3);

    let report = engine().score(&responses, &bank).expect("scored");

    let anomaly = report
        .risk_indicators
        .iter()
        .find(|indicator| indicator.kind == RiskIndicatorKind::TimeAnomaly)
        .expect("time anomaly flagged");
    assert_eq!(anomaly.severity, IndicatorSeverity::Medium);
}

#[test]
fn low_scores_raise_dimension_overall_and_moral_indicators() {
    let bank = three_dimension_bank();
    let responses = vec![choice(1, "e"), choice(2, "e"), choice(3, "e")];

    let report = engine().score(&responses, &bank).expect("scored");

    assert_eq!(report.overall_score, 10.0);
    assert_eq!(report.risk_level, RiskLevel::Critical);

    let kinds: Vec<_> = report
        .risk_indicators
        .iter()
        .map(|indicator| indicator.kind)
        .collect();
    assert!(kinds.contains(&RiskIndicatorKind::LowDimension));
    assert!(kinds.contains(&RiskIndicatorKind::OverallRisk));
    assert!(kinds.contains(&RiskIndicatorKind::MoralLevel));
    assert!(!kinds.contains(&RiskIndicatorKind::TimeAnomaly));

    let overall = report
        .risk_indicators
        .iter()
        .find(|indicator| indicator.kind == RiskIndicatorKind::OverallRisk)
        .expect("overall indicator");
    assert_eq!(overall.severity, IndicatorSeverity::Critical);
}

#[test]
fn standard_bank_round_trip_produces_a_full_report() {
    let bank = QuestionBank::standard_integrity();
    assert_eq!(bank.len(), 18);

    let responses: Vec<ResponseInput> = bank
        .questions()
        .map(|question| ResponseInput {
            question_id: question.id,
            answer: match question.kind {
                QuestionKind::ForcedChoice => Answer::Choice("b".to_string()),
                QuestionKind::LikertScale => Answer::Scale(4),
            },
            justification: None,
            time_spent_secs: Some(25),
        })
        .collect();

    let report = engine().score(&responses, &bank).expect("scored");

    assert_eq!(report.dimension_scores.len(), 6);
    // Each dimension averages two 70-point choices and one 80-point scale.
    let view = report.view();
    assert_eq!(view.overall_score, 73);
    assert_eq!(view.risk_level, RiskLevel::Moderate);
    assert!(view.risk_indicators.is_empty());
    // All six dimensions average above 70, so the profile is the top tier.
    assert_eq!(view.interpretation.profile_type, "High Integrity Profile");
    assert_eq!(view.avg_time_per_question_secs, 25);
}

#[test]
fn report_carries_a_narrative_interpretation() {
    let bank = three_dimension_bank();
    let responses = vec![choice(1, "a"), choice(2, "b"), choice(3, "c")];

    let report = engine().score(&responses, &bank).expect("scored");
    let interpretation = &report.interpretation;

    // Honesty and Reliability land in the high band, so their highlights
    // make up the strengths list and the profile names the first of them.
    assert_eq!(interpretation.strengths.len(), 8);
    assert!(interpretation
        .strengths
        .contains(&"Transparent and direct communication".to_string()));
    assert_eq!(interpretation.profile_type, "Profile Highlighting Honesty");
    assert_eq!(
        interpretation.weaknesses,
        vec!["No critical area identified.".to_string()]
    );
    // Ethical Resilience sits in the medium band and contributes two
    // development suggestions.
    assert_eq!(interpretation.recommendations.len(), 2);
    assert_eq!(
        interpretation.moral_level_description.as_deref(),
        Some(MoralLevel::Conventional.description())
    );
    assert!(interpretation
        .profile_description
        .contains(MoralLevel::Conventional.description()));
}

#[test]
fn interpretation_flags_low_dimensions_and_preconventional_level() {
    let bank = three_dimension_bank();
    let responses = vec![choice(1, "e"), choice(2, "e"), choice(3, "e")];

    let report = engine().score(&responses, &bank).expect("scored");
    let interpretation = &report.interpretation;

    assert_eq!(interpretation.weaknesses.len(), 3);
    assert!(interpretation.weaknesses[0].starts_with("Honesty:"));
    // Two suggestions per low dimension plus the two pre-conventional ones.
    assert_eq!(interpretation.recommendations.len(), 8);
    assert_eq!(
        interpretation.profile_type,
        "Developing Profile with Focus on Honesty"
    );
    assert!(interpretation
        .profile_description
        .starts_with("Developing integrity competencies"));
}

#[test]
fn average_time_counts_missing_times_as_zero() {
    let bank = three_dimension_bank();
    let responses = vec![
        ResponseInput {
            question_id: QuestionId(1),
            answer: Answer::Choice("a".to_string()),
            justification: None,
            time_spent_secs: Some(30),
        },
        ResponseInput {
            question_id: QuestionId(2),
            answer: Answer::Choice("a".to_string()),
            justification: None,
            time_spent_secs: None,
        },
    ];

    let report = engine().score(&responses, &bank).expect("scored");

    assert_eq!(report.avg_time_per_question_secs, 15);
}
