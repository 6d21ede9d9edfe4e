use super::super::instrument::{Dimension, MoralLevel};
use super::ScoreBand;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Narrative reading of a score report: what the banded dimension scores
/// mean for the person being assessed. Derived entirely from the numeric
/// result, so it never needs to be stored separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interpretation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moral_level_description: Option<String>,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub recommendations: Vec<String>,
    pub profile_type: String,
    pub profile_description: String,
}

/// How many development suggestions each weak dimension contributes.
const SUGGESTIONS_PER_DIMENSION: usize = 2;

pub(super) fn interpret(
    dimension_bands: &BTreeMap<Dimension, ScoreBand>,
    overall_score: f64,
    dominant_dimension: Dimension,
    moral_level: Option<MoralLevel>,
) -> Interpretation {
    Interpretation {
        moral_level_description: moral_level.map(|level| level.description().to_string()),
        strengths: strengths(dimension_bands),
        weaknesses: weaknesses(dimension_bands),
        recommendations: recommendations(dimension_bands, moral_level),
        profile_type: profile_type(dimension_bands, dominant_dimension),
        profile_description: profile_description(dimension_bands, overall_score, moral_level),
    }
}

fn strengths(bands: &BTreeMap<Dimension, ScoreBand>) -> Vec<String> {
    let mut lines: Vec<String> = bands
        .iter()
        .filter(|(_, band)| **band == ScoreBand::High)
        .flat_map(|(dimension, _)| dimension.strength_highlights())
        .map(|line| line.to_string())
        .collect();

    if lines.is_empty() {
        lines.push("Balanced profile across all integrity dimensions.".to_string());
    }
    lines
}

fn weaknesses(bands: &BTreeMap<Dimension, ScoreBand>) -> Vec<String> {
    let mut lines: Vec<String> = bands
        .iter()
        .filter(|(_, band)| **band == ScoreBand::Low)
        .map(|(dimension, _)| format!("{}: {}", dimension.name(), dimension.low_band_narrative()))
        .collect();

    if lines.is_empty() {
        lines.push("No critical area identified.".to_string());
    }
    lines
}

fn recommendations(
    bands: &BTreeMap<Dimension, ScoreBand>,
    moral_level: Option<MoralLevel>,
) -> Vec<String> {
    let mut lines: Vec<String> = bands
        .iter()
        .filter(|(_, band)| **band != ScoreBand::High)
        .flat_map(|(dimension, _)| {
            dimension
                .development_areas()
                .iter()
                .take(SUGGESTIONS_PER_DIMENSION)
        })
        .map(|line| line.to_string())
        .collect();

    if moral_level == Some(MoralLevel::PreConventional) {
        lines.push("Build awareness of how actions affect others".to_string());
        lines.push(
            "Practice decision making that weighs perspectives beyond your own".to_string(),
        );
    }

    if lines.is_empty() {
        lines.push("Keep up current integrity practices.".to_string());
    }
    lines
}

fn profile_type(bands: &BTreeMap<Dimension, ScoreBand>, dominant: Dimension) -> String {
    let high: Vec<&'static str> = bands
        .iter()
        .filter(|(_, band)| **band == ScoreBand::High)
        .map(|(dimension, _)| dimension.name())
        .collect();

    match high.len() {
        n if n >= 5 => "High Integrity Profile".to_string(),
        n if n >= 3 => format!("Strong Profile in {} and {}", high[0], high[1]),
        n if n >= 1 => format!("Profile Highlighting {}", high[0]),
        _ => format!("Developing Profile with Focus on {}", dominant.name()),
    }
}

fn profile_description(
    bands: &BTreeMap<Dimension, ScoreBand>,
    overall_score: f64,
    moral_level: Option<MoralLevel>,
) -> String {
    let mut parts = Vec::new();

    parts.push(if overall_score >= 80.0 {
        "You show a high level of integrity in your professional attitudes and behavior."
    } else if overall_score >= 60.0 {
        "You show an adequate level of integrity, with some areas that can be strengthened."
    } else if overall_score >= 40.0 {
        "There are significant development opportunities in aspects of professional integrity."
    } else {
        "Developing integrity competencies should be a priority for professional growth."
    });

    for (dimension, band) in bands {
        if *band == ScoreBand::High {
            parts.push(dimension.high_band_narrative());
        }
    }

    if let Some(level) = moral_level {
        parts.push(level.description());
    }

    parts.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bands(entries: &[(Dimension, ScoreBand)]) -> BTreeMap<Dimension, ScoreBand> {
        entries.iter().copied().collect()
    }

    #[test]
    fn high_bands_collect_strength_highlights() {
        let bands = bands(&[
            (Dimension::Honesty, ScoreBand::High),
            (Dimension::Justice, ScoreBand::Medium),
        ]);
        let strengths = strengths(&bands);
        assert_eq!(strengths.len(), Dimension::Honesty.strength_highlights().len());
        assert!(strengths.contains(&"Transparent and direct communication".to_string()));
    }

    #[test]
    fn all_medium_bands_fall_back_to_balanced_profile() {
        let bands = bands(&[(Dimension::Reliability, ScoreBand::Medium)]);
        assert_eq!(
            strengths(&bands),
            vec!["Balanced profile across all integrity dimensions.".to_string()]
        );
        assert_eq!(
            weaknesses(&bands),
            vec!["No critical area identified.".to_string()]
        );
    }

    #[test]
    fn weak_and_medium_dimensions_drive_recommendations() {
        let bands = bands(&[
            (Dimension::Honesty, ScoreBand::Low),
            (Dimension::Justice, ScoreBand::Medium),
            (Dimension::MoralCourage, ScoreBand::High),
        ]);
        let recommendations = recommendations(&bands, Some(MoralLevel::Conventional));
        // Two suggestions each for the low and medium dimension, none for the
        // high one.
        assert_eq!(recommendations.len(), 2 * SUGGESTIONS_PER_DIMENSION);
        assert!(recommendations.contains(&"Practice more transparent communication".to_string()));
        assert!(recommendations.contains(&"Identify unconscious biases".to_string()));
    }

    #[test]
    fn pre_conventional_level_adds_perspective_recommendations() {
        let bands = bands(&[(Dimension::Honesty, ScoreBand::High)]);
        let recommendations = recommendations(&bands, Some(MoralLevel::PreConventional));
        assert_eq!(recommendations.len(), 2);
        assert!(recommendations[0].starts_with("Build awareness"));
    }

    #[test]
    fn profile_type_scales_with_high_band_count() {
        let dominant = Dimension::Honesty;
        let all_high: Vec<(Dimension, ScoreBand)> = Dimension::ordered()
            .into_iter()
            .map(|dimension| (dimension, ScoreBand::High))
            .collect();
        assert_eq!(profile_type(&bands(&all_high), dominant), "High Integrity Profile");

        let three_high = bands(&[
            (Dimension::Honesty, ScoreBand::High),
            (Dimension::Reliability, ScoreBand::High),
            (Dimension::Justice, ScoreBand::High),
        ]);
        assert_eq!(
            profile_type(&three_high, dominant),
            "Strong Profile in Honesty and Reliability"
        );

        let one_high = bands(&[
            (Dimension::Justice, ScoreBand::High),
            (Dimension::Honesty, ScoreBand::Medium),
        ]);
        assert_eq!(profile_type(&one_high, dominant), "Profile Highlighting Justice");

        let none_high = bands(&[(Dimension::Honesty, ScoreBand::Medium)]);
        assert_eq!(
            profile_type(&none_high, dominant),
            "Developing Profile with Focus on Honesty"
        );
    }

    #[test]
    fn profile_description_layers_overall_band_and_moral_level() {
        let bands = bands(&[(Dimension::MoralCourage, ScoreBand::High)]);
        let description =
            profile_description(&bands, 85.0, Some(MoralLevel::PostConventional));
        let parts: Vec<&str> = description.split("\n\n").collect();
        assert_eq!(parts.len(), 3);
        assert!(parts[0].starts_with("You show a high level of integrity"));
        assert_eq!(parts[1], Dimension::MoralCourage.high_band_narrative());
        assert_eq!(parts[2], MoralLevel::PostConventional.description());
    }
}
