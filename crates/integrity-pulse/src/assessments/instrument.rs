use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The six integrity dimensions of the Kohlberg-based instrument.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Honesty,
    Reliability,
    EthicalResilience,
    Responsibility,
    Justice,
    MoralCourage,
}

impl Dimension {
    pub const fn code(self) -> &'static str {
        match self {
            Dimension::Honesty => "HON",
            Dimension::Reliability => "CON",
            Dimension::EthicalResilience => "RES",
            Dimension::Responsibility => "RSP",
            Dimension::Justice => "JUS",
            Dimension::MoralCourage => "COR",
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Dimension::Honesty => "Honesty",
            Dimension::Reliability => "Reliability",
            Dimension::EthicalResilience => "Ethical Resilience",
            Dimension::Responsibility => "Responsibility",
            Dimension::Justice => "Justice",
            Dimension::MoralCourage => "Moral Courage",
        }
    }

    pub const fn ordered() -> [Dimension; 6] {
        [
            Dimension::Honesty,
            Dimension::Reliability,
            Dimension::EthicalResilience,
            Dimension::Responsibility,
            Dimension::Justice,
            Dimension::MoralCourage,
        ]
    }

    pub fn from_code(code: &str) -> Option<Dimension> {
        Dimension::ordered()
            .into_iter()
            .find(|dimension| dimension.code() == code)
    }

    pub const fn description(self) -> &'static str {
        match self {
            Dimension::Honesty => {
                "Being truthful, transparent and sincere in every interaction."
            }
            Dimension::Reliability => {
                "Keeping commitments, staying consistent and standing by one's word."
            }
            Dimension::EthicalResilience => {
                "Holding to ethical principles under pressure or adversity."
            }
            Dimension::Responsibility => {
                "Owning actions, decisions and their consequences."
            }
            Dimension::Justice => {
                "Treating people equitably and deciding impartially."
            }
            Dimension::MoralCourage => {
                "Acting on ethical principles even at personal risk."
            }
        }
    }

    /// Narrative line included in the profile when the dimension lands in
    /// the high band.
    pub const fn high_band_narrative(self) -> &'static str {
        match self {
            Dimension::Honesty => {
                "You show a high level of honesty, communicating transparently and truthfully."
            }
            Dimension::Reliability => {
                "You are highly reliable, keeping commitments and staying consistent."
            }
            Dimension::EthicalResilience => {
                "You show strong ethical resilience, holding to your principles under pressure."
            }
            Dimension::Responsibility => {
                "You show a strong sense of responsibility, owning the consequences of your actions."
            }
            Dimension::Justice => {
                "You show a strong sense of justice, treating people equitably."
            }
            Dimension::MoralCourage => {
                "You show strong moral courage, acting on your principles even when there is risk."
            }
        }
    }

    /// Narrative line attached to a low-band dimension in the weaknesses list.
    pub const fn low_band_narrative(self) -> &'static str {
        match self {
            Dimension::Honesty => "there is room to develop honesty.",
            Dimension::Reliability => "there is room to develop reliability.",
            Dimension::EthicalResilience => "there is room to develop ethical resilience.",
            Dimension::Responsibility => "there is room to develop responsibility.",
            Dimension::Justice => "there is room to develop justice.",
            Dimension::MoralCourage => "there is room to develop moral courage.",
        }
    }

    /// Observed strengths surfaced when the dimension lands in the high band.
    pub const fn strength_highlights(self) -> &'static [&'static str] {
        match self {
            Dimension::Honesty => &[
                "Transparent and direct communication",
                "Trust from colleagues and leadership",
                "Credibility in professional relationships",
                "Ability to give honest feedback",
            ],
            Dimension::Reliability => &[
                "Consistent delivery on deadlines",
                "Alignment between word and action",
                "Positive predictability in deliverables",
                "Building relationships of trust",
            ],
            Dimension::EthicalResilience => &[
                "Firm principles under pressure",
                "Resistance to unethical influence",
                "Ability to make hard calls",
                "Role model for ethical behavior",
            ],
            Dimension::Responsibility => &[
                "Accountability for one's own actions",
                "Proactive problem resolution",
                "No blame shifting",
                "Learning from mistakes",
            ],
            Dimension::Justice => &[
                "Equitable treatment of people",
                "Impartial, well-grounded decisions",
                "Consideration of multiple perspectives",
                "Advocacy for fairness",
            ],
            Dimension::MoralCourage => &[
                "Defending principles despite risk",
                "Willingness to confront unethical situations",
                "Leadership on integrity questions",
                "Inspiring others to act ethically",
            ],
        }
    }

    /// Suggested focus areas when the dimension does not reach the high band.
    pub const fn development_areas(self) -> &'static [&'static str] {
        match self {
            Dimension::Honesty => &[
                "Practice more transparent communication",
                "Build the courage to voice honest opinions",
                "Seek feedback on how your honesty is perceived",
                "Reflect on situations where the truth was withheld",
            ],
            Dimension::Reliability => &[
                "Tighten management of commitments taken on",
                "Flag difficulties proactively",
                "Set up follow-through systems for tasks",
                "Practice saying no when needed",
            ],
            Dimension::EthicalResilience => &[
                "Build strategies for handling pressure",
                "Identify triggers that compromise principles",
                "Seek support in ethical dilemmas",
                "Practice assertiveness in hard situations",
            ],
            Dimension::Responsibility => &[
                "Practice owning mistakes openly",
                "Build an ownership mindset",
                "Avoid justifications and excuses",
                "Focus on solutions rather than blame",
            ],
            Dimension::Justice => &[
                "Identify unconscious biases",
                "Practice active listening across viewpoints",
                "Develop objective criteria for decisions",
                "Seek feedback on perceived fairness",
            ],
            Dimension::MoralCourage => &[
                "Build assertiveness in difficult situations",
                "Practice constructive confrontation",
                "Find allies for ethical questions",
                "Strengthen confidence in taking a stand",
            ],
        }
    }
}

/// Kohlberg stage of moral development attached to answer options.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum MoralLevel {
    PreConventional,
    Conventional,
    PostConventional,
}

impl MoralLevel {
    pub const fn label(self) -> &'static str {
        match self {
            MoralLevel::PreConventional => "pre_conventional",
            MoralLevel::Conventional => "conventional",
            MoralLevel::PostConventional => "post_conventional",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            MoralLevel::PreConventional => {
                "Pre-conventional level: decisions driven mainly by personal consequences."
            }
            MoralLevel::Conventional => {
                "Conventional level: decisions driven by social norms and group expectations."
            }
            MoralLevel::PostConventional => {
                "Post-conventional level: decisions driven by universal ethical principles."
            }
        }
    }

    /// Higher stage wins when a plurality tie must be broken.
    pub(crate) const fn stage(self) -> u8 {
        match self {
            MoralLevel::PreConventional => 0,
            MoralLevel::Conventional => 1,
            MoralLevel::PostConventional => 2,
        }
    }
}

/// Coarse risk buckets derived from the overall score.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    Critical,
}

impl RiskLevel {
    pub const fn label(self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Moderate => "moderate",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }

    /// Zero is the best bucket; used to validate threshold monotonicity.
    pub(crate) const fn severity(self) -> u8 {
        match self {
            RiskLevel::Low => 0,
            RiskLevel::Moderate => 1,
            RiskLevel::High => 2,
            RiskLevel::Critical => 3,
        }
    }
}

/// Identifier wrapper for question-bank entries.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct QuestionId(pub u32);

/// One selectable answer with its stored token and score contribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerOption {
    pub value: String,
    pub label: String,
    pub score: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moral_level: Option<MoralLevel>,
}

/// Response capture style for a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    ForcedChoice,
    /// Likert 1-5 agreement scale mapped onto the 0-100 score range.
    LikertScale,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub dimension: Dimension,
    pub display_order: u16,
    pub kind: QuestionKind,
    pub prompt: String,
    pub options: Vec<AnswerOption>,
}

impl Question {
    pub fn option(&self, value: &str) -> Option<&AnswerOption> {
        self.options.iter().find(|option| option.value == value)
    }
}

/// Storage keeps option lists as serialized JSON text. This is the single
/// place it becomes typed data; the scorer never sees raw text.
pub fn parse_option_list(raw: &str) -> Result<Vec<AnswerOption>, InstrumentError> {
    serde_json::from_str(raw).map_err(|source| InstrumentError::MalformedOptions { source })
}

#[derive(Debug, thiserror::Error)]
pub enum InstrumentError {
    #[error("option list is not valid JSON: {source}")]
    MalformedOptions { source: serde_json::Error },
    #[error("duplicate question id {0:?} in question bank")]
    DuplicateQuestion(QuestionId),
    #[error("question {0:?} declares forced choice but has no options")]
    MissingOptions(QuestionId),
}

/// Versioned, read-only lookup from question id to its definition.
#[derive(Debug, Clone)]
pub struct QuestionBank {
    questions: BTreeMap<QuestionId, Question>,
}

impl QuestionBank {
    pub fn new(questions: Vec<Question>) -> Result<Self, InstrumentError> {
        let mut map = BTreeMap::new();
        for question in questions {
            if question.kind == QuestionKind::ForcedChoice && question.options.is_empty() {
                return Err(InstrumentError::MissingOptions(question.id));
            }
            if map.insert(question.id, question.clone()).is_some() {
                return Err(InstrumentError::DuplicateQuestion(question.id));
            }
        }
        Ok(Self { questions: map })
    }

    pub fn question(&self, id: QuestionId) -> Option<&Question> {
        self.questions.get(&id)
    }

    pub fn questions(&self) -> impl Iterator<Item = &Question> {
        self.questions.values()
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// The standard six-dimension integrity instrument used when no custom
    /// bank is loaded: two forced-choice scenarios plus one Likert statement
    /// per dimension.
    pub fn standard_integrity() -> Self {
        let mut questions = Vec::new();
        let mut next_id = 1u32;
        let mut order = 1u16;

        for dimension in Dimension::ordered() {
            let (first, second, statement) = standard_prompts(dimension);

            questions.push(Question {
                id: QuestionId(next_id),
                dimension,
                display_order: order,
                kind: QuestionKind::ForcedChoice,
                prompt: first.to_string(),
                options: standard_options(),
            });
            next_id += 1;
            order += 1;

            questions.push(Question {
                id: QuestionId(next_id),
                dimension,
                display_order: order,
                kind: QuestionKind::ForcedChoice,
                prompt: second.to_string(),
                options: standard_options(),
            });
            next_id += 1;
            order += 1;

            questions.push(Question {
                id: QuestionId(next_id),
                dimension,
                display_order: order,
                kind: QuestionKind::LikertScale,
                prompt: statement.to_string(),
                options: Vec::new(),
            });
            next_id += 1;
            order += 1;
        }

        Self::new(questions).expect("standard bank ids are sequential and unique")
    }
}

fn standard_options() -> Vec<AnswerOption> {
    vec![
        AnswerOption {
            value: "a".to_string(),
            label: "Act on principle even at personal cost".to_string(),
            score: 90,
            moral_level: Some(MoralLevel::PostConventional),
        },
        AnswerOption {
            value: "b".to_string(),
            label: "Follow team norms and escalate through my manager".to_string(),
            score: 70,
            moral_level: Some(MoralLevel::Conventional),
        },
        AnswerOption {
            value: "c".to_string(),
            label: "Stay out of it unless it affects my own work".to_string(),
            score: 40,
            moral_level: Some(MoralLevel::Conventional),
        },
        AnswerOption {
            value: "d".to_string(),
            label: "Do whatever avoids trouble for me".to_string(),
            score: 10,
            moral_level: Some(MoralLevel::PreConventional),
        },
    ]
}

fn standard_prompts(dimension: Dimension) -> (&'static str, &'static str, &'static str) {
    match dimension {
        Dimension::Honesty => (
            "A report you prepared contains an error nobody else noticed. What do you do?",
            "A colleague asks you to confirm a version of events you know is inaccurate.",
            "I communicate openly even when the truth is uncomfortable.",
        ),
        Dimension::Reliability => (
            "You realize mid-sprint that you cannot meet a commitment you made.",
            "A recurring task you own keeps slipping because of competing requests.",
            "People can count on me to deliver what I promised, when I promised it.",
        ),
        Dimension::EthicalResilience => (
            "Your manager pressures you to cut a control step to hit a deadline.",
            "A client offers a personal favor in exchange for flexible paperwork.",
            "I hold to my principles even when following them slows me down.",
        ),
        Dimension::Responsibility => (
            "A decision you made caused rework for another team.",
            "An incident postmortem is drifting toward blaming an absent colleague.",
            "I own the consequences of my decisions without shifting blame.",
        ),
        Dimension::Justice => (
            "Two teammates with the same workload receive very different recognition.",
            "You are asked to shortlist candidates and notice an uneven rubric.",
            "I apply the same standards to everyone regardless of affinity.",
        ),
        Dimension::MoralCourage => (
            "You witness a senior leader dismiss a compliance concern in a meeting.",
            "Raising a known product risk would make you unpopular with the team.",
            "I speak up about wrongdoing even when there is personal risk.",
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_bank_covers_all_dimensions() {
        let bank = QuestionBank::standard_integrity();
        assert_eq!(bank.len(), 18);
        for dimension in Dimension::ordered() {
            let count = bank
                .questions()
                .filter(|question| question.dimension == dimension)
                .count();
            assert_eq!(count, 3, "{} should have three questions", dimension.name());
        }
    }

    #[test]
    fn option_lookup_is_exact_match() {
        let bank = QuestionBank::standard_integrity();
        let question = bank.question(QuestionId(1)).expect("question present");
        assert!(question.option("a").is_some());
        assert!(question.option("A").is_none());
        assert!(question.option("z").is_none());
    }

    #[test]
    fn parses_serialized_option_list() {
        let raw = r#"[
            {"value": "a", "label": "Always", "score": 95, "moral_level": "post_conventional"},
            {"value": "b", "label": "Sometimes", "score": 50}
        ]"#;
        let options = parse_option_list(raw).expect("valid option list");
        assert_eq!(options.len(), 2);
        assert_eq!(options[0].score, 95);
        assert_eq!(options[0].moral_level, Some(MoralLevel::PostConventional));
        assert_eq!(options[1].moral_level, None);
    }

    #[test]
    fn rejects_malformed_option_text() {
        let result = parse_option_list("not json at all");
        assert!(matches!(
            result,
            Err(InstrumentError::MalformedOptions { .. })
        ));
    }

    #[test]
    fn rejects_duplicate_question_ids() {
        let question = Question {
            id: QuestionId(7),
            dimension: Dimension::Honesty,
            display_order: 1,
            kind: QuestionKind::LikertScale,
            prompt: "I am consistent.".to_string(),
            options: Vec::new(),
        };
        let result = QuestionBank::new(vec![question.clone(), question]);
        assert!(matches!(
            result,
            Err(InstrumentError::DuplicateQuestion(QuestionId(7)))
        ));
    }
}
