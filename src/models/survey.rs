use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Questionnaire section; every section has [`Section::ITEMS`] statements rated 1-5
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    EmotionalState,
    StressCoping,
    Attachment,
    Motivation,
    Flow,
}

impl Section {
    pub const ALL: [Section; 5] = [
        Section::EmotionalState,
        Section::StressCoping,
        Section::Attachment,
        Section::Motivation,
        Section::Flow,
    ];

    pub const ITEMS: usize = 4;

    /// Sections where agreeing signals difficulty rather than strength
    pub fn is_difficulty_scale(self) -> bool {
        matches!(self, Section::EmotionalState | Section::Attachment)
    }

    pub fn statements(self) -> [&'static str; Section::ITEMS] {
        match self {
            Section::EmotionalState => [
                "Lately my mood sinks for no clear reason.",
                "My emotional ups and downs are noticeably large.",
                "I have felt anxious or restless during the past week.",
                "My thoughts race before I fall asleep.",
            ],
            Section::StressCoping => [
                "Under pressure I set priorities and act on them.",
                "When emotions rise I express or release them appropriately.",
                "I break hard tasks into small pieces.",
                "I ask people around me for help when I need it.",
            ],
            Section::Attachment => [
                "I feel a strange loneliness even when I am with people.",
                "I find it hard to say no and put my own feelings off.",
                "I become overly sensitive to how others react.",
                "I struggle to keep healthy boundaries in relationships.",
            ],
            Section::Motivation => [
                "Once I start something I push through to the end.",
                "I treat failure as a chance to learn.",
                "I manage my own energy levels.",
                "I write down my goals and review them.",
            ],
            Section::Flow => [
                "I get absorbed in things and lose track of time.",
                "I try to solve problems in new ways.",
                "I need time alone for imagination and ideas.",
                "I enjoy even small details.",
            ],
        }
    }
}

/// Ratings per section, in statement order
pub type SurveyAnswers = HashMap<Section, Vec<u8>>;

/// Comfort-oriented scores, 0-100, higher is better on every axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub emotional_comfort: f64,
    pub stress_coping: f64,
    pub relationship_stability: f64,
    pub drive: f64,
    pub flow: f64,
}

/// Readable summary of a profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interpretation {
    pub highlights: Vec<String>,
    pub cautions: Vec<String>,
    pub suggestions: Vec<String>,
    /// One-line advice for today
    pub today: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_scales() {
        let difficulty: Vec<Section> = Section::ALL
            .into_iter()
            .filter(|s| s.is_difficulty_scale())
            .collect();
        assert_eq!(difficulty, vec![Section::EmotionalState, Section::Attachment]);
    }

    #[test]
    fn test_answers_deserialize_by_section_name() {
        let answers: SurveyAnswers =
            serde_json::from_str(r#"{"emotional_state": [1, 2, 3, 4], "flow": [5]}"#).unwrap();
        assert_eq!(answers[&Section::EmotionalState], vec![1, 2, 3, 4]);
        assert_eq!(answers[&Section::Flow], vec![5]);
    }
}
