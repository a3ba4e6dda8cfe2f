//! Quizzes, rounds, and the links binding bank questions into a round.

use serde::{Deserialize, Serialize};

use super::question::Question;
use super::team::Team;

/// Round format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundType {
    /// Preliminary multiple-choice round.
    #[serde(rename = "MCQ")]
    Mcq,
    /// First-to-buzz round.
    #[serde(rename = "BUZZER")]
    Buzzer,
    /// Pass/bounce round.
    #[serde(rename = "PASS")]
    Pass,
    /// Rapid-fire round.
    #[serde(rename = "RAPID")]
    Rapid,
}

/// A quiz with its nested rounds and registered teams.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quiz {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Code players use to join.
    pub code: String,
    #[serde(default)]
    pub scheduled_at: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub rounds: Vec<Round>,
    #[serde(default)]
    pub teams: Vec<Team>,
}

/// An ordered group of questions within a quiz.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Round {
    pub id: i64,
    pub quiz: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: RoundType,
    #[serde(default)]
    pub order: i32,
    #[serde(default)]
    pub is_active: bool,
    /// Round-specific knobs such as timer duration or negative marking.
    #[serde(default)]
    pub settings: serde_json::Value,
    #[serde(default)]
    pub questions: Vec<QuizQuestion>,
}

/// Link between a bank question and a round, with per-quiz overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub id: i64,
    pub round: i64,
    pub question: i64,
    #[serde(default)]
    pub question_details: Option<Question>,
    #[serde(default)]
    pub order: i32,
    #[serde(default = "default_points")]
    pub points: i32,
    #[serde(default)]
    pub is_cloned: bool,
}

fn default_points() -> i32 {
    10
}

/// Payload for creating a quiz.
#[derive(Debug, Clone, Serialize)]
pub struct NewQuiz {
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// Payload for creating a round inside a quiz.
#[derive(Debug, Clone, Serialize)]
pub struct NewRound {
    pub quiz: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: RoundType,
    pub order: i32,
}

/// Payload for attaching a bank question to a round.
#[derive(Debug, Clone, Serialize)]
pub struct NewQuizQuestion {
    pub round: i64,
    pub question: i64,
    pub order: i32,
    pub points: i32,
}

impl Quiz {
    /// All question links of the quiz, flattened across rounds in play order.
    ///
    /// This is the sequence a controller steps through when advancing the
    /// live game.
    pub fn all_questions(&self) -> Vec<&QuizQuestion> {
        self.rounds.iter().flat_map(|r| r.questions.iter()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiz_decodes_nested_rounds() {
        let json = r#"{
            "id": 3,
            "title": "Friday Night",
            "description": "",
            "code": "ABCD",
            "scheduled_at": null,
            "is_active": true,
            "rounds": [
                {
                    "id": 1, "quiz": 3, "name": "Prelims", "type": "MCQ",
                    "order": 0, "is_active": false, "settings": {"timer": 15},
                    "questions": [
                        {"id": 9, "round": 1, "question": 12, "order": 0,
                         "points": 10, "is_cloned": false}
                    ]
                },
                {
                    "id": 2, "quiz": 3, "name": "Buzzers", "type": "BUZZER",
                    "order": 1, "is_active": false, "settings": {},
                    "questions": []
                }
            ],
            "teams": []
        }"#;
        let quiz: Quiz = serde_json::from_str(json).unwrap();
        assert_eq!(quiz.rounds.len(), 2);
        assert_eq!(quiz.rounds[1].kind, RoundType::Buzzer);
        assert_eq!(quiz.all_questions().len(), 1);
        assert_eq!(quiz.all_questions()[0].points, 10);
    }
}
