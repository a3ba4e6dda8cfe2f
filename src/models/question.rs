//! Question-bank entries.

use serde::{Deserialize, Serialize};

/// How a question is answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestionType {
    /// Multiple choice with a fixed option list.
    #[serde(rename = "MCQ")]
    Mcq,
    /// Free-text answer.
    #[serde(rename = "TEXT")]
    Text,
    /// Question backed by a media attachment.
    #[serde(rename = "MEDIA")]
    Media,
}

/// Difficulty rating used for filtering and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// A question as stored in the question bank.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub text: String,
    #[serde(default)]
    pub media_url: Option<String>,
    #[serde(rename = "type")]
    pub kind: QuestionType,
    /// Option list; empty for non-MCQ questions.
    #[serde(default)]
    pub options: Vec<String>,
    pub answer: String,
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Payload for creating or updating a question-bank entry.
#[derive(Debug, Clone, Serialize)]
pub struct NewQuestion {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,
    #[serde(rename = "type")]
    pub kind: QuestionType,
    pub options: Vec<String>,
    pub answer: String,
    pub category: String,
    pub tags: Vec<String>,
    pub difficulty: Difficulty,
}
