//! Protocol messages for the live quiz channel.
//!
//! Frames travel as JSON text over WebSocket, enveloped as
//! `{"type": "<MESSAGE_TYPE>", "data": {...}}`. Inbound and outbound frames
//! are closed tagged unions; a frame whose `type` is not listed here fails to
//! decode and is dropped by the channel reader.

use serde::{Deserialize, Serialize};

use crate::models::{Difficulty, QuestionType};

/// Answer string a participant sends when hitting the buzzer.
pub const BUZZ_ANSWER: &str = "BUZZ";

/// Stage of live play.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// No game running; projector shows the splash screen.
    #[default]
    Idle,
    /// Teams joined, waiting for the first question.
    Lobby,
    /// A question is active.
    Question,
    /// The answer is being revealed.
    Answer,
    /// Standings on display.
    Leaderboard,
    /// Quiz finished.
    Ended,
}

/// Question body carried inside a `PHASE_CHANGE` frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionPayload {
    pub text: String,
    pub category: String,
    pub difficulty: Difficulty,
    #[serde(rename = "type")]
    pub kind: QuestionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

/// Data of a `PHASE_CHANGE` frame, inbound or outbound.
///
/// `question_index` and `question` are optional on the wire; a frame that
/// omits them changes only the phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseChangeData {
    pub phase: Phase,
    #[serde(rename = "questionIndex", default, skip_serializing_if = "Option::is_none")]
    pub question_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question: Option<QuestionPayload>,
}

/// One team's row in a `SCORE_UPDATE` frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamScore {
    pub name: String,
    pub score: i64,
    pub correct: u32,
    pub total: u32,
    pub buzzes: u32,
    #[serde(rename = "avgTime")]
    pub avg_time: String,
}

/// Frames received from the channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum GameEvent {
    /// The game moved to a new phase, possibly with a new question.
    #[serde(rename = "PHASE_CHANGE")]
    PhaseChange(PhaseChangeData),

    /// Full replacement of the scoreboard.
    #[serde(rename = "SCORE_UPDATE")]
    ScoreUpdate { teams: Vec<TeamScore> },

    /// Buzzer opened, closed, or claimed.
    #[serde(rename = "BUZZER_UPDATE")]
    BuzzerUpdate {
        active: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        team: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        time: Option<String>,
    },

    /// Countdown tick.
    #[serde(rename = "TIMER_UPDATE")]
    TimerUpdate { remaining: u32 },
}

/// Frames written to the channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum OutboundFrame {
    /// Sent by a controller role to advance the game.
    #[serde(rename = "PHASE_CHANGE")]
    PhaseChange(PhaseChangeData),

    /// Sent by a participant to answer the current question.
    #[serde(rename = "SUBMIT_ANSWER")]
    SubmitAnswer {
        answer: String,
        team_id: i64,
        team_name: String,
    },
}

/// What a view wants to happen on the live channel.
///
/// Intents are the caller-facing vocabulary; [`OutboundIntent::into_frame`]
/// lowers them onto the two wire message types.
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundIntent {
    /// Move to the given question (controller).
    AdvanceQuestion {
        question_index: usize,
        question: QuestionPayload,
    },
    /// Reveal the answer of the current question (controller).
    RevealAnswer,
    /// Put the standings on screen (controller).
    ShowLeaderboard,
    /// End the quiz (controller, past the last question).
    EndQuiz,
    /// Submit an answer for the current question (participant).
    SubmitAnswer {
        answer: String,
        team_id: i64,
        team_name: String,
    },
    /// Hit the buzzer (participant).
    Buzz { team_id: i64, team_name: String },
}

impl OutboundIntent {
    /// Lower the intent onto its wire frame.
    pub fn into_frame(self) -> OutboundFrame {
        match self {
            OutboundIntent::AdvanceQuestion {
                question_index,
                question,
            } => OutboundFrame::PhaseChange(PhaseChangeData {
                phase: Phase::Question,
                question_index: Some(question_index),
                question: Some(question),
            }),
            OutboundIntent::RevealAnswer => OutboundFrame::PhaseChange(PhaseChangeData {
                phase: Phase::Answer,
                question_index: None,
                question: None,
            }),
            OutboundIntent::ShowLeaderboard => OutboundFrame::PhaseChange(PhaseChangeData {
                phase: Phase::Leaderboard,
                question_index: None,
                question: None,
            }),
            OutboundIntent::EndQuiz => OutboundFrame::PhaseChange(PhaseChangeData {
                phase: Phase::Ended,
                question_index: None,
                question: None,
            }),
            OutboundIntent::SubmitAnswer {
                answer,
                team_id,
                team_name,
            } => OutboundFrame::SubmitAnswer {
                answer,
                team_id,
                team_name,
            },
            OutboundIntent::Buzz { team_id, team_name } => OutboundFrame::SubmitAnswer {
                answer: BUZZ_ANSWER.to_string(),
                team_id,
                team_name,
            },
        }
    }
}
