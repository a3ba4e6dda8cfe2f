//! Game state slices mirrored from the live channel.

use crate::protocol::{GameEvent, Phase, QuestionPayload, TeamScore};

/// Lifecycle of the underlying transport.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectionState {
    /// Handshake in progress.
    #[default]
    Connecting,
    /// Connected; frames flow.
    Open,
    /// Released by the owner.
    Closed,
    /// Transport error or unexpected close. No automatic recovery.
    Failed,
}

/// Current phase plus the question on display.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhaseState {
    pub phase: Phase,
    pub question_index: Option<usize>,
    /// Carried forward across `PHASE_CHANGE` frames that omit a question,
    /// so an answer-reveal still knows what was asked.
    pub question: Option<QuestionPayload>,
}

/// Ordered standings, replaced wholesale on every `SCORE_UPDATE`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreSnapshot {
    pub teams: Vec<TeamScore>,
}

/// First-to-respond signal state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuzzerState {
    pub active: bool,
    /// Team currently holding the buzz, if any.
    pub holder: Option<String>,
    /// Response time as reported by the backend, e.g. `"3.2s"`.
    pub response_time: Option<String>,
}

/// Countdown for the active question.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimerState {
    pub remaining: u32,
}

/// All four slices a view renders from.
///
/// The slices are independent: applying an event touches exactly one of
/// them and never invalidates the others.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameState {
    pub phase: PhaseState,
    pub scores: ScoreSnapshot,
    pub buzzer: BuzzerState,
    pub timer: TimerState,
}

impl GameState {
    /// Apply one inbound event to the matching slice.
    pub fn apply(&mut self, event: GameEvent) {
        match event {
            GameEvent::PhaseChange(data) => {
                self.phase.phase = data.phase;
                if let Some(index) = data.question_index {
                    self.phase.question_index = Some(index);
                }
                if let Some(question) = data.question {
                    self.phase.question = Some(question);
                }
            }
            GameEvent::ScoreUpdate { teams } => {
                self.scores.teams = teams;
            }
            GameEvent::BuzzerUpdate { active, team, time } => {
                self.buzzer = BuzzerState {
                    active,
                    holder: team,
                    response_time: time,
                };
            }
            GameEvent::TimerUpdate { remaining } => {
                self.timer.remaining = remaining;
            }
        }
    }
}
