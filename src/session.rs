//! Explicit session context handed to views at construction.
//!
//! Replaces ambient key-value storage: [`crate::api::ApiClient::login`]
//! produces a [`SessionContext`], views borrow it while they live, and it is
//! dropped at logout.

use serde::{Deserialize, Serialize};

/// Backend role attached to the logged-in user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    SuperAdmin,
    Admin,
    QuizMaster,
    ScoreManager,
    User,
}

/// Who is logged in and what they may drive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub username: String,
    pub role: Role,
}

impl SessionContext {
    pub fn new(username: impl Into<String>, role: Role) -> Self {
        Self {
            username: username.into(),
            role,
        }
    }

    /// Whether this session may send controller intents (advance question,
    /// reveal answer, show leaderboard) on a live channel.
    pub fn is_controller(&self) -> bool {
        matches!(self.role, Role::SuperAdmin | Role::Admin | Role::QuizMaster)
    }

    /// Whether this session may adjust scores.
    pub fn can_score(&self) -> bool {
        matches!(self.role, Role::SuperAdmin | Role::Admin | Role::ScoreManager)
    }
}
