//! Participant teams.

use serde::{Deserialize, Serialize};

/// A team registered to a quiz.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub id: i64,
    pub quiz: i64,
    pub name: String,
    /// Comma-separated member names.
    #[serde(default)]
    pub members: String,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub is_approved: bool,
}

/// Payload for registering a team directly (admin side; participants go
/// through the join-by-code endpoint instead).
#[derive(Debug, Clone, Serialize)]
pub struct NewTeam {
    pub quiz: i64,
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub members: String,
}
