//! Base-URL configuration for the REST API and the live channel.

use std::env;

/// Environment variable overriding the REST base URL.
const API_BASE_ENV: &str = "QZMAN_API_BASE";
/// Environment variable overriding the WebSocket base URL.
const WS_BASE_ENV: &str = "QZMAN_WS_BASE";

/// Development defaults match the backend's local setup.
const DEFAULT_API_BASE: &str = "http://localhost:8000/api";
const DEFAULT_WS_BASE: &str = "ws://localhost:8000";

/// Resolved endpoints shared by [`crate::api::ApiClient`] and
/// [`crate::channel::GameChannelClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    api_base: String,
    ws_base: String,
}

impl ClientConfig {
    /// Build a configuration from explicit base URLs.
    pub fn new(api_base: impl Into<String>, ws_base: impl Into<String>) -> Self {
        Self {
            api_base: trim_base(api_base.into()),
            ws_base: trim_base(ws_base.into()),
        }
    }

    /// Resolve from `QZMAN_API_BASE` / `QZMAN_WS_BASE`, falling back to the
    /// localhost defaults.
    pub fn from_env() -> Self {
        let api_base = env::var(API_BASE_ENV).unwrap_or_else(|_| DEFAULT_API_BASE.to_string());
        let ws_base = env::var(WS_BASE_ENV).unwrap_or_else(|_| DEFAULT_WS_BASE.to_string());
        Self::new(api_base, ws_base)
    }

    /// REST endpoint for a relative path such as `quizzes/3/`.
    pub fn api_url(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path.trim_start_matches('/'))
    }

    /// Live channel endpoint for a quiz.
    pub fn channel_url(&self, quiz_id: i64) -> String {
        format!("{}/ws/quiz/{}/", self.ws_base, quiz_id)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE, DEFAULT_WS_BASE)
    }
}

fn trim_base(base: String) -> String {
    base.trim_end_matches('/').to_string()
}
