//! Typed wrapper around the backend's JSON API.

use reqwest::multipart::{Form, Part};
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::debug;

use crate::config::ClientConfig;
use crate::models::{
    NewQuestion, NewQuiz, NewQuizQuestion, NewRound, NewTeam, Question, Quiz, QuizQuestion, Round,
    Team,
};
use crate::session::{Role, SessionContext};

/// Errors surfaced by the REST layer.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a usable response.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The backend answered with a non-success status.
    #[error("{status}: {detail}")]
    Backend { status: StatusCode, detail: String },
    /// Credentials were rejected at login.
    #[error("login rejected: {0}")]
    LoginRejected(String),
}

/// HTTP client with a cookie store carrying the backend session.
///
/// One instance per logged-in user; cloning `reqwest::Client` internals is
/// cheap, but the session cookie binds authorization to this value.
pub struct ApiClient {
    http: reqwest::Client,
    config: ClientConfig,
}

#[derive(Deserialize)]
struct LoginResponse {
    success: bool,
    #[serde(default)]
    role: Option<Role>,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
struct MeResponse {
    username: String,
    role: Role,
}

impl ApiClient {
    /// Build a client against the configured API base.
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder().cookie_store(true).build()?;
        Ok(Self { http, config })
    }

    fn url(&self, path: &str) -> String {
        self.config.api_url(path)
    }

    // --- auth ---

    /// Authenticate and return the session context for this user.
    ///
    /// The backend session cookie lands in this client's cookie store; the
    /// returned context is the only thing views receive.
    pub async fn login(&self, username: &str, password: &str) -> Result<SessionContext, ApiError> {
        let response = self
            .http
            .post(self.url("auth/login/"))
            .json(&json!({"username": username, "password": password}))
            .send()
            .await?;

        if response.status() == StatusCode::BAD_REQUEST {
            let body: LoginResponse = response.json().await?;
            return Err(ApiError::LoginRejected(
                body.error.unwrap_or_else(|| "Invalid Credentials".to_string()),
            ));
        }

        let body: LoginResponse = check(response).await?.json().await?;
        if !body.success {
            return Err(ApiError::LoginRejected(
                body.error.unwrap_or_else(|| "Invalid Credentials".to_string()),
            ));
        }
        let context = SessionContext::new(
            body.username.unwrap_or_else(|| username.to_string()),
            body.role.unwrap_or(Role::User),
        );
        debug!(username = %context.username, role = ?context.role, "logged in");
        Ok(context)
    }

    /// End the backend session. The caller drops its [`SessionContext`].
    pub async fn logout(&self) -> Result<(), ApiError> {
        check(self.http.post(self.url("auth/logout/")).send().await?).await?;
        Ok(())
    }

    /// Session context of the currently authenticated user.
    pub async fn me(&self) -> Result<SessionContext, ApiError> {
        let body: MeResponse = check(self.http.get(self.url("auth/me/")).send().await?)
            .await?
            .json()
            .await?;
        Ok(SessionContext::new(body.username, body.role))
    }

    // --- quizzes ---

    pub async fn list_quizzes(&self) -> Result<Vec<Quiz>, ApiError> {
        self.get_json("quizzes/").await
    }

    pub async fn get_quiz(&self, id: i64) -> Result<Quiz, ApiError> {
        self.get_json(&format!("quizzes/{}/", id)).await
    }

    pub async fn create_quiz(&self, quiz: &NewQuiz) -> Result<Quiz, ApiError> {
        self.post_json("quizzes/", quiz).await
    }

    pub async fn delete_quiz(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("quizzes/{}/", id)).await
    }

    /// Join a quiz by access code; the backend creates or returns the team.
    pub async fn join_quiz(
        &self,
        quiz_id: i64,
        access_code: &str,
        team_name: &str,
    ) -> Result<Team, ApiError> {
        self.post_json(
            &format!("quizzes/{}/join/", quiz_id),
            &json!({"access_code": access_code, "team_name": team_name}),
        )
        .await
    }

    /// Download the quiz export attachment as raw bytes.
    pub async fn export_quiz(&self, id: i64) -> Result<Vec<u8>, ApiError> {
        let response = check(
            self.http
                .get(self.url(&format!("quizzes/{}/export_data/", id)))
                .send()
                .await?,
        )
        .await?;
        Ok(response.bytes().await?.to_vec())
    }

    /// Upload a previously exported quiz file; returns the created quiz.
    pub async fn import_quiz(&self, file_name: &str, content: Vec<u8>) -> Result<Quiz, ApiError> {
        let part = Part::bytes(content)
            .file_name(file_name.to_string())
            .mime_str("application/json")?;
        let form = Form::new().part("file", part);
        let response = check(
            self.http
                .post(self.url("quizzes/import_quiz/"))
                .multipart(form)
                .send()
                .await?,
        )
        .await?;
        Ok(response.json().await?)
    }

    // --- question bank ---

    pub async fn list_questions(&self) -> Result<Vec<Question>, ApiError> {
        self.get_json("questions/").await
    }

    pub async fn create_question(&self, question: &NewQuestion) -> Result<Question, ApiError> {
        self.post_json("questions/", question).await
    }

    pub async fn update_question(
        &self,
        id: i64,
        question: &NewQuestion,
    ) -> Result<Question, ApiError> {
        let response = check(
            self.http
                .put(self.url(&format!("questions/{}/", id)))
                .json(question)
                .send()
                .await?,
        )
        .await?;
        Ok(response.json().await?)
    }

    pub async fn delete_question(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("questions/{}/", id)).await
    }

    // --- teams ---

    pub async fn list_teams(&self) -> Result<Vec<Team>, ApiError> {
        self.get_json("teams/").await
    }

    pub async fn create_team(&self, team: &NewTeam) -> Result<Team, ApiError> {
        self.post_json("teams/", team).await
    }

    /// Full-record update, used for approval and manual score fixes.
    pub async fn update_team(&self, team: &Team) -> Result<Team, ApiError> {
        let response = check(
            self.http
                .put(self.url(&format!("teams/{}/", team.id)))
                .json(team)
                .send()
                .await?,
        )
        .await?;
        Ok(response.json().await?)
    }

    pub async fn delete_team(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("teams/{}/", id)).await
    }

    // --- rounds and question links ---

    pub async fn create_round(&self, round: &NewRound) -> Result<Round, ApiError> {
        self.post_json("rounds/", round).await
    }

    pub async fn delete_round(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("rounds/{}/", id)).await
    }

    pub async fn add_quiz_question(
        &self,
        link: &NewQuizQuestion,
    ) -> Result<QuizQuestion, ApiError> {
        self.post_json("quiz-questions/", link).await
    }

    pub async fn remove_quiz_question(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("quiz-questions/{}/", id)).await
    }

    // --- plumbing ---

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = check(self.http.get(self.url(path)).send().await?).await?;
        Ok(response.json().await?)
    }

    async fn post_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &impl serde::Serialize,
    ) -> Result<T, ApiError> {
        let response = check(self.http.post(self.url(path)).json(body).send().await?).await?;
        Ok(response.json().await?)
    }

    async fn delete(&self, path: &str) -> Result<(), ApiError> {
        check(self.http.delete(self.url(path)).send().await?).await?;
        Ok(())
    }
}

/// Map non-success responses to [`ApiError::Backend`], pulling the backend's
/// `detail`/`error` field out of the body when present.
async fn check(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    #[derive(Deserialize)]
    struct ErrorBody {
        #[serde(default)]
        detail: Option<String>,
        #[serde(default)]
        error: Option<String>,
    }

    let detail = match response.json::<ErrorBody>().await {
        Ok(body) => body
            .detail
            .or(body.error)
            .unwrap_or_else(|| "API Request Failed".to_string()),
        Err(_) => "API Request Failed".to_string(),
    };
    Err(ApiError::Backend { status, detail })
}
