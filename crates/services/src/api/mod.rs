//! Client contract for the study HTTP API.

mod http;
mod wire;

pub use http::HttpStudyApi;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use study_core::model::{AnswerCheck, DocumentFile, OptionLabel, Quiz, QuizError, UserId};

/// Failure of a single API call, classified for display.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    /// The backend could not be reached (refused, DNS, TLS, reset).
    #[error("cannot reach the study server at {base_url}: {reason}")]
    Unreachable { base_url: String, reason: String },

    /// The fixed request timeout elapsed.
    #[error("the study server did not answer in time")]
    Timeout,

    /// Non-success status with a `detail` message from the server.
    #[error("{detail}")]
    Server { status: u16, detail: String },

    /// Non-success status without a usable body.
    #[error("request failed with status {0}")]
    Status(u16),

    #[error("unexpected response from server: {0}")]
    Decode(String),

    #[error("could not encode request: {0}")]
    Encode(String),

    #[error("could not build HTTP client: {0}")]
    Client(String),

    #[error("server returned an invalid quiz: {0}")]
    InvalidQuiz(#[from] QuizError),
}

impl ApiError {
    /// Connectivity failures, as opposed to errors reported by the server.
    #[must_use]
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Unreachable { .. } | Self::Timeout)
    }
}

/// `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
    pub documents_loaded: u32,
}

/// `GET /documents`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentsInfo {
    pub total_documents: u32,
    #[serde(default)]
    pub message: String,
}

/// `POST /upload`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReceipt {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub filename: String,
    pub chunks_processed: u32,
    pub total_documents: u32,
}

/// Input of `POST /ask`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AskRequest {
    pub query: String,
    pub top_k: u32,
    /// Opaque pass-through so the backend can keep per-user context.
    pub user_id: Option<UserId>,
}

/// One retrieved passage backing an answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    #[serde(default)]
    pub file: String,
    #[serde(default)]
    pub section: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub relevance_score: Option<f64>,
}

/// `POST /ask`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub answer: String,
    #[serde(default)]
    pub sources: Vec<Source>,
    #[serde(default)]
    pub total_sources: Option<u32>,
    #[serde(default)]
    pub query: Option<String>,
}

/// Operations offered by the study backend.
#[async_trait]
pub trait StudyApi: Send + Sync {
    /// # Errors
    ///
    /// Returns `ApiError` on transport or server failure.
    async fn health(&self) -> Result<Health, ApiError>;

    /// # Errors
    ///
    /// Returns `ApiError` on transport or server failure.
    async fn documents(&self) -> Result<DocumentsInfo, ApiError>;

    /// Send one document as a multipart `file` field.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport or server failure.
    async fn upload(&self, file: DocumentFile) -> Result<UploadReceipt, ApiError>;

    /// # Errors
    ///
    /// Returns `ApiError` on transport or server failure.
    async fn ask(&self, request: AskRequest) -> Result<Answer, ApiError>;

    /// # Errors
    ///
    /// Returns `ApiError::InvalidQuiz` when the generated quiz is unusable,
    /// or other `ApiError` variants on transport or server failure.
    async fn generate_quiz(&self) -> Result<Quiz, ApiError>;

    /// Score one answer against the full quiz payload.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport or server failure.
    async fn check_answer(
        &self,
        quiz: &Quiz,
        question_index: usize,
        answer: &OptionLabel,
    ) -> Result<AnswerCheck, ApiError>;
}
