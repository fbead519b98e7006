use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use study_core::model::{AnswerCheck, DocumentFile, OptionLabel, Quiz};

use super::wire::{GeneratedQuiz, error_detail};
use super::{Answer, ApiError, AskRequest, DocumentsInfo, Health, StudyApi, UploadReceipt};
use crate::config::ApiConfig;

/// `StudyApi` over HTTP with a fixed overall request timeout.
#[derive(Clone, Debug)]
pub struct HttpStudyApi {
    client: Client,
    config: ApiConfig,
}

impl HttpStudyApi {
    /// # Errors
    ///
    /// Returns `ApiError::Client` if the HTTP client cannot be built.
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|err| ApiError::Client(err.to_string()))?;
        Ok(Self { client, config })
    }

    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    fn classify(&self, err: &reqwest::Error) -> ApiError {
        if err.is_timeout() {
            ApiError::Timeout
        } else if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else if err.is_builder() {
            ApiError::Encode(err.to_string())
        } else {
            ApiError::Unreachable {
                base_url: self.config.base_url().to_string(),
                reason: err.to_string(),
            }
        }
    }

    async fn send(
        &self,
        path: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<Response, ApiError> {
        debug!(path, "sending request");
        request.send().await.map_err(|err| {
            let classified = self.classify(&err);
            warn!(path, error = %classified, "request failed");
            classified
        })
    }

    async fn read_json<T: DeserializeOwned>(
        &self,
        path: &str,
        response: Response,
    ) -> Result<T, ApiError> {
        let status = response.status();
        let body = response.text().await.map_err(|err| self.classify(&err))?;
        if !status.is_success() {
            let err = match error_detail(&body) {
                Some(detail) => ApiError::Server {
                    status: status.as_u16(),
                    detail,
                },
                None => ApiError::Status(status.as_u16()),
            };
            warn!(path, status = status.as_u16(), error = %err, "server rejected request");
            return Err(err);
        }
        serde_json::from_str(&body).map_err(|err| ApiError::Decode(err.to_string()))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let request = self.client.get(self.config.endpoint(path));
        let response = self.send(path, request).await?;
        self.read_json(path, response).await
    }

    async fn post_form<T: DeserializeOwned>(&self, path: &str, form: Form) -> Result<T, ApiError> {
        let request = self.client.post(self.config.endpoint(path)).multipart(form);
        let response = self.send(path, request).await?;
        self.read_json(path, response).await
    }
}

#[async_trait]
impl StudyApi for HttpStudyApi {
    async fn health(&self) -> Result<Health, ApiError> {
        self.get_json("health").await
    }

    async fn documents(&self) -> Result<DocumentsInfo, ApiError> {
        self.get_json("documents").await
    }

    async fn upload(&self, file: DocumentFile) -> Result<UploadReceipt, ApiError> {
        let mime = file
            .validate()
            .map(|kind| kind.mime_type())
            .unwrap_or("application/octet-stream");
        let name = file.name().to_string();
        let part = Part::bytes(file.into_bytes())
            .file_name(name)
            .mime_str(mime)
            .map_err(|err| ApiError::Encode(err.to_string()))?;
        self.post_form("upload", Form::new().part("file", part)).await
    }

    async fn ask(&self, request: AskRequest) -> Result<Answer, ApiError> {
        let mut form = Form::new()
            .text("query", request.query)
            .text("top_k", request.top_k.to_string());
        if let Some(user_id) = request.user_id {
            form = form.text("user_id", String::from(user_id));
        }
        self.post_form("ask", form).await
    }

    async fn generate_quiz(&self) -> Result<Quiz, ApiError> {
        let request = self.client.post(self.config.endpoint("generate-quiz"));
        let response = self.send("generate-quiz", request).await?;
        let generated: GeneratedQuiz = self.read_json("generate-quiz", response).await?;
        Ok(generated.into_quiz()?)
    }

    async fn check_answer(
        &self,
        quiz: &Quiz,
        question_index: usize,
        answer: &OptionLabel,
    ) -> Result<AnswerCheck, ApiError> {
        let quiz_data =
            serde_json::to_string(quiz).map_err(|err| ApiError::Encode(err.to_string()))?;
        let form = Form::new()
            .text("question_index", question_index.to_string())
            .text("user_answer", answer.as_str().to_string())
            .text("quiz_data", quiz_data);
        self.post_form("check-answer", form).await
    }
}
