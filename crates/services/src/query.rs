use std::sync::{Arc, Mutex, PoisonError};

use tracing::{info, warn};

use study_core::validate::validate_query;

use crate::api::{Answer, AskRequest, StudyApi};
use crate::cancel::RequestScope;
use crate::config::ApiConfig;
use crate::error::FlowError;
use crate::session_store::SessionStore;

/// Sends questions to `/ask` and keeps the last answer.
pub struct QueryFlow {
    api: Arc<dyn StudyApi>,
    store: SessionStore,
    top_k: u32,
    answer: Mutex<Option<Answer>>,
    scope: RequestScope,
}

impl QueryFlow {
    #[must_use]
    pub fn new(api: Arc<dyn StudyApi>, store: SessionStore, config: &ApiConfig) -> Self {
        Self {
            api,
            store,
            top_k: config.top_k(),
            answer: Mutex::new(None),
            scope: RequestScope::new(),
        }
    }

    #[must_use]
    pub fn top_k(&self) -> u32 {
        self.top_k
    }

    #[must_use]
    pub fn answer(&self) -> Option<Answer> {
        self.answer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.store.query_flag().is_busy()
    }

    /// Ask a question on behalf of the signed-in user, if any.
    ///
    /// Success replaces the stored answer and sources in one step; failure
    /// clears them. A cancelled request leaves them untouched.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::Form` for blank input (no request is sent),
    /// `FlowError::Busy` while another question is pending,
    /// `FlowError::Cancelled`, or `FlowError::Api`.
    pub async fn submit(&self, text: &str) -> Result<Answer, FlowError> {
        let query = validate_query(text)?.to_string();
        let _guard = self
            .store
            .query_flag()
            .try_begin()
            .ok_or(FlowError::Busy)?;
        let token = self.scope.begin();
        let request = AskRequest {
            query,
            top_k: self.top_k,
            user_id: self.store.auth().user_id(),
        };
        info!(
            top_k = request.top_k,
            signed_in = request.user_id.is_some(),
            "asking question"
        );

        let outcome = token.run(self.api.ask(request)).await;
        let mut answer = self.answer.lock().unwrap_or_else(PoisonError::into_inner);
        match outcome {
            None => Err(FlowError::Cancelled),
            Some(Ok(received)) => {
                info!(sources = received.sources.len(), "answer received");
                *answer = Some(received.clone());
                Ok(received)
            }
            Some(Err(err)) => {
                warn!(error = %err, "question failed");
                *answer = None;
                Err(err.into())
            }
        }
    }

    pub fn close(&self) {
        self.scope.close();
    }
}
