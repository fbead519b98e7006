use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, warn};

use study_core::model::AuthUser;

use crate::api::{ApiError, StudyApi};
use crate::auth::AuthContext;
use crate::inflight::InFlight;

#[derive(Debug, Default)]
struct Counters {
    document_count: Option<u32>,
    backend_online: Option<bool>,
}

/// Read-only view of the ephemeral app state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub user: Option<AuthUser>,
    pub document_count: Option<u32>,
    pub backend_online: Option<bool>,
    pub uploading: bool,
    pub querying: bool,
    pub generating_quiz: bool,
}

/// Ephemeral UI state shared by the flows: current user, document count and
/// in-flight request flags.
#[derive(Clone)]
pub struct SessionStore {
    auth: AuthContext,
    counters: Arc<Mutex<Counters>>,
    upload: InFlight,
    query: InFlight,
    quiz: InFlight,
}

impl SessionStore {
    #[must_use]
    pub fn new(auth: AuthContext) -> Self {
        Self {
            auth,
            counters: Arc::default(),
            upload: InFlight::new(),
            query: InFlight::new(),
            quiz: InFlight::new(),
        }
    }

    #[must_use]
    pub fn auth(&self) -> &AuthContext {
        &self.auth
    }

    #[must_use]
    pub fn upload_flag(&self) -> InFlight {
        self.upload.clone()
    }

    #[must_use]
    pub fn query_flag(&self) -> InFlight {
        self.query.clone()
    }

    #[must_use]
    pub fn quiz_flag(&self) -> InFlight {
        self.quiz.clone()
    }

    pub fn set_document_count(&self, count: u32) {
        let mut counters = self.counters.lock().unwrap_or_else(PoisonError::into_inner);
        counters.document_count = Some(count);
        counters.backend_online = Some(true);
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        let counters = self.counters.lock().unwrap_or_else(PoisonError::into_inner);
        SessionSnapshot {
            user: self.auth.current_user(),
            document_count: counters.document_count,
            backend_online: counters.backend_online,
            uploading: self.upload.is_busy(),
            querying: self.query.is_busy(),
            generating_quiz: self.quiz.is_busy(),
        }
    }

    /// Refresh the document count from `/health`, falling back to
    /// `/documents` when the health check fails.
    ///
    /// # Errors
    ///
    /// Returns the fallback's `ApiError` when both calls fail; the backend is
    /// then recorded as offline.
    pub async fn refresh_documents(&self, api: &dyn StudyApi) -> Result<u32, ApiError> {
        let count = match api.health().await {
            Ok(health) => {
                debug!(status = %health.status, documents = health.documents_loaded, "backend healthy");
                Ok(health.documents_loaded)
            }
            Err(err) => {
                warn!(error = %err, "health check failed, trying /documents");
                api.documents().await.map(|info| info.total_documents)
            }
        };
        match count {
            Ok(count) => {
                self.set_document_count(count);
                Ok(count)
            }
            Err(err) => {
                self.counters
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .backend_online = Some(false);
                Err(err)
            }
        }
    }
}
