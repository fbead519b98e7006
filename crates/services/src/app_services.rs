use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::api::{HttpStudyApi, StudyApi};
use crate::auth::{AuthContext, AuthGateway, AuthProvider};
use crate::config::ApiConfig;
use crate::error::AppServicesError;
use crate::progress::ProgressService;
use crate::query::QueryFlow;
use crate::quiz::QuizFlow;
use crate::session_store::SessionStore;
use crate::upload::UploadFlow;

/// Assembles the app-facing flows around one API client, result store and
/// auth context.
#[derive(Clone)]
pub struct AppServices {
    config: ApiConfig,
    api: Arc<dyn StudyApi>,
    auth: AuthContext,
    store: SessionStore,
    gateway: Arc<AuthGateway>,
    upload: Arc<UploadFlow>,
    query: Arc<QueryFlow>,
    quiz: Arc<QuizFlow>,
    progress: Arc<ProgressService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage and the HTTP API.
    ///
    /// Starts the auth subscription; call [`AppServices::shutdown`] on exit.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization or HTTP client
    /// setup fails.
    pub async fn new_sqlite(
        db_url: &str,
        config: ApiConfig,
        clock: Clock,
        provider: Arc<dyn AuthProvider>,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        let api: Arc<dyn StudyApi> = Arc::new(HttpStudyApi::new(config.clone())?);
        let auth = AuthContext::start(provider.as_ref());
        Ok(Self::assemble(config, api, storage, provider, auth, clock))
    }

    /// Wire the flows from already-built parts.
    #[must_use]
    pub fn assemble(
        config: ApiConfig,
        api: Arc<dyn StudyApi>,
        storage: Storage,
        provider: Arc<dyn AuthProvider>,
        auth: AuthContext,
        clock: Clock,
    ) -> Self {
        let store = SessionStore::new(auth.clone());
        let gateway = Arc::new(AuthGateway::new(provider));
        let upload = Arc::new(UploadFlow::new(Arc::clone(&api), store.clone()));
        let query = Arc::new(QueryFlow::new(Arc::clone(&api), store.clone(), &config));
        let quiz = Arc::new(QuizFlow::new(
            Arc::clone(&api),
            Arc::clone(&storage.quiz_results),
            auth.clone(),
            store.quiz_flag(),
            clock,
        ));
        let progress = Arc::new(ProgressService::new(
            Arc::clone(&storage.quiz_results),
            auth.clone(),
        ));

        Self {
            config,
            api,
            auth,
            store,
            gateway,
            upload,
            query,
            quiz,
            progress,
        }
    }

    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    #[must_use]
    pub fn api(&self) -> Arc<dyn StudyApi> {
        Arc::clone(&self.api)
    }

    #[must_use]
    pub fn auth(&self) -> AuthContext {
        self.auth.clone()
    }

    #[must_use]
    pub fn store(&self) -> SessionStore {
        self.store.clone()
    }

    #[must_use]
    pub fn gateway(&self) -> Arc<AuthGateway> {
        Arc::clone(&self.gateway)
    }

    #[must_use]
    pub fn upload(&self) -> Arc<UploadFlow> {
        Arc::clone(&self.upload)
    }

    #[must_use]
    pub fn query(&self) -> Arc<QueryFlow> {
        Arc::clone(&self.query)
    }

    #[must_use]
    pub fn quiz(&self) -> Arc<QuizFlow> {
        Arc::clone(&self.quiz)
    }

    #[must_use]
    pub fn progress(&self) -> Arc<ProgressService> {
        Arc::clone(&self.progress)
    }

    /// End the auth subscription and suppress outstanding requests.
    pub fn shutdown(&self) {
        self.upload.close();
        self.query.close();
        self.quiz.close();
        self.auth.shutdown();
    }
}
