use std::sync::Arc;

use services::api::StudyApi;
use services::auth::{AuthContext, AuthGateway};
use services::{AppServices, ProgressService, QueryFlow, QuizFlow, SessionStore, UploadFlow};

/// Handles the views reach through `use_context`.
#[derive(Clone)]
pub struct AppContext {
    services: AppServices,
}

impl AppContext {
    #[must_use]
    pub fn new(services: AppServices) -> Self {
        Self { services }
    }

    /// Base URL of the study server, for display.
    #[must_use]
    pub fn api_url(&self) -> String {
        self.services.config().base_url().to_string()
    }

    #[must_use]
    pub fn api(&self) -> Arc<dyn StudyApi> {
        self.services.api()
    }

    #[must_use]
    pub fn auth(&self) -> AuthContext {
        self.services.auth()
    }

    #[must_use]
    pub fn store(&self) -> SessionStore {
        self.services.store()
    }

    #[must_use]
    pub fn gateway(&self) -> Arc<AuthGateway> {
        self.services.gateway()
    }

    #[must_use]
    pub fn upload(&self) -> Arc<UploadFlow> {
        self.services.upload()
    }

    #[must_use]
    pub fn query(&self) -> Arc<QueryFlow> {
        self.services.query()
    }

    #[must_use]
    pub fn quiz(&self) -> Arc<QuizFlow> {
        self.services.quiz()
    }

    #[must_use]
    pub fn progress(&self) -> Arc<ProgressService> {
        self.services.progress()
    }

    pub fn shutdown(&self) {
        self.services.shutdown();
    }
}

// Provided by the composition root (`crates/app`).

/// Build an `AppContext` around assembled services.
#[must_use]
pub fn build_app_context(services: AppServices) -> AppContext {
    AppContext::new(services)
}
