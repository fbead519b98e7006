use std::sync::Arc;

use tracing::{info, warn};

use study_core::model::AuthUser;
use study_core::validate::{ResetForm, SignInForm, SignUpForm};

use super::{AuthProvider, ProviderError, message_for_code};

/// Uniform outcome of every gateway operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthResult {
    pub success: bool,
    pub user: Option<AuthUser>,
    pub error: Option<String>,
}

impl AuthResult {
    #[must_use]
    pub fn ok(user: Option<AuthUser>) -> Self {
        Self {
            success: true,
            user,
            error: None,
        }
    }

    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            user: None,
            error: Some(error.into()),
        }
    }

    fn from_provider(op: &'static str, err: &ProviderError) -> Self {
        warn!(op, code = %err.code, "identity provider rejected request");
        Self::failed(message_for_code(&err.code))
    }
}

/// Normalizes sign-up, sign-in, sign-out and reset against an
/// `AuthProvider`. Form validation runs locally first; a form that fails it
/// never reaches the provider.
#[derive(Clone)]
pub struct AuthGateway {
    provider: Arc<dyn AuthProvider>,
}

impl AuthGateway {
    #[must_use]
    pub fn new(provider: Arc<dyn AuthProvider>) -> Self {
        Self { provider }
    }

    pub async fn sign_up(&self, form: &SignUpForm) -> AuthResult {
        let credentials = match form.validate() {
            Ok(credentials) => credentials,
            Err(err) => return AuthResult::failed(err.to_string()),
        };
        match self.provider.sign_up(&credentials).await {
            Ok(user) => {
                info!(user_id = %user.id, "account created");
                AuthResult::ok(Some(user))
            }
            Err(err) => AuthResult::from_provider("sign_up", &err),
        }
    }

    pub async fn sign_in(&self, form: &SignInForm) -> AuthResult {
        let credentials = match form.validate() {
            Ok(credentials) => credentials,
            Err(err) => return AuthResult::failed(err.to_string()),
        };
        match self.provider.sign_in(&credentials).await {
            Ok(user) => {
                info!(user_id = %user.id, "signed in");
                AuthResult::ok(Some(user))
            }
            Err(err) => AuthResult::from_provider("sign_in", &err),
        }
    }

    pub async fn sign_out(&self) -> AuthResult {
        match self.provider.sign_out().await {
            Ok(()) => {
                info!("signed out");
                AuthResult::ok(None)
            }
            Err(err) => AuthResult::from_provider("sign_out", &err),
        }
    }

    pub async fn reset_password(&self, form: &ResetForm) -> AuthResult {
        let email = match form.validate() {
            Ok(email) => email,
            Err(err) => return AuthResult::failed(err.to_string()),
        };
        match self.provider.reset_password(&email).await {
            Ok(()) => AuthResult::ok(None),
            Err(err) => AuthResult::from_provider("reset_password", &err),
        }
    }
}
