//! Identity provider seam: normalized gateway, app-wide auth context, and a
//! local provider for development.

mod context;
mod gateway;
mod memory;
mod messages;

pub use context::{AuthContext, AuthState};
pub use gateway::{AuthGateway, AuthResult};
pub use memory::InMemoryAuthProvider;
pub use messages::{GENERIC_AUTH_ERROR, message_for_code};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::watch;

use study_core::model::{AuthUser, Email};
use study_core::validate::Credentials;

/// Failure reported by an identity provider, keyed by its error code
/// (e.g. `auth/wrong-password`).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {message}")]
pub struct ProviderError {
    pub code: String,
    pub message: String,
}

impl ProviderError {
    #[must_use]
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Capability interface of a third-party identity provider.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Create an account and sign it in.
    ///
    /// # Errors
    ///
    /// Returns the provider's `ProviderError`.
    async fn sign_up(&self, credentials: &Credentials) -> Result<AuthUser, ProviderError>;

    /// # Errors
    ///
    /// Returns the provider's `ProviderError`.
    async fn sign_in(&self, credentials: &Credentials) -> Result<AuthUser, ProviderError>;

    /// # Errors
    ///
    /// Returns the provider's `ProviderError`.
    async fn sign_out(&self) -> Result<(), ProviderError>;

    /// Send a password-reset message.
    ///
    /// # Errors
    ///
    /// Returns the provider's `ProviderError`.
    async fn reset_password(&self, email: &Email) -> Result<(), ProviderError>;

    /// Live view of the signed-in user. Each change fully replaces the
    /// previous value.
    fn watch_user(&self) -> watch::Receiver<Option<AuthUser>>;
}
