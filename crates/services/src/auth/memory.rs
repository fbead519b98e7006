use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use tokio::sync::watch;

use study_core::model::{AuthUser, Email, UserId};
use study_core::validate::{Credentials, MIN_PASSWORD_LEN};

use super::{AuthProvider, ProviderError};

struct Account {
    user: AuthUser,
    password: String,
    disabled: bool,
}

/// Local identity provider keeping accounts in memory.
///
/// Error codes mirror the hosted provider's `auth/*` codes so the gateway's
/// message table applies unchanged.
pub struct InMemoryAuthProvider {
    accounts: Mutex<HashMap<Email, Account>>,
    reset_requests: Mutex<Vec<Email>>,
    current: watch::Sender<Option<AuthUser>>,
    calls: AtomicUsize,
}

impl Default for InMemoryAuthProvider {
    fn default() -> Self {
        let (current, _) = watch::channel(None);
        Self {
            accounts: Mutex::new(HashMap::new()),
            reset_requests: Mutex::new(Vec::new()),
            current,
            calls: AtomicUsize::new(0),
        }
    }
}

impl InMemoryAuthProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account without signing it in.
    ///
    /// # Errors
    ///
    /// Returns `auth/email-already-in-use` if the address is taken.
    pub fn add_account(&self, email: Email, password: &str) -> Result<AuthUser, ProviderError> {
        self.insert(email, password, UserId::generate())
    }

    /// Register an account with a known id.
    ///
    /// # Errors
    ///
    /// Returns `auth/email-already-in-use` if the address is taken.
    pub fn add_account_with_id(
        &self,
        email: Email,
        password: &str,
        id: UserId,
    ) -> Result<AuthUser, ProviderError> {
        self.insert(email, password, id)
    }

    /// Block future sign-ins for `email`.
    pub fn disable_account(&self, email: &Email) {
        if let Ok(mut accounts) = self.accounts() {
            if let Some(account) = accounts.get_mut(email) {
                account.disabled = true;
            }
        }
    }

    /// Number of provider operations invoked so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Addresses for which a reset was requested, oldest first.
    #[must_use]
    pub fn reset_requests(&self) -> Vec<Email> {
        self.reset_requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    fn accounts(&self) -> Result<MutexGuard<'_, HashMap<Email, Account>>, ProviderError> {
        self.accounts
            .lock()
            .map_err(|_| ProviderError::new("auth/internal-error", "account table unavailable"))
    }

    fn insert(&self, email: Email, password: &str, id: UserId) -> Result<AuthUser, ProviderError> {
        let mut accounts = self.accounts()?;
        if accounts.contains_key(&email) {
            return Err(ProviderError::new(
                "auth/email-already-in-use",
                "email already registered",
            ));
        }
        let user = AuthUser {
            id,
            email: email.clone(),
        };
        accounts.insert(
            email,
            Account {
                user: user.clone(),
                password: password.to_string(),
                disabled: false,
            },
        );
        Ok(user)
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl AuthProvider for InMemoryAuthProvider {
    async fn sign_up(&self, credentials: &Credentials) -> Result<AuthUser, ProviderError> {
        self.record_call();
        if credentials.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ProviderError::new("auth/weak-password", "password too short"));
        }
        let user = self.insert(
            credentials.email.clone(),
            &credentials.password,
            UserId::generate(),
        )?;
        self.current.send_replace(Some(user.clone()));
        Ok(user)
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<AuthUser, ProviderError> {
        self.record_call();
        let user = {
            let accounts = self.accounts()?;
            let account = accounts
                .get(&credentials.email)
                .ok_or_else(|| ProviderError::new("auth/user-not-found", "no such account"))?;
            if account.disabled {
                return Err(ProviderError::new("auth/user-disabled", "account disabled"));
            }
            if account.password != credentials.password {
                return Err(ProviderError::new("auth/wrong-password", "password mismatch"));
            }
            account.user.clone()
        };
        self.current.send_replace(Some(user.clone()));
        Ok(user)
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        self.record_call();
        self.current.send_replace(None);
        Ok(())
    }

    async fn reset_password(&self, email: &Email) -> Result<(), ProviderError> {
        self.record_call();
        if !self.accounts()?.contains_key(email) {
            return Err(ProviderError::new("auth/user-not-found", "no such account"));
        }
        self.reset_requests
            .lock()
            .map_err(|_| ProviderError::new("auth/internal-error", "reset queue unavailable"))?
            .push(email.clone());
        Ok(())
    }

    fn watch_user(&self) -> watch::Receiver<Option<AuthUser>> {
        self.current.subscribe()
    }
}
