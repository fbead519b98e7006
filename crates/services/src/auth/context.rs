use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use study_core::model::{AuthUser, UserId};

use super::AuthProvider;
use crate::cancel::CancelToken;

/// Snapshot of "who is signed in". Each provider update replaces it whole.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthState {
    pub user: Option<AuthUser>,
    pub loading: bool,
    pub error: Option<String>,
}

struct ContextInner {
    state: watch::Sender<AuthState>,
    token: CancelToken,
    task: Mutex<Option<JoinHandle<()>>>,
}

/// Process-wide source of truth for the signed-in user.
///
/// Created once at startup with [`AuthContext::start`] and injected into
/// the flows; [`AuthContext::shutdown`] ends the provider subscription.
#[derive(Clone)]
pub struct AuthContext {
    inner: Arc<ContextInner>,
}

impl AuthContext {
    /// Subscribe to `provider` and forward its changes until shutdown.
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn start(provider: &dyn AuthProvider) -> Self {
        let mut users = provider.watch_user();
        let initial = users.borrow_and_update().clone();
        let context = Self::detached(initial);

        let sender = Arc::clone(&context.inner);
        let token = context.inner.token.clone();
        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    () = token.cancelled() => break,
                    changed = users.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let user = users.borrow_and_update().clone();
                        debug!(signed_in = user.is_some(), "auth state changed");
                        sender.state.send_replace(AuthState {
                            user,
                            loading: false,
                            error: None,
                        });
                    }
                }
            }
            debug!("auth subscription closed");
        });
        *context
            .inner
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(task);
        context
    }

    /// A context that is not connected to any provider.
    #[must_use]
    pub fn detached(user: Option<AuthUser>) -> Self {
        let (state, _) = watch::channel(AuthState {
            user,
            loading: false,
            error: None,
        });
        Self {
            inner: Arc::new(ContextInner {
                state,
                token: CancelToken::new(),
                task: Mutex::new(None),
            }),
        }
    }

    #[must_use]
    pub fn state(&self) -> AuthState {
        self.inner.state.borrow().clone()
    }

    #[must_use]
    pub fn current_user(&self) -> Option<AuthUser> {
        self.inner.state.borrow().user.clone()
    }

    #[must_use]
    pub fn user_id(&self) -> Option<UserId> {
        self.inner
            .state
            .borrow()
            .user
            .as_ref()
            .map(|user| user.id.clone())
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.inner.state.subscribe()
    }

    /// Mark a gateway operation as running; clears any previous error.
    pub fn set_loading(&self, loading: bool) {
        self.inner.state.send_modify(|state| {
            state.loading = loading;
            if loading {
                state.error = None;
            }
        });
    }

    pub fn report_error(&self, error: impl Into<String>) {
        let error = error.into();
        self.inner.state.send_modify(|state| {
            state.loading = false;
            state.error = Some(error);
        });
    }

    /// Stop forwarding provider updates. Idempotent.
    pub fn shutdown(&self) {
        self.inner.token.cancel();
        if let Some(task) = self
            .inner
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            task.abort();
        }
    }

    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.inner.token.is_cancelled()
    }
}

impl std::fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthContext")
            .field("state", &self.state())
            .field("shut_down", &self.is_shut_down())
            .finish()
    }
}
