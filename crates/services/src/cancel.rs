//! Per-request cancellation so results of abandoned requests are dropped
//! instead of written into stale state.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::Notify;

#[derive(Default)]
struct TokenInner {
    cancelled: AtomicBool,
    notify: Notify,
}

/// Clone-shared cancellation flag.
#[derive(Clone, Default)]
pub struct CancelToken {
    inner: Arc<TokenInner>,
}

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Resolves once the token is cancelled.
    pub async fn cancelled(&self) {
        loop {
            let notified = self.inner.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }

    /// Drive `fut` unless the token is cancelled first.
    ///
    /// Returns `None` when cancelled, including when cancellation races with
    /// completion: a result that arrives after `cancel()` is discarded.
    pub async fn run<F: Future>(&self, fut: F) -> Option<F::Output> {
        if self.is_cancelled() {
            return None;
        }
        let output = tokio::select! {
            biased;
            () = self.cancelled() => return None,
            output = fut => output,
        };
        (!self.is_cancelled()).then_some(output)
    }
}

impl std::fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancelToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Hands out one live token at a time for a view or flow.
///
/// `begin()` cancels whatever request the previous token guarded; `close()`
/// cancels the live token on teardown.
#[derive(Debug, Default)]
pub struct RequestScope {
    current: Mutex<CancelToken>,
}

impl RequestScope {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel the previous request and return a token for the next one.
    pub fn begin(&self) -> CancelToken {
        let mut current = self
            .current
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        current.cancel();
        *current = CancelToken::new();
        current.clone()
    }

    /// Token of the live request without replacing it.
    pub fn token(&self) -> CancelToken {
        self.current
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    pub fn close(&self) {
        self.token().cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn run_returns_output_when_not_cancelled() {
        let token = CancelToken::new();
        assert_eq!(token.run(async { 7 }).await, Some(7));
    }

    #[tokio::test]
    async fn cancelling_suppresses_pending_result() {
        let token = CancelToken::new();
        let canceller = token.clone();
        let handle = tokio::spawn(async move {
            token
                .run(async {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    1
                })
                .await
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
        canceller.cancel();
        assert_eq!(handle.await.unwrap(), None);
    }

    #[tokio::test]
    async fn begin_cancels_previous_token() {
        let scope = RequestScope::new();
        let first = scope.begin();
        let second = scope.begin();
        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());
        scope.close();
        assert!(second.is_cancelled());
        assert_eq!(second.run(async {}).await, None);
    }
}
