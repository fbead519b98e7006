//! User-facing messages produced at flow boundaries.

use std::time::Duration;

use crate::api::ApiError;

const NETWORK_TTL: Duration = Duration::from_secs(8);
const SERVER_TTL: Duration = Duration::from_secs(5);
const SUCCESS_TTL: Duration = Duration::from_secs(5);
const WARNING_TTL: Duration = Duration::from_secs(6);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoticeKind {
    Validation,
    Network,
    Server,
    Failure,
    Success,
    Warning,
    Info,
}

impl NoticeKind {
    #[must_use]
    pub fn is_error(self) -> bool {
        matches!(
            self,
            Self::Validation | Self::Network | Self::Server | Self::Failure
        )
    }
}

/// A message plus how long it stays on screen.
///
/// `ttl == None` means the notice stays until the user edits the
/// offending input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
    pub ttl: Option<Duration>,
}

impl Notice {
    fn with(kind: NoticeKind, text: impl Into<String>, ttl: Option<Duration>) -> Self {
        Self {
            kind,
            text: text.into(),
            ttl,
        }
    }

    #[must_use]
    pub fn validation(text: impl Into<String>) -> Self {
        Self::with(NoticeKind::Validation, text, None)
    }

    #[must_use]
    pub fn network(text: impl Into<String>) -> Self {
        Self::with(NoticeKind::Network, text, Some(NETWORK_TTL))
    }

    #[must_use]
    pub fn server(text: impl Into<String>) -> Self {
        Self::with(NoticeKind::Server, text, Some(SERVER_TTL))
    }

    #[must_use]
    pub fn failure(text: impl Into<String>) -> Self {
        Self::with(NoticeKind::Failure, text, Some(SERVER_TTL))
    }

    #[must_use]
    pub fn success(text: impl Into<String>) -> Self {
        Self::with(NoticeKind::Success, text, Some(SUCCESS_TTL))
    }

    #[must_use]
    pub fn warning(text: impl Into<String>) -> Self {
        Self::with(NoticeKind::Warning, text, Some(WARNING_TTL))
    }

    #[must_use]
    pub fn info(text: impl Into<String>) -> Self {
        Self::with(NoticeKind::Info, text, Some(SUCCESS_TTL))
    }

    /// Classify an API failure: unreachable backend, server-reported
    /// detail, or generic failure.
    #[must_use]
    pub fn from_api_error(err: &ApiError, action: &str) -> Self {
        match err {
            ApiError::Unreachable { base_url, .. } => Self::network(format!(
                "{action} failed: cannot connect to the study server. \
                 Make sure it is running at {base_url}"
            )),
            ApiError::Timeout => Self::network(format!(
                "{action} failed: the study server took too long to respond. \
                 Check your connection and try again"
            )),
            ApiError::Server { detail, .. } => Self::server(detail.clone()),
            other => Self::failure(format!("{action} failed: {other}")),
        }
    }
}
