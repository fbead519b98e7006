#![forbid(unsafe_code)]

pub mod api;
pub mod app_services;
pub mod auth;
pub mod cancel;
pub mod config;
pub mod error;
pub mod inflight;
pub mod notice;
pub mod progress;
pub mod query;
pub mod quiz;
pub mod session_store;
pub mod upload;

pub use study_core::Clock;

pub use api::{ApiError, HttpStudyApi, StudyApi};
pub use app_services::AppServices;
pub use auth::{AuthContext, AuthGateway, AuthProvider, AuthResult, InMemoryAuthProvider};
pub use config::{ApiConfig, AuthConfig};
pub use error::{AppServicesError, FlowError, ProgressError, QuizFlowError};
pub use notice::{Notice, NoticeKind};
pub use progress::{ProgressOverview, ProgressReport, ProgressService};
pub use query::QueryFlow;
pub use quiz::{QuizFlow, QuizPhase};
pub use session_store::{SessionSnapshot, SessionStore};
pub use upload::UploadFlow;
