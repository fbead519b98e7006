mod ask;
mod auth;
mod home;
mod notice_banner;
mod progress;
mod quiz;
mod state;
mod upload;

#[cfg(test)]
mod test_harness;
#[cfg(test)]
mod view_smoke;

pub use ask::AskView;
pub use auth::{LoginView, ResetView, SignupView};
pub use home::HomeView;
pub use notice_banner::NoticeBanner;
pub use progress::ProgressView;
pub use quiz::QuizView;
pub use state::{ViewError, ViewState, use_auth_state, view_state_from_resource};
pub use upload::UploadView;
