use dioxus::prelude::*;
use services::auth::AuthState;

use crate::context::AppContext;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewError {
    SignedOut,
    Unavailable(String),
}

impl ViewError {
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::SignedOut => "Please sign in to view your progress".to_string(),
            Self::Unavailable(detail) => format!("Something went wrong. {detail}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ViewState<T> {
    Idle,
    Loading,
    Ready(T),
    Error(ViewError),
}

#[must_use]
pub fn view_state_from_resource<T: Clone>(
    resource: Resource<Result<T, ViewError>>,
) -> ViewState<T> {
    match resource.state().cloned() {
        UseResourceState::Pending => ViewState::Loading,
        UseResourceState::Ready => match resource.value().read().as_ref() {
            Some(Ok(data)) => ViewState::Ready(data.clone()),
            Some(Err(err)) => ViewState::Error(err.clone()),
            None => ViewState::Error(ViewError::Unavailable(String::new())),
        },
        UseResourceState::Paused | UseResourceState::Stopped => ViewState::Idle,
    }
}

/// Mirror the auth context into a signal so views re-render on sign-in
/// and sign-out.
pub fn use_auth_state() -> Signal<AuthState> {
    let ctx = use_context::<AppContext>();
    let auth = ctx.auth();
    let state = use_signal(|| auth.state());

    use_future(move || {
        let mut updates = auth.subscribe();
        let mut state = state;
        async move {
            while updates.changed().await.is_ok() {
                let next = updates.borrow_and_update().clone();
                state.set(next);
            }
        }
    });

    state
}
