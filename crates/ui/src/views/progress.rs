use dioxus::prelude::*;
use dioxus_router::Link;
use services::ProgressError;
use services::progress::DEFAULT_HISTORY_LIMIT;

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ViewError, ViewState, use_auth_state, view_state_from_resource};
use crate::vm::{HistoryRowVm, OverviewVm, map_history_rows};

#[derive(Clone, Debug, PartialEq)]
struct ProgressData {
    overview: OverviewVm,
    rows: Vec<HistoryRowVm>,
}

#[component]
pub fn ProgressView() -> Element {
    let ctx = use_context::<AppContext>();
    let auth = use_auth_state();

    let mut resource = use_resource(move || {
        let progress = ctx.progress();
        // Re-run when the signed-in user changes.
        let _user = auth.read().user.clone();
        async move {
            let report = progress
                .for_current_user(DEFAULT_HISTORY_LIMIT)
                .await
                .map_err(|err| match err {
                    ProgressError::SignedOut => ViewError::SignedOut,
                    other => ViewError::Unavailable(other.to_string()),
                })?;
            Ok(ProgressData {
                overview: OverviewVm::from(&report.overview),
                rows: map_history_rows(&report.history),
            })
        }
    });

    let state = view_state_from_resource(resource);

    rsx! {
        div { class: "page",
            h2 { "Progress" }

            match state {
                ViewState::Idle => rsx! {
                    p { "Idle" }
                },
                ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Ready(data) => rsx! {
                    dl { class: "overview",
                        dt { "Quizzes taken" } dd { "{data.overview.quizzes_taken}" }
                        dt { "Average score" } dd { "{data.overview.average}" }
                        dt { "Best score" } dd { "{data.overview.best}" }
                        dt { "Questions" } dd { "{data.overview.totals}" }
                        dt { "Last quiz" } dd { "{data.overview.latest}" }
                    }
                    if data.rows.is_empty() {
                        p { "No quizzes taken yet." }
                    } else {
                        ul { class: "history",
                            for row in data.rows {
                                HistoryRow { key: "{row.id}", row }
                            }
                        }
                    }
                },
                ViewState::Error(err @ ViewError::SignedOut) => rsx! {
                    p { "{err.message()}" }
                    Link { class: "btn", to: Route::Login {}, "Sign in" }
                },
                ViewState::Error(err) => rsx! {
                    p { "{err.message()}" }
                    button {
                        class: "btn",
                        onclick: move |_| resource.restart(),
                        "Retry"
                    }
                },
            }
        }
    }
}

#[component]
fn HistoryRow(row: HistoryRowVm) -> Element {
    rsx! {
        li { class: "history-row {row.grade_class}",
            span { class: "history-date", "{row.taken_at}" }
            span { class: "history-score", "{row.score}" }
            span { class: "history-percentage", "{row.percentage}" }
            if !row.missed_topics.is_empty() {
                ul { class: "history-missed",
                    for topic in row.missed_topics {
                        li { "{topic}" }
                    }
                }
            }
        }
    }
}
