use dioxus::prelude::*;
use dioxus_router::Link;

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ViewError, ViewState, use_auth_state, view_state_from_resource};

#[derive(Clone, Debug, PartialEq)]
struct HomeData {
    document_count: u32,
}

#[component]
pub fn HomeView() -> Element {
    let ctx = use_context::<AppContext>();
    let api_url = ctx.api_url();
    let auth = use_auth_state();
    let user = auth.read().user.clone();

    let mut resource = use_resource(move || {
        let store = ctx.store();
        let api = ctx.api();
        async move {
            let document_count = store
                .refresh_documents(api.as_ref())
                .await
                .map_err(|err| ViewError::Unavailable(err.to_string()))?;
            Ok(HomeData { document_count })
        }
    });

    let state = view_state_from_resource(resource);

    rsx! {
        div { class: "page",
            h2 { "Home" }

            if let Some(user) = user {
                p { class: "home-user", "Signed in as {user.email}" }
            } else {
                p { class: "home-user",
                    "Not signed in. "
                    Link { to: Route::Login {}, "Sign in" }
                    " to keep your quiz history."
                }
            }

            match state {
                ViewState::Idle => rsx! {
                    p { "Idle" }
                },
                ViewState::Loading => rsx! {
                    p { "Checking the study server..." }
                },
                ViewState::Ready(data) => rsx! {
                    p { class: "home-server", "Server: online" }
                    p { class: "home-documents", "Documents loaded: {data.document_count}" }
                    if data.document_count == 0 {
                        p {
                            "Start by "
                            Link { to: Route::Upload {}, "uploading a document" }
                            "."
                        }
                    } else {
                        ul { class: "home-actions",
                            li { Link { to: Route::Ask {}, "Ask a question" } }
                            li { Link { to: Route::Quiz {}, "Take a quiz" } }
                        }
                    }
                },
                ViewState::Error(_) => rsx! {
                    p { class: "home-server", "Server: offline" }
                    p { "Cannot reach the study server at {api_url}" }
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
