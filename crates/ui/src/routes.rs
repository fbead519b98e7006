use dioxus::prelude::*;
use dioxus_router::{Link, Outlet, Routable};

use crate::context::AppContext;
use crate::views::{
    AskView, HomeView, LoginView, ProgressView, QuizView, ResetView, SignupView, UploadView,
    use_auth_state,
};

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
pub enum Route {
    #[layout(Layout)]
        #[route("/", HomeView)] Home {},
        #[route("/upload", UploadView)] Upload {},
        #[route("/ask", AskView)] Ask {},
        #[route("/quiz", QuizView)] Quiz {},
        #[route("/progress", ProgressView)] Progress {},
        #[route("/login", LoginView)] Login {},
        #[route("/signup", SignupView)] Signup {},
        #[route("/reset", ResetView)] Reset {},
}

#[component]
fn Layout() -> Element {
    rsx! {
        div { class: "app",
            Sidebar {}
            main { class: "content",
                Outlet::<Route> {}
            }
        }
    }
}

#[component]
fn Sidebar() -> Element {
    let ctx = use_context::<AppContext>();
    let auth = use_auth_state();
    let user = auth.read().user.clone();

    rsx! {
        nav { class: "sidebar",
            h1 { "Study Assistant" }
            ul {
                li { Link { to: Route::Home {}, "Home" } }
                li { Link { to: Route::Upload {}, "Upload" } }
                li { Link { to: Route::Ask {}, "Ask" } }
                li { Link { to: Route::Quiz {}, "Quiz" } }
                li { Link { to: Route::Progress {}, "Progress" } }
            }
            div { class: "sidebar-account",
                if let Some(user) = user {
                    p { class: "account-email", "{user.email}" }
                    button {
                        class: "btn btn-secondary",
                        onclick: move |_| {
                            let gateway = ctx.gateway();
                            spawn(async move {
                                gateway.sign_out().await;
                            });
                        },
                        "Sign out"
                    }
                } else {
                    Link { class: "btn", to: Route::Login {}, "Sign in" }
                }
            }
        }
    }
}
