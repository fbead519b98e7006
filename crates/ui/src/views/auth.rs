use dioxus::prelude::*;
use dioxus_router::{Link, use_navigator};
use services::Notice;
use study_core::validate::{ResetForm, SignInForm, SignUpForm};

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::NoticeBanner;
use crate::vm::use_notice;

#[component]
pub fn LoginView() -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();
    let mut notice = use_notice();
    let mut email = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut busy = use_signal(|| false);

    let on_submit = move |evt: FormEvent| {
        evt.prevent_default();
        let gateway = ctx.gateway();
        let form = SignInForm {
            email: email(),
            password: password(),
        };
        busy.set(true);
        spawn(async move {
            let result = gateway.sign_in(&form).await;
            busy.set(false);
            match result.error {
                Some(error) => notice.show(Notice::validation(error)),
                None => {
                    navigator.push(Route::Home {});
                }
            }
        });
    };

    rsx! {
        div { class: "page auth-page",
            h2 { "Sign in" }
            NoticeBanner { slot: notice }
            form { class: "auth-form", onsubmit: on_submit,
                label { "Email"
                    input {
                        r#type: "email",
                        value: "{email}",
                        oninput: move |evt| email.set(evt.value()),
                    }
                }
                label { "Password"
                    input {
                        r#type: "password",
                        value: "{password}",
                        oninput: move |evt| password.set(evt.value()),
                    }
                }
                button { class: "btn btn-primary", r#type: "submit", disabled: busy(),
                    if busy() { "Signing in..." } else { "Sign in" }
                }
            }
            p {
                Link { to: Route::Signup {}, "Create an account" }
                " | "
                Link { to: Route::Reset {}, "Forgot password?" }
            }
        }
    }
}

#[component]
pub fn SignupView() -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();
    let mut notice = use_notice();
    let mut email = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut confirm = use_signal(String::new);
    let mut busy = use_signal(|| false);

    let on_submit = move |evt: FormEvent| {
        evt.prevent_default();
        let gateway = ctx.gateway();
        let form = SignUpForm {
            email: email(),
            password: password(),
            confirm_password: confirm(),
        };
        busy.set(true);
        spawn(async move {
            let result = gateway.sign_up(&form).await;
            busy.set(false);
            match result.error {
                Some(error) => notice.show(Notice::validation(error)),
                None => {
                    navigator.push(Route::Home {});
                }
            }
        });
    };

    rsx! {
        div { class: "page auth-page",
            h2 { "Create an account" }
            NoticeBanner { slot: notice }
            form { class: "auth-form", onsubmit: on_submit,
                label { "Email"
                    input {
                        r#type: "email",
                        value: "{email}",
                        oninput: move |evt| email.set(evt.value()),
                    }
                }
                label { "Password"
                    input {
                        r#type: "password",
                        value: "{password}",
                        oninput: move |evt| password.set(evt.value()),
                    }
                }
                label { "Confirm password"
                    input {
                        r#type: "password",
                        value: "{confirm}",
                        oninput: move |evt| confirm.set(evt.value()),
                    }
                }
                button { class: "btn btn-primary", r#type: "submit", disabled: busy(),
                    if busy() { "Creating account..." } else { "Sign up" }
                }
            }
            p {
                "Already have an account? "
                Link { to: Route::Login {}, "Sign in" }
            }
        }
    }
}

#[component]
pub fn ResetView() -> Element {
    let ctx = use_context::<AppContext>();
    let mut notice = use_notice();
    let mut email = use_signal(String::new);
    let mut busy = use_signal(|| false);

    let on_submit = move |evt: FormEvent| {
        evt.prevent_default();
        let gateway = ctx.gateway();
        let form = ResetForm { email: email() };
        busy.set(true);
        spawn(async move {
            let result = gateway.reset_password(&form).await;
            busy.set(false);
            match result.error {
                Some(error) => notice.show(Notice::validation(error)),
                None => notice.show(Notice::success(
                    "Password reset email sent. Check your inbox.",
                )),
            }
        });
    };

    rsx! {
        div { class: "page auth-page",
            h2 { "Reset password" }
            NoticeBanner { slot: notice }
            form { class: "auth-form", onsubmit: on_submit,
                label { "Email"
                    input {
                        r#type: "email",
                        value: "{email}",
                        oninput: move |evt| email.set(evt.value()),
                    }
                }
                button { class: "btn btn-primary", r#type: "submit", disabled: busy(),
                    if busy() { "Sending..." } else { "Send reset link" }
                }
            }
            p { Link { to: Route::Login {}, "Back to sign in" } }
        }
    }
}
