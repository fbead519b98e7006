use dioxus::prelude::*;
use services::FlowError;

use crate::context::AppContext;
use crate::views::NoticeBanner;
use crate::vm::{AnswerVm, use_notice};

#[component]
pub fn AskView() -> Element {
    let ctx = use_context::<AppContext>();
    let query = ctx.query();
    let mut notice = use_notice();
    let mut text = use_signal(String::new);
    let mut busy = use_signal(|| query.is_busy());
    let mut answer = use_signal(|| query.answer().as_ref().map(AnswerVm::from));
    let top_k = query.top_k();

    let on_submit = move |evt: FormEvent| {
        evt.prevent_default();
        let query = query.clone();
        let question = text();
        busy.set(true);
        spawn(async move {
            match query.submit(&question).await {
                Ok(reply) => {
                    notice.clear();
                    answer.set(Some(AnswerVm::from(&reply)));
                }
                Err(FlowError::Cancelled) => {}
                Err(err) => {
                    notice.show(err.notice("Search"));
                    answer.set(query.answer().as_ref().map(AnswerVm::from));
                }
            }
            busy.set(query.is_busy());
        });
    };

    rsx! {
        div { class: "page",
            h2 { "Ask a question" }

            NoticeBanner { slot: notice }

            form { class: "ask-form", onsubmit: on_submit,
                textarea {
                    placeholder: "What would you like to know about your documents?",
                    value: "{text}",
                    oninput: move |evt| text.set(evt.value()),
                }
                button {
                    class: "btn btn-primary",
                    r#type: "submit",
                    disabled: busy(),
                    if busy() { "Searching..." } else { "Ask" }
                }
                span { class: "hint", "Using the top {top_k} passages" }
            }

            if let Some(answer) = answer() {
                section { class: "answer",
                    h3 { "Answer" }
                    div { class: "answer-body", dangerous_inner_html: "{answer.html}" }
                    h4 { "{answer.sources_label}" }
                    ul { class: "sources",
                        for source in answer.sources {
                            li { class: "source",
                                p { class: "source-file", "{source.file} ({source.section})" }
                                if let Some(score) = source.score {
                                    span { class: "source-score", "{score}" }
                                }
                                blockquote { "{source.snippet}" }
                            }
                        }
                    }
                }
            }
        }
    }
}
