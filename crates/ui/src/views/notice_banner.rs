use dioxus::prelude::*;

use crate::vm::NoticeSlot;

#[component]
pub fn NoticeBanner(slot: NoticeSlot) -> Element {
    let Some(notice) = slot.get() else {
        return rsx! {};
    };

    rsx! {
        div { class: "{notice.class}", role: "{notice.role}",
            span { class: "notice-text", "{notice.text}" }
            button {
                class: "notice-dismiss",
                onclick: move |_| {
                    let mut slot = slot;
                    slot.clear();
                },
                "Dismiss"
            }
        }
    }
}
