use dioxus::prelude::*;
use services::upload::receipt_notice;
use services::{FlowError, Notice};
use study_core::model::DocumentFile;

use crate::context::AppContext;
use crate::views::NoticeBanner;
use crate::vm::use_notice;

#[component]
pub fn UploadView() -> Element {
    let ctx = use_context::<AppContext>();
    let upload = ctx.upload();
    let mut notice = use_notice();
    let mut staged = use_signal(|| upload.staged_name());
    let mut busy = use_signal(|| upload.is_busy());

    let on_pick = {
        let upload = upload.clone();
        move |evt: FormEvent| {
            let upload = upload.clone();
            let Some(file) = evt.files().into_iter().next() else {
                return;
            };
            spawn(async move {
                let name = file.name();
                let bytes = match file.read_bytes().await {
                    Ok(bytes) => bytes.to_vec(),
                    Err(err) => {
                        notice.show(Notice::failure(format!("Could not read {name}: {err}")));
                        return;
                    }
                };
                match upload.stage(DocumentFile::new(name, bytes)) {
                    Ok(_) => notice.clear(),
                    Err(err) => notice.show(Notice::validation(err.to_string())),
                }
                staged.set(upload.staged_name());
            });
        }
    };

    let on_submit = move |_| {
        let upload = upload.clone();
        busy.set(true);
        spawn(async move {
            match upload.submit().await {
                Ok(receipt) => notice.show(receipt_notice(&receipt)),
                Err(FlowError::Cancelled) => {}
                Err(err) => notice.show(err.notice("Upload")),
            }
            staged.set(upload.staged_name());
            busy.set(upload.is_busy());
        });
    };

    let label = match staged() {
        Some(name) => format!("Selected: {name}"),
        None => "No file selected".to_string(),
    };
    let disabled = busy() || staged().is_none();

    rsx! {
        div { class: "page",
            h2 { "Upload a document" }
            p { class: "hint", "PDF and PowerPoint files (.pdf, .ppt, .pptx)" }

            NoticeBanner { slot: notice }

            input {
                r#type: "file",
                accept: ".pdf,.ppt,.pptx",
                disabled: busy(),
                onchange: on_pick,
            }
            p { class: "upload-staged", "{label}" }
            button {
                class: "btn btn-primary",
                disabled,
                onclick: on_submit,
                if busy() { "Uploading..." } else { "Upload" }
            }
        }
    }
}
