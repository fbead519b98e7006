use dioxus::prelude::*;
use services::QuizFlowError;
use services::quiz::{CheckTicket, Navigation, QuizPhase, QuizSnapshot};
use study_core::model::OptionLabel;

use crate::context::AppContext;
use crate::views::NoticeBanner;
use crate::vm::{CompletionVm, QuestionCardVm, completion_warning, use_notice};

#[component]
pub fn QuizView() -> Element {
    let ctx = use_context::<AppContext>();
    let quiz = ctx.quiz();
    let mut notice = use_notice();
    let mut snapshot = use_signal(|| quiz.snapshot());
    let mut busy = use_signal(|| false);

    let on_generate = use_callback({
        let quiz = quiz.clone();
        move |()| {
            let quiz = quiz.clone();
            busy.set(true);
            notice.clear();
            spawn(async move {
                match quiz.generate().await {
                    Ok(next) => snapshot.set(next),
                    Err(QuizFlowError::Cancelled) => snapshot.set(quiz.snapshot()),
                    Err(err) => {
                        notice.show(err.notice());
                        snapshot.set(quiz.snapshot());
                    }
                }
                busy.set(false);
            });
        }
    });

    let on_select = use_callback({
        let quiz = quiz.clone();
        move |(index, raw): (usize, String)| {
            let Ok(label) = OptionLabel::new(&raw) else {
                return;
            };
            if let Err(err) = quiz.select_answer(index, label) {
                notice.show(err.notice());
            }
            snapshot.set(quiz.snapshot());
        }
    });

    let on_check = use_callback({
        let quiz = quiz.clone();
        move |index: usize| {
            match quiz.start_check(index) {
                Ok(CheckTicket::Recorded(_)) => {}
                Ok(CheckTicket::Pending(pending)) => {
                    let quiz = quiz.clone();
                    spawn(async move {
                        match quiz.finish_check(pending).await {
                            Ok(_) | Err(QuizFlowError::Stale | QuizFlowError::Cancelled) => {}
                            Err(err) => notice.show(err.notice()),
                        }
                        snapshot.set(quiz.snapshot());
                    });
                }
                Err(err) => notice.show(err.notice()),
            }
            snapshot.set(quiz.snapshot());
        }
    });

    let on_next = use_callback({
        let quiz = quiz.clone();
        move |()| {
            let quiz = quiz.clone();
            spawn(async move {
                match quiz.advance().await {
                    Ok(Navigation::Moved(_)) => notice.clear(),
                    Ok(Navigation::Completed(report)) => notice.show(report.notice),
                    Err(err) => notice.show(err.notice()),
                }
                snapshot.set(quiz.snapshot());
            });
        }
    });

    let on_back = use_callback({
        let quiz = quiz.clone();
        move |()| {
            if let Err(err) = quiz.retreat() {
                notice.show(err.notice());
            }
            snapshot.set(quiz.snapshot());
        }
    });

    let on_jump = use_callback({
        let quiz = quiz.clone();
        move |index: usize| {
            if let Err(err) = quiz.go_to(index) {
                notice.show(err.notice());
            }
            snapshot.set(quiz.snapshot());
        }
    });

    let on_abandon = use_callback({
        let quiz = quiz.clone();
        move |()| {
            quiz.abandon();
            notice.clear();
            busy.set(false);
            snapshot.set(quiz.snapshot());
        }
    });

    let on_retry_save = use_callback(move |()| {
        let quiz = quiz.clone();
        spawn(async move {
            match quiz.retry_persist().await {
                Ok(report) => notice.show(report.notice),
                Err(err) => notice.show(err.notice()),
            }
            snapshot.set(quiz.snapshot());
        });
    });

    let QuizSnapshot {
        phase,
        session,
        report,
    } = snapshot();
    let card = session.as_ref().and_then(QuestionCardVm::from_session);
    let warning = session
        .as_ref()
        .filter(|session| session.is_last())
        .and_then(completion_warning);
    let completion = report.as_ref().map(CompletionVm::from);

    rsx! {
        div { class: "page",
            h2 { "Quiz" }

            NoticeBanner { slot: notice }

            match (phase, card, completion) {
                (QuizPhase::Generating, _, _) => rsx! {
                    p { class: "quiz-status", "Generating quiz..." }
                },
                (QuizPhase::InProgress, Some(card), _) => rsx! {
                    QuestionCard {
                        card,
                        warning,
                        on_select,
                        on_check,
                        on_next,
                        on_back,
                        on_jump,
                        on_abandon,
                    }
                },
                (QuizPhase::Completed, _, Some(completion)) => rsx! {
                    CompletionPanel {
                        completion,
                        busy: busy(),
                        on_retry_save,
                        on_generate,
                    }
                },
                _ => rsx! {
                    p { class: "quiz-status", "Generate a quiz from your uploaded documents." }
                    button {
                        class: "btn btn-primary",
                        disabled: busy(),
                        onclick: move |_| on_generate.call(()),
                        if busy() { "Generating..." } else { "Generate Quiz" }
                    }
                },
            }
        }
    }
}

#[component]
fn QuestionCard(
    card: QuestionCardVm,
    warning: Option<String>,
    on_select: EventHandler<(usize, String)>,
    on_check: EventHandler<usize>,
    on_next: EventHandler<()>,
    on_back: EventHandler<()>,
    on_jump: EventHandler<usize>,
    on_abandon: EventHandler<()>,
) -> Element {
    let index = card.index;

    rsx! {
        section { class: "quiz-card",
            ol { class: "quiz-steps",
                for step in card.steps {
                    li { key: "{step.index}",
                        button {
                            class: "{step.class}",
                            onclick: move |_| on_jump.call(step.index),
                            "{step.number}"
                        }
                    }
                }
            }

            p { class: "quiz-position", "{card.position_label}" }
            p { class: "quiz-progress", "{card.progress_label}" }
            h3 { class: "quiz-question", "{card.text}" }

            ul { class: "quiz-options",
                for option in card.options {
                    li { key: "{option.label}",
                        label { class: if option.selected { "option option-selected" } else { "option" },
                            input {
                                r#type: "radio",
                                name: "quiz-option",
                                checked: option.selected,
                                disabled: card.checking,
                                onchange: {
                                    let label = option.label.clone();
                                    move |_| on_select.call((index, label.clone()))
                                },
                            }
                            span { class: "option-label", "{option.label}." }
                            span { class: "option-text", "{option.text}" }
                        }
                    }
                }
            }

            button {
                class: "btn",
                disabled: !card.can_check,
                onclick: move |_| on_check.call(index),
                if card.checking { "Checking..." } else { "Check Answer" }
            }

            if let Some(verdict) = card.verdict {
                div { class: if verdict.correct { "verdict verdict-correct" } else { "verdict verdict-incorrect" },
                    strong { "{verdict.headline}" }
                    p { "{verdict.your_answer}" }
                    p { "{verdict.correct_answer}" }
                    if verdict.stale {
                        p { class: "hint", "You changed your answer after checking. Check again to score it." }
                    }
                }
            }

            if let Some(warning) = warning {
                p { class: "quiz-warning", "{warning}" }
            }

            div { class: "quiz-nav",
                button {
                    class: "btn btn-secondary",
                    disabled: !card.can_go_back,
                    onclick: move |_| on_back.call(()),
                    "Previous"
                }
                button {
                    class: "btn btn-primary",
                    onclick: move |_| on_next.call(()),
                    "{card.next_label}"
                }
                button {
                    class: "btn btn-link",
                    onclick: move |_| on_abandon.call(()),
                    "Abandon quiz"
                }
            }
        }
    }
}

#[component]
fn CompletionPanel(
    completion: CompletionVm,
    busy: bool,
    on_retry_save: EventHandler<()>,
    on_generate: EventHandler<()>,
) -> Element {
    rsx! {
        section { class: "quiz-complete",
            h3 { "Quiz complete" }
            p { class: "quiz-score", "{completion.score_label}" }
            ol { class: "quiz-outcomes",
                for outcome in completion.outcomes {
                    li { key: "{outcome.number}",
                        class: if outcome.correct { "outcome outcome-correct" } else { "outcome outcome-incorrect" },
                        span { class: "outcome-status", "{outcome.status}" }
                        span { class: "outcome-topic", "{outcome.topic}" }
                        span { class: "outcome-answers", "{outcome.answers}" }
                    }
                }
            }
            p { class: "quiz-persistence", "{completion.persistence}" }
            if completion.can_retry_save {
                button {
                    class: "btn",
                    onclick: move |_| on_retry_save.call(()),
                    "Retry save"
                }
            }
            button {
                class: "btn btn-primary",
                disabled: busy,
                onclick: move |_| on_generate.call(()),
                "New Quiz"
            }
        }
    }
}
