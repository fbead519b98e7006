use services::quiz::CheckTicket;
use storage::repository::QuizResultRepository;
use study_core::model::{OptionLabel, QuestionOutcome, QuizResult, UserId};
use study_core::time::fixed_now;

use super::test_harness::{
    ViewKind, mount, setup_services, setup_view_harness, test_user,
};

fn label(raw: &str) -> OptionLabel {
    OptionLabel::new(raw).unwrap()
}

#[tokio::test(flavor = "current_thread")]
async fn home_view_smoke_renders_user_and_documents() {
    let mut harness = setup_view_harness(ViewKind::Home, Some(test_user("ada")));
    harness.rebuild();
    harness.drive_async().await;

    let html = harness.render();
    assert!(html.contains("Signed in as ada@example.com"), "missing user in {html}");
    assert!(html.contains("Server: online"), "missing health in {html}");
    assert!(html.contains("Documents loaded: 3"), "missing count in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn home_view_smoke_renders_offline_server() {
    let (services, storage) = setup_services(None, false);
    let mut harness = mount(ViewKind::Home, services, storage);
    harness.rebuild();
    harness.drive_async().await;

    let html = harness.render();
    assert!(html.contains("Not signed in"), "missing signed-out text in {html}");
    assert!(html.contains("Server: offline"), "missing offline in {html}");
    assert!(html.contains("Retry"), "missing retry in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn upload_view_smoke_renders_picker() {
    let mut harness = setup_view_harness(ViewKind::Upload, None);
    harness.rebuild();

    let html = harness.render();
    assert!(html.contains(".pdf,.ppt,.pptx"), "missing accept list in {html}");
    assert!(html.contains("No file selected"), "missing staged label in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn ask_view_smoke_renders_answer_and_sources() {
    let (services, storage) = setup_services(None, true);
    services.query().submit("Ownership").await.unwrap();
    let mut harness = mount(ViewKind::Ask, services, storage);
    harness.rebuild();

    let html = harness.render();
    assert!(html.contains("<strong>Ownership</strong>"), "missing answer in {html}");
    assert!(html.contains("rust-book.pdf (Page 4)"), "missing source in {html}");
    assert!(html.contains("Relevance: 82%"), "missing score in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn quiz_view_smoke_offers_generation() {
    let mut harness = setup_view_harness(ViewKind::Quiz, None);
    harness.rebuild();

    let html = harness.render();
    assert!(html.contains("Generate Quiz"), "missing generate button in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn quiz_view_smoke_shows_incorrect_verdict() {
    let (services, storage) = setup_services(None, true);
    let quiz = services.quiz();
    quiz.generate().await.unwrap();
    quiz.select_answer(0, label("B")).unwrap();
    quiz.check_answer(0).await.unwrap();

    let mut harness = mount(ViewKind::Quiz, services, storage);
    harness.rebuild();

    let html = harness.render();
    assert!(html.contains("Question 1 of 1"), "missing position in {html}");
    assert!(html.contains("Incorrect"), "missing verdict in {html}");
    assert!(html.contains("Your answer: B"), "missing user answer in {html}");
    assert!(html.contains("Correct answer: A"), "missing correct answer in {html}");
    assert!(html.contains("Finish Quiz"), "missing finish in {html}");
    assert!(!html.contains("Please answer"), "unexpected warning in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn quiz_view_smoke_shows_running_check() {
    let (services, storage) = setup_services(None, true);
    let quiz = services.quiz();
    quiz.generate().await.unwrap();
    quiz.select_answer(0, label("A")).unwrap();
    let CheckTicket::Pending(_pending) = quiz.start_check(0).unwrap() else {
        panic!("expected a new check");
    };

    let mut harness = mount(ViewKind::Quiz, services, storage);
    harness.rebuild();

    let html = harness.render();
    assert!(html.contains("Checking..."), "missing checking state in {html}");
    assert!(!html.contains("Check Answer"), "unexpected check button label in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn quiz_view_smoke_warns_before_checking() {
    let (services, storage) = setup_services(None, true);
    let quiz = services.quiz();
    quiz.generate().await.unwrap();
    quiz.select_answer(0, label("A")).unwrap();

    let mut harness = mount(ViewKind::Quiz, services, storage);
    harness.rebuild();

    let html = harness.render();
    assert!(
        html.contains("Please check all your answers before finishing the quiz. Not checked: 1"),
        "missing warning in {html}"
    );
}

#[tokio::test(flavor = "current_thread")]
async fn quiz_view_smoke_renders_completion() {
    let (services, storage) = setup_services(Some(test_user("u1")), true);
    let quiz = services.quiz();
    quiz.generate().await.unwrap();
    quiz.select_answer(0, label("B")).unwrap();
    quiz.check_answer(0).await.unwrap();
    quiz.complete().await.unwrap();

    let mut harness = mount(ViewKind::Quiz, services, storage);
    harness.rebuild();

    let html = harness.render();
    assert!(html.contains("You scored 0 out of 1 (0%)"), "missing score in {html}");
    assert!(html.contains("Result saved to your progress"), "missing save state in {html}");
    assert!(html.contains("New Quiz"), "missing restart in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn progress_view_smoke_requires_sign_in() {
    let mut harness = setup_view_harness(ViewKind::Progress, None);
    harness.rebuild();
    harness.drive_async().await;

    let html = harness.render();
    assert!(
        html.contains("Please sign in to view your progress"),
        "missing sign-in prompt in {html}"
    );
}

#[tokio::test(flavor = "current_thread")]
async fn progress_view_smoke_lists_history() {
    let mut harness = setup_view_harness(ViewKind::Progress, Some(test_user("u1")));
    let outcomes = vec![
        QuestionOutcome {
            index: 0,
            user_answer: label("A"),
            correct_answer: "A".into(),
            is_correct: true,
            topic_snippet: "Ownership".into(),
        },
        QuestionOutcome {
            index: 1,
            user_answer: label("C"),
            correct_answer: "B".into(),
            is_correct: false,
            topic_snippet: "Lifetimes".into(),
        },
    ];
    let result = QuizResult::from_outcomes(UserId::new("u1").unwrap(), fixed_now(), outcomes)
        .unwrap();
    harness
        .storage
        .quiz_results
        .append_result(&result)
        .await
        .expect("append result");

    harness.rebuild();
    harness.drive_async().await;

    let html = harness.render();
    assert!(html.contains("1/2"), "missing score in {html}");
    assert!(html.contains("50%"), "missing percentage in {html}");
    assert!(html.contains("Lifetimes"), "missing missed topic in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn login_view_smoke_renders_form() {
    let mut harness = setup_view_harness(ViewKind::Login, None);
    harness.rebuild();

    let html = harness.render();
    assert!(html.contains("Sign in"), "missing title in {html}");
    assert!(html.contains("Forgot password?"), "missing reset link in {html}");
    assert!(harness.services.auth().current_user().is_none());
}
