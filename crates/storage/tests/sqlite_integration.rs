use chrono::Duration;
use storage::repository::{QuizResultRepository, Storage, StorageError};
use storage::sqlite::SqliteRepository;
use study_core::model::{OptionLabel, QuestionOutcome, QuizResult, UserId};
use study_core::time::fixed_now;

fn outcome(index: usize, answer: &str, correct: &str) -> QuestionOutcome {
    QuestionOutcome {
        index,
        user_answer: OptionLabel::new(answer).unwrap(),
        correct_answer: correct.to_string(),
        is_correct: answer.eq_ignore_ascii_case(correct),
        topic_snippet: format!("Topic {index}"),
    }
}

#[tokio::test]
async fn sqlite_roundtrip_preserves_outcomes() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_roundtrip?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let user = UserId::new("u1").unwrap();
    let result = QuizResult::from_outcomes(
        user.clone(),
        fixed_now(),
        vec![outcome(0, "A", "A"), outcome(1, "B", "C")],
    )
    .unwrap();

    let id = repo.append_result(&result).await.expect("append");
    let fetched = repo.get_result(id).await.expect("get");
    assert_eq!(fetched, result);
    assert_eq!(fetched.percentage(), 50);
    assert_eq!(fetched.outcomes()[1].correct_answer, "C");
    assert!(!fetched.outcomes()[1].is_correct);
}

#[tokio::test]
async fn sqlite_history_is_per_user_and_newest_first() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_history?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let alice = UserId::new("alice").unwrap();
    let bob = UserId::new("bob").unwrap();
    let now = fixed_now();

    let older = QuizResult::from_outcomes(
        alice.clone(),
        now - Duration::hours(3),
        vec![outcome(0, "A", "B")],
    )
    .unwrap();
    let newer =
        QuizResult::from_outcomes(alice.clone(), now, vec![outcome(0, "A", "A")]).unwrap();
    let other = QuizResult::from_outcomes(bob.clone(), now, vec![outcome(0, "D", "A")]).unwrap();

    let older_id = repo.append_result(&older).await.unwrap();
    let newer_id = repo.append_result(&newer).await.unwrap();
    repo.append_result(&other).await.unwrap();

    let rows = repo.list_for_user(&alice, 10).await.unwrap();
    let ids: Vec<_> = rows.iter().map(|row| row.id).collect();
    assert_eq!(ids, vec![newer_id, older_id]);
    assert!(rows.iter().all(|row| row.result.user_id() == &alice));

    assert_eq!(repo.count_for_user(&alice).await.unwrap(), 2);
    assert_eq!(repo.count_for_user(&bob).await.unwrap(), 1);

    let limited = repo.list_for_user(&alice, 1).await.unwrap();
    assert_eq!(limited.len(), 1);
    assert_eq!(limited[0].id, newer_id);
}

#[tokio::test]
async fn sqlite_missing_result_is_not_found() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_missing?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");
    assert!(matches!(repo.get_result(42).await, Err(StorageError::NotFound)));
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_migrate?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("first migrate");
    repo.migrate().await.expect("second migrate");
    assert_eq!(repo.schema_version().await.expect("version"), 1);
}

#[tokio::test]
async fn open_migrates_a_fresh_database() {
    let repo = SqliteRepository::open("sqlite:file:memdb_open?mode=memory&cache=shared")
        .await
        .expect("open");
    assert_eq!(repo.schema_version().await.expect("version"), 1);
    let user = UserId::new("u3").unwrap();
    assert_eq!(repo.count_for_user(&user).await.unwrap(), 0);
}

#[tokio::test]
async fn storage_sqlite_builds_repositories() {
    let storage = Storage::sqlite("sqlite:file:memdb_storage?mode=memory&cache=shared")
        .await
        .expect("storage");
    let user = UserId::new("u9").unwrap();
    let result =
        QuizResult::from_outcomes(user.clone(), fixed_now(), vec![outcome(0, "B", "B")]).unwrap();
    storage.quiz_results.append_result(&result).await.unwrap();
    assert_eq!(storage.quiz_results.count_for_user(&user).await.unwrap(), 1);
}
