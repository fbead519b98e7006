use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use study_core::model::{QuizResult, UserId};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Storage identifier for a persisted quiz result.
pub type QuizResultId = i64;

/// A persisted quiz result together with its storage identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizResultRow {
    pub id: QuizResultId,
    pub result: QuizResult,
}

impl QuizResultRow {
    #[must_use]
    pub fn new(id: QuizResultId, result: QuizResult) -> Self {
        Self { id, result }
    }
}

/// Write/read contract for completed quiz results, keyed by user.
///
/// Results are append-only: there is no update or delete.
#[async_trait]
pub trait QuizResultRepository: Send + Sync {
    /// Append a completed result.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the result cannot be stored.
    async fn append_result(&self, result: &QuizResult) -> Result<QuizResultId, StorageError>;

    /// Fetch a single result by ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_result(&self, id: QuizResultId) -> Result<QuizResult, StorageError>;

    /// List a user's results, newest first (ties broken by ID, newest first).
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on read failures.
    async fn list_for_user(
        &self,
        user_id: &UserId,
        limit: u32,
    ) -> Result<Vec<QuizResultRow>, StorageError>;

    /// Count every result stored for a user.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on read failures.
    async fn count_for_user(&self, user_id: &UserId) -> Result<u32, StorageError>;
}

#[derive(Default)]
struct InMemoryState {
    next_id: QuizResultId,
    results: HashMap<QuizResultId, QuizResult>,
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    state: Arc<Mutex<InMemoryState>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QuizResultRepository for InMemoryRepository {
    async fn append_result(&self, result: &QuizResult) -> Result<QuizResultId, StorageError> {
        let mut guard = self
            .state
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.next_id += 1;
        let id = guard.next_id;
        guard.results.insert(id, result.clone());
        Ok(id)
    }

    async fn get_result(&self, id: QuizResultId) -> Result<QuizResult, StorageError> {
        let guard = self
            .state
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.results.get(&id).cloned().ok_or(StorageError::NotFound)
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
        limit: u32,
    ) -> Result<Vec<QuizResultRow>, StorageError> {
        let guard = self
            .state
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut rows: Vec<QuizResultRow> = guard
            .results
            .iter()
            .filter(|(_, result)| result.user_id() == user_id)
            .map(|(id, result)| QuizResultRow::new(*id, result.clone()))
            .collect();
        rows.sort_by(|a, b| {
            b.result
                .taken_at()
                .cmp(&a.result.taken_at())
                .then(b.id.cmp(&a.id))
        });
        rows.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(rows)
    }

    async fn count_for_user(&self, user_id: &UserId) -> Result<u32, StorageError> {
        let guard = self
            .state
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let count = guard
            .results
            .values()
            .filter(|result| result.user_id() == user_id)
            .count();
        u32::try_from(count).map_err(|_| StorageError::Serialization("count overflow".into()))
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub quiz_results: Arc<dyn QuizResultRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let quiz_results: Arc<dyn QuizResultRepository> = Arc::new(repo);
        Self { quiz_results }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use study_core::model::{OptionLabel, QuestionOutcome};
    use study_core::time::fixed_now;

    fn build_result(user: &str, minutes_ago: i64, correct: &[bool]) -> QuizResult {
        let outcomes = correct
            .iter()
            .enumerate()
            .map(|(index, is_correct)| QuestionOutcome {
                index,
                user_answer: OptionLabel::new("A").unwrap(),
                correct_answer: if *is_correct { "A".into() } else { "C".into() },
                is_correct: *is_correct,
                topic_snippet: format!("Q{index}"),
            })
            .collect();
        QuizResult::from_outcomes(
            UserId::new(user).unwrap(),
            fixed_now() - Duration::minutes(minutes_ago),
            outcomes,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn lists_only_the_users_results_newest_first() {
        let repo = InMemoryRepository::new();
        let old = repo.append_result(&build_result("u1", 30, &[true])).await.unwrap();
        let new = repo
            .append_result(&build_result("u1", 5, &[true, false]))
            .await
            .unwrap();
        repo.append_result(&build_result("u2", 1, &[false])).await.unwrap();

        let user = UserId::new("u1").unwrap();
        let rows = repo.list_for_user(&user, 10).await.unwrap();
        let ids: Vec<_> = rows.iter().map(|row| row.id).collect();
        assert_eq!(ids, vec![new, old]);
        assert_eq!(repo.count_for_user(&user).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn limit_truncates_history() {
        let repo = InMemoryRepository::new();
        for minutes in 0..5 {
            repo.append_result(&build_result("u1", minutes, &[true]))
                .await
                .unwrap();
        }
        let rows = repo
            .list_for_user(&UserId::new("u1").unwrap(), 3)
            .await
            .unwrap();
        assert_eq!(rows.len(), 3);
    }

    #[tokio::test]
    async fn missing_result_is_not_found() {
        let repo = InMemoryRepository::new();
        assert!(matches!(
            repo.get_result(99).await,
            Err(StorageError::NotFound)
        ));
    }
}
