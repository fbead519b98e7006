use sqlx::Row;
use study_core::model::{QuizResult, UserId};

use super::SqliteRepository;
use super::mapping::{map_result_row, map_result_row_with_id, outcomes_to_json, u32_from_i64};
use crate::repository::{QuizResultId, QuizResultRepository, QuizResultRow, StorageError};

#[async_trait::async_trait]
impl QuizResultRepository for SqliteRepository {
    async fn append_result(&self, result: &QuizResult) -> Result<QuizResultId, StorageError> {
        let outcomes_json = outcomes_to_json(result.outcomes())?;

        let res = sqlx::query(
            r"
                INSERT INTO quiz_results (
                    user_id, taken_at, score, total, percentage, outcomes_json
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ",
        )
        .bind(result.user_id().as_str())
        .bind(result.taken_at())
        .bind(i64::from(result.score()))
        .bind(i64::from(result.total()))
        .bind(i64::from(result.percentage()))
        .bind(outcomes_json)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(res.last_insert_rowid())
    }

    async fn get_result(&self, id: QuizResultId) -> Result<QuizResult, StorageError> {
        let row = sqlx::query(
            r"
                SELECT user_id, taken_at, score, total, outcomes_json
                FROM quiz_results
                WHERE id = ?1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?
        .ok_or(StorageError::NotFound)?;

        map_result_row(&row)
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
        limit: u32,
    ) -> Result<Vec<QuizResultRow>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT id, user_id, taken_at, score, total, outcomes_json
                FROM quiz_results
                WHERE user_id = ?1
                ORDER BY taken_at DESC, id DESC
                LIMIT ?2
            ",
        )
        .bind(user_id.as_str())
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_result_row_with_id(&row)?);
        }
        Ok(out)
    }

    async fn count_for_user(&self, user_id: &UserId) -> Result<u32, StorageError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM quiz_results WHERE user_id = ?1")
            .bind(user_id.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let n: i64 = row
            .try_get("n")
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        u32_from_i64("count", n)
    }
}
