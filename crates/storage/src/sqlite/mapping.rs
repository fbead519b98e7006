use study_core::model::{QuestionOutcome, QuizResult, UserId};
use sqlx::Row;

use crate::repository::{QuizResultRow, StorageError};

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn outcomes_to_json(outcomes: &[QuestionOutcome]) -> Result<String, StorageError> {
    serde_json::to_string(outcomes).map_err(ser)
}

pub(crate) fn map_result_row(row: &sqlx::sqlite::SqliteRow) -> Result<QuizResult, StorageError> {
    let user_id = UserId::new(row.try_get::<String, _>("user_id").map_err(ser)?).map_err(ser)?;
    let taken_at = row.try_get("taken_at").map_err(ser)?;
    let score = u32_from_i64("score", row.try_get::<i64, _>("score").map_err(ser)?)?;
    let total = u32_from_i64("total", row.try_get::<i64, _>("total").map_err(ser)?)?;
    let outcomes_json: String = row.try_get("outcomes_json").map_err(ser)?;
    let outcomes: Vec<QuestionOutcome> = serde_json::from_str(&outcomes_json).map_err(ser)?;

    QuizResult::from_persisted(user_id, taken_at, score, total, outcomes).map_err(ser)
}

pub(crate) fn map_result_row_with_id(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<QuizResultRow, StorageError> {
    let id: i64 = row.try_get("id").map_err(ser)?;
    let result = map_result_row(row)?;
    Ok(QuizResultRow::new(id, result))
}
