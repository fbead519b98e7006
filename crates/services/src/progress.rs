use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use storage::repository::{QuizResultRepository, QuizResultRow};
use study_core::model::UserId;

use crate::auth::AuthContext;
use crate::error::ProgressError;

/// Number of history rows shown by default.
pub const DEFAULT_HISTORY_LIMIT: u32 = 50;

/// Aggregate over every stored result of one user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressOverview {
    pub quizzes_taken: u32,
    pub average_percentage: u32,
    pub best_percentage: u32,
    pub total_correct: u32,
    pub total_questions: u32,
    pub latest: Option<DateTime<Utc>>,
}

impl ProgressOverview {
    #[must_use]
    pub fn from_rows(rows: &[QuizResultRow]) -> Self {
        let mut overview = Self::default();
        let mut percentage_sum: u64 = 0;
        for row in rows {
            let result = &row.result;
            overview.quizzes_taken = overview.quizzes_taken.saturating_add(1);
            overview.total_correct = overview.total_correct.saturating_add(result.score());
            overview.total_questions = overview.total_questions.saturating_add(result.total());
            overview.best_percentage = overview.best_percentage.max(result.percentage());
            percentage_sum += u64::from(result.percentage());
            if overview.latest.is_none_or(|latest| result.taken_at() > latest) {
                overview.latest = Some(result.taken_at());
            }
        }
        if overview.quizzes_taken > 0 {
            let n = u64::from(overview.quizzes_taken);
            overview.average_percentage =
                u32::try_from((percentage_sum * 2 + n) / (n * 2)).unwrap_or(100);
        }
        overview
    }
}

/// History plus its overview, for the progress screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressReport {
    pub overview: ProgressOverview,
    pub history: Vec<QuizResultRow>,
}

/// Reads quiz history from the result store.
#[derive(Clone)]
pub struct ProgressService {
    results: Arc<dyn QuizResultRepository>,
    auth: AuthContext,
}

impl ProgressService {
    #[must_use]
    pub fn new(results: Arc<dyn QuizResultRepository>, auth: AuthContext) -> Self {
        Self { results, auth }
    }

    /// A user's results, newest first.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Storage` on read failures.
    pub async fn history(
        &self,
        user: &UserId,
        limit: u32,
    ) -> Result<Vec<QuizResultRow>, ProgressError> {
        Ok(self.results.list_for_user(user, limit).await?)
    }

    /// Aggregate over all of a user's results.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Storage` on read failures.
    pub async fn overview(&self, user: &UserId) -> Result<ProgressOverview, ProgressError> {
        let count = self.results.count_for_user(user).await?;
        if count == 0 {
            return Ok(ProgressOverview::default());
        }
        let rows = self.results.list_for_user(user, count).await?;
        Ok(ProgressOverview::from_rows(&rows))
    }

    /// History and overview of the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::SignedOut` without a user, or
    /// `ProgressError::Storage` on read failures.
    pub async fn for_current_user(&self, limit: u32) -> Result<ProgressReport, ProgressError> {
        let user = self.auth.user_id().ok_or(ProgressError::SignedOut)?;
        let overview = self.overview(&user).await?;
        let history = self.history(&user, limit).await?;
        debug!(user_id = %user, rows = history.len(), "loaded progress");
        Ok(ProgressReport { overview, history })
    }
}
