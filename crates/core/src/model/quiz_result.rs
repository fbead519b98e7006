use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use crate::model::{OptionLabel, UserId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizResultError {
    #[error("quiz result has no questions")]
    Empty,

    #[error("total ({total}) does not match outcome count ({outcomes})")]
    CountMismatch { total: u32, outcomes: u32 },

    #[error("score ({score}) does not match correct outcomes ({correct})")]
    ScoreMismatch { score: u32, correct: u32 },

    #[error("duplicate outcome for question {index}")]
    DuplicateIndex { index: usize },

    #[error("too many outcomes for a single quiz: {len}")]
    TooManyOutcomes { len: usize },
}

/// Backend verdict for one submitted answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerCheck {
    pub is_correct: bool,
    pub correct_answer: String,
    pub user_answer: String,
}

/// Per-question line of a finished quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOutcome {
    pub index: usize,
    pub user_answer: OptionLabel,
    pub correct_answer: String,
    pub is_correct: bool,
    pub topic_snippet: String,
}

/// Score of a quiz attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizScore {
    pub total_questions: u32,
    pub correct_answers: u32,
}

impl QuizScore {
    /// Fold a set of outcomes into a score.
    ///
    /// # Errors
    ///
    /// Returns `QuizResultError::TooManyOutcomes` if the count overflows `u32`.
    pub fn from_outcomes(outcomes: &[QuestionOutcome]) -> Result<Self, QuizResultError> {
        let total_questions = u32::try_from(outcomes.len())
            .map_err(|_| QuizResultError::TooManyOutcomes { len: outcomes.len() })?;
        let correct_answers = outcomes.iter().fold(0_u32, |acc, outcome| {
            if outcome.is_correct {
                acc.saturating_add(1)
            } else {
                acc
            }
        });
        Ok(Self {
            total_questions,
            correct_answers,
        })
    }

    /// Whole-number percentage, rounded half up. Zero for an empty quiz.
    #[must_use]
    pub fn percentage(&self) -> u32 {
        if self.total_questions == 0 {
            return 0;
        }
        let correct = u64::from(self.correct_answers) * 100;
        let total = u64::from(self.total_questions);
        // Integer rounding: (a * 2 + b) / (2 * b)
        u32::try_from((correct * 2 + total) / (total * 2)).unwrap_or(100)
    }
}

/// Immutable record of a completed quiz, owned by the result store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizResult {
    user_id: UserId,
    taken_at: DateTime<Utc>,
    score: u32,
    total: u32,
    percentage: u32,
    outcomes: Vec<QuestionOutcome>,
}

impl QuizResult {
    /// Build a result from the outcomes of a completed session.
    ///
    /// # Errors
    ///
    /// Returns `QuizResultError` if outcomes are empty or contain duplicate indices.
    pub fn from_outcomes(
        user_id: UserId,
        taken_at: DateTime<Utc>,
        outcomes: Vec<QuestionOutcome>,
    ) -> Result<Self, QuizResultError> {
        let score = QuizScore::from_outcomes(&outcomes)?;
        Self::from_persisted(
            user_id,
            taken_at,
            score.correct_answers,
            score.total_questions,
            outcomes,
        )
    }

    /// Rehydrate a result from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `QuizResultError` if the stored totals disagree with the outcomes.
    pub fn from_persisted(
        user_id: UserId,
        taken_at: DateTime<Utc>,
        score: u32,
        total: u32,
        outcomes: Vec<QuestionOutcome>,
    ) -> Result<Self, QuizResultError> {
        if outcomes.is_empty() {
            return Err(QuizResultError::Empty);
        }

        let computed = QuizScore::from_outcomes(&outcomes)?;
        if computed.total_questions != total {
            return Err(QuizResultError::CountMismatch {
                total,
                outcomes: computed.total_questions,
            });
        }
        if computed.correct_answers != score {
            return Err(QuizResultError::ScoreMismatch {
                score,
                correct: computed.correct_answers,
            });
        }

        let mut seen = HashSet::with_capacity(outcomes.len());
        for outcome in &outcomes {
            if !seen.insert(outcome.index) {
                return Err(QuizResultError::DuplicateIndex {
                    index: outcome.index,
                });
            }
        }

        Ok(Self {
            user_id,
            taken_at,
            score,
            total,
            percentage: computed.percentage(),
            outcomes,
        })
    }

    #[must_use]
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    #[must_use]
    pub fn taken_at(&self) -> DateTime<Utc> {
        self.taken_at
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn percentage(&self) -> u32 {
        self.percentage
    }

    #[must_use]
    pub fn outcomes(&self) -> &[QuestionOutcome] {
        &self.outcomes
    }
}
