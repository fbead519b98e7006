use std::fmt::Write as _;
use std::sync::Arc;

use thiserror::Error;

use study_core::model::{
    AnswerCheck, OptionLabel, QuestionOutcome, Question, Quiz, QuizResultError, QuizScore,
};

use super::question_state::{CheckStart, QuestionPhase, QuestionState, QuestionStateError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizSessionError {
    #[error("question {} does not exist", .0 + 1)]
    NoSuchQuestion(usize),

    #[error("option {label} is not offered for question {}", .index + 1)]
    UnknownOption { index: usize, label: OptionLabel },

    #[error("Please select an answer for question {} first", .index + 1)]
    NoSelection { index: usize },

    #[error("question {} is being checked", .index + 1)]
    CheckInProgress { index: usize },

    #[error("no check is pending for question {}", .index + 1)]
    NoCheckPending { index: usize },

    #[error("{}", .0.message())]
    Incomplete(CompletionBlocked),

    #[error("the quiz is already completed")]
    AlreadyCompleted,

    #[error(transparent)]
    Score(#[from] QuizResultError),
}

impl QuizSessionError {
    fn at(index: usize, err: QuestionStateError) -> Self {
        match err {
            QuestionStateError::CheckInProgress => Self::CheckInProgress { index },
            QuestionStateError::NoSelection => Self::NoSelection { index },
            QuestionStateError::NoCheckPending => Self::NoCheckPending { index },
        }
    }
}

/// Why the quiz cannot be completed yet. Indices are zero-based.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionBlocked {
    /// Questions with no selected answer.
    pub missing_answers: Vec<usize>,
    /// Questions with a selected answer that has never been checked.
    pub missing_checks: Vec<usize>,
    /// Questions whose answer check has not returned yet.
    pub checks_pending: Vec<usize>,
}

impl CompletionBlocked {
    /// Warning shown to the user, numbering questions from 1.
    #[must_use]
    pub fn message(&self) -> String {
        if !self.checks_pending.is_empty() {
            return format!(
                "Please wait for the answer check on question(s) {} to finish",
                numbered(&self.checks_pending)
            );
        }
        let answers = numbered(&self.missing_answers);
        let checks = numbered(&self.missing_checks);
        match (answers.is_empty(), checks.is_empty()) {
            (false, false) => format!(
                "Please answer question(s) {answers} and check your answer for question(s) {checks} before finishing the quiz"
            ),
            (false, true) => format!(
                "Please answer all questions before finishing the quiz. Unanswered: {answers}"
            ),
            (true, false) => format!(
                "Please check all your answers before finishing the quiz. Not checked: {checks}"
            ),
            (true, true) => "The quiz is ready to finish".to_string(),
        }
    }
}

fn numbered(indices: &[usize]) -> String {
    let mut out = String::new();
    for (i, index) in indices.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        let _ = write!(out, "{}", index + 1);
    }
    out
}

/// Completion predicate over every question of a quiz.
///
/// A quiz can finish exactly when each question has both a selected answer
/// and a stored check result, and no check is still running.
///
/// # Errors
///
/// Returns `CompletionBlocked` listing the questions that hold it back.
pub fn completion_gate(states: &[QuestionState]) -> Result<(), CompletionBlocked> {
    let mut blocked = CompletionBlocked::default();
    for (index, state) in states.iter().enumerate() {
        if state.phase() == QuestionPhase::Checking {
            blocked.checks_pending.push(index);
        } else if !state.has_selection() {
            blocked.missing_answers.push(index);
        } else if !state.has_result() {
            blocked.missing_checks.push(index);
        }
    }
    if blocked.missing_answers.is_empty()
        && blocked.missing_checks.is_empty()
        && blocked.checks_pending.is_empty()
    {
        Ok(())
    } else {
        Err(blocked)
    }
}

/// Folded score of a completed quiz.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSummary {
    pub total_questions: u32,
    pub correct_answers: u32,
    pub results: Vec<QuestionOutcome>,
}

impl QuizSummary {
    #[must_use]
    pub fn percentage(&self) -> u32 {
        QuizScore {
            total_questions: self.total_questions,
            correct_answers: self.correct_answers,
        }
        .percentage()
    }
}

/// Result of moving forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Moved(usize),
    /// Already on the last question; moving on means completing.
    AtLast,
}

/// One attempt at a generated quiz.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSession {
    quiz: Arc<Quiz>,
    current: usize,
    questions: Vec<QuestionState>,
    completed: bool,
}

impl QuizSession {
    #[must_use]
    pub fn new(quiz: Arc<Quiz>) -> Self {
        let questions = vec![QuestionState::default(); quiz.len()];
        Self {
            quiz,
            current: 0,
            questions,
            completed: false,
        }
    }

    #[must_use]
    pub fn quiz(&self) -> &Arc<Quiz> {
        &self.quiz
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.quiz.question(self.current)
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.current == self.quiz.last_index()
    }

    #[must_use]
    pub fn state(&self, index: usize) -> Option<&QuestionState> {
        self.questions.get(index)
    }

    #[must_use]
    pub fn states(&self) -> &[QuestionState] {
        &self.questions
    }

    #[must_use]
    pub fn phases(&self) -> Vec<QuestionPhase> {
        self.questions.iter().map(QuestionState::phase).collect()
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.questions.iter().filter(|q| q.has_selection()).count()
    }

    #[must_use]
    pub fn checked_count(&self) -> usize {
        self.questions.iter().filter(|q| q.has_result()).count()
    }

    fn question_mut(&mut self, index: usize) -> Result<&mut QuestionState, QuizSessionError> {
        self.questions
            .get_mut(index)
            .ok_or(QuizSessionError::NoSuchQuestion(index))
    }

    /// Record `label` as the answer to `index`, replacing any earlier choice.
    ///
    /// # Errors
    ///
    /// Returns `QuizSessionError` if the quiz is completed, the question or
    /// option does not exist, or a check for the question is running.
    pub fn select(&mut self, index: usize, label: OptionLabel) -> Result<(), QuizSessionError> {
        if self.completed {
            return Err(QuizSessionError::AlreadyCompleted);
        }
        let question = self
            .quiz
            .question(index)
            .ok_or(QuizSessionError::NoSuchQuestion(index))?;
        if !question.has_option(&label) {
            return Err(QuizSessionError::UnknownOption { index, label });
        }
        self.question_mut(index)?
            .select(label)
            .map_err(|err| QuizSessionError::at(index, err))
    }

    /// # Errors
    ///
    /// Returns `QuizSessionError` if the quiz is completed, nothing is
    /// selected, or a check is already running for `index`.
    pub fn begin_check(&mut self, index: usize) -> Result<CheckStart, QuizSessionError> {
        if self.completed {
            return Err(QuizSessionError::AlreadyCompleted);
        }
        self.question_mut(index)?
            .begin_check()
            .map_err(|err| QuizSessionError::at(index, err))
    }

    /// # Errors
    ///
    /// Returns `QuizSessionError::AlreadyCompleted` once the quiz is finished
    /// and `QuizSessionError::NoCheckPending` if no check was started.
    pub fn finish_check(
        &mut self,
        index: usize,
        check: AnswerCheck,
    ) -> Result<(), QuizSessionError> {
        if self.completed {
            return Err(QuizSessionError::AlreadyCompleted);
        }
        self.question_mut(index)?
            .finish(check)
            .map_err(|err| QuizSessionError::at(index, err))
    }

    pub fn abort_check(&mut self, index: usize) {
        if let Some(state) = self.questions.get_mut(index) {
            state.abort();
        }
    }

    pub fn advance(&mut self) -> Advance {
        if self.is_last() {
            return Advance::AtLast;
        }
        self.current += 1;
        Advance::Moved(self.current)
    }

    pub fn retreat(&mut self) -> usize {
        self.current = self.current.saturating_sub(1);
        self.current
    }

    /// # Errors
    ///
    /// Returns `QuizSessionError::NoSuchQuestion` for an out-of-range index.
    pub fn go_to(&mut self, index: usize) -> Result<usize, QuizSessionError> {
        if index >= self.questions.len() {
            return Err(QuizSessionError::NoSuchQuestion(index));
        }
        self.current = index;
        Ok(index)
    }

    /// # Errors
    ///
    /// Returns `CompletionBlocked` while any question lacks an answer or
    /// check, or is still being checked.
    pub fn gate(&self) -> Result<(), CompletionBlocked> {
        completion_gate(&self.questions)
    }

    /// Finish the quiz once every question is answered and checked.
    ///
    /// # Errors
    ///
    /// Returns `QuizSessionError::AlreadyCompleted` on repeat calls and
    /// `QuizSessionError::Incomplete` while the gate is closed.
    pub fn complete(&mut self) -> Result<QuizSummary, QuizSessionError> {
        if self.completed {
            return Err(QuizSessionError::AlreadyCompleted);
        }
        self.gate().map_err(QuizSessionError::Incomplete)?;
        let summary = self.build_summary()?;
        self.completed = true;
        Ok(summary)
    }

    /// Summary of a completed quiz.
    #[must_use]
    pub fn summary(&self) -> Option<QuizSummary> {
        if !self.completed {
            return None;
        }
        self.build_summary().ok()
    }

    fn build_summary(&self) -> Result<QuizSummary, QuizSessionError> {
        let mut results = Vec::with_capacity(self.questions.len());
        for (index, state) in self.questions.iter().enumerate() {
            let (Some(check), Some(user_answer)) = (state.result(), state.checked_selection())
            else {
                return Err(QuizSessionError::NoSelection { index });
            };
            let topic_snippet = self
                .quiz
                .question(index)
                .map(Question::topic_snippet)
                .unwrap_or_default();
            results.push(QuestionOutcome {
                index,
                user_answer: user_answer.clone(),
                correct_answer: check.correct_answer.clone(),
                is_correct: check.is_correct,
                topic_snippet,
            });
        }
        let score = QuizScore::from_outcomes(&results)?;
        Ok(QuizSummary {
            total_questions: score.total_questions,
            correct_answers: score.correct_answers,
            results,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn quiz(n: usize) -> Arc<Quiz> {
        let questions = (0..n)
            .map(|i| {
                let options: BTreeMap<OptionLabel, String> = ["A", "B", "C", "D"]
                    .iter()
                    .map(|l| (OptionLabel::new(l).unwrap(), format!("{l} for {i}")))
                    .collect();
                Question::new(format!("Question {}", i + 1), options)
            })
            .collect();
        Arc::new(Quiz::new(questions).unwrap())
    }

    fn label(raw: &str) -> OptionLabel {
        OptionLabel::new(raw).unwrap()
    }

    fn check(session: &mut QuizSession, index: usize, user: &str, correct: &str) {
        session.select(index, label(user)).unwrap();
        let CheckStart::Started(sent) = session.begin_check(index).unwrap() else {
            panic!("expected a new check");
        };
        session
            .finish_check(index, AnswerCheck {
                is_correct: sent.as_str() == correct,
                correct_answer: correct.into(),
                user_answer: sent.to_string(),
            })
            .unwrap();
    }

    #[test]
    fn navigation_is_clamped() {
        let mut session = QuizSession::new(quiz(3));
        assert_eq!(session.retreat(), 0);
        assert_eq!(session.advance(), Advance::Moved(1));
        assert_eq!(session.advance(), Advance::Moved(2));
        assert_eq!(session.advance(), Advance::AtLast);
        assert_eq!(session.current_index(), 2);
        assert_eq!(session.go_to(0), Ok(0));
        assert_eq!(session.go_to(3), Err(QuizSessionError::NoSuchQuestion(3)));
    }

    #[test]
    fn unknown_options_are_rejected() {
        let mut session = QuizSession::new(quiz(1));
        assert_eq!(
            session.select(0, label("E")),
            Err(QuizSessionError::UnknownOption {
                index: 0,
                label: label("E")
            })
        );
    }

    #[test]
    fn gate_distinguishes_missing_answers_and_checks() {
        let mut session = QuizSession::new(quiz(3));
        check(&mut session, 0, "A", "A");
        session.select(1, label("B")).unwrap();

        let blocked = session.gate().unwrap_err();
        assert_eq!(blocked.missing_answers, vec![2]);
        assert_eq!(blocked.missing_checks, vec![1]);
        assert_eq!(
            blocked.message(),
            "Please answer question(s) 3 and check your answer for question(s) 2 before finishing the quiz"
        );

        let only_answers = CompletionBlocked {
            missing_answers: vec![0, 2],
            ..CompletionBlocked::default()
        };
        assert_eq!(
            only_answers.message(),
            "Please answer all questions before finishing the quiz. Unanswered: 1, 3"
        );
        let only_checks = CompletionBlocked {
            missing_checks: vec![1],
            ..CompletionBlocked::default()
        };
        assert_eq!(
            only_checks.message(),
            "Please check all your answers before finishing the quiz. Not checked: 2"
        );
    }

    #[test]
    fn completes_once_every_question_is_answered_and_checked() {
        let mut session = QuizSession::new(quiz(2));
        check(&mut session, 0, "A", "A");
        assert!(matches!(
            session.complete(),
            Err(QuizSessionError::Incomplete(_))
        ));
        assert!(!session.is_completed());

        check(&mut session, 1, "C", "D");
        let summary = session.complete().unwrap();
        assert_eq!(summary.total_questions, 2);
        assert_eq!(summary.correct_answers, 1);
        assert_eq!(summary.percentage(), 50);
        assert_eq!(summary.results[1].user_answer, label("C"));
        assert_eq!(summary.results[1].topic_snippet, "Question 2");
        assert!(session.is_completed());
        assert_eq!(session.summary(), Some(summary));

        assert_eq!(session.complete(), Err(QuizSessionError::AlreadyCompleted));
        assert_eq!(
            session.select(0, label("B")),
            Err(QuizSessionError::AlreadyCompleted)
        );
    }

    #[test]
    fn completion_uses_the_scored_selection() {
        let mut session = QuizSession::new(quiz(1));
        check(&mut session, 0, "B", "A");
        session.select(0, label("A")).unwrap();

        let summary = session.complete().unwrap();
        assert_eq!(summary.correct_answers, 0);
        assert_eq!(summary.results[0].user_answer, label("B"));
    }

    #[test]
    fn running_check_keeps_the_quiz_open() {
        let mut session = QuizSession::new(quiz(2));
        check(&mut session, 0, "B", "A");
        check(&mut session, 1, "A", "A");
        session.select(0, label("A")).unwrap();
        assert_eq!(
            session.begin_check(0).unwrap(),
            CheckStart::Started(label("A"))
        );

        let Err(QuizSessionError::Incomplete(blocked)) = session.complete() else {
            panic!("completion must wait for the running check");
        };
        assert_eq!(blocked.checks_pending, vec![0]);
        assert!(blocked.missing_checks.is_empty());
        assert_eq!(
            blocked.message(),
            "Please wait for the answer check on question(s) 1 to finish"
        );
        assert!(!session.is_completed());

        session
            .finish_check(0, AnswerCheck {
                is_correct: true,
                correct_answer: "A".into(),
                user_answer: "A".into(),
            })
            .unwrap();
        let summary = session.complete().unwrap();
        assert_eq!(summary.correct_answers, 2);
    }

    #[test]
    fn finished_quiz_refuses_late_results() {
        let mut session = QuizSession::new(quiz(1));
        check(&mut session, 0, "B", "A");
        let summary = session.complete().unwrap();

        let late = AnswerCheck {
            is_correct: true,
            correct_answer: "A".into(),
            user_answer: "A".into(),
        };
        assert_eq!(
            session.finish_check(0, late),
            Err(QuizSessionError::AlreadyCompleted)
        );
        assert_eq!(session.summary(), Some(summary));
    }

    #[test]
    fn gate_holds_exactly_when_all_selected_and_checked() {
        for n in 1..=4 {
            let mut session = QuizSession::new(quiz(n));
            for i in 0..n {
                assert!(session.gate().is_err());
                check(&mut session, i, "A", "B");
            }
            assert_eq!(session.answered_count(), n);
            assert_eq!(session.checked_count(), n);
            assert!(session.gate().is_ok());
        }
    }
}
