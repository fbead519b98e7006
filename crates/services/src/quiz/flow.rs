use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use storage::repository::{QuizResultId, QuizResultRepository};
use study_core::model::{AnswerCheck, OptionLabel, Quiz, QuizResult, UserId};

use super::question_state::CheckStart;
use super::session::{Advance, QuizSession, QuizSessionError, QuizSummary};
use crate::Clock;
use crate::api::StudyApi;
use crate::auth::AuthContext;
use crate::cancel::RequestScope;
use crate::error::QuizFlowError;
use crate::inflight::InFlight;
use crate::notice::Notice;

/// Top-level lifecycle of the quiz screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuizPhase {
    NoQuiz,
    Generating,
    InProgress,
    Completed,
}

/// Where the completed quiz's result went.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Persistence {
    Pending,
    Saved(QuizResultId),
    SkippedSignedOut,
    Failed(String),
}

/// Outcome of completing a quiz.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionReport {
    pub summary: QuizSummary,
    pub persistence: Persistence,
    pub notice: Notice,
}

/// Result of pressing "next".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Moved(usize),
    Completed(CompletionReport),
}

/// Result of starting a check.
#[derive(Debug)]
pub enum CheckTicket {
    /// The selection was already scored.
    Recorded(AnswerCheck),
    Pending(PendingCheck),
}

/// A check that has been started but not sent.
#[derive(Debug)]
#[must_use = "a started check stays in progress until it is finished"]
pub struct PendingCheck {
    quiz: Arc<Quiz>,
    index: usize,
    label: OptionLabel,
    epoch: u64,
}

impl PendingCheck {
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }
}

/// Copy of the flow state for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSnapshot {
    pub phase: QuizPhase,
    pub session: Option<QuizSession>,
    pub report: Option<CompletionReport>,
}

struct FlowState {
    phase: QuizPhase,
    session: Option<QuizSession>,
    report: Option<CompletionReport>,
    // Bumped whenever the session is replaced or dropped; late responses
    // from an older epoch are discarded.
    epoch: u64,
}

/// Drives generate, select, check, navigate and complete over the API and
/// the result store.
pub struct QuizFlow {
    api: Arc<dyn StudyApi>,
    results: Arc<dyn QuizResultRepository>,
    auth: AuthContext,
    clock: Clock,
    generating: InFlight,
    scope: RequestScope,
    state: Mutex<FlowState>,
}

/// Puts the phase back if generation does not finish.
struct PhaseRestore<'a> {
    flow: &'a QuizFlow,
    prior: QuizPhase,
    armed: bool,
}

impl Drop for PhaseRestore<'_> {
    fn drop(&mut self) {
        if self.armed {
            let mut state = self.flow.lock();
            if state.phase == QuizPhase::Generating {
                state.phase = self.prior;
            }
        }
    }
}

impl QuizFlow {
    #[must_use]
    pub fn new(
        api: Arc<dyn StudyApi>,
        results: Arc<dyn QuizResultRepository>,
        auth: AuthContext,
        generating: InFlight,
        clock: Clock,
    ) -> Self {
        Self {
            api,
            results,
            auth,
            clock,
            generating,
            scope: RequestScope::new(),
            state: Mutex::new(FlowState {
                phase: QuizPhase::NoQuiz,
                session: None,
                report: None,
                epoch: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FlowState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn phase(&self) -> QuizPhase {
        self.lock().phase
    }

    #[must_use]
    pub fn snapshot(&self) -> QuizSnapshot {
        let state = self.lock();
        QuizSnapshot {
            phase: state.phase,
            session: state.session.clone(),
            report: state.report.clone(),
        }
    }

    /// Request a new quiz.
    ///
    /// Allowed from `NoQuiz` and `Completed`. On failure the previous phase
    /// and session are kept.
    ///
    /// # Errors
    ///
    /// Returns `QuizFlowError::QuizInProgress` while a quiz is being taken,
    /// `QuizFlowError::Busy` while another generation runs, and
    /// `QuizFlowError::Api` or `QuizFlowError::Cancelled` when the request
    /// does not produce a quiz.
    pub async fn generate(&self) -> Result<QuizSnapshot, QuizFlowError> {
        let _guard = self.generating.try_begin().ok_or(QuizFlowError::Busy)?;
        let prior = {
            let mut state = self.lock();
            match state.phase {
                QuizPhase::InProgress => return Err(QuizFlowError::QuizInProgress),
                QuizPhase::Generating => return Err(QuizFlowError::Busy),
                QuizPhase::NoQuiz | QuizPhase::Completed => {}
            }
            let prior = state.phase;
            state.phase = QuizPhase::Generating;
            prior
        };
        let mut restore = PhaseRestore {
            flow: self,
            prior,
            armed: true,
        };

        let token = self.scope.begin();
        info!("generating quiz");
        let quiz = match token.run(self.api.generate_quiz()).await {
            None => return Err(QuizFlowError::Cancelled),
            Some(Err(err)) => {
                warn!(error = %err, "quiz generation failed");
                return Err(err.into());
            }
            Some(Ok(quiz)) => quiz,
        };

        info!(questions = quiz.len(), "quiz ready");
        restore.armed = false;
        let mut state = self.lock();
        state.epoch += 1;
        state.session = Some(QuizSession::new(Arc::new(quiz)));
        state.report = None;
        state.phase = QuizPhase::InProgress;
        Ok(QuizSnapshot {
            phase: state.phase,
            session: state.session.clone(),
            report: None,
        })
    }

    /// Drop the current quiz and suppress its outstanding requests.
    pub fn abandon(&self) {
        self.scope.close();
        let mut state = self.lock();
        if state.phase == QuizPhase::Generating {
            return;
        }
        state.epoch += 1;
        state.session = None;
        state.report = None;
        state.phase = QuizPhase::NoQuiz;
        debug!("quiz abandoned");
    }

    /// # Errors
    ///
    /// Returns `QuizFlowError::NoQuiz` without a quiz, or the session's
    /// refusal (completed quiz, unknown option, check running).
    pub fn select_answer(&self, index: usize, label: OptionLabel) -> Result<(), QuizFlowError> {
        let mut state = self.lock();
        let session = state.session.as_mut().ok_or(QuizFlowError::NoQuiz)?;
        session.select(index, label)?;
        Ok(())
    }

    /// Score the selected answer for `index`.
    ///
    /// A selection that was already scored returns the stored result
    /// without a request. Checks for different questions run independently.
    ///
    /// # Errors
    ///
    /// See [`QuizFlow::start_check`] and [`QuizFlow::finish_check`].
    pub async fn check_answer(&self, index: usize) -> Result<AnswerCheck, QuizFlowError> {
        match self.start_check(index)? {
            CheckTicket::Recorded(check) => Ok(check),
            CheckTicket::Pending(pending) => self.finish_check(pending).await,
        }
    }

    /// Mark `index` as being checked without waiting for the backend.
    ///
    /// The question is in `QuestionPhase::Checking` when this returns; the
    /// pending check must then be handed to [`QuizFlow::finish_check`].
    ///
    /// # Errors
    ///
    /// Returns `QuizFlowError::NoQuiz` without a quiz and
    /// `QuizFlowError::Session` when nothing is selected, the quiz is
    /// completed, or a check for `index` is already running.
    pub fn start_check(&self, index: usize) -> Result<CheckTicket, QuizFlowError> {
        let mut state = self.lock();
        let epoch = state.epoch;
        let session = state.session.as_mut().ok_or(QuizFlowError::NoQuiz)?;
        Ok(match session.begin_check(index)? {
            CheckStart::Recorded(check) => CheckTicket::Recorded(check),
            CheckStart::Started(label) => CheckTicket::Pending(PendingCheck {
                quiz: Arc::clone(session.quiz()),
                index,
                label,
                epoch,
            }),
        })
    }

    /// Send a started check and store its result.
    ///
    /// # Errors
    ///
    /// Returns `QuizFlowError::Stale` if the quiz was replaced or finished
    /// meanwhile, and `QuizFlowError::Api` / `QuizFlowError::Cancelled` on
    /// request failure (the question returns to its selected state).
    pub async fn finish_check(&self, pending: PendingCheck) -> Result<AnswerCheck, QuizFlowError> {
        let PendingCheck {
            quiz,
            index,
            label,
            epoch,
        } = pending;

        debug!(index, "checking answer");
        let token = self.scope.token();
        let outcome = token
            .run(self.api.check_answer(&quiz, index, &label))
            .await;

        let mut state = self.lock();
        if state.epoch != epoch {
            return Err(QuizFlowError::Stale);
        }
        let session = state.session.as_mut().ok_or(QuizFlowError::Stale)?;
        match outcome {
            None => {
                session.abort_check(index);
                Err(QuizFlowError::Cancelled)
            }
            Some(Err(err)) => {
                warn!(index, error = %err, "answer check failed");
                session.abort_check(index);
                Err(err.into())
            }
            Some(Ok(check)) => match session.finish_check(index, check.clone()) {
                Ok(()) => Ok(check),
                Err(QuizSessionError::AlreadyCompleted) => {
                    debug!(index, "check returned after completion; ignored");
                    session.abort_check(index);
                    Err(QuizFlowError::Stale)
                }
                Err(err) => Err(err.into()),
            },
        }
    }

    /// Move to the next question; on the last one this completes the quiz.
    ///
    /// # Errors
    ///
    /// Returns `QuizFlowError::NoQuiz` without a quiz, or the completion
    /// error when finishing is not yet possible.
    pub async fn advance(&self) -> Result<Navigation, QuizFlowError> {
        let step = {
            let mut state = self.lock();
            let session = state.session.as_mut().ok_or(QuizFlowError::NoQuiz)?;
            session.advance()
        };
        match step {
            Advance::Moved(index) => Ok(Navigation::Moved(index)),
            Advance::AtLast => self.complete().await.map(Navigation::Completed),
        }
    }

    /// # Errors
    ///
    /// Returns `QuizFlowError::NoQuiz` without a quiz.
    pub fn retreat(&self) -> Result<usize, QuizFlowError> {
        let mut state = self.lock();
        let session = state.session.as_mut().ok_or(QuizFlowError::NoQuiz)?;
        Ok(session.retreat())
    }

    /// # Errors
    ///
    /// Returns `QuizFlowError::NoQuiz` without a quiz, or
    /// `QuizFlowError::Session` for an out-of-range index.
    pub fn go_to(&self, index: usize) -> Result<usize, QuizFlowError> {
        let mut state = self.lock();
        let session = state.session.as_mut().ok_or(QuizFlowError::NoQuiz)?;
        Ok(session.go_to(index)?)
    }

    /// Finish the quiz and persist its result for the signed-in user.
    ///
    /// Repeat calls return the first report and never write again. Without
    /// a signed-in user the quiz still completes but nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns `QuizFlowError::NoQuiz` without a quiz and
    /// `QuizFlowError::Session` while the completion gate is closed. A
    /// failed write is reported through `Persistence::Failed`, not as an error.
    pub async fn complete(&self) -> Result<CompletionReport, QuizFlowError> {
        let (summary, user, epoch) = {
            let mut state = self.lock();
            if state.phase == QuizPhase::Completed {
                if let Some(report) = &state.report {
                    return Ok(report.clone());
                }
            }
            let epoch = state.epoch;
            let session = state.session.as_mut().ok_or(QuizFlowError::NoQuiz)?;
            let summary = session.complete()?;
            state.phase = QuizPhase::Completed;
            info!(
                total = summary.total_questions,
                correct = summary.correct_answers,
                "quiz completed"
            );

            let Some(user) = self.auth.user_id() else {
                warn!("quiz completed while signed out; result not saved");
                let report = CompletionReport {
                    notice: Notice::warning(format!(
                        "Quiz completed: {}/{} correct. Sign in to save your results.",
                        summary.correct_answers, summary.total_questions
                    )),
                    summary,
                    persistence: Persistence::SkippedSignedOut,
                };
                state.report = Some(report.clone());
                return Ok(report);
            };

            state.report = Some(CompletionReport {
                summary: summary.clone(),
                persistence: Persistence::Pending,
                notice: Notice::info("Saving your result..."),
            });
            (summary, user, epoch)
        };
        Ok(self.persist(summary, user, epoch).await)
    }

    /// Try again to store a result whose first write failed.
    ///
    /// # Errors
    ///
    /// Returns `QuizFlowError::NoQuiz` if there is no completed quiz.
    pub async fn retry_persist(&self) -> Result<CompletionReport, QuizFlowError> {
        let (summary, user, epoch) = {
            let mut state = self.lock();
            let epoch = state.epoch;
            let signed_in = self.auth.user_id();
            let report = state.report.as_mut().ok_or(QuizFlowError::NoQuiz)?;
            if !matches!(report.persistence, Persistence::Failed(_)) {
                return Ok(report.clone());
            }
            let Some(user) = signed_in else {
                report.persistence = Persistence::SkippedSignedOut;
                report.notice = Notice::warning("Sign in to save your results.");
                return Ok(report.clone());
            };
            report.persistence = Persistence::Pending;
            (report.summary.clone(), user, epoch)
        };
        Ok(self.persist(summary, user, epoch).await)
    }

    async fn persist(&self, summary: QuizSummary, user: UserId, epoch: u64) -> CompletionReport {
        let written = match QuizResult::from_outcomes(
            user.clone(),
            self.clock.now(),
            summary.results.clone(),
        ) {
            Ok(result) => self
                .results
                .append_result(&result)
                .await
                .map_err(|err| err.to_string()),
            Err(err) => Err(err.to_string()),
        };

        let (persistence, notice) = match written {
            Ok(id) => {
                info!(user_id = %user, result_id = id, "quiz result saved");
                (
                    Persistence::Saved(id),
                    Notice::success(format!(
                        "Quiz completed! You scored {}/{} ({}%). Your result has been saved.",
                        summary.correct_answers,
                        summary.total_questions,
                        summary.percentage()
                    )),
                )
            }
            Err(reason) => {
                warn!(user_id = %user, error = %reason, "saving quiz result failed");
                (
                    Persistence::Failed(reason.clone()),
                    Notice::failure(format!(
                        "Quiz completed, but the result could not be saved: {reason}"
                    )),
                )
            }
        };

        let report = CompletionReport {
            summary,
            persistence,
            notice,
        };
        let mut state = self.lock();
        if state.epoch == epoch {
            state.report = Some(report.clone());
        }
        report
    }

    /// Suppress outstanding generate and check requests on teardown.
    pub fn close(&self) {
        self.scope.close();
    }
}
