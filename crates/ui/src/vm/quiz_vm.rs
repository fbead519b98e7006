use services::quiz::{CompletionReport, Persistence, QuestionPhase, QuizSession};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionVm {
    pub label: String,
    pub text: String,
    pub selected: bool,
}

/// Backend verdict for the current question.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerdictVm {
    pub correct: bool,
    pub headline: &'static str,
    pub your_answer: String,
    pub correct_answer: String,
    /// The selection changed after this verdict was recorded.
    pub stale: bool,
}

/// One entry of the question strip above the card.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StepVm {
    pub index: usize,
    pub number: usize,
    pub class: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuestionCardVm {
    pub index: usize,
    pub position_label: String,
    pub progress_label: String,
    pub text: String,
    pub options: Vec<OptionVm>,
    pub phase: QuestionPhase,
    pub can_check: bool,
    pub checking: bool,
    pub verdict: Option<VerdictVm>,
    pub can_go_back: bool,
    pub next_label: &'static str,
    pub steps: Vec<StepVm>,
}

impl QuestionCardVm {
    #[must_use]
    pub fn from_session(session: &QuizSession) -> Option<Self> {
        let index = session.current_index();
        let question = session.current_question()?;
        let state = session.state(index)?;
        let phase = state.phase();
        let selection = state.selection();

        let options = question
            .options()
            .iter()
            .map(|(label, text)| OptionVm {
                label: label.to_string(),
                text: text.clone(),
                selected: selection == Some(label),
            })
            .collect();

        let verdict = state.result().map(|check| VerdictVm {
            correct: check.is_correct,
            headline: if check.is_correct {
                "Correct"
            } else {
                "Incorrect"
            },
            your_answer: format!("Your answer: {}", check.user_answer),
            correct_answer: format!("Correct answer: {}", check.correct_answer),
            stale: state.is_result_stale(),
        });

        let steps = session
            .phases()
            .into_iter()
            .enumerate()
            .map(|(i, phase)| {
                let state = match phase {
                    QuestionPhase::Unanswered => "step-unanswered",
                    QuestionPhase::Selected => "step-selected",
                    QuestionPhase::Checking => "step-checking",
                    QuestionPhase::Checked => "step-checked",
                };
                let current = if i == index { " step-current" } else { "" };
                StepVm {
                    index: i,
                    number: i + 1,
                    class: format!("step {state}{current}"),
                }
            })
            .collect();

        Some(Self {
            index,
            position_label: format!("Question {} of {}", index + 1, session.len()),
            progress_label: format!(
                "Answered {} of {}, checked {}",
                session.answered_count(),
                session.len(),
                session.checked_count()
            ),
            text: question.text().to_string(),
            options,
            phase,
            can_check: phase == QuestionPhase::Selected,
            checking: phase == QuestionPhase::Checking,
            verdict,
            can_go_back: index > 0,
            next_label: if session.is_last() { "Finish Quiz" } else { "Next" },
            steps,
        })
    }
}

/// What still blocks completion, or `None` when the quiz can be finished.
#[must_use]
pub fn completion_warning(session: &QuizSession) -> Option<String> {
    session.gate().err().map(|blocked| blocked.message())
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutcomeVm {
    pub number: usize,
    pub topic: String,
    pub status: &'static str,
    pub correct: bool,
    pub answers: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompletionVm {
    pub score_label: String,
    pub outcomes: Vec<OutcomeVm>,
    pub persistence: String,
    pub can_retry_save: bool,
}

impl From<&CompletionReport> for CompletionVm {
    fn from(report: &CompletionReport) -> Self {
        let summary = &report.summary;
        let outcomes = summary
            .results
            .iter()
            .map(|outcome| OutcomeVm {
                number: outcome.index + 1,
                topic: outcome.topic_snippet.clone(),
                status: if outcome.is_correct {
                    "Correct"
                } else {
                    "Incorrect"
                },
                correct: outcome.is_correct,
                answers: format!(
                    "Your answer: {}, correct answer: {}",
                    outcome.user_answer, outcome.correct_answer
                ),
            })
            .collect();

        Self {
            score_label: format!(
                "You scored {} out of {} ({}%)",
                summary.correct_answers,
                summary.total_questions,
                summary.percentage()
            ),
            outcomes,
            persistence: persistence_label(&report.persistence),
            can_retry_save: matches!(report.persistence, Persistence::Failed(_)),
        }
    }
}

#[must_use]
pub fn persistence_label(persistence: &Persistence) -> String {
    match persistence {
        Persistence::Pending => "Saving result...".to_string(),
        Persistence::Saved(_) => "Result saved to your progress".to_string(),
        Persistence::SkippedSignedOut => "Sign in to keep a record of your results".to_string(),
        Persistence::Failed(reason) => format!("Could not save result: {reason}"),
    }
}
