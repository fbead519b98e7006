//! Quiz taking: per-question state, the session aggregate, and the flow
//! that talks to the API and the result store.

mod flow;
mod question_state;
mod session;

pub use flow::{
    CheckTicket, CompletionReport, Navigation, Persistence, PendingCheck, QuizFlow, QuizPhase,
    QuizSnapshot,
};
pub use question_state::{CheckStart, QuestionPhase, QuestionState};
pub use session::{
    Advance, CompletionBlocked, QuizSession, QuizSessionError, QuizSummary, completion_gate,
};
