mod document;
mod ids;
mod question;
mod quiz_result;
mod user;

pub use document::{ALLOWED_EXTENSIONS, DocumentError, DocumentFile, DocumentKind};
pub use ids::{ParseIdError, UserId};
pub use question::{OptionLabel, Question, Quiz, QuizError};
pub use quiz_result::{AnswerCheck, QuestionOutcome, QuizResult, QuizResultError, QuizScore};
pub use user::{AuthUser, Email};
