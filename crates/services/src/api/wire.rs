use serde::Deserialize;
use serde_json::Value;

use study_core::model::{Question, Quiz, QuizError};

#[derive(Debug, Deserialize)]
pub(crate) struct GeneratedQuiz {
    #[serde(default)]
    questions: Vec<Question>,
}

impl GeneratedQuiz {
    pub(crate) fn into_quiz(self) -> Result<Quiz, QuizError> {
        Quiz::new(self.questions)
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Value,
}

/// Pull a human-readable message out of an error body.
///
/// `detail` is usually a string; validation errors carry a list of
/// `{loc, msg, type}` objects instead.
pub(crate) fn error_detail(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    let detail = match parsed.detail {
        Value::String(text) => text,
        Value::Array(items) => items
            .iter()
            .filter_map(|item| item.get("msg").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join("; "),
        Value::Null => String::new(),
        other => other.to_string(),
    };
    let detail = detail.trim();
    (!detail.is_empty()).then(|| detail.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_detail_is_returned_verbatim() {
        assert_eq!(
            error_detail(r#"{"detail":"No documents uploaded. Please upload documents first."}"#)
                .as_deref(),
            Some("No documents uploaded. Please upload documents first.")
        );
    }

    #[test]
    fn validation_detail_list_is_joined() {
        let body = r#"{"detail":[{"loc":["body","query"],"msg":"field required","type":"missing"},{"msg":"bad top_k"}]}"#;
        assert_eq!(
            error_detail(body).as_deref(),
            Some("field required; bad top_k")
        );
    }

    #[test]
    fn missing_or_blank_detail_is_none() {
        assert_eq!(error_detail("Internal Server Error"), None);
        assert_eq!(error_detail(r#"{"detail":"  "}"#), None);
        assert_eq!(error_detail(r#"{"error":"x"}"#), None);
    }

    #[test]
    fn generated_quiz_keeps_answer_keys() {
        let json = r#"{"questions":[{"question":"Q?","options":{"A":"x","B":"y"},"correct_answer":"A"}],"total_questions":1}"#;
        let quiz = serde_json::from_str::<GeneratedQuiz>(json)
            .unwrap()
            .into_quiz()
            .unwrap();
        assert_eq!(quiz.len(), 1);
        let payload = serde_json::to_value(&quiz).unwrap();
        assert_eq!(payload["questions"][0]["correct_answer"], "A");
    }

    #[test]
    fn empty_generated_quiz_is_rejected() {
        let parsed: GeneratedQuiz = serde_json::from_str(r#"{"questions":[]}"#).unwrap();
        assert_eq!(parsed.into_quiz().unwrap_err(), QuizError::Empty);
    }
}
