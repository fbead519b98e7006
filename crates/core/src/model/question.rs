use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("quiz has no questions")]
    Empty,

    #[error("question {index} has no text")]
    EmptyQuestion { index: usize },

    #[error("question {index} has no options")]
    NoOptions { index: usize },

    #[error("option label cannot be empty")]
    EmptyLabel,
}

//
// ─── OPTION LABEL ─────────────────────────────────────────────────────────────
//

/// Label of a multiple-choice option ("A", "B", ...).
///
/// Labels are trimmed and upper-cased so that `"b"` and `"B"` refer to the
/// same option.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OptionLabel(String);

impl OptionLabel {
    /// # Errors
    ///
    /// Returns `QuizError::EmptyLabel` if the label is blank.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, QuizError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(QuizError::EmptyLabel);
        }
        Ok(Self(trimmed.to_uppercase()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for OptionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OptionLabel({})", self.0)
    }
}

impl fmt::Display for OptionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for OptionLabel {
    type Error = QuizError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<OptionLabel> for String {
    fn from(value: OptionLabel) -> Self {
        value.0
    }
}

//
// ─── QUESTION ─────────────────────────────────────────────────────────────────
//

/// A single multiple-choice question as generated by the backend.
///
/// `answer_key` is opaque to the client. It is never shown, only sent back
/// verbatim with the quiz payload so the backend can score answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    #[serde(rename = "question")]
    text: String,
    options: BTreeMap<OptionLabel, String>,
    #[serde(
        rename = "correct_answer",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    answer_key: Option<String>,
}

impl Question {
    #[must_use]
    pub fn new(text: impl Into<String>, options: BTreeMap<OptionLabel, String>) -> Self {
        Self {
            text: text.into(),
            options,
            answer_key: None,
        }
    }

    #[must_use]
    pub fn with_answer_key(mut self, key: impl Into<String>) -> Self {
        self.answer_key = Some(key.into());
        self
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn options(&self) -> &BTreeMap<OptionLabel, String> {
        &self.options
    }

    #[must_use]
    pub fn has_option(&self, label: &OptionLabel) -> bool {
        self.options.contains_key(label)
    }

    /// Short excerpt of the question used to label history rows.
    #[must_use]
    pub fn topic_snippet(&self) -> String {
        const MAX_CHARS: usize = 80;
        let text = self.text.trim();
        if text.chars().count() <= MAX_CHARS {
            return text.to_string();
        }
        let mut out: String = text.chars().take(MAX_CHARS).collect();
        out.push('…');
        out
    }
}

//
// ─── QUIZ ─────────────────────────────────────────────────────────────────────
//

/// An ordered, immutable set of questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Quiz {
    questions: Vec<Question>,
}

impl Quiz {
    /// # Errors
    ///
    /// Returns `QuizError` if there are no questions, or a question has
    /// no text or no options.
    pub fn new(questions: Vec<Question>) -> Result<Self, QuizError> {
        if questions.is_empty() {
            return Err(QuizError::Empty);
        }
        for (index, question) in questions.iter().enumerate() {
            if question.text.trim().is_empty() {
                return Err(QuizError::EmptyQuestion { index });
            }
            if question.options.is_empty() {
                return Err(QuizError::NoOptions { index });
            }
        }
        Ok(Self { questions })
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn question(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Always false for a constructed quiz; provided for API symmetry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn last_index(&self) -> usize {
        self.questions.len().saturating_sub(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(labels: &[&str]) -> BTreeMap<OptionLabel, String> {
        labels
            .iter()
            .map(|l| (OptionLabel::new(l).unwrap(), format!("Option {l}")))
            .collect()
    }

    #[test]
    fn labels_are_normalized() {
        assert_eq!(OptionLabel::new(" b ").unwrap().as_str(), "B");
        assert_eq!(OptionLabel::new("").unwrap_err(), QuizError::EmptyLabel);
    }

    #[test]
    fn quiz_rejects_empty_and_malformed_questions() {
        assert_eq!(Quiz::new(Vec::new()).unwrap_err(), QuizError::Empty);

        let blank = Question::new("  ", options(&["A"]));
        assert_eq!(
            Quiz::new(vec![blank]).unwrap_err(),
            QuizError::EmptyQuestion { index: 0 }
        );

        let ok = Question::new("Q1", options(&["A", "B"]));
        let no_opts = Question::new("Q2", BTreeMap::new());
        assert_eq!(
            Quiz::new(vec![ok, no_opts]).unwrap_err(),
            QuizError::NoOptions { index: 1 }
        );
    }

    #[test]
    fn question_parses_backend_shape_and_keeps_answer_key() {
        let json = r#"{"question":"What is 2+2?","options":{"A":"3","b":"4"},"correct_answer":"B"}"#;
        let q: Question = serde_json::from_str(json).unwrap();
        assert_eq!(q.text(), "What is 2+2?");
        assert!(q.has_option(&OptionLabel::new("B").unwrap()));

        let back = serde_json::to_value(&q).unwrap();
        assert_eq!(back["correct_answer"], "B");
        assert_eq!(back["options"]["B"], "4");
    }

    #[test]
    fn topic_snippet_truncates_long_text() {
        let long = "x".repeat(120);
        let q = Question::new(long, options(&["A"]));
        let snippet = q.topic_snippet();
        assert_eq!(snippet.chars().count(), 81);
        assert!(snippet.ends_with('…'));

        let short = Question::new("Short?", options(&["A"]));
        assert_eq!(short.topic_snippet(), "Short?");
    }
}
