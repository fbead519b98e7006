use study_core::model::{AnswerCheck, OptionLabel};

/// Where a single question stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuestionPhase {
    Unanswered,
    Selected,
    Checking,
    Checked,
}

/// Outcome of asking to check a question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStart {
    /// The current selection was already scored; this is the stored result.
    Recorded(AnswerCheck),
    /// A check must be sent for this selection.
    Started(OptionLabel),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum QuestionStateError {
    CheckInProgress,
    NoSelection,
    NoCheckPending,
}

/// Answer and scoring state of one question.
///
/// A stored result is only replaced by a later check; changing the
/// selection afterwards leaves it as is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionState {
    selection: Option<OptionLabel>,
    result: Option<AnswerCheck>,
    checked_selection: Option<OptionLabel>,
    checking: Option<OptionLabel>,
}

impl QuestionState {
    #[must_use]
    pub fn phase(&self) -> QuestionPhase {
        if self.checking.is_some() {
            QuestionPhase::Checking
        } else if self.result.is_some() && self.selection == self.checked_selection {
            QuestionPhase::Checked
        } else if self.selection.is_some() {
            QuestionPhase::Selected
        } else {
            QuestionPhase::Unanswered
        }
    }

    #[must_use]
    pub fn selection(&self) -> Option<&OptionLabel> {
        self.selection.as_ref()
    }

    #[must_use]
    pub fn result(&self) -> Option<&AnswerCheck> {
        self.result.as_ref()
    }

    /// The selection the stored result was computed for.
    #[must_use]
    pub fn checked_selection(&self) -> Option<&OptionLabel> {
        self.checked_selection.as_ref()
    }

    #[must_use]
    pub fn has_selection(&self) -> bool {
        self.selection.is_some()
    }

    #[must_use]
    pub fn has_result(&self) -> bool {
        self.result.is_some()
    }

    /// True when the selection differs from the one that was scored.
    #[must_use]
    pub fn is_result_stale(&self) -> bool {
        self.result.is_some() && self.selection != self.checked_selection
    }

    pub(crate) fn select(&mut self, label: OptionLabel) -> Result<(), QuestionStateError> {
        if self.checking.is_some() {
            return Err(QuestionStateError::CheckInProgress);
        }
        self.selection = Some(label);
        Ok(())
    }

    pub(crate) fn begin_check(&mut self) -> Result<CheckStart, QuestionStateError> {
        if self.checking.is_some() {
            return Err(QuestionStateError::CheckInProgress);
        }
        let label = self
            .selection
            .clone()
            .ok_or(QuestionStateError::NoSelection)?;
        if let Some(result) = &self.result {
            if self.checked_selection.as_ref() == Some(&label) {
                return Ok(CheckStart::Recorded(result.clone()));
            }
        }
        self.checking = Some(label.clone());
        Ok(CheckStart::Started(label))
    }

    pub(crate) fn finish(&mut self, check: AnswerCheck) -> Result<(), QuestionStateError> {
        let label = self
            .checking
            .take()
            .ok_or(QuestionStateError::NoCheckPending)?;
        self.checked_selection = Some(label);
        self.result = Some(check);
        Ok(())
    }

    pub(crate) fn abort(&mut self) {
        self.checking = None;
    }
}
