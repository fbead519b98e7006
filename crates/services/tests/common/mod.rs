#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use services::api::{
    Answer, ApiError, AskRequest, DocumentsInfo, Health, Source, StudyApi, UploadReceipt,
};
use services::auth::AuthContext;
use study_core::model::{
    AnswerCheck, AuthUser, DocumentFile, Email, OptionLabel, Question, Quiz, QuizError, UserId,
};

/// Scripted `StudyApi` that records every call.
#[derive(Default)]
pub struct FakeApi {
    calls: Mutex<Vec<String>>,
    quiz: Mutex<Option<Quiz>>,
    correct: Mutex<HashMap<usize, String>>,
    next_error: Mutex<Option<ApiError>>,
    health_down: Mutex<bool>,
    documents: Mutex<u32>,
    check_gate: Mutex<Option<Arc<Notify>>>,
    question_gates: Mutex<HashMap<usize, Arc<Notify>>>,
}

impl FakeApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_quiz(quiz: Quiz, correct: &[&str]) -> Arc<Self> {
        let api = Self::default();
        *api.quiz.lock().unwrap() = Some(quiz);
        *api.correct.lock().unwrap() = correct
            .iter()
            .enumerate()
            .map(|(i, c)| (i, (*c).to_string()))
            .collect();
        Arc::new(api)
    }

    pub fn set_quiz(&self, quiz: Quiz) {
        *self.quiz.lock().unwrap() = Some(quiz);
    }

    pub fn fail_next(&self, err: ApiError) {
        *self.next_error.lock().unwrap() = Some(err);
    }

    pub fn set_health_down(&self, down: bool) {
        *self.health_down.lock().unwrap() = down;
    }

    pub fn set_documents(&self, count: u32) {
        *self.documents.lock().unwrap() = count;
    }

    /// Hold `check_answer` responses until the returned `Notify` fires.
    pub fn hold_checks(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.check_gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    /// Hold `check_answer` responses for one question only.
    pub fn hold_check(&self, question_index: usize) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.question_gates
            .lock()
            .unwrap()
            .insert(question_index, Arc::clone(&gate));
        gate
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.starts_with(prefix))
            .count()
    }

    fn record(&self, call: String) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(call);
        match self.next_error.lock().unwrap().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl StudyApi for FakeApi {
    async fn health(&self) -> Result<Health, ApiError> {
        self.record("health".into())?;
        if *self.health_down.lock().unwrap() {
            return Err(ApiError::Status(503));
        }
        Ok(Health {
            status: "healthy".into(),
            documents_loaded: *self.documents.lock().unwrap(),
        })
    }

    async fn documents(&self) -> Result<DocumentsInfo, ApiError> {
        self.record("documents".into())?;
        Ok(DocumentsInfo {
            total_documents: *self.documents.lock().unwrap(),
            message: "Document count retrieved successfully".into(),
        })
    }

    async fn upload(&self, file: DocumentFile) -> Result<UploadReceipt, ApiError> {
        self.record(format!("upload:{}", file.name()))?;
        let mut documents = self.documents.lock().unwrap();
        *documents += 1;
        Ok(UploadReceipt {
            message: "Document uploaded and processed successfully".into(),
            filename: file.name().to_string(),
            chunks_processed: 12,
            total_documents: *documents,
        })
    }

    async fn ask(&self, request: AskRequest) -> Result<Answer, ApiError> {
        let user = request
            .user_id
            .as_ref()
            .map_or_else(|| "-".to_string(), ToString::to_string);
        self.record(format!("ask:{}:{}:{user}", request.query, request.top_k))?;
        Ok(Answer {
            answer: format!("**Answer** to {}", request.query),
            sources: vec![Source {
                file: "notes.pdf".into(),
                section: "Page 1".into(),
                text: "Ownership rules".into(),
                relevance_score: Some(0.82),
            }],
            total_sources: Some(1),
            query: Some(request.query),
        })
    }

    async fn generate_quiz(&self) -> Result<Quiz, ApiError> {
        self.record("generate_quiz".into())?;
        self.quiz
            .lock()
            .unwrap()
            .clone()
            .ok_or(ApiError::InvalidQuiz(QuizError::Empty))
    }

    async fn check_answer(
        &self,
        _quiz: &Quiz,
        question_index: usize,
        answer: &OptionLabel,
    ) -> Result<AnswerCheck, ApiError> {
        self.record(format!("check_answer:{question_index}:{answer}"))?;
        let gate = self
            .question_gates
            .lock()
            .unwrap()
            .get(&question_index)
            .cloned()
            .or_else(|| self.check_gate.lock().unwrap().clone());
        if let Some(gate) = gate {
            gate.notified().await;
        }
        let correct = self
            .correct
            .lock()
            .unwrap()
            .get(&question_index)
            .cloned()
            .unwrap_or_else(|| "A".into());
        Ok(AnswerCheck {
            is_correct: answer.as_str().eq_ignore_ascii_case(&correct),
            correct_answer: correct,
            user_answer: answer.to_string(),
        })
    }
}

pub fn quiz_of(n: usize) -> Quiz {
    let questions = (0..n)
        .map(|i| {
            let options: BTreeMap<OptionLabel, String> = ["A", "B", "C", "D"]
                .iter()
                .map(|l| (OptionLabel::new(l).unwrap(), format!("Choice {l}")))
                .collect();
            Question::new(format!("What does chapter {} cover?", i + 1), options)
                .with_answer_key("A")
        })
        .collect();
    Quiz::new(questions).unwrap()
}

pub fn label(raw: &str) -> OptionLabel {
    OptionLabel::new(raw).unwrap()
}

pub fn user(id: &str) -> AuthUser {
    AuthUser {
        id: UserId::new(id).unwrap(),
        email: Email::parse(&format!("{id}@example.com")).unwrap(),
    }
}

pub fn signed_in(id: &str) -> AuthContext {
    AuthContext::detached(Some(user(id)))
}

pub fn signed_out() -> AuthContext {
    AuthContext::detached(None)
}
