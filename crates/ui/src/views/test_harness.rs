use std::collections::BTreeMap;
use std::sync::Arc;

use dioxus::core::NoOpMutations;
use dioxus::prelude::*;
use dioxus_router::{Routable, Router};
use services::api::{Answer, ApiError, AskRequest, DocumentsInfo, Health, Source, UploadReceipt};
use services::auth::AuthContext;
use services::config::DEFAULT_API_URL;
use services::{ApiConfig, AppServices, Clock, InMemoryAuthProvider, StudyApi};
use storage::repository::Storage;
use study_core::model::{
    AnswerCheck, AuthUser, DocumentFile, Email, OptionLabel, Question, Quiz, UserId,
};
use study_core::time::fixed_now;

use crate::context::{AppContext, build_app_context};
use crate::views::{AskView, HomeView, LoginView, ProgressView, QuizView, UploadView};

/// Canned backend: three documents, a one-question quiz whose key is "A".
pub struct StubApi {
    online: bool,
}

impl StubApi {
    fn unreachable() -> ApiError {
        ApiError::Unreachable {
            base_url: DEFAULT_API_URL.into(),
            reason: "connection refused".into(),
        }
    }

    fn online(&self) -> Result<(), ApiError> {
        if self.online {
            Ok(())
        } else {
            Err(Self::unreachable())
        }
    }
}

#[async_trait::async_trait]
impl StudyApi for StubApi {
    async fn health(&self) -> Result<Health, ApiError> {
        self.online()?;
        Ok(Health {
            status: "healthy".into(),
            documents_loaded: 3,
        })
    }

    async fn documents(&self) -> Result<DocumentsInfo, ApiError> {
        self.online()?;
        Ok(DocumentsInfo {
            total_documents: 3,
            message: "Document count retrieved successfully".into(),
        })
    }

    async fn upload(&self, file: DocumentFile) -> Result<UploadReceipt, ApiError> {
        self.online()?;
        Ok(UploadReceipt {
            message: "Document uploaded and processed successfully".into(),
            filename: file.name().to_string(),
            chunks_processed: 4,
            total_documents: 4,
        })
    }

    async fn ask(&self, request: AskRequest) -> Result<Answer, ApiError> {
        self.online()?;
        Ok(Answer {
            answer: format!("**{}** means one owner per value.", request.query),
            sources: vec![Source {
                file: "rust-book.pdf".into(),
                section: "Page 4".into(),
                text: "Each value in Rust has an owner.".into(),
                relevance_score: Some(0.82),
            }],
            total_sources: Some(1),
            query: Some(request.query),
        })
    }

    async fn generate_quiz(&self) -> Result<Quiz, ApiError> {
        self.online()?;
        let options: BTreeMap<OptionLabel, String> = [("A", "One owner"), ("B", "Two owners")]
            .into_iter()
            .map(|(label, text)| (OptionLabel::new(label).unwrap(), text.to_string()))
            .collect();
        Ok(Quiz::new(vec![Question::new("How many owners can a value have?", options)]).unwrap())
    }

    async fn check_answer(
        &self,
        _quiz: &Quiz,
        _question_index: usize,
        answer: &OptionLabel,
    ) -> Result<AnswerCheck, ApiError> {
        self.online()?;
        Ok(AnswerCheck {
            is_correct: answer.as_str() == "A",
            correct_answer: "A".into(),
            user_answer: answer.to_string(),
        })
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Home,
    Upload,
    Ask,
    Quiz,
    Progress,
    Login,
}

#[derive(Props, Clone)]
struct ViewHarnessProps {
    context: AppContext,
    view: ViewKind,
}

impl PartialEq for ViewHarnessProps {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

#[component]
fn ViewRouterHarness(props: ViewHarnessProps) -> Element {
    use_context_provider(|| props.context.clone());
    use_context_provider(|| props.view);
    rsx! { Router::<TestRoute> {} }
}

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum TestRoute {
    #[route("/")]
    Root {},
}

#[component]
fn Root() -> Element {
    let view = use_context::<ViewKind>();
    match view {
        ViewKind::Home => rsx! { HomeView {} },
        ViewKind::Upload => rsx! { UploadView {} },
        ViewKind::Ask => rsx! { AskView {} },
        ViewKind::Quiz => rsx! { QuizView {} },
        ViewKind::Progress => rsx! { ProgressView {} },
        ViewKind::Login => rsx! { LoginView {} },
    }
}

pub struct ViewHarness {
    pub dom: VirtualDom,
    pub services: AppServices,
    pub storage: Storage,
}

impl ViewHarness {
    pub fn rebuild(&mut self) {
        self.dom.rebuild_in_place();
        drive_dom(&mut self.dom);
    }

    pub async fn drive_async(&mut self) {
        for _ in 0..3 {
            let _ = tokio::time::timeout(
                std::time::Duration::from_millis(50),
                self.dom.wait_for_work(),
            )
            .await;
            self.dom.render_immediate(&mut NoOpMutations);
            self.dom.process_events();
        }
    }

    pub fn render(&self) -> String {
        dioxus_ssr::render(&self.dom)
    }
}

pub fn drive_dom(dom: &mut VirtualDom) {
    dom.process_events();
    dom.render_immediate(&mut NoOpMutations);
    dom.process_events();
}

pub fn test_user(id: &str) -> AuthUser {
    AuthUser {
        id: UserId::new(id).unwrap(),
        email: Email::parse(&format!("{id}@example.com")).unwrap(),
    }
}

/// Services over `StubApi` and in-memory storage; the DOM is built lazily
/// so tests can drive the flows first.
pub fn setup_services(user: Option<AuthUser>, online: bool) -> (AppServices, Storage) {
    let storage = Storage::in_memory();
    let services = AppServices::assemble(
        ApiConfig::new(DEFAULT_API_URL).unwrap(),
        Arc::new(StubApi { online }),
        storage.clone(),
        Arc::new(InMemoryAuthProvider::new()),
        AuthContext::detached(user),
        Clock::fixed(fixed_now()),
    );
    (services, storage)
}

pub fn mount(view: ViewKind, services: AppServices, storage: Storage) -> ViewHarness {
    let dom = VirtualDom::new_with_props(
        ViewRouterHarness,
        ViewHarnessProps {
            context: build_app_context(services.clone()),
            view,
        },
    );
    ViewHarness {
        dom,
        services,
        storage,
    }
}

pub fn setup_view_harness(view: ViewKind, user: Option<AuthUser>) -> ViewHarness {
    let (services, storage) = setup_services(user, true);
    mount(view, services, storage)
}
