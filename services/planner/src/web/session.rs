//! services/planner/src/web/session.rs
//!
//! The session controller: the single credential slot, the user-selected locale and
//! the result panel state, plus the operations that move them.
//!
//! There is exactly one session per process. Every mutation goes through the inner
//! mutex, and no lock is held across a call to the generation service. Writes to the
//! credential store are serialized by a second mutex, always taken before the inner one.

use std::sync::Arc;

use lesson_planner_core::{
    layout_document, render_state,
    ports::{CredentialStore, DocumentWriter, GenerationService, PortError},
    Label, LessonPlan, LessonPlanInput, Locale, ReferenceFile, RenderState,
};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

//=========================================================================================
// State Types
//=========================================================================================

/// What the result panel currently shows.
#[derive(Debug, Clone, PartialEq)]
pub enum View {
    /// No generation attempted since login or the last reset.
    Empty,
    /// A generation is in flight.
    Loading,
    /// The last generation failed with this user-facing message.
    Failed(String),
    Ready(Arc<Vec<LessonPlan>>),
}

#[derive(Debug)]
struct SessionInner {
    api_key: Option<String>,
    locale: Locale,
    view: View,
    login_error: Option<Label>,
    /// Bumped whenever the credential changes. A generation started under an older
    /// epoch is discarded when it settles.
    epoch: u64,
}

impl SessionInner {
    fn start_over(&mut self) {
        self.epoch += 1;
        self.view = View::Empty;
    }
}

/// A point-in-time copy of the session, safe to serialize.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub authenticated: bool,
    pub locale: Locale,
    pub login_error: Option<Label>,
    pub view: View,
}

/// A finished export, ready to be sent as a download.
#[derive(Debug, Clone)]
pub struct ExportedDocument {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("No active credential")]
    NotAuthenticated,
    #[error("A generation is already in progress")]
    Busy,
    #[error("The session changed while the generation was in flight")]
    Discarded,
    #[error("There are no lesson plans to export")]
    NothingToExport,
    #[error(transparent)]
    Port(#[from] PortError),
}

//=========================================================================================
// The Controller
//=========================================================================================

#[derive(Clone)]
pub struct SessionController {
    generator: Arc<dyn GenerationService>,
    store: Arc<dyn CredentialStore>,
    writer: Arc<dyn DocumentWriter>,
    inner: Arc<Mutex<SessionInner>>,
    /// Held across a store write and the matching in-memory credential change.
    persist: Arc<Mutex<()>>,
}

impl SessionController {
    pub fn new(
        generator: Arc<dyn GenerationService>,
        store: Arc<dyn CredentialStore>,
        writer: Arc<dyn DocumentWriter>,
        locale: Locale,
    ) -> Self {
        Self {
            generator,
            store,
            writer,
            inner: Arc::new(Mutex::new(SessionInner {
                api_key: None,
                locale,
                view: View::Empty,
                login_error: None,
                epoch: 0,
            })),
            persist: Arc::new(Mutex::new(())),
        }
    }

    /// Restores a persisted credential, if any. Returns whether the session starts
    /// authenticated. An unreadable store is logged and treated as empty.
    pub async fn initialize(&self) -> bool {
        let stored = match self.store.load().await {
            Ok(stored) => stored,
            Err(e) => {
                warn!("Could not read the stored credential: {}", e);
                None
            }
        };

        let mut inner = self.inner.lock().await;
        inner.api_key = stored;
        inner.start_over();
        inner.api_key.is_some()
    }

    /// Checks a candidate key against the generation service. Fails closed.
    pub async fn validate(&self, candidate: &str) -> bool {
        self.generator.validate_credential(candidate).await
    }

    /// Validates, persists and then activates `candidate`. A rejected key leaves the
    /// stored credential untouched.
    pub async fn authenticate(&self, candidate: &str) -> Result<(), SessionError> {
        let key = candidate.trim();
        if key.is_empty() {
            let mut inner = self.inner.lock().await;
            inner.login_error = Some(Label::ApiKeyRequired);
            return Err(PortError::ValidationFailed(
                inner.locale.text(Label::ApiKeyRequired).to_string(),
            )
            .into());
        }

        if !self.validate(key).await {
            info!("Login rejected: the API key was not accepted");
            self.inner.lock().await.login_error = Some(Label::ApiKeyInvalid);
            return Err(PortError::CredentialInvalid.into());
        }

        let _persist = self.persist.lock().await;
        self.store.save(key).await?;

        let mut inner = self.inner.lock().await;
        inner.api_key = Some(key.to_string());
        inner.login_error = None;
        inner.start_over();
        info!("Login succeeded");
        Ok(())
    }

    /// Full session reset: credential, stored copy, plans and errors.
    pub async fn deauthenticate(&self) -> Result<(), SessionError> {
        let _persist = self.persist.lock().await;
        {
            let mut inner = self.inner.lock().await;
            inner.api_key = None;
            inner.login_error = None;
            inner.start_over();
        }
        self.store.clear().await?;
        info!("Logged out");
        Ok(())
    }

    /// Generates plans for `input` and records the outcome in the session.
    ///
    /// The service call runs on its own task, so the outcome is recorded even if the
    /// caller goes away. If the credential changed in the meantime the outcome is dropped.
    pub async fn generate(
        &self,
        input: LessonPlanInput,
        files: Vec<ReferenceFile>,
    ) -> Result<Arc<Vec<LessonPlan>>, SessionError> {
        input.validate()?;

        let (api_key, locale, epoch) = {
            let mut inner = self.inner.lock().await;
            let api_key = inner.api_key.clone().ok_or(SessionError::NotAuthenticated)?;
            if inner.view == View::Loading {
                return Err(SessionError::Busy);
            }
            inner.view = View::Loading;
            (api_key, inner.locale, inner.epoch)
        };

        let this = self.clone();
        let task = tokio::spawn(async move {
            let outcome = this
                .generator
                .generate_lesson_plans(&input, &files, locale, &api_key)
                .await;
            this.settle(epoch, locale, outcome).await
        });

        match task.await {
            Ok(result) => result,
            Err(e) => {
                error!("Generation task failed to complete: {}", e);
                let mut inner = self.inner.lock().await;
                let message = locale.text(Label::GenerationFailed).to_string();
                if inner.epoch == epoch {
                    inner.view = View::Failed(message.clone());
                }
                Err(PortError::GenerationFailed(message).into())
            }
        }
    }

    async fn settle(
        &self,
        epoch: u64,
        locale: Locale,
        outcome: Result<Vec<LessonPlan>, PortError>,
    ) -> Result<Arc<Vec<LessonPlan>>, SessionError> {
        let mut inner = self.inner.lock().await;
        if inner.epoch != epoch {
            info!("Discarding a generation result from a previous session");
            return Err(SessionError::Discarded);
        }

        match outcome {
            Ok(plans) => {
                let plans = Arc::new(plans);
                inner.view = View::Ready(plans.clone());
                Ok(plans)
            }
            Err(PortError::CredentialInvalid) => {
                warn!("Stored credential was rejected; forcing a new login");
                inner.api_key = None;
                inner.login_error = Some(Label::SessionExpired);
                inner.start_over();
                let expired = inner.epoch;
                drop(inner);
                self.forget_rejected(expired).await;
                Err(PortError::CredentialInvalid.into())
            }
            Err(PortError::GenerationFailed(message)) => {
                inner.view = View::Failed(message.clone());
                Err(PortError::GenerationFailed(message).into())
            }
            Err(other) => {
                error!("Unexpected generation failure: {}", other);
                let message = locale.text(Label::GenerationFailed).to_string();
                inner.view = View::Failed(message.clone());
                Err(PortError::GenerationFailed(message).into())
            }
        }
    }

    /// Removes the stored copy of a rejected key, unless a login or logout has
    /// already replaced it since `expired`.
    async fn forget_rejected(&self, expired: u64) {
        let _persist = self.persist.lock().await;
        if self.inner.lock().await.epoch != expired {
            info!("Credential changed after rejection; keeping the stored copy");
            return;
        }
        if let Err(e) = self.store.clear().await {
            error!("Failed to clear the rejected credential: {}", e);
        }
    }

    /// Serializes the current plans as one document.
    pub async fn export(&self) -> Result<ExportedDocument, SessionError> {
        let (plans, locale) = {
            let inner = self.inner.lock().await;
            match &inner.view {
                View::Ready(plans) => (plans.clone(), inner.locale),
                _ => return Err(SessionError::NothingToExport),
            }
        };

        let layout = layout_document(&plans, locale);
        let bytes = self.writer.write(&layout).map_err(|e| {
            error!("Export of '{}' failed: {}", layout.file_name, e);
            PortError::ExportFailed(locale.text(Label::ExportFailed).to_string())
        })?;

        info!(file = %layout.file_name, plans = plans.len(), "Exported lesson plans");
        Ok(ExportedDocument {
            file_name: layout.file_name,
            content_type: self.writer.content_type(),
            bytes,
        })
    }

    /// Clears plans and errors, as the form's reset button does.
    pub async fn reset(&self) -> Result<(), SessionError> {
        let mut inner = self.inner.lock().await;
        if inner.view == View::Loading {
            return Err(SessionError::Busy);
        }
        inner.view = View::Empty;
        Ok(())
    }

    pub async fn set_locale(&self, locale: Locale) {
        self.inner.lock().await.locale = locale;
    }

    pub async fn has_credential(&self) -> bool {
        self.inner.lock().await.api_key.is_some()
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let inner = self.inner.lock().await;
        SessionSnapshot {
            authenticated: inner.api_key.is_some(),
            locale: inner.locale,
            login_error: inner.login_error,
            view: inner.view.clone(),
        }
    }

    /// The result panel as HTML, in the current locale.
    pub async fn preview_html(&self) -> String {
        let inner = self.inner.lock().await;
        let state = match &inner.view {
            View::Empty => RenderState::Empty,
            View::Loading => RenderState::Loading,
            View::Failed(message) => RenderState::Failed(message.as_str()),
            View::Ready(plans) => RenderState::Ready(plans.as_slice()),
        };
        render_state(state, inner.locale)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use lesson_planner_core::{
        export::DocumentLayout, ports::PortResult, Cv5512Outcomes, Cv5512Plan, PlanBody,
        TeachingAids, TemplateKind,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex as StdMutex;
    use tokio::sync::Notify;

    pub(crate) const GOOD_KEY: &str = "good-key";

    pub(crate) fn plan() -> LessonPlan {
        LessonPlan {
            subject: "Ngữ văn".to_string(),
            grade: "Lớp 8".to_string(),
            lesson_title: "Bài 2: Thơ".to_string(),
            periods: 1,
            execution_time: "Tiết 1 - Tuần 3".to_string(),
            teaching_aids: TeachingAids::default(),
            post_lesson_adjustments: String::new(),
            body: PlanBody::Cv5512(Cv5512Plan {
                required_outcomes: Cv5512Outcomes::default(),
                teaching_activities: Vec::new(),
            }),
        }
    }

    pub(crate) fn input() -> LessonPlanInput {
        LessonPlanInput {
            teacher_name: "Phạm Thị D".to_string(),
            subject: "Ngữ văn".to_string(),
            grade: "Lớp 8".to_string(),
            periods: 1,
            template: TemplateKind::Cv5512,
        }
    }

    /// Scripted generation service. `gate`, when set, holds every generation until notified.
    #[derive(Default)]
    pub(crate) struct FakeGenerator {
        pub outcome: StdMutex<Option<PortResult<Vec<LessonPlan>>>>,
        pub gate: Option<Arc<Notify>>,
        pub calls: AtomicUsize,
    }

    impl FakeGenerator {
        pub(crate) fn returning(outcome: PortResult<Vec<LessonPlan>>) -> Self {
            Self {
                outcome: StdMutex::new(Some(outcome)),
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl GenerationService for FakeGenerator {
        async fn validate_credential(&self, api_key: &str) -> bool {
            api_key == GOOD_KEY
        }

        async fn generate_lesson_plans(
            &self,
            _input: &LessonPlanInput,
            _files: &[ReferenceFile],
            _locale: Locale,
            _api_key: &str,
        ) -> PortResult<Vec<LessonPlan>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            self.outcome
                .lock()
                .unwrap()
                .clone()
                .unwrap_or_else(|| Ok(vec![plan()]))
        }
    }

    #[derive(Default)]
    pub(crate) struct MemoryStore {
        pub key: StdMutex<Option<String>>,
    }

    #[async_trait]
    impl CredentialStore for MemoryStore {
        async fn load(&self) -> PortResult<Option<String>> {
            Ok(self.key.lock().unwrap().clone())
        }
        async fn save(&self, api_key: &str) -> PortResult<()> {
            *self.key.lock().unwrap() = Some(api_key.to_string());
            Ok(())
        }
        async fn clear(&self) -> PortResult<()> {
            *self.key.lock().unwrap() = None;
            Ok(())
        }
    }

    /// A store whose `clear` waits for `gate`, to hold a logout mid-write.
    pub(crate) struct GatedStore {
        pub inner: MemoryStore,
        pub gate: Arc<Notify>,
        pub clears: AtomicUsize,
    }

    #[async_trait]
    impl CredentialStore for GatedStore {
        async fn load(&self) -> PortResult<Option<String>> {
            self.inner.load().await
        }
        async fn save(&self, api_key: &str) -> PortResult<()> {
            self.inner.save(api_key).await
        }
        async fn clear(&self) -> PortResult<()> {
            self.clears.fetch_add(1, Ordering::SeqCst);
            self.gate.notified().await;
            self.inner.clear().await
        }
    }

    pub(crate) struct FakeWriter {
        pub fail: bool,
    }

    impl DocumentWriter for FakeWriter {
        fn write(&self, layout: &DocumentLayout) -> PortResult<Vec<u8>> {
            if self.fail {
                return Err(PortError::ExportFailed("disk on fire".to_string()));
            }
            Ok(layout.file_name.clone().into_bytes())
        }
        fn content_type(&self) -> &'static str {
            "application/test"
        }
    }

    pub(crate) fn controller_with(
        generator: Arc<FakeGenerator>,
        store: Arc<MemoryStore>,
    ) -> SessionController {
        SessionController::new(generator, store, Arc::new(FakeWriter { fail: false }), Locale::Vi)
    }

    async fn logged_in(generator: Arc<FakeGenerator>) -> (SessionController, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::default());
        let controller = controller_with(generator, store.clone());
        controller.authenticate(GOOD_KEY).await.unwrap();
        (controller, store)
    }

    #[tokio::test]
    async fn initialize_restores_a_stored_credential() {
        let store = Arc::new(MemoryStore::default());
        store.save("saved").await.unwrap();
        let controller = controller_with(Arc::new(FakeGenerator::default()), store);
        assert!(controller.initialize().await);
        assert!(controller.has_credential().await);
    }

    #[tokio::test]
    async fn rejected_key_is_neither_activated_nor_persisted() {
        let store = Arc::new(MemoryStore::default());
        let controller = controller_with(Arc::new(FakeGenerator::default()), store.clone());

        let result = controller.authenticate("wrong").await;
        assert!(matches!(result, Err(SessionError::Port(PortError::CredentialInvalid))));

        let snapshot = controller.snapshot().await;
        assert!(!snapshot.authenticated);
        assert_eq!(snapshot.login_error, Some(Label::ApiKeyInvalid));
        assert_eq!(store.load().await.unwrap(), None);
        assert!(matches!(
            controller.generate(input(), Vec::new()).await,
            Err(SessionError::NotAuthenticated)
        ));
    }

    #[tokio::test]
    async fn blank_key_is_a_validation_error() {
        let controller = controller_with(
            Arc::new(FakeGenerator::default()),
            Arc::new(MemoryStore::default()),
        );
        let result = controller.authenticate("   ").await;
        assert!(matches!(result, Err(SessionError::Port(PortError::ValidationFailed(_)))));
        assert_eq!(controller.snapshot().await.login_error, Some(Label::ApiKeyRequired));
    }

    #[tokio::test]
    async fn successful_generation_is_shown_and_exportable() {
        let generator = Arc::new(FakeGenerator::returning(Ok(vec![plan(), plan()])));
        let (controller, store) = logged_in(generator).await;
        assert_eq!(store.load().await.unwrap().as_deref(), Some(GOOD_KEY));

        let plans = controller.generate(input(), Vec::new()).await.unwrap();
        assert_eq!(plans.len(), 2);
        assert!(matches!(controller.snapshot().await.view, View::Ready(_)));
        assert!(controller.preview_html().await.contains("Tiết 1 - Tuần 3"));

        let document = controller.export().await.unwrap();
        assert_eq!(document.file_name, "Giao_an_Ngữ_văn_Bài_2:_Thơ.docx");
        assert_eq!(document.content_type, "application/test");
    }

    #[tokio::test]
    async fn rejected_credential_forces_a_new_login() {
        let generator = Arc::new(FakeGenerator::returning(Err(PortError::CredentialInvalid)));
        let (controller, store) = logged_in(generator).await;

        let result = controller.generate(input(), Vec::new()).await;
        assert!(matches!(result, Err(SessionError::Port(PortError::CredentialInvalid))));

        let snapshot = controller.snapshot().await;
        assert!(!snapshot.authenticated);
        assert_eq!(snapshot.login_error, Some(Label::SessionExpired));
        assert_eq!(snapshot.view, View::Empty);
        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn generation_failure_is_shown_in_the_panel() {
        let generator = Arc::new(FakeGenerator::returning(Err(PortError::GenerationFailed(
            "thử lại sau".to_string(),
        ))));
        let (controller, _) = logged_in(generator).await;

        assert!(controller.generate(input(), Vec::new()).await.is_err());
        assert_eq!(controller.snapshot().await.view, View::Failed("thử lại sau".to_string()));
        assert!(matches!(controller.export().await, Err(SessionError::NothingToExport)));

        controller.reset().await.unwrap();
        assert_eq!(controller.snapshot().await.view, View::Empty);
    }

    #[tokio::test]
    async fn invalid_input_never_reaches_the_service() {
        let generator = Arc::new(FakeGenerator::default());
        let (controller, _) = logged_in(generator.clone()).await;

        let mut bad = input();
        bad.periods = 11;
        let result = controller.generate(bad, Vec::new()).await;
        assert!(matches!(result, Err(SessionError::Port(PortError::ValidationFailed(_)))));
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
        assert_eq!(controller.snapshot().await.view, View::Empty);
    }

    #[tokio::test]
    async fn second_submission_while_loading_is_refused() {
        let gate = Arc::new(Notify::new());
        let generator = Arc::new(FakeGenerator {
            gate: Some(gate.clone()),
            ..FakeGenerator::default()
        });
        let (controller, _) = logged_in(generator.clone()).await;

        let first = tokio::spawn({
            let controller = controller.clone();
            async move { controller.generate(input(), Vec::new()).await }
        });
        while generator.calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }

        assert_eq!(controller.snapshot().await.view, View::Loading);
        assert!(matches!(
            controller.generate(input(), Vec::new()).await,
            Err(SessionError::Busy)
        ));
        assert!(matches!(controller.reset().await, Err(SessionError::Busy)));

        gate.notify_one();
        assert!(first.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn result_arriving_after_logout_is_discarded() {
        let gate = Arc::new(Notify::new());
        let generator = Arc::new(FakeGenerator {
            gate: Some(gate.clone()),
            ..FakeGenerator::default()
        });
        let (controller, _) = logged_in(generator.clone()).await;

        let pending = tokio::spawn({
            let controller = controller.clone();
            async move { controller.generate(input(), Vec::new()).await }
        });
        while generator.calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }

        controller.deauthenticate().await.unwrap();
        gate.notify_one();

        assert!(matches!(pending.await.unwrap(), Err(SessionError::Discarded)));
        let snapshot = controller.snapshot().await;
        assert!(!snapshot.authenticated);
        assert_eq!(snapshot.view, View::Empty);
    }

    #[tokio::test]
    async fn login_during_a_forced_logout_keeps_the_new_key_stored() {
        let gate = Arc::new(Notify::new());
        let store = Arc::new(GatedStore {
            inner: MemoryStore::default(),
            gate: gate.clone(),
            clears: AtomicUsize::new(0),
        });
        let controller = SessionController::new(
            Arc::new(FakeGenerator::returning(Err(PortError::CredentialInvalid))),
            store.clone(),
            Arc::new(FakeWriter { fail: false }),
            Locale::Vi,
        );
        controller.authenticate(GOOD_KEY).await.unwrap();

        let rejected = tokio::spawn({
            let controller = controller.clone();
            async move { controller.generate(input(), Vec::new()).await }
        });
        while store.clears.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }

        let relogin = tokio::spawn({
            let controller = controller.clone();
            async move { controller.authenticate(GOOD_KEY).await }
        });
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        gate.notify_one();

        assert!(matches!(
            rejected.await.unwrap(),
            Err(SessionError::Port(PortError::CredentialInvalid))
        ));
        relogin.await.unwrap().unwrap();
        assert!(controller.has_credential().await);
        assert_eq!(store.load().await.unwrap().as_deref(), Some(GOOD_KEY));
    }

    #[tokio::test]
    async fn stale_rejection_does_not_clear_a_newer_login() {
        let store = Arc::new(MemoryStore::default());
        let controller = controller_with(Arc::new(FakeGenerator::default()), store.clone());
        controller.authenticate(GOOD_KEY).await.unwrap();

        // the rejection was recorded under an epoch that a later login has since replaced
        let stale = controller.inner.lock().await.epoch - 1;
        controller.forget_rejected(stale).await;
        assert_eq!(store.load().await.unwrap().as_deref(), Some(GOOD_KEY));
    }

    #[tokio::test]
    async fn export_failure_is_reported_generically() {
        let store = Arc::new(MemoryStore::default());
        let controller = SessionController::new(
            Arc::new(FakeGenerator::default()),
            store,
            Arc::new(FakeWriter { fail: true }),
            Locale::En,
        );
        controller.authenticate(GOOD_KEY).await.unwrap();
        controller.generate(input(), Vec::new()).await.unwrap();

        let Err(SessionError::Port(PortError::ExportFailed(message))) = controller.export().await
        else {
            panic!("expected an export failure");
        };
        assert!(!message.contains("fire"));
    }

    #[tokio::test]
    async fn locale_switch_changes_the_preview_language() {
        let (controller, _) = logged_in(Arc::new(FakeGenerator::default())).await;
        let vietnamese = controller.preview_html().await;
        controller.set_locale(Locale::En).await;
        let english = controller.preview_html().await;
        assert_ne!(vietnamese, english);
        assert_eq!(controller.snapshot().await.locale, Locale::En);
    }
}
