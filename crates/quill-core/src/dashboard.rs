//! Dashboard: the root component tying session, API, rendering and polling together.
//!
//! Owns the transient form state and the session-dependent view state. Every
//! network operation catches its own failure, logs it, and leaves the view
//! as it was; only login and upload surface a human-readable status. Responses
//! are applied in completion order, so a slow stale fetch may overwrite a
//! fresher one.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::Serialize;

use crate::api::{FileUpload, NotesApi};
use crate::cookies::CookieJar;
use crate::models::{Note, NoteDraft, Profile};
use crate::polling::{PollingController, PollingState, TickFn, TickFuture, POLL_INTERVAL};
use crate::render::{render, render_legacy_list, render_note_cards, RenderedNote, Trust};
use crate::session::{SessionResult, SessionStore};

/// Placeholder shown instead of a token snippet when logged out.
pub const NO_TOKEN_PLACEHOLDER: &str = "(none)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardSettings {
    pub trust: Trust,
    pub poll_interval: Duration,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            trust: Trust::Untrusted,
            poll_interval: POLL_INTERVAL,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct FormState {
    email: String,
    password: String,
    draft: String,
    preview_visible: bool,
}

#[derive(Debug, Clone, Default)]
struct ViewState {
    profile: Option<Profile>,
    notes: Vec<Note>,
    status: Option<String>,
}

/// Point-in-time copy of everything the page displays.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub token_snippet: String,
    pub profile: Option<Profile>,
    pub notes: Vec<Note>,
    pub status: Option<String>,
    pub polling: bool,
    pub preview: Option<String>,
}

struct Shared<A> {
    api: A,
    session: SessionStore,
    cookies: Arc<CookieJar>,
    trust: Trust,
    form: Mutex<FormState>,
    view: Mutex<ViewState>,
}

impl<A: NotesApi> Shared<A> {
    fn form(&self) -> MutexGuard<'_, FormState> {
        self.form.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn view(&self) -> MutexGuard<'_, ViewState> {
        self.view.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn token(&self) -> Option<String> {
        self.session
            .current_token()
            .map(|token| token.as_str().to_string())
    }

    fn set_status(&self, status: impl Into<String>) {
        self.view().status = Some(status.into());
    }

    async fn refresh_profile(&self) {
        let token = self.token();
        match self.api.fetch_profile(token.as_deref()).await {
            Ok(profile) => self.view().profile = Some(profile),
            Err(error) => tracing::error!("Failed to fetch profile: {}", error),
        }
    }

    async fn refresh_notes(&self) {
        let token = self.token();
        match self.api.fetch_notes(token.as_deref()).await {
            Ok(notes) => {
                tracing::debug!(count = notes.len(), "Notes refreshed");
                self.view().notes = notes;
            }
            Err(error) => tracing::error!("Failed to fetch notes: {}", error),
        }
    }

    /// Token changed: profile and notes are fetched concurrently, in no set order.
    async fn refresh_session_data(&self) {
        tokio::join!(self.refresh_profile(), self.refresh_notes());
    }
}

pub struct Dashboard<A: NotesApi> {
    shared: Arc<Shared<A>>,
    polling: PollingController,
}

impl<A: NotesApi> std::fmt::Debug for Dashboard<A> {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("Dashboard")
            .field("trust", &self.shared.trust)
            .field("polling", &self.polling)
            .finish_non_exhaustive()
    }
}

impl<A: NotesApi> Dashboard<A> {
    /// Wires the cookie jar to the session and prepares the polling timer.
    pub fn new(
        api: A,
        session: SessionStore,
        cookies: Arc<CookieJar>,
        settings: DashboardSettings,
    ) -> SessionResult<Self> {
        session.subscribe(cookies.clone())?;
        let shared = Arc::new(Shared {
            api,
            session,
            cookies,
            trust: settings.trust,
            form: Mutex::new(FormState::default()),
            view: Mutex::new(ViewState::default()),
        });

        let tick_shared = Arc::clone(&shared);
        let tick: TickFn = Arc::new(move || -> TickFuture {
            let shared = Arc::clone(&tick_shared);
            Box::pin(async move { shared.refresh_notes().await })
        });

        Ok(Self {
            shared,
            polling: PollingController::new(settings.poll_interval, tick),
        })
    }

    pub fn api(&self) -> &A {
        &self.shared.api
    }

    pub fn session(&self) -> &SessionStore {
        &self.shared.session
    }

    /// Initial load: fetch profile and notes for whatever token was restored.
    pub async fn start(&self) {
        self.shared.refresh_session_data().await;
    }

    pub fn set_email(&self, email: impl Into<String>) {
        self.shared.form().email = email.into();
    }

    pub fn set_password(&self, password: impl Into<String>) {
        self.shared.form().password = password.into();
    }

    pub fn set_draft(&self, draft: impl Into<String>) {
        self.shared.form().draft = draft.into();
    }

    pub fn draft(&self) -> String {
        self.shared.form().draft.clone()
    }

    /// Flips preview visibility and returns the new value.
    pub fn toggle_preview(&self) -> bool {
        let mut form = self.shared.form();
        form.preview_visible = !form.preview_visible;
        form.preview_visible
    }

    /// Rendered draft when the preview is visible.
    pub fn preview(&self) -> Option<String> {
        let form = self.shared.form();
        form.preview_visible
            .then(|| render(&form.draft, self.shared.trust))
    }

    /// Submits the login form. Returns whether a token was obtained.
    pub async fn submit_login(&self) -> bool {
        let (email, password) = {
            let form = self.shared.form();
            (form.email.clone(), form.password.clone())
        };

        match self
            .shared
            .session
            .login(&self.shared.api, &email, &password)
            .await
        {
            Ok(_) => {
                tracing::info!(email = %email, "Logged in");
                self.shared.set_status("Logged in");
                self.shared.refresh_session_data().await;
                true
            }
            Err(error) => {
                tracing::warn!("Login failed: {}", error);
                self.shared.set_status("Login failed");
                false
            }
        }
    }

    pub async fn refresh_profile(&self) {
        self.shared.refresh_profile().await;
    }

    pub async fn refresh_notes(&self) {
        self.shared.refresh_notes().await;
    }

    /// Posts the draft, then re-fetches the whole list. No optimistic insert.
    pub async fn submit_note(&self) {
        let draft = {
            let form = self.shared.form();
            NoteDraft {
                content: form.draft.clone(),
                email: form.email.clone(),
            }
        };
        let token = self.shared.token();

        match self.shared.api.create_note(&draft, token.as_deref()).await {
            Ok(created) => {
                let owner = created.owner.as_deref().unwrap_or("anonymous");
                self.shared.set_status(format!("Saved note for {owner}"));
                self.shared.form().draft.clear();
                self.shared.refresh_notes().await;
            }
            Err(error) => tracing::error!("Failed to create note: {}", error),
        }
    }

    /// Uploads a file from disk. Returns whether the server accepted it.
    pub async fn upload_file(&self, path: &Path) -> bool {
        let upload = match FileUpload::from_path(path).await {
            Ok(upload) => upload,
            Err(error) => {
                tracing::error!("Failed to read {}: {}", path.display(), error);
                self.shared.set_status("Upload failed");
                return false;
            }
        };
        let token = self.shared.token();

        match self.shared.api.upload_file(upload, token.as_deref()).await {
            Ok(receipt) => {
                self.shared.set_status(format!("Uploaded: {}", receipt.url));
                true
            }
            Err(error) => {
                tracing::error!("Upload failed: {}", error);
                self.shared.set_status("Upload failed");
                false
            }
        }
    }

    pub fn toggle_polling(&mut self) -> PollingState {
        self.polling.toggle()
    }

    pub const fn polling_state(&self) -> PollingState {
        self.polling.state()
    }

    pub fn token_snippet(&self) -> String {
        self.shared.session.current_token().map_or_else(
            || NO_TOKEN_PLACEHOLDER.to_string(),
            |token| token.snippet(),
        )
    }

    pub fn profile(&self) -> Option<Profile> {
        self.shared.view().profile.clone()
    }

    pub fn notes(&self) -> Vec<Note> {
        self.shared.view().notes.clone()
    }

    pub fn status(&self) -> Option<String> {
        self.shared.view().status.clone()
    }

    /// Notes through the current renderer.
    pub fn note_cards(&self) -> Vec<RenderedNote> {
        render_note_cards(&self.shared.view().notes, self.shared.trust)
    }

    /// Notes through the legacy renderer.
    pub fn legacy_notes_html(&self) -> String {
        render_legacy_list(&self.shared.view().notes, self.shared.trust)
    }

    /// Cookie inspector: every cookie the page can see.
    pub fn cookie_listing(&self) -> Vec<String> {
        self.shared.cookies.listing()
    }

    pub fn set_debug_cookie(&self, value: impl Into<String>) -> SessionResult<()> {
        self.shared.cookies.set_debug_cookie(value)
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        let view = self.shared.view().clone();
        DashboardSnapshot {
            token_snippet: self.token_snippet(),
            profile: view.profile,
            notes: view.notes,
            status: view.status,
            polling: self.polling_state() == PollingState::Polling,
            preview: self.preview(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::api::{
        normalize_notes_payload, ApiError, ApiResult, Credentials, LoginResponse, UploadReceipt,
    };
    use crate::cookies::SESSION_COOKIE;
    use crate::models::CreatedNote;
    use crate::session::{KeyValueStore, MemoryStore, TOKEN_STORAGE_KEY};

    #[derive(Default)]
    struct FakeApi {
        login_token: Option<String>,
        notes: Mutex<VecDeque<ApiResult<Vec<Note>>>>,
        calls: Mutex<Vec<String>>,
        notes_fetches: AtomicUsize,
        upload_fails: bool,
    }

    impl FakeApi {
        fn with_token(token: &str) -> Self {
            Self {
                login_token: Some(token.to_string()),
                ..Self::default()
            }
        }

        fn queue_notes(&self, result: ApiResult<Vec<Note>>) {
            self.notes.lock().unwrap().push_back(result);
        }

        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    fn token_label(token: Option<&str>) -> &str {
        token.unwrap_or("-")
    }

    impl NotesApi for FakeApi {
        async fn login(&self, credentials: &Credentials) -> ApiResult<LoginResponse> {
            self.record(format!("login:{}", credentials.email));
            Ok(LoginResponse {
                token: self.login_token.clone(),
                message: None,
            })
        }

        async fn fetch_profile(&self, token: Option<&str>) -> ApiResult<Profile> {
            self.record(format!("profile:{}", token_label(token)));
            Ok(Profile {
                user: token.map(|_| "alice@example.com".to_string()),
                ..Profile::default()
            })
        }

        async fn fetch_notes(&self, token: Option<&str>) -> ApiResult<Vec<Note>> {
            self.record(format!("notes:{}", token_label(token)));
            self.notes_fetches.fetch_add(1, Ordering::SeqCst);
            self.notes
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(Vec::new()))
        }

        async fn create_note(&self, draft: &NoteDraft, token: Option<&str>) -> ApiResult<CreatedNote> {
            self.record(format!("create:{}:{}", draft.content, token_label(token)));
            Ok(CreatedNote {
                status: Some("ok".to_string()),
                owner: Some(draft.email.clone()),
            })
        }

        async fn upload_file(&self, upload: FileUpload, _token: Option<&str>) -> ApiResult<UploadReceipt> {
            if self.upload_fails {
                return Err(ApiError::Status {
                    status: 500,
                    body: "disk full".to_string(),
                });
            }
            Ok(UploadReceipt {
                url: format!("/uploads/{}", upload.file_name),
                size: Some(upload.bytes.len() as u64),
            })
        }
    }

    fn note(id: i64, content: &str) -> Note {
        Note {
            id,
            content: content.to_string(),
            owner_email: Some("alice@example.com".to_string()),
            created_at: None,
        }
    }

    fn dashboard_with(api: FakeApi) -> (Dashboard<FakeApi>, Arc<MemoryStore>) {
        let storage = Arc::new(MemoryStore::default());
        let session = SessionStore::open(storage.clone()).unwrap();
        let dashboard = Dashboard::new(
            api,
            session,
            Arc::new(CookieJar::in_memory()),
            DashboardSettings::default(),
        )
        .unwrap();
        (dashboard, storage)
    }

    #[tokio::test(flavor = "current_thread")]
    async fn login_stores_token_and_fetches_with_it() {
        let (dashboard, storage) = dashboard_with(FakeApi::with_token("abc123"));
        dashboard.set_email("alice@example.com");
        dashboard.set_password("password123");

        assert!(dashboard.submit_login().await);

        let token = dashboard.session().current_token().unwrap();
        assert_eq!(token.as_str(), "abc123");
        assert_eq!(
            storage.get(TOKEN_STORAGE_KEY).unwrap().as_deref(),
            Some("abc123")
        );
        assert_eq!(dashboard.status().as_deref(), Some("Logged in"));

        let calls = dashboard.api().calls();
        assert_eq!(calls[0], "login:alice@example.com");
        assert!(calls.contains(&"profile:abc123".to_string()));
        assert!(calls.contains(&"notes:abc123".to_string()));
        assert_eq!(
            dashboard.profile().unwrap().user.as_deref(),
            Some("alice@example.com")
        );
    }

    #[tokio::test(flavor = "current_thread")]
    async fn login_without_token_reports_failure() {
        let (dashboard, storage) = dashboard_with(FakeApi::default());
        dashboard.set_email("alice@example.com");
        dashboard.set_password("wrong");

        assert!(!dashboard.submit_login().await);

        assert_eq!(dashboard.status().as_deref(), Some("Login failed"));
        assert!(dashboard.session().current_token().is_none());
        assert_eq!(storage.get(TOKEN_STORAGE_KEY).unwrap(), None);
        assert_eq!(dashboard.token_snippet(), NO_TOKEN_PLACEHOLDER);
        assert_eq!(dashboard.api().calls(), vec!["login:alice@example.com"]);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn token_snippet_is_a_prefix_and_cookie_mirrors_token() {
        let (dashboard, _storage) = dashboard_with(FakeApi::with_token("abc123"));
        dashboard.submit_login().await;

        let snippet = dashboard.token_snippet();
        assert!("abc123".starts_with(snippet.trim_end_matches('…')));
        assert_ne!(snippet, "abc123");
        assert!(dashboard
            .cookie_listing()
            .contains(&"session=abc123; Path=/; SameSite=None".to_string()));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn start_fetches_anonymously_without_a_token() {
        let (dashboard, _storage) = dashboard_with(FakeApi::default());
        dashboard.start().await;

        let mut calls = dashboard.api().calls();
        calls.sort();
        assert_eq!(calls, vec!["notes:-", "profile:-"]);
        assert_eq!(dashboard.profile().unwrap().user, None);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn failed_fetch_keeps_last_successful_list() {
        let (dashboard, _storage) = dashboard_with(FakeApi::default());
        dashboard.refresh_notes().await;
        assert!(dashboard.notes().is_empty());

        dashboard
            .api()
            .queue_notes(Ok(vec![note(2, "two"), note(1, "one")]));
        dashboard.api().queue_notes(Err(ApiError::Status {
            status: 502,
            body: "bad gateway".to_string(),
        }));

        dashboard.refresh_notes().await;
        dashboard.refresh_notes().await;

        assert_eq!(dashboard.notes(), vec![note(2, "two"), note(1, "one")]);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn non_array_notes_payload_empties_the_list() {
        let (dashboard, _storage) = dashboard_with(FakeApi::default());
        dashboard.api().queue_notes(Ok(vec![note(1, "one")]));
        dashboard.refresh_notes().await;
        assert_eq!(dashboard.notes().len(), 1);

        dashboard
            .api()
            .queue_notes(normalize_notes_payload(json!({"error": "boom"})));
        dashboard.refresh_notes().await;
        assert!(dashboard.notes().is_empty());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn submit_note_refetches_the_whole_list() {
        let (dashboard, _storage) = dashboard_with(FakeApi::with_token("abc123"));
        dashboard.set_email("alice@example.com");
        dashboard.submit_login().await;

        dashboard.set_draft("**bold** and *italic*");
        dashboard
            .api()
            .queue_notes(Ok(vec![note(1, "**bold** and *italic*")]));
        dashboard.submit_note().await;

        let calls = dashboard.api().calls();
        let create_index = calls
            .iter()
            .position(|call| call == "create:**bold** and *italic*:abc123")
            .unwrap();
        assert_eq!(calls[create_index + 1], "notes:abc123");
        assert_eq!(
            dashboard.status().as_deref(),
            Some("Saved note for alice@example.com")
        );
        assert_eq!(dashboard.draft(), "");
        assert_eq!(
            dashboard.note_cards()[0].html,
            "<strong>bold</strong> and <em>italic</em>"
        );
    }

    #[tokio::test(flavor = "current_thread")]
    async fn preview_renders_the_draft_when_visible() {
        let (dashboard, _storage) = dashboard_with(FakeApi::default());
        dashboard.set_draft("**bold** and *italic*");
        assert_eq!(dashboard.preview(), None);

        assert!(dashboard.toggle_preview());
        assert_eq!(
            dashboard.preview().as_deref(),
            Some("<strong>bold</strong> and <em>italic</em>")
        );
        assert_eq!(dashboard.preview(), dashboard.preview());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn both_renderers_follow_the_trust_setting() {
        let storage = Arc::new(MemoryStore::default());
        let dashboard = Dashboard::new(
            FakeApi::default(),
            SessionStore::open(storage).unwrap(),
            Arc::new(CookieJar::in_memory()),
            DashboardSettings {
                trust: Trust::RawHtml,
                ..DashboardSettings::default()
            },
        )
        .unwrap();
        dashboard
            .api()
            .queue_notes(Ok(vec![note(9, "<img src=x onerror=alert(1)>")]));
        dashboard.refresh_notes().await;

        assert_eq!(dashboard.note_cards()[0].html, "<img src=x onerror=alert(1)>");
        assert!(dashboard
            .legacy_notes_html()
            .contains("<img src=x onerror=alert(1)>"));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn upload_reports_status() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.pdf");
        std::fs::write(&path, b"%PDF").unwrap();

        let (dashboard, _storage) = dashboard_with(FakeApi::default());
        assert!(dashboard.upload_file(&path).await);
        assert_eq!(dashboard.status().as_deref(), Some("Uploaded: /uploads/report.pdf"));

        assert!(!dashboard.upload_file(&dir.path().join("missing.pdf")).await);
        assert_eq!(dashboard.status().as_deref(), Some("Upload failed"));

        let (failing, _storage) = dashboard_with(FakeApi {
            upload_fails: true,
            ..FakeApi::default()
        });
        assert!(!failing.upload_file(&path).await);
        assert_eq!(failing.status().as_deref(), Some("Upload failed"));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn debug_cookie_shows_in_inspector() {
        let (dashboard, _storage) = dashboard_with(FakeApi::default());
        dashboard.set_debug_cookie("hello").unwrap();
        assert_eq!(dashboard.cookie_listing(), vec!["debug=hello; Path=/"]);
        assert!(dashboard
            .cookie_listing()
            .iter()
            .all(|line| !line.starts_with(SESSION_COOKIE)));
    }

    #[tokio::test(start_paused = true)]
    async fn polling_refetches_until_toggled_off() {
        let (mut dashboard, _storage) = dashboard_with(FakeApi::default());
        assert_eq!(dashboard.toggle_polling(), PollingState::Polling);
        assert!(dashboard.snapshot().polling);

        for _ in 0..2 {
            tokio::time::advance(POLL_INTERVAL).await;
            for _ in 0..8 {
                tokio::task::yield_now().await;
            }
        }
        assert_eq!(dashboard.api().notes_fetches.load(Ordering::SeqCst), 2);

        assert_eq!(dashboard.toggle_polling(), PollingState::Idle);
        tokio::time::advance(POLL_INTERVAL * 3).await;
        tokio::task::yield_now().await;
        assert_eq!(dashboard.api().notes_fetches.load(Ordering::SeqCst), 2);
    }
}
