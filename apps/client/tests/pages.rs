use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    extract::{Multipart, RawQuery},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use referhub_api::config::Config;
use referhub_api::media::{ResumeStorage, ResumeUpload, StorageError, StoredResume};
use referhub_api::routes::build_router;
use referhub_api::state::AppState;
use referhub_api::store::MemoryStore;
use referhub_client::auth_page::{AuthMode, AuthPage};
use referhub_client::dashboard::{CandidateForm, Dashboard, FixedAnswer};
use referhub_client::http::ApiClient;
use referhub_client::notify::{Notification, RecordingNotifier};
use referhub_client::render::{render_candidates, resume_view_url, EMPTY_STATE};
use referhub_client::session::{
    KeyValueStore, MemoryKeyValueStore, SessionError, SessionStore, TOKEN_KEY, USER_KEY,
};
use referhub_client::shell::AuthFlag;
use referhub_models::{CandidateQuery, CandidateStats, CandidateStatus};
use serde_json::{json, Value};

#[derive(Default)]
struct StubStorage {
    uploads: Mutex<Vec<String>>,
    fail: bool,
}

#[async_trait]
impl ResumeStorage for StubStorage {
    async fn upload(&self, upload: ResumeUpload) -> Result<StoredResume, StorageError> {
        if self.fail {
            return Err(StorageError::NotConfigured("no credentials".to_string()));
        }
        self.uploads.lock().unwrap().push(upload.file_name.clone());
        Ok(StoredResume {
            url: format!(
                "https://res.cloudinary.com/demo/image/upload/v1/referhub/resumes/{}",
                upload.file_name
            ),
        })
    }

    fn backend(&self) -> &'static str {
        "stub"
    }
}

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    format!("http://{addr}")
}

async fn spawn_backend(storage: Arc<StubStorage>) -> String {
    let state = AppState::new(Arc::new(MemoryStore::new()), storage, Config::default());
    serve(build_router(state)).await
}

/// Everything a page needs, sharing one session and one notifier.
struct Harness {
    kv: Arc<MemoryKeyValueStore>,
    session: SessionStore,
    api: ApiClient,
    flag: AuthFlag,
    notifier: Arc<RecordingNotifier>,
}

impl Harness {
    fn new(origin: &str) -> Self {
        let kv = Arc::new(MemoryKeyValueStore::default());
        let session = SessionStore::new(kv.clone());
        Self {
            api: ApiClient::new(origin, session.clone()),
            kv,
            session,
            flag: AuthFlag::default(),
            notifier: Arc::new(RecordingNotifier::default()),
        }
    }

    fn auth_page(&self) -> AuthPage {
        AuthPage::new(
            self.api.clone(),
            self.session.clone(),
            self.flag.clone(),
            self.notifier.clone(),
        )
    }

    fn dashboard(&self, confirm: bool) -> Dashboard {
        Dashboard::new(
            self.api.clone(),
            self.session.clone(),
            self.flag.clone(),
            self.notifier.clone(),
            Arc::new(FixedAnswer(confirm)),
        )
    }

    async fn sign_up(&self, email: &str) {
        let mut page = self.auth_page();
        page.set_mode(AuthMode::Signup);
        let form = page.form_mut();
        form.email = email.to_string();
        form.password = "s3cret-pass".to_string();
        form.full_name = "Riley Referrer".to_string();
        assert!(page.submit().await, "signup failed: {:?}", self.notifier.take());
        self.notifier.take();
    }

    async fn refer(&self, dashboard: &Dashboard, name: &str, job_title: &str) {
        dashboard.edit_form(|form| {
            form.name = name.to_string();
            form.email = format!("{}@example.com", name.to_lowercase());
            form.phone = "555-0100".to_string();
            form.job_title = job_title.to_string();
        });
        assert!(dashboard.create_candidate().await, "{:?}", self.notifier.take());
    }
}

fn fake_candidate(name: &str) -> Value {
    json!({
        "id": "00000000-0000-0000-0000-000000000001",
        "name": name,
        "email": "x@example.com",
        "phone": "555",
        "job_title": "Engineer",
        "resume_url": null,
        "status": "Pending",
        "referred_by": "00000000-0000-0000-0000-000000000002",
        "created_at": "2026-01-01T00:00:00Z"
    })
}

fn zero_stats() -> Json<Value> {
    Json(json!({"total": 0, "pending": 0, "reviewed": 0, "hired": 0}))
}

fn signed_in(origin: &str) -> Harness {
    let harness = Harness::new(origin);
    harness.kv.set(TOKEN_KEY, "test-token").unwrap();
    harness
        .kv
        .set(
            USER_KEY,
            r#"{"id":"00000000-0000-0000-0000-000000000002","email":"r@example.com","full_name":"R"}"#,
        )
        .unwrap();
    harness.flag.set(true);
    harness
}

// ── Auth page ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_signup_sets_both_keys_and_flag() {
    let origin = spawn_backend(Arc::default()).await;
    let h = Harness::new(&origin);

    let mut page = h.auth_page();
    page.form_mut().email = "riley@example.com".to_string();
    page.form_mut().password = "s3cret-pass".to_string();
    page.toggle_mode();
    page.form_mut().full_name = "Riley Referrer".to_string();

    assert!(page.submit().await);
    assert!(h.flag.get());
    assert!(h.kv.get(TOKEN_KEY).unwrap().is_some());
    let user: Value = serde_json::from_str(&h.kv.get(USER_KEY).unwrap().unwrap()).unwrap();
    assert_eq!(user["full_name"], "Riley Referrer");
    assert_eq!(
        h.notifier.take(),
        vec![Notification::Success("Account created successfully!".to_string())]
    );
}

#[tokio::test]
async fn test_login_failure_writes_nothing() {
    let origin = spawn_backend(Arc::default()).await;
    let registered = Harness::new(&origin);
    registered.sign_up("riley@example.com").await;

    let h = Harness::new(&origin);
    let mut page = h.auth_page();
    page.form_mut().email = "riley@example.com".to_string();
    page.form_mut().password = "wrong".to_string();

    assert!(!page.submit().await);
    assert!(!h.flag.get());
    assert_eq!(h.kv.get(TOKEN_KEY).unwrap(), None);
    assert_eq!(h.kv.get(USER_KEY).unwrap(), None);
    assert_eq!(h.notifier.errors(), vec!["Invalid email or password".to_string()]);
}

#[tokio::test]
async fn test_login_after_toggle_back_keeps_credentials() {
    let origin = spawn_backend(Arc::default()).await;
    Harness::new(&origin).sign_up("riley@example.com").await;

    let h = Harness::new(&origin);
    let mut page = h.auth_page();
    page.toggle_mode();
    page.form_mut().email = "riley@example.com".to_string();
    page.form_mut().password = "s3cret-pass".to_string();
    page.toggle_mode();
    assert_eq!(page.mode(), AuthMode::Login);
    assert_eq!(page.title(), "Welcome Back");

    // Login mode does not need the full name.
    assert!(page.form().full_name.is_empty());
    assert!(page.submit().await);
    assert!(h.flag.get());
    assert_eq!(
        h.notifier.take(),
        vec![Notification::Success("Login successful!".to_string())]
    );
}

/// Accepts the token, then fails every later write and removal.
#[derive(Default)]
struct BrokenDisk {
    inner: MemoryKeyValueStore,
}

impl KeyValueStore for BrokenDisk {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SessionError> {
        if key == TOKEN_KEY {
            return self.inner.set(key, value);
        }
        Err(std::io::Error::other("disk full").into())
    }

    fn remove(&self, _key: &str) -> Result<(), SessionError> {
        Err(std::io::Error::other("read-only").into())
    }
}

#[tokio::test]
async fn test_session_write_failure_is_reported_not_authenticated() {
    let origin = spawn_backend(Arc::default()).await;
    Harness::new(&origin).sign_up("riley@example.com").await;

    let session = SessionStore::new(Arc::new(BrokenDisk::default()));
    let flag = AuthFlag::default();
    let notifier = Arc::new(RecordingNotifier::default());
    let mut page = AuthPage::new(
        ApiClient::new(&origin, session.clone()),
        session.clone(),
        flag.clone(),
        notifier.clone(),
    );
    page.form_mut().email = "riley@example.com".to_string();
    page.form_mut().password = "s3cret-pass".to_string();

    assert!(!page.submit().await);
    assert!(!flag.get());
    assert_eq!(session.load().unwrap(), None);
    assert_eq!(notifier.errors(), vec!["Authentication failed".to_string()]);
}

#[tokio::test]
async fn test_duplicate_signup_surfaces_server_detail() {
    let origin = spawn_backend(Arc::default()).await;
    Harness::new(&origin).sign_up("riley@example.com").await;

    let h = Harness::new(&origin);
    let mut page = h.auth_page();
    page.set_mode(AuthMode::Signup);
    page.form_mut().email = "riley@example.com".to_string();
    page.form_mut().password = "another".to_string();
    page.form_mut().full_name = "Someone".to_string();

    assert!(!page.submit().await);
    assert!(!h.flag.get());
    assert_eq!(h.notifier.errors(), vec!["Email already registered".to_string()]);
}

// ── Dashboard against the real API ──────────────────────────────────────────

#[tokio::test]
async fn test_refer_without_resume_then_hire() {
    let storage = Arc::new(StubStorage::default());
    let origin = spawn_backend(storage.clone()).await;
    let h = Harness::new(&origin);
    h.sign_up("riley@example.com").await;

    let dashboard = h.dashboard(true);
    assert!(dashboard.refresh().await);
    assert!(dashboard.candidates().is_empty());

    dashboard.open_dialog();
    h.refer(&dashboard, "Ana", "Frontend Engineer").await;

    let state = dashboard.snapshot();
    assert!(!state.dialog_open);
    assert_eq!(state.form, CandidateForm::default());
    assert_eq!(state.candidates.len(), 1);
    assert_eq!(state.candidates[0].resume_url, None);
    assert_eq!(state.stats.pending, 1);
    assert!(storage.uploads.lock().unwrap().is_empty());

    let id = state.candidates[0].id;
    assert!(dashboard.update_status(id, CandidateStatus::Hired).await);
    assert_eq!(dashboard.candidates()[0].status, CandidateStatus::Hired);
    assert_eq!(dashboard.stats().hired, 1);
    assert!(h
        .notifier
        .take()
        .contains(&Notification::Success("Status updated to Hired".to_string())));
}

#[tokio::test]
async fn test_refer_with_resume_links_view_url() {
    let storage = Arc::new(StubStorage::default());
    let origin = spawn_backend(storage.clone()).await;
    let h = Harness::new(&origin);
    h.sign_up("riley@example.com").await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ana.pdf");
    std::fs::write(&path, b"%PDF-1.4").unwrap();

    let dashboard = h.dashboard(true);
    dashboard.edit_form(|form| form.resume = Some(path.clone()));
    h.refer(&dashboard, "Ana", "Frontend Engineer").await;

    let stored = dashboard.candidates()[0].resume_url.clone().unwrap();
    assert_eq!(*storage.uploads.lock().unwrap(), vec!["ana.pdf".to_string()]);
    assert_eq!(
        resume_view_url(&stored),
        "https://res.cloudinary.com/demo/image/upload/f_auto/v1/referhub/resumes/ana.pdf"
    );
    assert!(render_candidates(&dashboard.candidates(), false).contains("/upload/f_auto/"));
}

#[tokio::test]
async fn test_refer_failure_keeps_form_and_shows_detail() {
    let storage = Arc::new(StubStorage {
        fail: true,
        ..Default::default()
    });
    let origin = spawn_backend(storage).await;
    let h = Harness::new(&origin);
    h.sign_up("riley@example.com").await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ana.pdf");
    std::fs::write(&path, b"%PDF-1.4").unwrap();

    let dashboard = h.dashboard(true);
    dashboard.open_dialog();
    dashboard.edit_form(|form| {
        form.name = "Ana".to_string();
        form.email = "ana@example.com".to_string();
        form.phone = "555".to_string();
        form.job_title = "SRE".to_string();
        form.resume = Some(path.clone());
    });

    assert!(!dashboard.create_candidate().await);
    let errors = h.notifier.errors();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].starts_with("Resume upload failed"), "{errors:?}");

    let state = dashboard.snapshot();
    assert!(state.dialog_open);
    assert_eq!(state.form.name, "Ana");
}

#[tokio::test]
async fn test_missing_form_field_sends_nothing() {
    let origin = spawn_backend(Arc::default()).await;
    let h = Harness::new(&origin);
    h.sign_up("riley@example.com").await;

    let dashboard = h.dashboard(true);
    dashboard.edit_form(|form| form.name = "Ana".to_string());
    assert!(!dashboard.create_candidate().await);
    assert_eq!(h.notifier.errors(), vec!["Field 'email' is required".to_string()]);

    let listed = h.api.list_candidates(&CandidateQuery::default()).await.unwrap();
    assert!(listed.is_empty());
}

#[tokio::test]
async fn test_stats_for_mixed_statuses() {
    let origin = spawn_backend(Arc::default()).await;
    let h = Harness::new(&origin);
    h.sign_up("riley@example.com").await;

    let dashboard = h.dashboard(true);
    for name in ["Ana", "Bo", "Cy", "Di"] {
        h.refer(&dashboard, name, "Engineer").await;
    }
    let by_name = |name: &str| {
        dashboard
            .candidates()
            .into_iter()
            .find(|c| c.name == name)
            .unwrap()
            .id
    };
    let (cy, di) = (by_name("Cy"), by_name("Di"));
    assert!(dashboard.update_status(cy, CandidateStatus::Reviewed).await);
    assert!(dashboard.update_status(di, CandidateStatus::Hired).await);

    assert_eq!(
        dashboard.stats(),
        CandidateStats {
            total: 4,
            pending: 2,
            reviewed: 1,
            hired: 1
        }
    );
}

#[tokio::test]
async fn test_declined_delete_keeps_candidate() {
    let origin = spawn_backend(Arc::default()).await;
    let h = Harness::new(&origin);
    h.sign_up("riley@example.com").await;

    let confirming = h.dashboard(true);
    h.refer(&confirming, "Ana", "Engineer").await;
    let id = confirming.candidates()[0].id;
    h.notifier.take();

    let declining = h.dashboard(false);
    declining.refresh().await;
    assert!(!declining.delete_candidate(id).await);
    assert_eq!(declining.candidates().len(), 1);
    assert!(h.notifier.take().is_empty());

    assert!(confirming.delete_candidate(id).await);
    assert!(confirming.candidates().is_empty());
    assert_eq!(confirming.stats().total, 0);
}

#[tokio::test]
async fn test_list_failure_keeps_previous_list_and_stats_failure_is_silent() {
    let origin = spawn_backend(Arc::default()).await;
    let h = Harness::new(&origin);
    h.sign_up("riley@example.com").await;

    let dashboard = h.dashboard(true);
    h.refer(&dashboard, "Ana", "Engineer").await;
    assert_eq!(dashboard.candidates().len(), 1);
    h.notifier.take();

    h.kv.set(TOKEN_KEY, "revoked").unwrap();
    assert!(!dashboard.refresh().await);
    let names: Vec<_> = dashboard.candidates().into_iter().map(|c| c.name).collect();
    assert_eq!(names, vec!["Ana".to_string()]);
    assert!(!dashboard.snapshot().loading);
    assert_eq!(dashboard.stats().total, 1);
    assert_eq!(h.notifier.errors(), vec!["Failed to fetch candidates".to_string()]);
}

#[tokio::test]
async fn test_logout_clears_session_without_server() {
    let h = signed_in("http://127.0.0.1:9");
    let dashboard = h.dashboard(true);

    dashboard.logout();
    assert!(!h.flag.get());
    assert_eq!(h.session.load().unwrap(), None);
    assert_eq!(
        h.notifier.take(),
        vec![Notification::Success("Logged out successfully".to_string())]
    );
}

// ── Wire-level behaviour against mock servers ───────────────────────────────

#[tokio::test]
async fn test_search_and_filter_reach_query_string() {
    let seen: Arc<Mutex<Vec<String>>> = Arc::default();
    let recorded = seen.clone();
    let app = Router::new()
        .route(
            "/api/candidates",
            get(move |RawQuery(query): RawQuery| {
                let recorded = recorded.clone();
                async move {
                    recorded.lock().unwrap().push(query.unwrap_or_default());
                    Json(json!([]))
                }
            }),
        )
        .route("/api/candidates/stats", get(|| async { zero_stats() }));
    let origin = serve(app).await;
    let h = signed_in(&origin);

    let dashboard = h.dashboard(true);
    dashboard.set_search("front").await;
    dashboard.set_status_filter(Some(CandidateStatus::Pending)).await;

    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            "search=front".to_string(),
            "search=front&status_filter=Pending".to_string()
        ]
    );
    assert_eq!(render_candidates(&dashboard.candidates(), false).trim(), EMPTY_STATE);
}

#[tokio::test]
async fn test_create_without_resume_omits_resume_part() {
    let parts: Arc<Mutex<Vec<String>>> = Arc::default();
    let recorded = parts.clone();
    let app = Router::new()
        .route(
            "/api/candidates",
            get(|| async { Json(json!([])) }).post(move |mut multipart: Multipart| {
                let recorded = recorded.clone();
                async move {
                    while let Some(field) = multipart.next_field().await.unwrap() {
                        recorded
                            .lock()
                            .unwrap()
                            .push(field.name().unwrap_or_default().to_string());
                    }
                    (StatusCode::CREATED, Json(fake_candidate("Ana")))
                }
            }),
        )
        .route("/api/candidates/stats", get(|| async { zero_stats() }));
    let origin = serve(app).await;
    let h = signed_in(&origin);

    let dashboard = h.dashboard(true);
    h.refer(&dashboard, "Ana", "Engineer").await;

    assert_eq!(*parts.lock().unwrap(), vec!["name", "email", "phone", "job_title"]);
}

#[tokio::test]
async fn test_declined_delete_issues_no_request() {
    let deletes = Arc::new(AtomicUsize::new(0));
    let counter = deletes.clone();
    let app = Router::new()
        .route(
            "/api/candidates/:id",
            delete(move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    StatusCode::NO_CONTENT
                }
            }),
        )
        .route("/api/candidates", get(|| async { Json(json!([])) }))
        .route("/api/candidates/stats", get(|| async { zero_stats() }));
    let origin = serve(app).await;
    let h = signed_in(&origin);

    let id = uuid::Uuid::new_v4();
    assert!(!h.dashboard(false).delete_candidate(id).await);
    assert_eq!(deletes.load(Ordering::SeqCst), 0);

    assert!(h.dashboard(true).delete_candidate(id).await);
    assert_eq!(deletes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_stale_list_response_is_dropped() {
    let app = Router::new()
        .route(
            "/api/candidates",
            get(|RawQuery(query): RawQuery| async move {
                if query.as_deref() == Some("search=slow") {
                    tokio::time::sleep(Duration::from_millis(300)).await;
                    Json(json!([fake_candidate("Slow")]))
                } else {
                    Json(json!([fake_candidate("Fast")]))
                }
            }),
        )
        .route("/api/candidates/stats", get(|| async { zero_stats() }));
    let origin = serve(app).await;
    let h = signed_in(&origin);
    let dashboard = h.dashboard(true);

    tokio::join!(dashboard.set_search("slow"), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        dashboard.set_search("fast").await;
    });

    let names: Vec<_> = dashboard.candidates().into_iter().map(|c| c.name).collect();
    assert_eq!(names, vec!["Fast".to_string()]);
    assert!(!dashboard.snapshot().loading);
}
