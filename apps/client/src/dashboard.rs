//! Dashboard page: candidate list with search and status filter, stats,
//! referral form, status changes, deletion and logout.
//!
//! Methods take `&self` so several fetches can be in flight at once. List
//! responses are ordered by a `RequestGuard`: only the newest request's
//! response is applied, stale ones are dropped.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use referhub_models::{Candidate, CandidateQuery, CandidateStats, CandidateStatus, NewCandidate};
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::http::{ApiClient, ResumeFile};
use crate::notify::Notifier;
use crate::session::SessionStore;
use crate::shell::AuthFlag;

pub const DELETE_PROMPT: &str = "Are you sure you want to delete this candidate?";

/// Interactive yes/no prompt shown before destructive actions.
pub trait Confirm: Send + Sync {
    fn confirm(&self, message: &str) -> bool;
}

/// Answers every prompt the same way (`--yes`, tests).
#[derive(Debug, Clone, Copy)]
pub struct FixedAnswer(pub bool);

impl Confirm for FixedAnswer {
    fn confirm(&self, _message: &str) -> bool {
        self.0
    }
}

/// Hands out monotonically increasing tickets; a response is accepted only if
/// its ticket is still the newest one issued.
#[derive(Debug, Default)]
pub struct RequestGuard {
    latest: AtomicU64,
}

impl RequestGuard {
    pub fn issue(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn is_current(&self, ticket: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket
    }
}

/// The referral dialog's fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub job_title: String,
    pub resume: Option<PathBuf>,
}

impl CandidateForm {
    fn to_new_candidate(&self) -> NewCandidate {
        NewCandidate {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            job_title: self.job_title.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    pub candidates: Vec<Candidate>,
    pub stats: CandidateStats,
    pub query: CandidateQuery,
    pub form: CandidateForm,
    pub dialog_open: bool,
    /// True until the first list fetch settles.
    pub loading: bool,
}

pub struct Dashboard {
    api: ApiClient,
    session: SessionStore,
    authenticated: AuthFlag,
    notifier: Arc<dyn Notifier>,
    confirm: Arc<dyn Confirm>,
    guard: RequestGuard,
    state: Mutex<DashboardState>,
}

impl Dashboard {
    pub fn new(
        api: ApiClient,
        session: SessionStore,
        authenticated: AuthFlag,
        notifier: Arc<dyn Notifier>,
        confirm: Arc<dyn Confirm>,
    ) -> Self {
        Self {
            api,
            session,
            authenticated,
            notifier,
            confirm,
            guard: RequestGuard::default(),
            state: Mutex::new(DashboardState {
                loading: true,
                ..Default::default()
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, DashboardState> {
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    pub fn snapshot(&self) -> DashboardState {
        self.state().clone()
    }

    pub fn candidates(&self) -> Vec<Candidate> {
        self.state().candidates.clone()
    }

    pub fn stats(&self) -> CandidateStats {
        self.state().stats
    }

    // ── Loading ──────────────────────────────────────────────────────────────

    /// Initial load and the refresh after every successful mutation.
    /// Returns whether the list fetch succeeded.
    pub async fn refresh(&self) -> bool {
        let (listed, ()) = tokio::join!(self.fetch_candidates(), self.fetch_stats());
        listed
    }

    /// Replaces the list with the server's answer for the current query.
    /// A stale response is dropped and counts as success. On failure the
    /// previous list stays on screen.
    pub async fn fetch_candidates(&self) -> bool {
        let ticket = self.guard.issue();
        let query = self.state().query.clone();
        let result = self.api.list_candidates(&query).await;

        if !self.guard.is_current(ticket) {
            debug!("Dropping stale candidate list response (ticket {ticket})");
            return true;
        }

        self.state().loading = false;
        match result {
            Ok(candidates) => {
                self.state().candidates = candidates;
                true
            }
            Err(e) => {
                warn!("Failed to fetch candidates: {e}");
                self.notifier.error("Failed to fetch candidates");
                false
            }
        }
    }

    /// Failures are logged only; the previous numbers stay on screen.
    pub async fn fetch_stats(&self) {
        match self.api.stats().await {
            Ok(stats) => self.state().stats = stats,
            Err(e) => error!("Failed to fetch stats: {e}"),
        }
    }

    /// Updates the search term and refetches.
    pub async fn set_search(&self, search: &str) {
        let changed = {
            let mut state = self.state();
            let next = CandidateQuery::new(search, state.query.status_filter);
            let changed = next != state.query;
            state.query = next;
            changed
        };
        if changed {
            self.refresh().await;
        }
    }

    /// Updates the status filter and refetches.
    pub async fn set_status_filter(&self, status: Option<CandidateStatus>) {
        let changed = {
            let mut state = self.state();
            let changed = state.query.status_filter != status;
            state.query.status_filter = status;
            changed
        };
        if changed {
            self.refresh().await;
        }
    }

    /// Sets both criteria at once with a single refetch.
    pub async fn apply_query(&self, query: CandidateQuery) -> bool {
        self.state().query = query;
        self.refresh().await
    }

    // ── Referral dialog ──────────────────────────────────────────────────────

    pub fn open_dialog(&self) {
        self.state().dialog_open = true;
    }

    pub fn close_dialog(&self) {
        self.state().dialog_open = false;
    }

    pub fn edit_form(&self, edit: impl FnOnce(&mut CandidateForm)) {
        edit(&mut self.state().form);
    }

    /// Submits the referral form. On success the dialog closes, the form
    /// resets and both list and stats are refetched.
    pub async fn create_candidate(&self) -> bool {
        let form = self.state().form.clone();
        let candidate = form.to_new_candidate();
        if let Some(field) = candidate.first_missing_field() {
            self.notifier.error(&format!("Field '{field}' is required"));
            return false;
        }

        let resume = match &form.resume {
            Some(path) => match ResumeFile::from_path(path).await {
                Ok(file) => {
                    if !file.has_pdf_extension() {
                        warn!("Resume '{}' is not a .pdf; uploading anyway", file.file_name);
                    }
                    Some(file)
                }
                Err(e) => {
                    error!("Failed to read resume {}: {e}", path.display());
                    self.notifier.error("Failed to read resume file");
                    return false;
                }
            },
            None => None,
        };

        match self.api.create_candidate(&candidate, resume).await {
            Ok(created) => {
                debug!("Referred candidate {}", created.id);
                self.notifier.success("Candidate referred successfully!");
                {
                    let mut state = self.state();
                    state.dialog_open = false;
                    state.form = CandidateForm::default();
                }
                self.refresh().await;
                true
            }
            Err(e) => {
                self.notifier.error(&e.detail_or("Failed to refer candidate"));
                false
            }
        }
    }

    // ── Per-candidate actions ────────────────────────────────────────────────

    /// Waits for the server before anything changes locally.
    pub async fn update_status(&self, id: Uuid, status: CandidateStatus) -> bool {
        match self.api.update_status(id, status).await {
            Ok(_) => {
                self.notifier.success(&format!("Status updated to {status}"));
                self.refresh().await;
                true
            }
            Err(e) => {
                warn!("Status update for {id} failed: {e}");
                self.notifier.error("Failed to update status");
                false
            }
        }
    }

    /// Asks for confirmation first; a declined prompt sends nothing.
    pub async fn delete_candidate(&self, id: Uuid) -> bool {
        if !self.confirm.confirm(DELETE_PROMPT) {
            return false;
        }

        match self.api.delete_candidate(id).await {
            Ok(()) => {
                self.notifier.success("Candidate deleted successfully");
                self.refresh().await;
                true
            }
            Err(e) => {
                warn!("Delete of {id} failed: {e}");
                self.notifier.error("Failed to delete candidate");
                false
            }
        }
    }

    /// Clears the stored session and lowers the shell's flag. No server call.
    pub fn logout(&self) {
        if let Err(e) = self.session.clear() {
            error!("Failed to clear session: {e}");
        }
        self.authenticated.set(false);
        self.notifier.success("Logged out successfully");
    }
}
