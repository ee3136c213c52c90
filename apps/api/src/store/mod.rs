//! Persistence seam. `AppState` holds an `Arc<dyn Store>`; Postgres in
//! production, the in-memory store for local runs and tests.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use referhub_models::{Candidate, CandidateQuery, CandidateStats, CandidateStatus, NewCandidate};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::{SessionRow, UserRow};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Fields of a user about to be created. The password is already hashed.
pub struct NewUser<'a> {
    pub email: &'a str,
    pub full_name: &'a str,
    pub password_hash: &'a str,
}

/// Every candidate operation is scoped to the referring user (`owner`).
#[async_trait]
pub trait Store: Send + Sync {
    /// Fails with `AppError::Validation` when the email is already registered.
    async fn create_user(&self, user: NewUser<'_>) -> Result<UserRow, AppError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRow>, AppError>;

    async fn create_session(&self, session: SessionRow) -> Result<(), AppError>;

    /// Resolves a bearer token to its user, ignoring sessions expired at `now`.
    async fn find_session_user(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<UserRow>, AppError>;

    async fn insert_candidate(
        &self,
        owner: Uuid,
        candidate: &NewCandidate,
        resume_url: Option<String>,
    ) -> Result<Candidate, AppError>;

    /// Newest first.
    async fn list_candidates(
        &self,
        owner: Uuid,
        query: &CandidateQuery,
    ) -> Result<Vec<Candidate>, AppError>;

    async fn candidate_stats(&self, owner: Uuid) -> Result<CandidateStats, AppError>;

    /// Returns `None` when no candidate with that id belongs to `owner`.
    async fn update_status(
        &self,
        owner: Uuid,
        id: Uuid,
        status: CandidateStatus,
    ) -> Result<Option<Candidate>, AppError>;

    /// Returns `false` when nothing was deleted.
    async fn delete_candidate(&self, owner: Uuid, id: Uuid) -> Result<bool, AppError>;
}

pub(crate) fn email_taken() -> AppError {
    AppError::Validation("Email already registered".to_string())
}
