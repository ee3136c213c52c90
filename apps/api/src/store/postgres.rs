use async_trait::async_trait;
use chrono::{DateTime, Utc};
use referhub_models::{Candidate, CandidateQuery, CandidateStats, CandidateStatus, NewCandidate};
use sqlx::{FromRow, PgPool};
use tracing::info;
use uuid::Uuid;

use super::{email_taken, NewUser, Store};
use crate::errors::AppError;
use crate::models::candidate::CandidateRow;
use crate::models::user::{SessionRow, UserRow};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct StatsRow {
    total: i64,
    pending: i64,
    reviewed: i64,
    hired: i64,
}

/// Escapes LIKE wildcards so the search term is matched literally.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[async_trait]
impl Store for PgStore {
    async fn create_user(&self, user: NewUser<'_>) -> Result<UserRow, AppError> {
        let result = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, email, full_name, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, full_name, password_hash, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user.email)
        .bind(user.full_name)
        .bind(user.password_hash)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => {
                info!("Created user {} ({})", row.id, row.email);
                Ok(row)
            }
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(email_taken()),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRow>, AppError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, full_name, password_hash, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn create_session(&self, session: SessionRow) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO sessions (token, user_id, created_at, expires_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(&session.token)
        .bind(session.user_id)
        .bind(session.created_at)
        .bind(session.expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_session_user(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<UserRow>, AppError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT u.id, u.email, u.full_name, u.password_hash, u.created_at
            FROM sessions s
            JOIN users u ON u.id = s.user_id
            WHERE s.token = $1 AND s.expires_at > $2
            "#,
        )
        .bind(token)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn insert_candidate(
        &self,
        owner: Uuid,
        candidate: &NewCandidate,
        resume_url: Option<String>,
    ) -> Result<Candidate, AppError> {
        let row = sqlx::query_as::<_, CandidateRow>(
            r#"
            INSERT INTO candidates
                (id, name, email, phone, job_title, resume_url, status, referred_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, name, email, phone, job_title, resume_url, status, referred_by, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&candidate.name)
        .bind(&candidate.email)
        .bind(&candidate.phone)
        .bind(&candidate.job_title)
        .bind(resume_url)
        .bind(CandidateStatus::Pending.as_str())
        .bind(owner)
        .fetch_one(&self.pool)
        .await?;

        info!("Inserted candidate {} referred by {owner}", row.id);
        row.try_into()
    }

    async fn list_candidates(
        &self,
        owner: Uuid,
        query: &CandidateQuery,
    ) -> Result<Vec<Candidate>, AppError> {
        let search = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(like_pattern);
        let status = query.status_filter.map(CandidateStatus::as_str);

        let rows = sqlx::query_as::<_, CandidateRow>(
            r#"
            SELECT id, name, email, phone, job_title, resume_url, status, referred_by, created_at
            FROM candidates
            WHERE referred_by = $1
              AND ($2::text IS NULL OR name ILIKE $2 OR job_title ILIKE $2)
              AND ($3::text IS NULL OR status = $3)
            ORDER BY created_at DESC
            "#,
        )
        .bind(owner)
        .bind(search)
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Candidate::try_from).collect()
    }

    async fn candidate_stats(&self, owner: Uuid) -> Result<CandidateStats, AppError> {
        let row = sqlx::query_as::<_, StatsRow>(
            r#"
            SELECT
                COUNT(*)                                     AS total,
                COUNT(*) FILTER (WHERE status = 'Pending')  AS pending,
                COUNT(*) FILTER (WHERE status = 'Reviewed') AS reviewed,
                COUNT(*) FILTER (WHERE status = 'Hired')    AS hired
            FROM candidates
            WHERE referred_by = $1
            "#,
        )
        .bind(owner)
        .fetch_one(&self.pool)
        .await?;

        Ok(CandidateStats {
            total: row.total.max(0) as u64,
            pending: row.pending.max(0) as u64,
            reviewed: row.reviewed.max(0) as u64,
            hired: row.hired.max(0) as u64,
        })
    }

    async fn update_status(
        &self,
        owner: Uuid,
        id: Uuid,
        status: CandidateStatus,
    ) -> Result<Option<Candidate>, AppError> {
        let row = sqlx::query_as::<_, CandidateRow>(
            r#"
            UPDATE candidates SET status = $1
            WHERE id = $2 AND referred_by = $3
            RETURNING id, name, email, phone, job_title, resume_url, status, referred_by, created_at
            "#,
        )
        .bind(status.as_str())
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Candidate::try_from).transpose()
    }

    async fn delete_candidate(&self, owner: Uuid, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM candidates WHERE id = $1 AND referred_by = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
