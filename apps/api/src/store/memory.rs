use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use referhub_models::{Candidate, CandidateQuery, CandidateStats, CandidateStatus, NewCandidate};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{email_taken, NewUser, Store};
use crate::errors::AppError;
use crate::models::user::{SessionRow, UserRow};

/// Process-local store. Data is lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<Uuid, UserRow>>,
    sessions: RwLock<HashMap<String, SessionRow>>,
    candidates: RwLock<Vec<Candidate>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(&self, user: NewUser<'_>) -> Result<UserRow, AppError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(email_taken());
        }

        let row = UserRow {
            id: Uuid::new_v4(),
            email: user.email.to_string(),
            full_name: user.full_name.to_string(),
            password_hash: user.password_hash.to_string(),
            created_at: Utc::now(),
        };
        users.insert(row.id, row.clone());
        Ok(row)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRow>, AppError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn create_session(&self, session: SessionRow) -> Result<(), AppError> {
        self.sessions
            .write()
            .await
            .insert(session.token.clone(), session);
        Ok(())
    }

    async fn find_session_user(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<UserRow>, AppError> {
        let user_id = match self.sessions.read().await.get(token) {
            Some(session) if session.expires_at > now => session.user_id,
            _ => return Ok(None),
        };
        Ok(self.users.read().await.get(&user_id).cloned())
    }

    async fn insert_candidate(
        &self,
        owner: Uuid,
        candidate: &NewCandidate,
        resume_url: Option<String>,
    ) -> Result<Candidate, AppError> {
        let created = Candidate {
            id: Uuid::new_v4(),
            name: candidate.name.clone(),
            email: candidate.email.clone(),
            phone: candidate.phone.clone(),
            job_title: candidate.job_title.clone(),
            resume_url,
            status: CandidateStatus::Pending,
            referred_by: owner,
            created_at: Utc::now(),
        };
        self.candidates.write().await.push(created.clone());
        Ok(created)
    }

    async fn list_candidates(
        &self,
        owner: Uuid,
        query: &CandidateQuery,
    ) -> Result<Vec<Candidate>, AppError> {
        let candidates = self.candidates.read().await;
        // Insertion order is creation order, so reversing yields newest first.
        Ok(candidates
            .iter()
            .rev()
            .filter(|c| c.referred_by == owner && query.matches(c))
            .cloned()
            .collect())
    }

    async fn candidate_stats(&self, owner: Uuid) -> Result<CandidateStats, AppError> {
        let candidates = self.candidates.read().await;
        Ok(CandidateStats::from_statuses(
            candidates
                .iter()
                .filter(|c| c.referred_by == owner)
                .map(|c| c.status),
        ))
    }

    async fn update_status(
        &self,
        owner: Uuid,
        id: Uuid,
        status: CandidateStatus,
    ) -> Result<Option<Candidate>, AppError> {
        let mut candidates = self.candidates.write().await;
        Ok(candidates
            .iter_mut()
            .find(|c| c.id == id && c.referred_by == owner)
            .map(|c| {
                c.status = status;
                c.clone()
            }))
    }

    async fn delete_candidate(&self, owner: Uuid, id: Uuid) -> Result<bool, AppError> {
        let mut candidates = self.candidates.write().await;
        let before = candidates.len();
        candidates.retain(|c| !(c.id == id && c.referred_by == owner));
        Ok(candidates.len() != before)
    }
}
