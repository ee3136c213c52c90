use chrono::{DateTime, Utc};
use referhub_models::{Candidate, CandidateStatus};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::errors::AppError;

/// Row shape of the `candidates` table. Status is stored as text and checked
/// against the enum on the way out.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CandidateRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub job_title: String,
    pub resume_url: Option<String>,
    pub status: String,
    pub referred_by: Uuid,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<CandidateRow> for Candidate {
    type Error = AppError;

    fn try_from(row: CandidateRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<CandidateStatus>()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("candidate {}: {e}", row.id)))?;

        Ok(Candidate {
            id: row.id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            job_title: row.job_title,
            resume_url: row.resume_url,
            status,
            referred_by: row.referred_by,
            created_at: row.created_at,
        })
    }
}
