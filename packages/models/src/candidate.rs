use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

// ────────────────────────────────────────────────────────────────────────────
// Status
// ────────────────────────────────────────────────────────────────────────────

/// Review status of a referred candidate. There is no fourth state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CandidateStatus {
    #[default]
    Pending,
    Reviewed,
    Hired,
}

impl CandidateStatus {
    pub const ALL: [CandidateStatus; 3] = [
        CandidateStatus::Pending,
        CandidateStatus::Reviewed,
        CandidateStatus::Hired,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CandidateStatus::Pending => "Pending",
            CandidateStatus::Reviewed => "Reviewed",
            CandidateStatus::Hired => "Hired",
        }
    }
}

impl fmt::Display for CandidateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid candidate status '{0}' (expected Pending, Reviewed or Hired)")]
pub struct ParseStatusError(pub String);

impl FromStr for CandidateStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CandidateStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ParseStatusError(s.to_string()))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Candidate records
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub job_title: String,
    pub resume_url: Option<String>,
    pub status: CandidateStatus,
    pub referred_by: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Text fields submitted when referring a candidate. The resume travels
/// separately as a multipart file part.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCandidate {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub job_title: String,
}

impl NewCandidate {
    /// Returns the wire name of the first required field that is blank.
    pub fn first_missing_field(&self) -> Option<&'static str> {
        [
            ("name", &self.name),
            ("email", &self.email),
            ("phone", &self.phone),
            ("job_title", &self.job_title),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: CandidateStatus,
}

// ────────────────────────────────────────────────────────────────────────────
// Query & stats
// ────────────────────────────────────────────────────────────────────────────

/// Filter criteria for the candidate list. Absent fields are left out of the
/// query string entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_filter: Option<CandidateStatus>,
}

impl CandidateQuery {
    pub fn new(search: impl Into<String>, status_filter: Option<CandidateStatus>) -> Self {
        let search = search.into();
        Self {
            search: (!search.is_empty()).then_some(search),
            status_filter,
        }
    }

    /// Case-insensitive match of the search term against name and job title,
    /// combined with the status filter.
    pub fn matches(&self, candidate: &Candidate) -> bool {
        if let Some(status) = self.status_filter {
            if candidate.status != status {
                return false;
            }
        }
        match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                let term = term.to_lowercase();
                candidate.name.to_lowercase().contains(&term)
                    || candidate.job_title.to_lowercase().contains(&term)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateStats {
    pub total: u64,
    pub pending: u64,
    pub reviewed: u64,
    pub hired: u64,
}

impl CandidateStats {
    pub fn from_statuses<I>(statuses: I) -> Self
    where
        I: IntoIterator<Item = CandidateStatus>,
    {
        statuses
            .into_iter()
            .fold(CandidateStats::default(), |mut stats, status| {
                stats.total += 1;
                match status {
                    CandidateStatus::Pending => stats.pending += 1,
                    CandidateStatus::Reviewed => stats.reviewed += 1,
                    CandidateStatus::Hired => stats.hired += 1,
                }
                stats
            })
    }
}
