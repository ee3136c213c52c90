//! Axum route handlers for the Candidates API.

use axum::{
    extract::{Multipart, Query, State},
    http::StatusCode,
    Json,
};
use referhub_models::{Candidate, CandidateQuery, CandidateStats, CandidateStatus, StatusUpdate};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::candidates::form::ReferralForm;
use crate::errors::AppError;
use crate::extract::{ApiJson, ApiPath};
use crate::state::AppState;

/// Raw list query. Empty strings mean "no filter".
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub search: Option<String>,
    pub status_filter: Option<String>,
}

impl TryFrom<ListParams> for CandidateQuery {
    type Error = AppError;

    fn try_from(params: ListParams) -> Result<Self, Self::Error> {
        let status_filter = params
            .status_filter
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.trim().parse::<CandidateStatus>())
            .transpose()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        Ok(CandidateQuery::new(
            params.search.unwrap_or_default().trim(),
            status_filter,
        ))
    }
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Candidate {id} not found"))
}

/// GET /api/candidates
pub async fn handle_list_candidates(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Candidate>>, AppError> {
    let query = CandidateQuery::try_from(params)?;
    let candidates = state.store.list_candidates(user.id, &query).await?;
    Ok(Json(candidates))
}

/// GET /api/candidates/stats
pub async fn handle_candidate_stats(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<CandidateStats>, AppError> {
    Ok(Json(state.store.candidate_stats(user.id).await?))
}

/// POST /api/candidates
///
/// Multipart body: `name`, `email`, `phone`, `job_title`, optional `resume` file.
/// The resume is uploaded before the record is written, so a storage failure
/// leaves no candidate behind.
pub async fn handle_create_candidate(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Candidate>), AppError> {
    let form = ReferralForm::from_multipart(&mut multipart, state.config.max_resume_bytes).await?;
    form.validate()?;

    let resume_url = match form.resume {
        Some(upload) => {
            let file_name = upload.file_name.clone();
            let stored = state.media.upload(upload).await?;
            info!(
                "Stored resume '{file_name}' via {} at {}",
                state.media.backend(),
                stored.url
            );
            Some(stored.url)
        }
        None => None,
    };

    let candidate = state
        .store
        .insert_candidate(user.id, &form.candidate, resume_url)
        .await?;

    Ok((StatusCode::CREATED, Json(candidate)))
}

/// PUT /api/candidates/:id/status
pub async fn handle_update_status(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<StatusUpdate>,
) -> Result<Json<Candidate>, AppError> {
    let candidate = state
        .store
        .update_status(user.id, id, req.status)
        .await?
        .ok_or_else(|| not_found(id))?;

    info!("Candidate {id} moved to {}", req.status);
    Ok(Json(candidate))
}

/// DELETE /api/candidates/:id
pub async fn handle_delete_candidate(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, AppError> {
    if !state.store.delete_candidate(user.id, id).await? {
        return Err(not_found(id));
    }

    info!("Candidate {id} deleted by {}", user.id);
    Ok(StatusCode::NO_CONTENT)
}
