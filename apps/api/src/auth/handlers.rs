//! Axum route handlers for signup and login.

use axum::{extract::State, Json};
use referhub_models::{AuthResponse, LoginRequest, SignupRequest};
use tracing::{info, warn};

use crate::auth::{hash_password, issue_session, verify_password};
use crate::errors::AppError;
use crate::extract::ApiJson;
use crate::models::user::UserRow;
use crate::state::AppState;
use crate::store::NewUser;

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_email(email: &str) -> Result<(), AppError> {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(AppError::Validation("A valid email address is required".to_string())),
    }
}

async fn auth_response(state: &AppState, user: &UserRow) -> Result<AuthResponse, AppError> {
    let access_token = issue_session(state, user).await?;
    Ok(AuthResponse {
        access_token,
        token_type: "bearer".to_string(),
        user: user.profile(),
    })
}

/// POST /api/auth/signup
pub async fn handle_signup(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<SignupRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let email = normalize_email(&req.email);
    validate_email(&email)?;
    if req.password.is_empty() {
        return Err(AppError::Validation("Password is required".to_string()));
    }
    let full_name = req.full_name.trim();
    if full_name.is_empty() {
        return Err(AppError::Validation("Full name is required".to_string()));
    }

    let password = req.password;
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AppError::Internal(e.into()))??;

    let user = state
        .store
        .create_user(NewUser {
            email: &email,
            full_name,
            password_hash: &password_hash,
        })
        .await?;

    info!("User {} signed up", user.id);
    Ok(Json(auth_response(&state, &user).await?))
}

/// POST /api/auth/login
pub async fn handle_login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let email = normalize_email(&req.email);
    let user = state.store.find_user_by_email(&email).await?;

    // Unknown emails still pay for one Argon2 run so response timing does not
    // reveal which addresses are registered.
    let password = req.password;
    let stored_hash = user.as_ref().map(|u| u.password_hash.clone());
    let valid = tokio::task::spawn_blocking(move || match stored_hash {
        Some(hash) => verify_password(&password, &hash),
        None => {
            if let Err(e) = hash_password(&password) {
                warn!("Dummy password hash failed: {e}");
            }
            false
        }
    })
    .await
    .map_err(|e| AppError::Internal(e.into()))?;

    let user = match user {
        Some(user) if valid => user,
        _ => return Err(AppError::InvalidCredentials),
    };

    info!("User {} logged in", user.id);
    Ok(Json(auth_response(&state, &user).await?))
}
