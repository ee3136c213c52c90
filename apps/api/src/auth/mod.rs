//! Password hashing, bearer token issuance and the authenticated-user extractor.

pub mod handlers;

use anyhow::Result;
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use chrono::{Duration, Utc};
use rand::Rng;
use tracing::warn;

use crate::errors::AppError;
use crate::models::user::{SessionRow, UserRow};
use crate::state::AppState;

/// Hashes a password with Argon2id and a random salt. CPU-heavy; call from
/// `spawn_blocking`.
pub fn hash_password(password: &str) -> Result<String> {
    let salt_bytes: [u8; 16] = rand::rng().random();
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| anyhow::anyhow!("Failed to encode salt: {e}"))?;

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}

/// Returns false for a wrong password and for a malformed stored hash.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    PasswordHash::new(stored_hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

/// Generates an opaque bearer token (64 character hex string).
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    hex::encode(bytes)
}

/// Creates and persists a session for `user`, returning its token.
pub async fn issue_session(state: &AppState, user: &UserRow) -> Result<String, AppError> {
    let now = Utc::now();
    let token = generate_token();
    state
        .store
        .create_session(SessionRow {
            token: token.clone(),
            user_id: user.id,
            created_at: now,
            expires_at: now + Duration::hours(state.config.session_ttl_hours),
        })
        .await?;
    Ok(token)
}

/// Extracts the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// The user behind the request's bearer token. Rejects with 401 when the
/// header is missing or the session is unknown or expired.
#[derive(Debug, Clone)]
pub struct AuthUser(pub UserRow);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(&parts.headers) else {
            warn!("token missing, authentication denied");
            return Err(AppError::Unauthorized);
        };

        match state.store.find_session_user(token, Utc::now()).await? {
            Some(user) => Ok(AuthUser(user)),
            None => {
                warn!("unknown or expired token, authentication denied");
                Err(AppError::Unauthorized)
            }
        }
    }
}
