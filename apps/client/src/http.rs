//! HTTP client wrapper: the single point of entry for all ReferHub API calls.
//!
//! Every candidate call reads the bearer token from the injected
//! `SessionStore` at send time; the two auth calls send no token. No retries.

use std::path::Path;

use referhub_models::{
    AuthResponse, Candidate, CandidateQuery, CandidateStats, CandidateStatus, LoginRequest,
    NewCandidate, SignupRequest, StatusUpdate,
};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::session::{SessionError, SessionStore};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {}", .detail.as_deref().unwrap_or("no detail"))]
    Api { status: u16, detail: Option<String> },

    #[error("not signed in")]
    NotAuthenticated,

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// The server's human-readable detail, or `fallback` when there is none.
    pub fn detail_or(&self, fallback: &str) -> String {
        match self {
            ClientError::Api {
                detail: Some(detail),
                ..
            } => detail.clone(),
            _ => fallback.to_string(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// A resume attached to a referral.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ResumeFile {
    pub async fn from_path(path: &Path) -> Result<Self, ClientError> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "resume".to_string());
        Ok(Self { file_name, bytes })
    }

    /// Whether the name carries the `.pdf` hint the referral form asks for.
    pub fn has_pdf_extension(&self) -> bool {
        Path::new(&self.file_name)
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
    }

    fn content_type(&self) -> &'static str {
        if self.has_pdf_extension() {
            "application/pdf"
        } else {
            "application/octet-stream"
        }
    }
}

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    api_base: String,
    session: SessionStore,
}

impl ApiClient {
    /// `backend_origin` is the server root; requests go to `<origin>/api/...`.
    pub fn new(backend_origin: &str, session: SessionStore) -> Self {
        Self {
            client: Client::new(),
            api_base: format!("{}/api", backend_origin.trim_end_matches('/')),
            session,
        }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.api_base)
    }

    fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder, ClientError> {
        let token = self.session.token()?.ok_or(ClientError::NotAuthenticated)?;
        Ok(request.bearer_auth(token))
    }

    async fn check(response: Response) -> Result<Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| v.get("detail").and_then(Value::as_str).map(str::to_string));
        debug!("API returned {status}: {body}");
        Err(ClientError::Api {
            status: status.as_u16(),
            detail,
        })
    }

    async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ClientError> {
        let response = Self::check(request.send().await?).await?;
        Ok(response.json().await?)
    }

    /// POST /auth/login
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ClientError> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        Self::send_json(self.client.post(self.url("/auth/login")).json(&body)).await
    }

    /// POST /auth/signup
    pub async fn signup(&self, request: &SignupRequest) -> Result<AuthResponse, ClientError> {
        Self::send_json(self.client.post(self.url("/auth/signup")).json(request)).await
    }

    /// GET /candidates?search=&status_filter=
    pub async fn list_candidates(
        &self,
        query: &CandidateQuery,
    ) -> Result<Vec<Candidate>, ClientError> {
        let request = self.client.get(self.url("/candidates")).query(query);
        Self::send_json(self.authorized(request)?).await
    }

    /// GET /candidates/stats
    pub async fn stats(&self) -> Result<CandidateStats, ClientError> {
        let request = self.client.get(self.url("/candidates/stats"));
        Self::send_json(self.authorized(request)?).await
    }

    /// POST /candidates (multipart). The `resume` part is only present when a
    /// file is given.
    pub async fn create_candidate(
        &self,
        candidate: &NewCandidate,
        resume: Option<ResumeFile>,
    ) -> Result<Candidate, ClientError> {
        let mut form = Form::new()
            .text("name", candidate.name.clone())
            .text("email", candidate.email.clone())
            .text("phone", candidate.phone.clone())
            .text("job_title", candidate.job_title.clone());

        if let Some(resume) = resume {
            let content_type = resume.content_type();
            let part = Part::bytes(resume.bytes)
                .file_name(resume.file_name)
                .mime_str(content_type)?;
            form = form.part("resume", part);
        }

        let request = self.client.post(self.url("/candidates")).multipart(form);
        Self::send_json(self.authorized(request)?).await
    }

    /// PUT /candidates/{id}/status
    pub async fn update_status(
        &self,
        id: Uuid,
        status: CandidateStatus,
    ) -> Result<Candidate, ClientError> {
        let request = self
            .client
            .put(self.url(&format!("/candidates/{id}/status")))
            .json(&StatusUpdate { status });
        Self::send_json(self.authorized(request)?).await
    }

    /// DELETE /candidates/{id}
    pub async fn delete_candidate(&self, id: Uuid) -> Result<(), ClientError> {
        let request = self.client.delete(self.url(&format!("/candidates/{id}")));
        Self::check(self.authorized(request)?.send().await?).await?;
        Ok(())
    }
}
