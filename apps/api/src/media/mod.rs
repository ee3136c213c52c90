//! Resume storage: pluggable, trait-based upload target for candidate resumes.
//!
//! Default: `CloudinaryClient` (hosted media CDN, configured from env at startup).
//! Alternative: `S3ResumeStorage` (S3 / MinIO bucket), selected by `STORAGE_BACKEND=s3`.
//!
//! `AppState` holds an `Arc<dyn ResumeStorage>`.

pub mod cloudinary;
pub mod s3;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

pub use cloudinary::{CloudinaryClient, CloudinaryConfig};
pub use s3::S3ResumeStorage;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage is not configured: {0}")]
    NotConfigured(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("storage rejected upload (status {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("S3 error: {0}")]
    S3(String),
}

/// A resume file received from a client.
#[derive(Debug, Clone)]
pub struct ResumeUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// Where an uploaded resume ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredResume {
    pub url: String,
}

#[async_trait]
pub trait ResumeStorage: Send + Sync {
    async fn upload(&self, upload: ResumeUpload) -> Result<StoredResume, StorageError>;

    /// Short backend name for logs ("cloudinary" | "s3").
    fn backend(&self) -> &'static str;
}

/// Reduces a client-supplied file name to a safe object-key segment.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_matches('.');
    if cleaned.is_empty() {
        "resume".to_string()
    } else {
        cleaned.to_string()
    }
}
