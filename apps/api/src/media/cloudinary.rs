//! Cloudinary media client: hosts uploaded resume files.
//!
//! The three credentials are read once from the environment at startup and
//! never validated there. An upload with missing credentials fails at call
//! time with `StorageError::NotConfigured`.

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use super::{sanitize_file_name, ResumeStorage, ResumeUpload, StorageError, StoredResume};
use crate::config::optional_env;

const DEFAULT_API_BASE: &str = "https://api.cloudinary.com/v1_1";
const RESUME_FOLDER: &str = "referhub/resumes";

#[derive(Clone, Default)]
pub struct CloudinaryConfig {
    pub cloud_name: Option<String>,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
}

impl fmt::Debug for CloudinaryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudinaryConfig")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key.as_ref().map(|_| "<set>"))
            .field("api_secret", &self.api_secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl CloudinaryConfig {
    pub fn from_env() -> Self {
        let config = CloudinaryConfig {
            cloud_name: optional_env("CLOUDINARY_CLOUD_NAME"),
            api_key: optional_env("CLOUDINARY_API_KEY"),
            api_secret: optional_env("CLOUDINARY_API_SECRET"),
        };
        info!(
            "Cloudinary configured for cloud: {}",
            config.cloud_name.as_deref().unwrap_or("<unset>")
        );
        config
    }

    fn credentials(&self) -> Result<(&str, &str, &str), StorageError> {
        match (&self.cloud_name, &self.api_key, &self.api_secret) {
            (Some(cloud), Some(key), Some(secret)) => Ok((cloud, key, secret)),
            _ => Err(StorageError::NotConfigured(
                "CLOUDINARY_CLOUD_NAME, CLOUDINARY_API_KEY and CLOUDINARY_API_SECRET must all be set"
                    .to_string(),
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CloudinaryError {
    error: CloudinaryErrorBody,
}

#[derive(Debug, Deserialize)]
struct CloudinaryErrorBody {
    message: String,
}

/// Signed-upload client for the Cloudinary upload API.
#[derive(Clone)]
pub struct CloudinaryClient {
    client: Client,
    config: CloudinaryConfig,
    api_base: String,
}

impl CloudinaryClient {
    pub fn new(config: CloudinaryConfig) -> Self {
        Self {
            client: Client::new(),
            config,
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    /// Points the client at another API root (a local mock, a proxy).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    fn upload_url(&self, cloud_name: &str) -> String {
        format!("{}/{cloud_name}/auto/upload", self.api_base)
    }
}

/// Cloudinary request signature: parameters sorted by name, joined as
/// `k=v&k=v`, secret appended, SHA-256 hex digest.
pub fn sign_params(params: &BTreeMap<&str, String>, api_secret: &str) -> String {
    let to_sign = params
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    let digest = Sha256::digest(format!("{to_sign}{api_secret}").as_bytes());
    hex::encode(digest)
}

#[async_trait]
impl ResumeStorage for CloudinaryClient {
    async fn upload(&self, upload: ResumeUpload) -> Result<StoredResume, StorageError> {
        let (cloud_name, api_key, api_secret) = self.config.credentials()?;

        let mut params = BTreeMap::new();
        params.insert("folder", RESUME_FOLDER.to_string());
        params.insert("timestamp", chrono::Utc::now().timestamp().to_string());
        let signature = sign_params(&params, api_secret);

        let mut file = Part::bytes(upload.bytes.to_vec()).file_name(sanitize_file_name(&upload.file_name));
        if let Some(content_type) = upload.content_type.as_deref() {
            file = file.mime_str(content_type)?;
        }

        let form = params
            .into_iter()
            .fold(Form::new(), |form, (k, v)| form.text(k, v))
            .text("api_key", api_key.to_string())
            .text("signature", signature)
            .text("signature_algorithm", "sha256")
            .part("file", file);

        let response = self
            .client
            .post(self.upload_url(cloud_name))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<CloudinaryError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(StorageError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let uploaded: UploadResponse = response.json().await?;
        debug!(
            "Cloudinary upload stored {} as {}",
            upload.file_name,
            uploaded.public_id.as_deref().unwrap_or("<unknown>")
        );

        Ok(StoredResume {
            url: uploaded.secure_url,
        })
    }

    fn backend(&self) -> &'static str {
        "cloudinary"
    }
}
