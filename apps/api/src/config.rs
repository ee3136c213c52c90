use anyhow::{Context, Result};

use crate::media::cloudinary::CloudinaryConfig;

/// Which backend receives uploaded resume files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Cloudinary,
    S3,
}

/// S3 / MinIO settings, only required when `STORAGE_BACKEND=s3`.
#[derive(Debug, Clone)]
pub struct S3Config {
    pub bucket: String,
    pub endpoint: String,
    pub access_key_id: String,
    pub secret_access_key: String,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string. The in-memory store is used when unset.
    pub database_url: Option<String>,
    pub port: u16,
    pub rust_log: String,
    pub storage_backend: StorageBackend,
    pub cloudinary: CloudinaryConfig,
    pub s3: Option<S3Config>,
    pub session_ttl_hours: i64,
    pub max_resume_bytes: usize,
    /// Allowed browser origin; any origin when unset.
    pub cors_allow_origin: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database_url: None,
            port: 8000,
            rust_log: "info".to_string(),
            storage_backend: StorageBackend::Cloudinary,
            cloudinary: CloudinaryConfig::default(),
            s3: None,
            session_ttl_hours: 24 * 7,
            max_resume_bytes: 10 * 1024 * 1024,
            cors_allow_origin: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();

        let storage_backend = match optional_env("STORAGE_BACKEND").as_deref() {
            None | Some("cloudinary") => StorageBackend::Cloudinary,
            Some("s3") => StorageBackend::S3,
            Some(other) => anyhow::bail!("STORAGE_BACKEND must be 'cloudinary' or 's3', got '{other}'"),
        };

        let s3 = match storage_backend {
            StorageBackend::S3 => Some(S3Config {
                bucket: require_env("S3_BUCKET")?,
                endpoint: require_env("S3_ENDPOINT")?,
                access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
                secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            }),
            StorageBackend::Cloudinary => None,
        };

        Ok(Config {
            database_url: optional_env("DATABASE_URL"),
            port: parse_env("PORT", defaults.port)?,
            rust_log: optional_env("RUST_LOG").unwrap_or(defaults.rust_log),
            storage_backend,
            cloudinary: CloudinaryConfig::from_env(),
            s3,
            session_ttl_hours: parse_env("SESSION_TTL_HOURS", defaults.session_ttl_hours)?,
            max_resume_bytes: parse_env("MAX_RESUME_BYTES", defaults.max_resume_bytes)?,
            cors_allow_origin: optional_env("CORS_ALLOW_ORIGIN"),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

pub(crate) fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}
