use std::sync::Arc;

use crate::config::Config;
use crate::media::ResumeStorage;
use crate::store::Store;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Users, sessions and candidates. Postgres or in-memory.
    pub store: Arc<dyn Store>,
    /// Resume upload target. Cloudinary by default, S3 via `STORAGE_BACKEND=s3`.
    pub media: Arc<dyn ResumeStorage>,
    pub config: Config,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, media: Arc<dyn ResumeStorage>, config: Config) -> Self {
        Self {
            store,
            media,
            config,
        }
    }
}
