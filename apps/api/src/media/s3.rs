use async_trait::async_trait;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::primitives::ByteStream;
use tracing::info;
use uuid::Uuid;

use super::{sanitize_file_name, ResumeStorage, ResumeUpload, StorageError, StoredResume};
use crate::config::S3Config;

/// Resume storage backed by an S3-compatible bucket (MinIO locally, AWS in production).
#[derive(Clone)]
pub struct S3ResumeStorage {
    client: aws_sdk_s3::Client,
    bucket: String,
    endpoint: String,
}

impl S3ResumeStorage {
    pub async fn from_config(config: &S3Config) -> Self {
        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "referhub-static",
        );

        let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .credentials_provider(credentials)
            .endpoint_url(&config.endpoint)
            .load()
            .await;

        // MinIO only serves path-style bucket addressing.
        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(true)
            .build();

        Self {
            client: aws_sdk_s3::Client::from_conf(s3_config),
            bucket: config.bucket.clone(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
        }
    }

    fn object_key(file_name: &str) -> String {
        format!("resumes/{}/{}", Uuid::new_v4(), sanitize_file_name(file_name))
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}/{}", self.endpoint, self.bucket, key)
    }
}

#[async_trait]
impl ResumeStorage for S3ResumeStorage {
    async fn upload(&self, upload: ResumeUpload) -> Result<StoredResume, StorageError> {
        let key = Self::object_key(&upload.file_name);
        let content_type = upload
            .content_type
            .unwrap_or_else(|| "application/octet-stream".to_string());

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(upload.bytes))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StorageError::S3(e.to_string()))?;

        info!("Uploaded resume to s3://{}/{}", self.bucket, key);

        Ok(StoredResume {
            url: self.public_url(&key),
        })
    }

    fn backend(&self) -> &'static str {
        "s3"
    }
}
