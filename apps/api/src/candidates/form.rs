//! Multipart parsing for the candidate referral form.

use axum::extract::Multipart;
use referhub_models::NewCandidate;
use tracing::debug;

use crate::errors::AppError;
use crate::media::ResumeUpload;

/// A parsed referral submission: the text fields plus an optional resume.
#[derive(Debug)]
pub struct ReferralForm {
    pub candidate: NewCandidate,
    pub resume: Option<ResumeUpload>,
}

impl ReferralForm {
    /// Reads every part of the body. Unknown parts are skipped; a `resume`
    /// part with no file name or no bytes counts as no resume.
    pub async fn from_multipart(
        multipart: &mut Multipart,
        max_resume_bytes: usize,
    ) -> Result<Self, AppError> {
        let mut candidate = NewCandidate::default();
        let mut resume = None;

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "name" => candidate.name = field.text().await?.trim().to_string(),
                "email" => candidate.email = field.text().await?.trim().to_string(),
                "phone" => candidate.phone = field.text().await?.trim().to_string(),
                "job_title" => candidate.job_title = field.text().await?.trim().to_string(),
                "resume" => {
                    let file_name = field.file_name().map(str::to_string);
                    let content_type = field.content_type().map(str::to_string);
                    let bytes = field.bytes().await?;

                    if bytes.len() > max_resume_bytes {
                        return Err(AppError::PayloadTooLarge(format!(
                            "Resume exceeds the {max_resume_bytes} byte limit"
                        )));
                    }
                    if let Some(file_name) = file_name.filter(|_| !bytes.is_empty()) {
                        resume = Some(ResumeUpload {
                            file_name,
                            content_type,
                            bytes,
                        });
                    }
                }
                other => debug!("Ignoring unknown multipart field '{other}'"),
            }
        }

        Ok(ReferralForm { candidate, resume })
    }

    pub fn validate(&self) -> Result<(), AppError> {
        match self.candidate.first_missing_field() {
            Some(field) => Err(AppError::Validation(format!("Field '{field}' is required"))),
            None => Ok(()),
        }
    }
}
