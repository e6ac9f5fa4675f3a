use axum::{
    extract::State,
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::Deserialize;
use tracing::{error, info};
use uuid::Uuid;

use crate::documents::cover_letter::{fill_template, CoverLetterFields, COVER_LETTER_TEMPLATE};
use crate::documents::filename::{cover_letter_filename, resume_filename};
use crate::documents::storage::{archive_cover_letter, fetch_resume};
use crate::errors::AppError;
use crate::extract::ApiQuery;
use crate::state::AppState;
use crate::tracking::repo::get_job;

#[derive(Deserialize)]
pub struct DocumentQuery {
    #[serde(rename = "jobId")]
    pub job_id: Option<String>,
}

impl DocumentQuery {
    fn job_id(&self) -> Result<Uuid, AppError> {
        let raw = self
            .job_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::Validation("Missing jobId".to_string()))?;
        // A malformed id cannot name a stored job.
        Uuid::parse_str(raw).map_err(|_| AppError::NotFound("Job not found".to_string()))
    }
}

fn pdf_attachment(body: impl IntoResponse, filename: &str) -> Result<Response, AppError> {
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{filename}\""))
        .map_err(|e| anyhow::anyhow!("Invalid attachment filename: {e}"))?;
    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/pdf")),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

/// GET /api/generate-resume?jobId=
pub async fn handle_generate_resume(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<DocumentQuery>,
) -> Result<Response, AppError> {
    let job = get_job(&state.db, params.job_id()?).await?;
    let pdf = fetch_resume(&state.s3, &state.config.s3_bucket, &state.config.resume_s3_key).await?;
    let filename = resume_filename(&state.profile.name, job.company_name.as_deref());
    info!(job_id = %job.id, %filename, "Serving resume");
    pdf_attachment(pdf, &filename)
}

/// GET /api/generate-cover-letter?jobId=
pub async fn handle_generate_cover_letter(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<DocumentQuery>,
) -> Result<Response, AppError> {
    let job = get_job(&state.db, params.job_id()?).await?;

    let html = fill_template(
        COVER_LETTER_TEMPLATE,
        &CoverLetterFields {
            candidate_name: &state.profile.name,
            company_name: job.company_name.as_deref(),
            job_title: job.job_title.as_deref(),
            date: Utc::now(),
        },
    );
    let pdf = state.renderer.render(&html).await?;

    if let Err(e) =
        archive_cover_letter(&state.s3, &state.config.s3_bucket, job.id, pdf.clone()).await
    {
        error!(job_id = %job.id, "Failed to archive cover letter: {e}");
    }

    let filename = cover_letter_filename(&state.profile.name, job.company_name.as_deref());
    info!(job_id = %job.id, %filename, "Serving cover letter");
    pdf_attachment(pdf, &filename)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_id_required() {
        let missing = DocumentQuery { job_id: None };
        assert!(matches!(missing.job_id(), Err(AppError::Validation(_))));

        let blank = DocumentQuery {
            job_id: Some("  ".to_string()),
        };
        assert!(matches!(blank.job_id(), Err(AppError::Validation(_))));

        let malformed = DocumentQuery {
            job_id: Some("42".to_string()),
        };
        assert!(matches!(malformed.job_id(), Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_pdf_attachment_headers() {
        let response = pdf_attachment(b"%PDF".to_vec(), "Resume of Jordan - Acme.pdf").unwrap();
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"Resume of Jordan - Acme.pdf\""
        );
    }
}
