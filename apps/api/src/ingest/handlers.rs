use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequestParts, Path, State},
    http::{request::Parts, StatusCode},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use crate::errors::AppError;
use crate::ingest::models::{BatchSummary, IngestJobRequest};
use crate::ingest::pipeline::{ingest_batch, ingest_job, retry_enrichment};
use crate::models::job::JobRow;
use crate::state::AppState;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Proof that the request carried the extension's shared key.
pub struct ExtensionKey;

#[async_trait]
impl FromRequestParts<AppState> for ExtensionKey {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let provided = parts
            .headers
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok());
        if provided == Some(state.config.extension_api_key.as_str()) {
            Ok(ExtensionKey)
        } else {
            warn!("Rejected ingest request with missing or wrong API key");
            Err(AppError::Unauthorized)
        }
    }
}

#[derive(Serialize)]
pub struct IngestJobResponse {
    pub success: bool,
    pub job: JobRow,
}

fn parse_json_body(body: &Bytes) -> Result<Value, AppError> {
    serde_json::from_slice(body).map_err(|_| AppError::Validation("Invalid JSON body".to_string()))
}

/// POST /api/ingest-job
pub async fn handle_ingest_job(
    _key: ExtensionKey,
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<IngestJobResponse>, AppError> {
    let request: IngestJobRequest = serde_json::from_value(parse_json_body(&body)?)
        .map_err(|_| AppError::Validation("Missing required fields".to_string()))?;
    let job = ingest_job(&state, request).await?;
    Ok(Json(IngestJobResponse { success: true, job }))
}

/// 200 when every item went in, 207 on a mix, 409 when everything was a
/// duplicate, 500 when nothing went in for any other reason.
pub fn batch_status(summary: &BatchSummary) -> StatusCode {
    if summary.failed == 0 {
        StatusCode::OK
    } else if summary.successful > 0 {
        StatusCode::MULTI_STATUS
    } else if summary.all_duplicates() {
        StatusCode::CONFLICT
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// POST /api/ingest-jobs-batch
pub async fn handle_ingest_batch(
    _key: ExtensionKey,
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<BatchSummary>), AppError> {
    let Value::Array(items) = parse_json_body(&body)? else {
        return Err(AppError::Validation(
            "Request body must be an array of jobs".to_string(),
        ));
    };
    let summary = ingest_batch(&state, &items).await?;
    Ok((batch_status(&summary), Json(summary)))
}

/// POST /api/jobs/:id/enrich
pub async fn handle_retry_enrichment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<JobRow>, AppError> {
    Ok(Json(retry_enrichment(&state, id).await?))
}
