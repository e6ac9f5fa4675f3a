//! Ingestion pipeline: validate → dedupe → enrich → normalize → insert.

use serde_json::{json, Value};
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::errors::{map_unique_violation, AppError};
use crate::ingest::dedup::{
    find_existing_urls, find_id_by_company_and_title, find_id_by_url, partition_batch,
};
use crate::ingest::enrich::JobEnricher;
use crate::ingest::html::{visible_text, MAX_PAGE_TEXT_CHARS};
use crate::ingest::models::{
    BatchItemResult, BatchJobInput, BatchSummary, Enrichment, EnrichmentInput, IngestJobRequest,
};
use crate::ingest::normalize::normalize_url;
use crate::ingest::queue::enqueue;
use crate::ingest::validation::validate_batch;
use crate::models::job::JobRow;
use crate::state::AppState;
use crate::tracking::models::JobStatus;

const DEFAULT_SOURCE: &str = "unknown";

/// Result of one worker pass over a queued job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrichmentOutcome {
    Enriched,
    /// Failed, attempts remain; the caller re-queues.
    Retry,
    /// Failed for the last time; row is now `enrichment_failed`.
    Failed,
    /// Row missing or no longer pending.
    Skipped,
}

/// Handles `POST /api/ingest-job`: one captured page, enriched synchronously.
pub async fn ingest_job(state: &AppState, request: IngestJobRequest) -> Result<JobRow, AppError> {
    let html = request.html.filter(|h| !h.trim().is_empty());
    let url = request
        .url
        .map(|u| normalize_url(&u))
        .filter(|u| !u.is_empty());
    let (Some(html), Some(url)) = (html, url) else {
        return Err(AppError::Validation("Missing required fields".to_string()));
    };
    let source = request
        .source
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_SOURCE.to_string());

    if let Some(existing_id) = find_id_by_url(&state.db, &url).await? {
        info!(job_post_url = %url, "Duplicate job_post_url, skipping");
        return Err(AppError::Conflict {
            message: "Duplicate job_post_url".to_string(),
            existing_id: Some(existing_id),
        });
    }

    let enrichment = analyze_page(state.enricher.as_ref(), &url, &html).await?;

    if let Some(company) = enrichment.company_name.as_deref() {
        if let Some(existing_id) =
            find_id_by_company_and_title(&state.db, company, enrichment.job_title.as_deref())
                .await?
        {
            info!(job_post_url = %url, company, "Posting already tracked under another URL");
            return Err(AppError::Conflict {
                message: "Duplicate job posting for this company and title".to_string(),
                existing_id: Some(existing_id),
            });
        }
    }

    let job = insert_enriched(
        &state.db,
        &url,
        &source,
        &html,
        &enrichment,
        state.enricher.version(),
    )
    .await?;

    info!(job_id = %job.id, job_post_url = %job.job_post_url, "Ingested job");
    Ok(job)
}

/// Reduces the page to text and runs full extraction over it.
pub async fn analyze_page(
    enricher: &dyn JobEnricher,
    url: &str,
    html: &str,
) -> Result<Enrichment, AppError> {
    let page_text = visible_text(html, MAX_PAGE_TEXT_CHARS);
    if page_text.is_empty() {
        return Err(AppError::Validation(
            "Job post HTML contains no readable text".to_string(),
        ));
    }
    enricher
        .enrich(&EnrichmentInput::Page {
            url: url.to_string(),
            page_text,
        })
        .await
}

async fn insert_enriched(
    pool: &PgPool,
    url: &str,
    source: &str,
    raw_html: &str,
    e: &Enrichment,
    ai_version: &str,
) -> Result<JobRow, AppError> {
    sqlx::query_as::<_, JobRow>(
        r#"
        INSERT INTO jobs
            (job_post_url, source, raw_html, company_name, job_title, salary, overview,
             hiring_manager, required_experience, skills_sought, company_insights,
             ideal_candidate, company_industry, tech_stack, ai_resume_tips,
             ai_tailored_summary, ai_status_score, red_flags, strategy_notes,
             ai_version, status, enriched_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15,
                $16, $17, $18, $19, $20, $21, now())
        RETURNING *
        "#,
    )
    .bind(url)
    .bind(source)
    .bind(raw_html)
    .bind(&e.company_name)
    .bind(&e.job_title)
    .bind(&e.salary)
    .bind(&e.overview)
    .bind(&e.hiring_manager)
    .bind(&e.required_experience)
    .bind(&e.skills_sought)
    .bind(&e.company_insights)
    .bind(&e.ideal_candidate)
    .bind(&e.company_industry)
    .bind(&e.tech_stack)
    .bind(e.ai_resume_tips.clone().map(Json))
    .bind(&e.ai_tailored_summary)
    .bind(e.ai_status_score)
    .bind(&e.red_flags)
    .bind(&e.strategy_notes)
    .bind(ai_version)
    .bind(JobStatus::Tracked.as_str())
    .fetch_one(pool)
    .await
    .map_err(|err| map_unique_violation(err, "Duplicate job_post_url"))
}

/// Handles `POST /api/ingest-jobs-batch`. Validation failures reject the
/// whole batch; after that every item gets its own success/error result.
pub async fn ingest_batch(state: &AppState, items: &[Value]) -> Result<BatchSummary, AppError> {
    let jobs = validate_batch(items).map_err(|issues| {
        warn!(?issues, "Validation failed for job payload");
        AppError::InvalidPayload {
            message: "Validation error".to_string(),
            details: json!(issues),
        }
    })?;

    let processed = jobs.len();
    let jobs: Vec<BatchJobInput> = jobs.into_iter().map(BatchJobInput::trimmed).collect();
    let urls: Vec<String> = jobs.iter().map(|j| normalize_url(&j.job_post_url)).collect();
    let existing = find_existing_urls(&state.db, &urls).await?;

    let (fresh, mut results) = partition_batch(jobs, &existing);

    let mut inserted_ids = Vec::with_capacity(fresh.len());
    for job in fresh {
        match insert_pending(&state.db, &job).await {
            Ok(id) => {
                inserted_ids.push(id);
                results.push(BatchItemResult::success(
                    job.job_post_url,
                    job.company_name,
                    id,
                ));
            }
            Err(err) => {
                let result = match map_unique_violation(err, "Duplicate job_post_url") {
                    AppError::Conflict { .. } => {
                        BatchItemResult::duplicate(job.job_post_url, job.company_name)
                    }
                    other => {
                        error!(job_post_url = %job.job_post_url, "Insert failed: {other}");
                        BatchItemResult::failure(
                            job.job_post_url,
                            job.company_name,
                            "Insert failed".to_string(),
                        )
                    }
                };
                results.push(result);
            }
        }
    }

    if let Err(e) = enqueue(&state.redis, &inserted_ids).await {
        // Rows stay pending and are re-queued when the worker restarts.
        error!(count = inserted_ids.len(), "Failed to queue jobs for enrichment: {e}");
    }

    let summary = BatchSummary::from_results(processed, results);
    info!(
        processed = summary.processed,
        successful = summary.successful,
        failed = summary.failed,
        "Batch ingest finished"
    );
    Ok(summary)
}

async fn insert_pending(pool: &PgPool, job: &BatchJobInput) -> Result<Uuid, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        INSERT INTO jobs
            (job_post_url, job_title, company_name, company_url, company_linkedin_slug,
             job_description, salary, source, status)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING id
        "#,
    )
    .bind(&job.job_post_url)
    .bind(&job.job_title)
    .bind(&job.company_name)
    .bind(&job.company_url)
    .bind(&job.company_linkedin_slug)
    .bind(&job.job_description)
    .bind(&job.salary)
    .bind(&job.source)
    .bind(JobStatus::PendingEnrichment.as_str())
    .fetch_one(pool)
    .await
}

/// What a failed attempt leads to, given the attempt count after the failure.
pub fn failure_outcome(attempts: i32, max_attempts: i32) -> EnrichmentOutcome {
    if attempts < max_attempts {
        EnrichmentOutcome::Retry
    } else {
        EnrichmentOutcome::Failed
    }
}

/// One worker pass: analyze a pending scraped job and record the result.
pub async fn enrich_pending_job(
    state: &AppState,
    job_id: Uuid,
) -> Result<EnrichmentOutcome, AppError> {
    let Some(job) = fetch_job(&state.db, job_id).await? else {
        return Ok(EnrichmentOutcome::Skipped);
    };
    if job.status != JobStatus::PendingEnrichment.as_str() {
        return Ok(EnrichmentOutcome::Skipped);
    }

    let input = EnrichmentInput::Scraped {
        job_title: job.job_title.clone(),
        company_name: job.company_name.clone(),
        salary: job.salary.clone(),
        job_description: job.job_description.clone().unwrap_or_default(),
    };

    match state.enricher.enrich(&input).await {
        Ok(enrichment) => {
            apply_enrichment(&state.db, job_id, &enrichment, state.enricher.version()).await?;
            info!(job_id = %job_id, "Job enriched");
            Ok(EnrichmentOutcome::Enriched)
        }
        Err(e) => {
            let attempts = job.enrichment_attempts + 1;
            let outcome = failure_outcome(attempts, state.config.enrichment_max_attempts);
            let status = match outcome {
                EnrichmentOutcome::Failed => JobStatus::EnrichmentFailed,
                _ => JobStatus::PendingEnrichment,
            };
            warn!(job_id = %job_id, attempts, "Enrichment attempt failed: {e}");
            sqlx::query(
                r#"
                UPDATE jobs
                SET enrichment_attempts = $2, enrichment_error = $3, status = $4, updated_at = now()
                WHERE id = $1 AND status = 'pending_enrichment'
                "#,
            )
            .bind(job_id)
            .bind(attempts)
            .bind(e.to_string())
            .bind(status.as_str())
            .execute(&state.db)
            .await?;
            Ok(outcome)
        }
    }
}

/// Writes analysis fields. Scraped identity fields and a scraped salary win
/// over anything the model returned.
async fn apply_enrichment(
    pool: &PgPool,
    job_id: Uuid,
    e: &Enrichment,
    ai_version: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE jobs SET
            company_name = COALESCE(company_name, $2),
            job_title = COALESCE(job_title, $3),
            salary = COALESCE(salary, $4),
            overview = $5,
            hiring_manager = $6,
            required_experience = $7,
            skills_sought = $8,
            company_insights = $9,
            ideal_candidate = $10,
            company_industry = $11,
            tech_stack = $12,
            ai_resume_tips = $13,
            ai_tailored_summary = $14,
            ai_status_score = $15,
            red_flags = $16,
            strategy_notes = $17,
            ai_version = $18,
            status = $19,
            enrichment_error = NULL,
            enriched_at = now(),
            updated_at = now()
        WHERE id = $1 AND status = 'pending_enrichment'
        "#,
    )
    .bind(job_id)
    .bind(&e.company_name)
    .bind(&e.job_title)
    .bind(&e.salary)
    .bind(&e.overview)
    .bind(&e.hiring_manager)
    .bind(&e.required_experience)
    .bind(&e.skills_sought)
    .bind(&e.company_insights)
    .bind(&e.ideal_candidate)
    .bind(&e.company_industry)
    .bind(&e.tech_stack)
    .bind(e.ai_resume_tips.clone().map(Json))
    .bind(&e.ai_tailored_summary)
    .bind(e.ai_status_score)
    .bind(&e.red_flags)
    .bind(&e.strategy_notes)
    .bind(ai_version)
    .bind(JobStatus::Tracked.as_str())
    .execute(pool)
    .await?;
    Ok(())
}

/// Handles `POST /api/jobs/:id/enrich`: puts a stuck or failed row back in the queue.
pub async fn retry_enrichment(state: &AppState, job_id: Uuid) -> Result<JobRow, AppError> {
    let job = fetch_job(&state.db, job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?;

    let retryable = [JobStatus::PendingEnrichment, JobStatus::EnrichmentFailed]
        .iter()
        .any(|s| s.as_str() == job.status);
    if !retryable {
        return Err(AppError::UnprocessableEntity(format!(
            "Job {job_id} has status '{}' and cannot be re-enriched",
            job.status
        )));
    }

    let job = sqlx::query_as::<_, JobRow>(
        r#"
        UPDATE jobs
        SET status = $2, enrichment_attempts = 0, enrichment_error = NULL, updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(job_id)
    .bind(JobStatus::PendingEnrichment.as_str())
    .fetch_one(&state.db)
    .await?;

    enqueue(&state.redis, &[job_id]).await?;
    info!(job_id = %job_id, "Job re-queued for enrichment");
    Ok(job)
}

async fn fetch_job(pool: &PgPool, job_id: Uuid) -> Result<Option<JobRow>, sqlx::Error> {
    sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = $1")
        .bind(job_id)
        .fetch_optional(pool)
        .await
}
