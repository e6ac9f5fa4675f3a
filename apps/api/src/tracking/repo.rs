//! Queries behind the dashboard: tracked jobs, applications, kanban and interviews.

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::job::JobRow;
use crate::tracking::interviews::extract_contacts;
use crate::tracking::models::{
    ActivityEntry, ApplicationStage, InterviewStage, JobStatus, TrackingUpdate,
};
use crate::tracking::sorting::SortSpec;

fn not_found(job_id: Uuid) -> AppError {
    AppError::NotFound(format!("Job {job_id} not found"))
}

pub async fn list_tracked(pool: &PgPool, sort: &SortSpec) -> Result<Vec<JobRow>, AppError> {
    let sql = format!(
        "SELECT * FROM jobs WHERE status = $1 ORDER BY {}",
        sort.order_by()
    );
    let mut jobs = sqlx::query_as::<_, JobRow>(&sql)
        .bind(JobStatus::Tracked.as_str())
        .fetch_all(pool)
        .await?;
    sort.apply_in_memory(&mut jobs);
    Ok(jobs)
}

pub async fn get_job(pool: &PgPool, job_id: Uuid) -> Result<JobRow, AppError> {
    sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = $1")
        .bind(job_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| not_found(job_id))
}

/// Marks a job applied. The first application date is kept on repeat calls.
pub async fn apply(pool: &PgPool, job_id: Uuid) -> Result<JobRow, AppError> {
    sqlx::query_as::<_, JobRow>(
        r#"
        UPDATE jobs
        SET status = $2,
            application_status = $3,
            date_applied = COALESCE(date_applied, now()),
            updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(job_id)
    .bind(JobStatus::Applied.as_str())
    .bind(ApplicationStage::Applied.as_str())
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| not_found(job_id))
}

pub async fn archive(pool: &PgPool, job_id: Uuid) -> Result<JobRow, AppError> {
    sqlx::query_as::<_, JobRow>(
        r#"
        UPDATE jobs
        SET status = $2, date_archived = now(), updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(job_id)
    .bind(JobStatus::Archived.as_str())
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| not_found(job_id))
}

/// Applied, non-archived jobs, optionally narrowed to one stage.
pub async fn list_applications(
    pool: &PgPool,
    stage: Option<ApplicationStage>,
    sort: &SortSpec,
) -> Result<Vec<JobRow>, AppError> {
    let sql = format!(
        r#"
        SELECT * FROM jobs
        WHERE date_applied IS NOT NULL
          AND date_archived IS NULL
          AND ($1::text IS NULL OR application_status = $1)
        ORDER BY {}
        "#,
        sort.order_by()
    );
    let mut jobs = sqlx::query_as::<_, JobRow>(&sql)
        .bind(stage.map(|s| s.as_str()))
        .fetch_all(pool)
        .await?;
    sort.apply_in_memory(&mut jobs);
    Ok(jobs)
}

pub async fn update_stage(
    pool: &PgPool,
    job_id: Uuid,
    stage: ApplicationStage,
) -> Result<JobRow, AppError> {
    sqlx::query_as::<_, JobRow>(
        r#"
        UPDATE jobs
        SET application_status = $2, current_interview_stage = $2, updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(job_id)
    .bind(stage.as_str())
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| not_found(job_id))
}

/// `[2026-10-19 14:05 UTC] note`
pub fn note_entry(note: &str, at: DateTime<Utc>) -> String {
    format!("[{}] {}", at.format("%Y-%m-%d %H:%M UTC"), note.trim())
}

/// Appends a note, separated from earlier notes by a blank line.
pub async fn add_note(pool: &PgPool, job_id: Uuid, note: &str) -> Result<JobRow, AppError> {
    let entry = note_entry(note, Utc::now());
    sqlx::query_as::<_, JobRow>(
        r#"
        UPDATE jobs
        SET application_notes = CASE
                WHEN application_notes IS NULL OR application_notes = '' THEN $2
                ELSE application_notes || E'\n\n' || $2
            END,
            updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(job_id)
    .bind(entry)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| not_found(job_id))
}

/// Partial update: every absent field keeps its stored value.
pub async fn update_tracking(
    pool: &PgPool,
    job_id: Uuid,
    u: &TrackingUpdate,
) -> Result<JobRow, AppError> {
    sqlx::query_as::<_, JobRow>(
        r#"
        UPDATE jobs SET
            next_steps = COALESCE($2, next_steps),
            follow_up_date = COALESCE($3, follow_up_date),
            recruiter_name = COALESCE($4, recruiter_name),
            recruiter_email = COALESCE($5, recruiter_email),
            recruiter_interview_date = COALESCE($6, recruiter_interview_date),
            hiring_manager_name = COALESCE($7, hiring_manager_name),
            hiring_manager_email = COALESCE($8, hiring_manager_email),
            hiring_manager_interview_date = COALESCE($9, hiring_manager_interview_date),
            technical_interview_date = COALESCE($10, technical_interview_date),
            panel_interview_date = COALESCE($11, panel_interview_date),
            take_home_assignment_due_date = COALESCE($12, take_home_assignment_due_date),
            offer_received_date = COALESCE($13, offer_received_date),
            offer_details = COALESCE($14, offer_details),
            offer_status = COALESCE($15, offer_status),
            next_step_due_date = COALESCE($16, next_step_due_date),
            next_step_defined = COALESCE($17, next_step_defined),
            strategic_interview_angle = COALESCE($18, strategic_interview_angle),
            strategic_leverage = COALESCE($19, strategic_leverage),
            updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(job_id)
    .bind(&u.next_steps)
    .bind(u.follow_up_date)
    .bind(&u.recruiter_name)
    .bind(&u.recruiter_email)
    .bind(u.recruiter_interview_date)
    .bind(&u.hiring_manager_name)
    .bind(&u.hiring_manager_email)
    .bind(u.hiring_manager_interview_date)
    .bind(u.technical_interview_date)
    .bind(u.panel_interview_date)
    .bind(u.take_home_assignment_due_date)
    .bind(u.offer_received_date)
    .bind(&u.offer_details)
    .bind(&u.offer_status)
    .bind(u.next_step_due_date)
    .bind(u.next_step_defined)
    .bind(&u.strategic_interview_angle)
    .bind(&u.strategic_leverage)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| not_found(job_id))
}

/// Applied, non-archived jobs for the kanban board and interview views.
pub async fn list_active_applications(pool: &PgPool) -> Result<Vec<JobRow>, AppError> {
    let jobs = sqlx::query_as::<_, JobRow>(
        r#"
        SELECT * FROM jobs
        WHERE date_applied IS NOT NULL AND date_archived IS NULL
        ORDER BY date_applied DESC
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(jobs)
}

/// Appends a stage and recomputes `contacts` from the full stage list.
pub async fn add_interview_stage(
    pool: &PgPool,
    job_id: Uuid,
    stage: InterviewStage,
) -> Result<JobRow, AppError> {
    let mut tx = pool.begin().await?;

    let Json(mut stages) = sqlx::query_scalar::<_, Json<Vec<InterviewStage>>>(
        "SELECT interview_stages FROM jobs WHERE id = $1 FOR UPDATE",
    )
    .bind(job_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| not_found(job_id))?;

    stages.push(stage);
    let contacts = extract_contacts(&stages);

    let job = sqlx::query_as::<_, JobRow>(
        r#"
        UPDATE jobs
        SET interview_stages = $2, contacts = $3, updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(job_id)
    .bind(Json(&stages))
    .bind(Json(&contacts))
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(job)
}

/// Prepends an entry so the log reads newest first.
pub async fn prepend_activity(
    pool: &PgPool,
    job_id: Uuid,
    entry: ActivityEntry,
) -> Result<JobRow, AppError> {
    sqlx::query_as::<_, JobRow>(
        r#"
        UPDATE jobs
        SET activity_log = $2::jsonb || activity_log, updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(job_id)
    .bind(Json(vec![entry]))
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| not_found(job_id))
}
