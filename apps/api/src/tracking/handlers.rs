use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::extract::{ApiJson, ApiQuery};
use crate::models::job::JobRow;
use crate::state::AppState;
use crate::tracking::interviews::{build_timeline, matches_filter, NewInterviewStage, Timeline};
use crate::tracking::kanban::{column_to_stage, group_by_column, KanbanColumn};
use crate::tracking::models::{ActivityEntry, ApplicationStage, TrackingUpdate};
use crate::tracking::repo;
use crate::tracking::sorting::{
    SortDirection, SortKey, SortSpec, APPLICATION_SORT_KEYS, TRACKED_SORT_KEYS,
};

#[derive(Deserialize)]
pub struct TrackedQuery {
    pub sort: Option<SortKey>,
    pub direction: Option<SortDirection>,
}

#[derive(Deserialize)]
pub struct ApplicationsQuery {
    pub stage: Option<String>,
    pub sort: Option<SortKey>,
    pub direction: Option<SortDirection>,
}

#[derive(Deserialize)]
pub struct InterviewsQuery {
    pub q: Option<String>,
}

#[derive(Deserialize)]
pub struct StageRequest {
    pub stage: String,
}

#[derive(Deserialize)]
pub struct NoteRequest {
    pub note: String,
}

#[derive(Deserialize)]
pub struct KanbanMoveRequest {
    pub job_id: Uuid,
    pub column: String,
}

#[derive(Deserialize)]
pub struct ActivityRequest {
    #[serde(rename = "type", default)]
    pub activity_type: String,
    #[serde(default)]
    pub notes: String,
}

fn parse_stage(raw: &str) -> Result<ApplicationStage, AppError> {
    ApplicationStage::parse(raw.trim())
        .ok_or_else(|| AppError::Validation(format!("Unknown application stage '{raw}'")))
}

/// `all` or an empty value means no stage filter.
fn stage_filter(raw: Option<&str>) -> Result<Option<ApplicationStage>, AppError> {
    match raw.map(str::trim) {
        None | Some("") | Some("all") => Ok(None),
        Some(s) => parse_stage(s).map(Some),
    }
}

/// GET /api/jobs
pub async fn handle_list_tracked(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<TrackedQuery>,
) -> Result<Json<Vec<JobRow>>, AppError> {
    let sort = SortSpec::resolve(
        params.sort,
        params.direction,
        TRACKED_SORT_KEYS,
        SortKey::CreatedAt,
    )?;
    Ok(Json(repo::list_tracked(&state.db, &sort).await?))
}

/// GET /api/jobs/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<JobRow>, AppError> {
    Ok(Json(repo::get_job(&state.db, id).await?))
}

/// POST /api/jobs/:id/apply
pub async fn handle_apply(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<JobRow>, AppError> {
    let job = repo::apply(&state.db, id).await?;
    info!(job_id = %id, "Marked job as applied");
    Ok(Json(job))
}

/// POST /api/jobs/:id/archive
pub async fn handle_archive(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<JobRow>, AppError> {
    let job = repo::archive(&state.db, id).await?;
    info!(job_id = %id, "Archived job");
    Ok(Json(job))
}

/// GET /api/applications
pub async fn handle_list_applications(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ApplicationsQuery>,
) -> Result<Json<Vec<JobRow>>, AppError> {
    let stage = stage_filter(params.stage.as_deref())?;
    let sort = SortSpec::resolve(
        params.sort,
        params.direction,
        APPLICATION_SORT_KEYS,
        SortKey::DateApplied,
    )?;
    Ok(Json(repo::list_applications(&state.db, stage, &sort).await?))
}

/// PATCH /api/jobs/:id/stage
pub async fn handle_update_stage(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ApiJson(req): ApiJson<StageRequest>,
) -> Result<Json<JobRow>, AppError> {
    let stage = parse_stage(&req.stage)?;
    Ok(Json(repo::update_stage(&state.db, id, stage).await?))
}

/// POST /api/jobs/:id/notes
pub async fn handle_add_note(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ApiJson(req): ApiJson<NoteRequest>,
) -> Result<Json<JobRow>, AppError> {
    if req.note.trim().is_empty() {
        return Err(AppError::Validation("note must not be empty".to_string()));
    }
    Ok(Json(repo::add_note(&state.db, id, &req.note).await?))
}

/// PATCH /api/jobs/:id/tracking
pub async fn handle_update_tracking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ApiJson(req): ApiJson<TrackingUpdate>,
) -> Result<Json<JobRow>, AppError> {
    let update = req.cleaned().map_err(AppError::Validation)?;
    Ok(Json(repo::update_tracking(&state.db, id, &update).await?))
}

/// GET /api/kanban
pub async fn handle_kanban_board(
    State(state): State<AppState>,
) -> Result<Json<Vec<KanbanColumn>>, AppError> {
    let jobs = repo::list_active_applications(&state.db).await?;
    Ok(Json(group_by_column(jobs)))
}

/// POST /api/kanban/move
pub async fn handle_kanban_move(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<KanbanMoveRequest>,
) -> Result<Json<JobRow>, AppError> {
    let stage = column_to_stage(&req.column)
        .ok_or_else(|| AppError::Validation(format!("Unknown kanban column '{}'", req.column)))?;
    let job = repo::update_stage(&state.db, req.job_id, stage).await?;
    info!(job_id = %req.job_id, stage = stage.as_str(), "Moved job on kanban board");
    Ok(Json(job))
}

/// GET /api/interviews
pub async fn handle_list_interviews(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<InterviewsQuery>,
) -> Result<Json<Vec<JobRow>>, AppError> {
    let filter = params.q.unwrap_or_default();
    let jobs = repo::list_active_applications(&state.db)
        .await?
        .into_iter()
        .filter(|job| matches_filter(job, &filter))
        .collect();
    Ok(Json(jobs))
}

/// POST /api/jobs/:id/interview-stages
pub async fn handle_add_interview_stage(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ApiJson(req): ApiJson<NewInterviewStage>,
) -> Result<Json<JobRow>, AppError> {
    let stage = req.into_stage().map_err(AppError::Validation)?;
    Ok(Json(repo::add_interview_stage(&state.db, id, stage).await?))
}

/// POST /api/jobs/:id/activity
pub async fn handle_log_activity(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ApiJson(req): ApiJson<ActivityRequest>,
) -> Result<Json<JobRow>, AppError> {
    if req.activity_type.trim().is_empty() && req.notes.trim().is_empty() {
        return Err(AppError::Validation("Type or Notes required".to_string()));
    }
    let entry = ActivityEntry {
        activity_type: req.activity_type.trim().to_string(),
        notes: req.notes.trim().to_string(),
        date_created: Utc::now(),
    };
    Ok(Json(repo::prepend_activity(&state.db, id, entry).await?))
}

/// GET /api/jobs/:id/timeline
pub async fn handle_timeline(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Timeline>, AppError> {
    let job = repo::get_job(&state.db, id).await?;
    Ok(Json(build_timeline(&job, Utc::now())))
}
