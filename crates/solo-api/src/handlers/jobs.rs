//! Job handlers.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use validator::Validate;

use solo_models::{Job, NewJob};
use solo_store::{DeleteOutcome, Document, JobQuery, UpdateOutcome};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Query parameters for GET /all-jobs.
#[derive(Debug, Deserialize)]
pub struct ListJobsParams {
    /// Case-insensitive substring match against the title.
    pub search: Option<String>,
    /// Exact-match category restriction.
    pub filter: Option<String>,
    /// Deadline ordering: "asc" or "dsc".
    pub sort: Option<String>,
}

/// POST /add-job — create a job. The bid counter starts at zero no
/// matter what the payload says.
pub async fn add_job(
    State(state): State<AppState>,
    Json(payload): Json<NewJob>,
) -> ApiResult<Json<Job>> {
    payload.validate()?;
    let job = state.jobs.create(payload).await?;
    Ok(Json(job))
}

/// GET /all-jobs — list jobs with search/filter/sort parameters.
pub async fn all_jobs(
    State(state): State<AppState>,
    Query(params): Query<ListJobsParams>,
) -> ApiResult<Json<Vec<Job>>> {
    let query = JobQuery::from_params(params.search, params.filter, params.sort);
    let jobs = state.jobs.list(&query).await?;
    Ok(Json(jobs))
}

/// GET /all-jobs-tab — list every job, unfiltered.
pub async fn all_jobs_tab(State(state): State<AppState>) -> ApiResult<Json<Vec<Job>>> {
    let jobs = state.jobs.list_all().await?;
    Ok(Json(jobs))
}

/// GET /jobs/:id — list jobs owned by a buyer. The path segment is the
/// buyer's email (route shape inherited from the original API).
pub async fn jobs_by_owner(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> ApiResult<Json<Vec<Job>>> {
    let jobs = state.jobs.list_by_owner(&email).await?;
    Ok(Json(jobs))
}

/// GET /job/:id — fetch one job.
pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Job>> {
    let job = state
        .jobs
        .get(&id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("job {id}")))?;
    Ok(Json(job))
}

/// PUT /update-job/:id — merge-update a job, creating it when the id is
/// unknown (upsert). Supplied fields overwrite, others are retained. A
/// patch that would not leave a well-formed job behind is a 400.
pub async fn update_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<Document>,
) -> ApiResult<Json<UpdateOutcome>> {
    let outcome = state.jobs.upsert(&id, patch).await?;
    Ok(Json(outcome))
}

/// DELETE /jobs/:id — delete a job. A missing id reports zero deleted.
pub async fn delete_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteOutcome>> {
    let outcome = state.jobs.delete(&id).await;
    Ok(Json(outcome))
}
