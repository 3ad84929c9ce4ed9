use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use agromart_offer::JobKind;

use crate::error::AppError;
use crate::scheduler::{JobReport, JobStatus};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/jobs", get(list_jobs))
        .route("/admin/jobs/{job}/run", post(run_job))
}

async fn list_jobs(State(state): State<AppState>) -> Json<Vec<JobStatus>> {
    Json(state.runner.board().snapshot().await)
}

async fn run_job(
    State(state): State<AppState>,
    Path(job): Path<String>,
) -> Result<Json<JobReport>, AppError> {
    let job = JobKind::from_slug(&job)
        .ok_or_else(|| AppError::NotFoundError(format!("Unknown job: {}", job)))?;

    tracing::info!(job = %job, "Manual job run requested");
    let report = state.runner.run(job).await?;
    Ok(Json(report))
}
