//! Download job routes
//!
//! - `GET /download-jobs?kind&status` - List job snapshots, newest first
//! - `GET /download-jobs/:job_id` - Single job snapshot
//!
//! The per-kind `download-status`, `bulk-download` and `:code/sync` routes
//! reuse [`download_status`], [`bulk_download`] and [`sync_component`].

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use super::{
    commands::{submit, sync, SubmitDownloadCommand, SyncComponentCommand},
    queries::{get_job, list_jobs, GetDownloadJobQuery, ListDownloadJobsQuery},
};
use crate::api::response::{ApiResponse, ApiResult};
use crate::ingest::{IngestErrorKind, IngestService, ItemResult, JobKind};
use crate::middleware::AdminUser;

pub fn download_jobs_routes() -> Router<IngestService> {
    Router::new()
        .route("/download-jobs", get(list_download_jobs))
        .route("/download-jobs/:job_id", get(download_status))
}

/// List download jobs
///
/// # Endpoint
///
/// `GET /api/download-jobs?kind=units&status=completed`
///
/// # Response
///
/// - `200 OK` - `{"success":true,"data":{"jobs":[...],"total":n}}`
/// - `400 Bad Request` - Unknown kind or status
#[tracing::instrument(skip(admin, service, query), fields(user_id = %admin.user_id))]
async fn list_download_jobs(
    admin: AdminUser,
    State(service): State<IngestService>,
    Query(query): Query<ListDownloadJobsQuery>,
) -> ApiResult<Response> {
    let response = list_jobs::handle(&service, query).await?;
    Ok(ApiResponse::success(response).into_response())
}

/// Job snapshot as plain JSON
///
/// # Response
///
/// - `200 OK` - The job
/// - `404 Not Found` - "Download job not found"
#[tracing::instrument(skip(admin, service), fields(user_id = %admin.user_id))]
pub(crate) async fn download_status(
    admin: AdminUser,
    State(service): State<IngestService>,
    Path(job_id): Path<String>,
) -> ApiResult<Response> {
    let job = get_job::handle(&service, GetDownloadJobQuery { job_id }).await?;
    Ok(Json(job).into_response())
}

/// Queue a job for a JSON array of codes
///
/// # Response
///
/// - `200 OK` - `{"jobId","message","status":"queued"}`
/// - `400 Bad Request` - Empty list or blank code
pub(crate) async fn bulk_download(
    admin: AdminUser,
    service: &IngestService,
    kind: JobKind,
    codes: Vec<String>,
) -> ApiResult<Response> {
    let command = SubmitDownloadCommand::new(kind, codes, Some(admin.user_id));
    let response = submit::handle(service, command).await?;

    tracing::info!(
        job_id = %response.job_id,
        kind = kind.as_str(),
        "Download job submitted via API"
    );

    Ok(Json(response).into_response())
}

/// HTTP status for a synced item
fn sync_status(result: &ItemResult) -> StatusCode {
    match result {
        ItemResult::Success { .. } => StatusCode::OK,
        ItemResult::Failed { kind, .. } => match kind {
            IngestErrorKind::NotFound => StatusCode::NOT_FOUND,
            IngestErrorKind::ParseEmpty => StatusCode::UNPROCESSABLE_ENTITY,
            IngestErrorKind::Auth | IngestErrorKind::Transport | IngestErrorKind::Malformed => {
                StatusCode::BAD_GATEWAY
            },
            IngestErrorKind::Config | IngestErrorKind::Db => StatusCode::INTERNAL_SERVER_ERROR,
        },
    }
}

/// Ingest one code synchronously
///
/// # Response
///
/// - `200 OK` - `{"code","status":"success","recordId"}`
/// - `404` / `422` / `502` / `500` - `{"code","status":"failed","error","kind"}`
/// - `400 Bad Request` - Blank code
/// - `500 Internal Server Error` - Upstream credentials not configured
pub(crate) async fn sync_component(
    admin: AdminUser,
    service: &IngestService,
    kind: JobKind,
    code: String,
) -> ApiResult<Response> {
    let command = SyncComponentCommand::new(kind, code, Some(admin.user_id));
    let result = sync::handle(service, command).await?;

    tracing::info!(
        code = result.code(),
        kind = kind.as_str(),
        "Component synced via API"
    );

    Ok((sync_status(&result), Json(result)).into_response())
}
