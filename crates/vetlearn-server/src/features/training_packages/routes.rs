//! Training package routes
//!
//! - `GET /training-packages/available?page&page_size` - Upstream packages, annotated
//! - `POST /training-packages/:code/sync` - Ingest one training package now
//! - `POST /training-packages/bulk-download` - Queue a package download job
//! - `GET /training-packages/download-status/:job_id` - Job snapshot
//! - `GET /packages/download-status/:job_id` - Same, shorter path

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

use super::queries::{list_available, ListAvailablePackagesQuery};
use crate::api::response::{ApiResponse, ApiResult};
use crate::features::download_jobs::routes::{bulk_download, download_status, sync_component};
use crate::ingest::{IngestService, JobKind};
use crate::middleware::AdminUser;

pub fn training_packages_routes() -> Router<IngestService> {
    Router::new()
        .route("/training-packages/available", get(list_available_packages))
        .route("/training-packages/:code/sync", post(sync_training_package))
        .route("/training-packages/bulk-download", post(bulk_download_packages))
        .route("/training-packages/download-status/:job_id", get(download_status))
        .route("/packages/download-status/:job_id", get(download_status))
}

/// List training packages offered upstream
///
/// # Endpoint
///
/// `GET /api/training-packages/available?page=1&page_size=50`
///
/// # Response
///
/// - `200 OK` - Page of packages with `inDatabase` and `processed` flags
/// - `400 Bad Request` - Invalid paging
/// - `500 Internal Server Error` - Upstream credentials not configured
/// - `502 Bad Gateway` - Upstream failure
#[tracing::instrument(skip(admin, service, query), fields(user_id = %admin.user_id))]
async fn list_available_packages(
    admin: AdminUser,
    State(service): State<IngestService>,
    Query(query): Query<ListAvailablePackagesQuery>,
) -> ApiResult<Response> {
    let page = list_available::handle(&service, query).await?;
    Ok(ApiResponse::success(page).into_response())
}

/// Download training packages by code
///
/// # Endpoint
///
/// `POST /api/training-packages/bulk-download`
///
/// # Request Body
///
/// ```json
/// ["BSB", "CHC"]
/// ```
#[tracing::instrument(skip(admin, service, codes), fields(user_id = %admin.user_id, items = codes.len()))]
async fn bulk_download_packages(
    admin: AdminUser,
    State(service): State<IngestService>,
    Json(codes): Json<Vec<String>>,
) -> ApiResult<Response> {
    bulk_download(admin, &service, JobKind::Packages, codes).await
}

/// Ingest a single training package without queuing a job
///
/// # Endpoint
///
/// `POST /api/training-packages/{code}/sync`
#[tracing::instrument(skip(admin, service), fields(user_id = %admin.user_id))]
async fn sync_training_package(
    admin: AdminUser,
    State(service): State<IngestService>,
    Path(code): Path<String>,
) -> ApiResult<Response> {
    sync_component(admin, &service, JobKind::Packages, code).await
}
