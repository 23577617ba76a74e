//! Unit routes
//!
//! - `GET /units/available?page&page_size&training_package_code` - Upstream units, annotated
//! - `POST /units/:code/sync` - Ingest one unit now
//! - `POST /units/bulk-download` - Queue a unit download job
//! - `GET /units/download-status/:job_id` - Job snapshot

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

use super::queries::{list_available, ListAvailableUnitsQuery};
use crate::api::response::{ApiResponse, ApiResult};
use crate::features::download_jobs::routes::{bulk_download, download_status, sync_component};
use crate::ingest::{IngestService, JobKind};
use crate::middleware::AdminUser;

pub fn units_routes() -> Router<IngestService> {
    Router::new()
        .route("/units/available", get(list_available_units))
        .route("/units/:code/sync", post(sync_unit))
        .route("/units/bulk-download", post(bulk_download_units))
        .route("/units/download-status/:job_id", get(download_status))
}

/// List units offered upstream
///
/// # Endpoint
///
/// `GET /api/units/available?page=1&page_size=50&training_package_code=BSB`
///
/// # Response
///
/// - `200 OK` - Page of units with `inDatabase` and `processed` flags
/// - `400 Bad Request` - Invalid paging
/// - `500 Internal Server Error` - Upstream credentials not configured
/// - `502 Bad Gateway` - Upstream failure
#[tracing::instrument(skip(admin, service, query), fields(user_id = %admin.user_id))]
async fn list_available_units(
    admin: AdminUser,
    State(service): State<IngestService>,
    Query(query): Query<ListAvailableUnitsQuery>,
) -> ApiResult<Response> {
    let page = list_available::handle(&service, query).await?;
    Ok(ApiResponse::success(page).into_response())
}

/// Download units by code
///
/// # Endpoint
///
/// `POST /api/units/bulk-download`
///
/// # Request Body
///
/// ```json
/// ["BSBWHS211", "CHCCOM005"]
/// ```
#[tracing::instrument(skip(admin, service, codes), fields(user_id = %admin.user_id, items = codes.len()))]
async fn bulk_download_units(
    admin: AdminUser,
    State(service): State<IngestService>,
    Json(codes): Json<Vec<String>>,
) -> ApiResult<Response> {
    bulk_download(admin, &service, JobKind::Units, codes).await
}

/// Ingest a single unit without queuing a job
///
/// # Endpoint
///
/// `POST /api/units/{code}/sync`
#[tracing::instrument(skip(admin, service), fields(user_id = %admin.user_id))]
async fn sync_unit(
    admin: AdminUser,
    State(service): State<IngestService>,
    Path(code): Path<String>,
) -> ApiResult<Response> {
    sync_component(admin, &service, JobKind::Units, code).await
}
