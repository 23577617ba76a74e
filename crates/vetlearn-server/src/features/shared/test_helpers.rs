//! Router fixtures for route tests
//!
//! Builds the full application router over a [`MemoryIngestStore`] and a
//! [`FakeTga`], and provides request builders carrying the gateway headers.
//!
//! ```rust,ignore
//! let app = TestApp::with_tga(FakeTga::new().with_unit("BSBWHS211", xml));
//! let (status, body) = app.send(admin_post("/api/units/bulk-download", json!(["BSBWHS211"]))).await;
//! let job = app.wait_for_job(&body["jobId"]).await;
//! ```

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use uuid::Uuid;

use crate::api::{create_router, AppState};
use crate::config::Config;
use crate::ingest::testing::FakeTga;
use crate::ingest::tga::TgaApi;
use crate::ingest::{IngestConfig, IngestService, Job, MemoryIngestStore, RetryPolicy};
use crate::middleware::auth::{USER_ID_HEADER, USER_ROLE_HEADER};

pub const ADMIN_ID: &str = "1";

/// Application wired to in-memory collaborators
pub struct TestApp {
    pub store: MemoryIngestStore,
    service: IngestService,
    router: Router,
}

impl TestApp {
    /// Upstream with no canned components
    pub fn new() -> Self {
        Self::build(Some(FakeTga::new()))
    }

    pub fn with_tga(tga: FakeTga) -> Self {
        Self::build(Some(tga))
    }

    /// No upstream credentials configured
    pub fn without_upstream() -> Self {
        Self::build(None)
    }

    fn build(tga: Option<FakeTga>) -> Self {
        let store = MemoryIngestStore::new();
        let config = IngestConfig {
            retry: RetryPolicy::immediate(0),
            ..Default::default()
        };
        let tga = tga.map(|t| Arc::new(t) as Arc<dyn TgaApi>);
        let service = IngestService::new(Arc::new(store.clone()), tga, config).unwrap();
        let router = create_router(
            AppState {
                ingest: service.clone(),
            },
            &Config::default(),
        );

        Self {
            store,
            service,
            router,
        }
    }

    pub fn service(&self) -> IngestService {
        self.service.clone()
    }

    /// Send a request and decode the JSON body (`Value::Null` when empty or not JSON)
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    /// Poll the registry until the job reaches a terminal state
    pub async fn wait_for_job(&self, job_id: &Value) -> Job {
        let id = Uuid::parse_str(job_id.as_str().unwrap()).unwrap();
        for _ in 0..500 {
            if let Some(job) = self.service.registry().get_job(id).await {
                if job.status.is_terminal() {
                    return job;
                }
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("job {} did not finish", id);
    }
}

pub fn admin_get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(USER_ID_HEADER, ADMIN_ID)
        .header(USER_ROLE_HEADER, "admin")
        .body(Body::empty())
        .unwrap()
}

pub fn admin_post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header(USER_ID_HEADER, ADMIN_ID)
        .header(USER_ROLE_HEADER, "admin")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Request from a signed-in user without the admin role
pub fn student_get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(USER_ID_HEADER, "2")
        .header(USER_ROLE_HEADER, "student")
        .body(Body::empty())
        .unwrap()
}

pub fn student_post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header(USER_ID_HEADER, "2")
        .header(USER_ROLE_HEADER, "student")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn anonymous_get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}
