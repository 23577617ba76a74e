//! Route tests for the training package endpoints

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;
    use vetlearn_common::types::ComponentKind;

    use crate::features::shared::test_helpers::*;
    use crate::ingest::models::PackageRecord;
    use crate::ingest::testing::FakeTga;
    use crate::ingest::tga::ComponentSummary;
    use crate::ingest::{IngestStore, JobKind, JobStatus};

    #[tokio::test]
    async fn test_bulk_download_stores_package_and_children() {
        let tga = FakeTga::new()
            .with_package("BSB")
            .with_search_hit(ComponentKind::Unit, ComponentSummary::new("BSBWHS211", "Safety"))
            .with_search_hit(ComponentKind::Qualification, ComponentSummary::new("BSB30120", "Cert III"));
        let app = TestApp::with_tga(tga);

        let (status, body) = app
            .send(admin_post("/api/training-packages/bulk-download", json!([" BSB "])))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "queued");
        assert_eq!(body["message"], "Bulk download started for 1 training package");

        let job = app.wait_for_job(&body["jobId"]).await;
        assert_eq!(job.kind, JobKind::Packages);
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.items, vec!["BSB".to_string()]);
        assert_eq!(job.completed_items, 1);

        let package = app.store.row(ComponentKind::TrainingPackage, "BSB").await.unwrap();
        let unit = app.store.row(ComponentKind::Unit, "BSBWHS211").await.unwrap();
        assert_eq!(unit.training_package_id, Some(package.id));
        assert!(app.store.row(ComponentKind::Qualification, "BSB30120").await.is_some());
    }

    #[tokio::test]
    async fn test_empty_code_list_is_rejected() {
        let app = TestApp::new();

        let (status, body) = app
            .send(admin_post("/api/training-packages/bulk-download", json!([])))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "No training package codes provided");
    }

    #[tokio::test]
    async fn test_both_status_paths_serve_the_same_job() {
        let app = TestApp::with_tga(FakeTga::new().with_package("BSB"));

        let (_, body) = app
            .send(admin_post("/api/training-packages/bulk-download", json!(["BSB"])))
            .await;
        let job_id = body["jobId"].as_str().unwrap().to_string();
        app.wait_for_job(&body["jobId"]).await;

        for prefix in ["/api/training-packages", "/api/packages"] {
            let (status, job) = app
                .send(admin_get(&format!("{}/download-status/{}", prefix, job_id)))
                .await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(job["id"], job_id.as_str());
            assert_eq!(job["kind"], "packages");
        }
    }

    #[tokio::test]
    async fn test_malformed_job_id_is_not_found() {
        let app = TestApp::new();

        let (status, body) = app
            .send(admin_get("/api/packages/download-status/not-a-job"))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_available_packages_flag_catalog_rows() {
        let tga = FakeTga::new()
            .with_search_hit(ComponentKind::TrainingPackage, ComponentSummary::new("BSB", "Business Services"))
            .with_search_hit(ComponentKind::TrainingPackage, ComponentSummary::new("CHC", "Community Services"))
            .with_search_hit(ComponentKind::Unit, ComponentSummary::new("BSBWHS211", "Safety"));
        let app = TestApp::with_tga(tga);
        app.store
            .upsert_training_package(&PackageRecord {
                code: "CHC".into(),
                title: "Community Services".into(),
                ..Default::default()
            })
            .await
            .unwrap();

        let (status, body) = app.send(admin_get("/api/training-packages/available")).await;
        assert_eq!(status, StatusCode::OK);

        let data = &body["data"];
        assert_eq!(data["pageSize"], 50);
        assert_eq!(data["total"], 2);
        assert_eq!(data["items"][0]["code"], "BSB");
        assert_eq!(data["items"][0]["inDatabase"], false);
        assert_eq!(data["items"][1]["code"], "CHC");
        assert_eq!(data["items"][1]["inDatabase"], true);
        assert_eq!(data["items"][1]["title"], "Community Services");
    }

    #[tokio::test]
    async fn test_upstream_failure_is_bad_gateway() {
        let app = TestApp::with_tga(FakeTga::new().with_failing_search());

        let (status, body) = app.send(admin_get("/api/training-packages/available?page=2")).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["code"], "UPSTREAM_ERROR");
    }

    #[tokio::test]
    async fn test_sync_ingests_package_and_children_inline() {
        let tga = FakeTga::new()
            .with_package("BSB")
            .with_search_hit(ComponentKind::Unit, ComponentSummary::new("BSBWHS211", "Safety"))
            .with_search_hit(ComponentKind::Skillset, ComponentSummary::new("BSBSS00001", "Skill set"));
        let app = TestApp::with_tga(tga);

        let (status, body) = app
            .send(admin_post("/api/training-packages/BSB/sync", json!({})))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["code"], "BSB");
        assert_eq!(body["status"], "success");

        let package = app.store.row(ComponentKind::TrainingPackage, "BSB").await.unwrap();
        assert_eq!(body["recordId"], package.id);
        assert!(app.store.row(ComponentKind::Unit, "BSBWHS211").await.is_some());
        assert!(app.store.row(ComponentKind::Skillset, "BSBSS00001").await.is_some());
    }

    #[tokio::test]
    async fn test_sync_unknown_package_is_not_found() {
        let app = TestApp::new();

        let (status, body) = app
            .send(admin_post("/api/training-packages/NOPE/sync", json!({})))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["status"], "failed");
        assert_eq!(body["kind"], "notFound");
        assert_eq!(app.store.count(ComponentKind::TrainingPackage).await, 0);

        let (status, _) = app
            .send(student_post("/api/training-packages/NOPE/sync", json!({})))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }
}
