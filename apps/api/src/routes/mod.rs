pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};

use crate::dsa::handlers as dsa;
use crate::profile::handlers as profile;
use crate::profile::upload::MAX_UPLOAD_BYTES;
use crate::resume::handlers as resume;
use crate::state::AppState;

/// Request bodies may exceed the upload limit so oversized files reach validation
/// and get a descriptive 413 instead of a bare body-limit rejection.
const REQUEST_BODY_LIMIT: usize = MAX_UPLOAD_BYTES + 3 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // DSA sheet
        .route("/api/v1/dsa/catalog", get(dsa::handle_get_catalog))
        .route("/api/v1/dsa/view", get(dsa::handle_get_view))
        .route(
            "/api/v1/dsa/filters",
            get(dsa::handle_get_filters).put(dsa::handle_update_filters),
        )
        .route("/api/v1/dsa/favorites", get(dsa::handle_get_favorites))
        .route(
            "/api/v1/dsa/favorites/:item_id/toggle",
            post(dsa::handle_toggle_favorite),
        )
        .route(
            "/api/v1/dsa/progress/:problem_id",
            put(dsa::handle_set_progress),
        )
        // Profile
        .route(
            "/api/v1/profile/extract",
            post(profile::handle_extract_profile),
        )
        .route(
            "/api/v1/profile/uploads/:upload_id",
            get(profile::handle_upload_status),
        )
        .route(
            "/api/v1/profile/:user_id",
            get(profile::handle_get_profile).put(profile::handle_update_profile),
        )
        // Resume analysis
        .route("/api/v1/resume/analyze", post(resume::handle_analyze))
        .route(
            "/api/v1/resume/quick-suggestions",
            post(resume::handle_quick_suggestions),
        )
        .route("/api/v1/resume/analyses", get(resume::handle_list_analyses))
        .layer(DefaultBodyLimit::max(REQUEST_BODY_LIMIT))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use aws_sdk_s3::config::{BehaviorVersion, Region};
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::Value;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::dsa::models::Catalog;
    use crate::dsa::session::SessionRegistry;
    use crate::llm_client::LlmClient;
    use crate::preferences::testing::RecordingStore;
    use crate::profile::jobs::UploadJobs;

    const BOUNDARY: &str = "studymate-test-boundary";

    /// State whose database and S3 clients are never contacted by the routes under test.
    fn offline_state() -> AppState {
        let config = Config {
            database_url: "postgres://localhost/studymate".to_string(),
            s3_bucket: "resumes".to_string(),
            s3_endpoint: "http://localhost:9000".to_string(),
            aws_access_key_id: "test".to_string(),
            aws_secret_access_key: "test".to_string(),
            groq_api_key: "test".to_string(),
            port: 0,
            rust_log: "info".to_string(),
            filter_save_debounce: Duration::from_millis(10),
            dsa_catalog_path: None,
        };
        let db = PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .unwrap();
        let s3 = aws_sdk_s3::Client::from_conf(
            aws_sdk_s3::Config::builder()
                .behavior_version(BehaviorVersion::latest())
                .region(Region::new("us-east-1"))
                .build(),
        );

        AppState {
            db,
            s3,
            llm: LlmClient::new(config.groq_api_key.clone()).unwrap(),
            catalog: Arc::new(Catalog::load(None).unwrap()),
            sessions: SessionRegistry::new(
                Arc::new(RecordingStore::default()),
                config.filter_save_debounce,
            ),
            uploads: UploadJobs::default(),
            config,
        }
    }

    fn multipart_upload(user_id: &str, filename: &str, mime: &str, bytes: &[u8]) -> Request<Body> {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"user_id\"\r\n\r\n{user_id}\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"resume\"; filename=\"{filename}\"\r\nContent-Type: {mime}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/api/v1/profile/extract")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = build_router(offline_state());
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["service"], "studymate-api");
    }

    #[tokio::test]
    async fn test_png_upload_rejected_with_415() {
        let app = build_router(offline_state());
        let response = app
            .oneshot(multipart_upload("u1", "photo.png", "image/png", b"\x89PNG"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "UNSUPPORTED_MEDIA_TYPE");
    }

    #[tokio::test]
    async fn test_six_mib_pdf_rejected_with_413() {
        let app = build_router(offline_state());
        let bytes = vec![b'%'; 6 * 1024 * 1024];
        let response = app
            .oneshot(multipart_upload("u1", "cv.pdf", "application/pdf", &bytes))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_toggle_favorite_round_trip() {
        let app = build_router(offline_state());
        let toggle = || {
            Request::post("/api/v1/dsa/favorites/arrays/toggle")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"user_id":"u1"}"#))
                .unwrap()
        };

        let first = json_body(app.clone().oneshot(toggle()).await.unwrap()).await;
        assert_eq!(first["action"], "added");
        assert_eq!(first["favorites"], serde_json::json!(["arrays"]));

        let second = json_body(app.oneshot(toggle()).await.unwrap()).await;
        assert_eq!(second["action"], "removed");
        assert_eq!(second["favorites"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_toggle_unknown_item_is_404() {
        let app = build_router(offline_state());
        let response = app
            .oneshot(
                Request::post("/api/v1/dsa/favorites/no-such-item/toggle")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"user_id":"u1"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_quick_suggestions_form() {
        let app = build_router(offline_state());
        let response = app
            .oneshot(
                Request::post("/api/v1/resume/quick-suggestions")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from("job_role=Data+Scientist"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["job_role"], "Data Scientist");
        assert_eq!(body["suggestions"][0], "Machine learning algorithms");
    }
}
