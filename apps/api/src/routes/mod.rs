pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName, Method},
    routing::{get, patch, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::documents::handlers as documents;
use crate::ingest::handlers::{self as ingest, API_KEY_HEADER};
use crate::state::AppState;
use crate::tracking::handlers as tracking;

/// Captured pages arrive as full HTML, inline scripts included.
const INGEST_BODY_LIMIT: usize = 10 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Extension ingestion
        .route(
            "/api/ingest-job",
            post(ingest::handle_ingest_job).layer(DefaultBodyLimit::max(INGEST_BODY_LIMIT)),
        )
        .route(
            "/api/ingest-jobs-batch",
            post(ingest::handle_ingest_batch).layer(DefaultBodyLimit::max(INGEST_BODY_LIMIT)),
        )
        .route("/api/jobs/:id/enrich", post(ingest::handle_retry_enrichment))
        // Tracked jobs and applications
        .route("/api/jobs", get(tracking::handle_list_tracked))
        .route("/api/jobs/:id", get(tracking::handle_get_job))
        .route("/api/jobs/:id/apply", post(tracking::handle_apply))
        .route("/api/jobs/:id/archive", post(tracking::handle_archive))
        .route("/api/jobs/:id/stage", patch(tracking::handle_update_stage))
        .route("/api/jobs/:id/notes", post(tracking::handle_add_note))
        .route("/api/jobs/:id/tracking", patch(tracking::handle_update_tracking))
        .route("/api/applications", get(tracking::handle_list_applications))
        // Kanban
        .route("/api/kanban", get(tracking::handle_kanban_board))
        .route("/api/kanban/move", post(tracking::handle_kanban_move))
        // Interviews
        .route("/api/interviews", get(tracking::handle_list_interviews))
        .route(
            "/api/jobs/:id/interview-stages",
            post(tracking::handle_add_interview_stage),
        )
        .route("/api/jobs/:id/activity", post(tracking::handle_log_activity))
        .route("/api/jobs/:id/timeline", get(tracking::handle_timeline))
        // Documents
        .route("/api/generate-resume", get(documents::handle_generate_resume))
        .route(
            "/api/generate-cover-letter",
            get(documents::handle_generate_cover_letter),
        )
        .with_state(state)
}

/// Any origin; only the methods and headers the extension and dashboard send.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static(API_KEY_HEADER)])
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        response::Response,
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::ingest::enrich::testing::CannedEnricher;
    use crate::ingest::models::Enrichment;

    fn app() -> Router {
        let state = AppState::for_tests(Arc::new(CannedEnricher::ok(Enrichment::default())));
        build_router(state).layer(cors_layer())
    }

    fn post_json(uri: &str, key: Option<&str>, body: &str) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(key) = key {
            builder = builder.header(API_KEY_HEADER, key);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    const KEY: &str = "test-extension-key";

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["service"], "jobtrail");
    }

    #[tokio::test]
    async fn test_ingest_requires_api_key() {
        for uri in ["/api/ingest-job", "/api/ingest-jobs-batch"] {
            let response = app().oneshot(post_json(uri, None, "[]")).await.unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

            let response = app()
                .oneshot(post_json(uri, Some("wrong"), "[]"))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        }
    }

    #[tokio::test]
    async fn test_ingest_job_rejects_bad_json_and_missing_fields() {
        let response = app()
            .oneshot(post_json("/api/ingest-job", Some(KEY), "{oops"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"]["message"], "Invalid JSON body");

        let response = app()
            .oneshot(post_json(
                "/api/ingest-job",
                Some(KEY),
                r#"{"url": "https://jobs.acme.dev/1", "html": "  "}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await["error"]["message"],
            "Missing required fields"
        );
    }

    #[tokio::test]
    async fn test_ingest_job_accepts_pages_over_default_body_limit() {
        let html = "<div>".repeat(600 * 1024);
        let body = serde_json::json!({ "html": html }).to_string();
        assert!(body.len() > 2 * 1024 * 1024);

        let response = app()
            .oneshot(post_json("/api/ingest-job", Some(KEY), &body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await["error"]["message"],
            "Missing required fields"
        );
    }

    #[tokio::test]
    async fn test_ingest_job_rejects_url_without_address() {
        let response = app()
            .oneshot(post_json(
                "/api/ingest-job",
                Some(KEY),
                r##"{"url": "#apply", "html": "<p>Sales Engineer</p>"}"##,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await["error"]["message"],
            "Missing required fields"
        );
    }

    #[tokio::test]
    async fn test_malformed_dashboard_body_is_json_error() {
        let id = uuid::Uuid::new_v4();
        let request = Request::builder()
            .method("PATCH")
            .uri(format!("/api/jobs/{id}/stage"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"stage": 5}"#))
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"]["code"], "VALIDATION_ERROR");

        let response = app()
            .oneshot(post_json(&format!("/api/jobs/{id}/notes"), None, "{}"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_unknown_sort_key_is_json_error() {
        let response = app()
            .oneshot(Request::get("/api/jobs?sort=bogus").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
        assert!(json["error"]["message"]
            .as_str()
            .unwrap()
            .contains("unknown variant"));
    }

    #[tokio::test]
    async fn test_batch_requires_array() {
        let response = app()
            .oneshot(post_json(
                "/api/ingest-jobs-batch",
                Some(KEY),
                r#"{"job_post_url": "https://jobs.acme.dev/1"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await["error"]["message"],
            "Request body must be an array of jobs"
        );
    }

    #[tokio::test]
    async fn test_batch_validation_rejects_whole_batch() {
        let body = r#"[
            {"job_post_url": "https://jobs.acme.dev/1", "job_description": "Sell", "source": "linkedin"},
            {"job_post_url": "https://jobs.acme.dev/2", "job_description": "Build"}
        ]"#;
        let response = app()
            .oneshot(post_json("/api/ingest-jobs-batch", Some(KEY), body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["message"], "Validation error");
        assert_eq!(json["error"]["details"][0]["path"][0], 1);
        assert_eq!(json["error"]["details"][0]["path"][1], "source");
    }

    #[tokio::test]
    async fn test_documents_require_job_id() {
        for uri in ["/api/generate-resume", "/api/generate-cover-letter"] {
            let response = app()
                .oneshot(Request::get(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }
    }

    #[tokio::test]
    async fn test_cors_preflight_allows_api_key_header() {
        let request = Request::builder()
            .method("OPTIONS")
            .uri("/api/ingest-job")
            .header(header::ORIGIN, "chrome-extension://abc")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "x-api-key")
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }
}
