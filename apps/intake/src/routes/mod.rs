pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::document::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Intake forms
        .route("/api/v1/forms", post(handlers::handle_submit_form))
        .route(
            "/api/v1/forms/preview",
            post(handlers::handle_preview_form),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::catalog::Locale;
    use crate::config::Config;
    use crate::document::RenderPipeline;
    use crate::render::testing::{FakeBehavior, FakeEngine};
    use crate::render::{RenderAdapter, DEFAULT_SETTLE_TIMEOUT};

    const BOUNDARY: &str = "intake-test-boundary";

    fn app(engine: &FakeEngine, output_dir: &std::path::Path) -> Router {
        let adapter = RenderAdapter::new(Arc::new(engine.clone()), DEFAULT_SETTLE_TIMEOUT);
        let pipeline = RenderPipeline::new(Locale::En, adapter).unwrap();
        build_router(AppState {
            config: Config::for_tests(output_dir),
            pipeline: Arc::new(pipeline),
        })
    }

    fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &str)>) -> String {
        let mut body = String::new();
        for (name, value) in fields {
            body.push_str(&format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            ));
        }
        if let Some((name, filename)) = file {
            body.push_str(&format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: application/pdf\r\n\r\n%PDF-1.4 attachment\r\n"
            ));
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));
        body
    }

    fn form_request(body: String) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/v1/forms")
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
        let dir = tempfile::tempdir().unwrap();
        let engine = FakeEngine::new(FakeBehavior::Succeed);
        let response = app(&engine, dir.path())
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "intake");
    }

    #[tokio::test]
    async fn test_submit_form_writes_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let engine = FakeEngine::new(FakeBehavior::Succeed);
        let body = multipart_body(
            &[
                ("name", "Ali"),
                ("family", "Rezai"),
                ("email", "a@x.com"),
                ("workHistories", r#"[{"company":"Acme","position":"Dev"}]"#),
            ],
            Some(("resumeFile", "cv.pdf")),
        );

        let response = app(&engine, dir.path())
            .oneshot(form_request(body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        let expected = dir.path().join("Ali_Rezai_form.pdf");
        assert_eq!(body["artifact_path"], expected.to_str().unwrap());
        assert_eq!(body["sections"], serde_json::json!(["personal", "work_history"]));
        assert_eq!(body["warnings"], serde_json::json!([]));

        let written = std::fs::read_to_string(&expected).unwrap();
        assert!(written.contains("Acme"));
        assert!(!written.contains("%PDF-1.4 attachment"));
        assert_eq!(engine.open_sessions(), 0);
    }

    #[tokio::test]
    async fn test_submit_form_reports_malformed_section() {
        let dir = tempfile::tempdir().unwrap();
        let engine = FakeEngine::new(FakeBehavior::Succeed);
        let body = multipart_body(&[("name", "Ali"), ("educations", "{not json")], None);

        let response = app(&engine, dir.path())
            .oneshot(form_request(body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["warnings"][0]["kind"], "malformed_input");
        assert_eq!(body["warnings"][0]["field"], "educations");
        assert!(dir.path().join("Ali_form.pdf").exists());
    }

    #[tokio::test]
    async fn test_submit_form_without_name_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let engine = FakeEngine::new(FakeBehavior::Succeed);
        let body = multipart_body(&[("email", "a@x.com")], None);

        let response = app(&engine, dir.path())
            .oneshot(form_request(body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(engine.launched(), 0);
    }

    #[tokio::test]
    async fn test_submit_form_render_failure() {
        let dir = tempfile::tempdir().unwrap();
        let engine = FakeEngine::new(FakeBehavior::FailPrint);
        let body = multipart_body(&[("name", "Ali"), ("family", "Rezai")], None);

        let response = app(&engine, dir.path())
            .oneshot(form_request(body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "RENDER_FAILED");
        assert!(!dir.path().join("Ali_Rezai_form.pdf").exists());
        assert_eq!(engine.open_sessions(), 0);
    }

    #[tokio::test]
    async fn test_preview_returns_html() {
        let dir = tempfile::tempdir().unwrap();
        let engine = FakeEngine::new(FakeBehavior::Succeed);
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/forms/preview")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"name":"Ali","family":"Rezai","childrenCount":0}"#))
            .unwrap();

        let response = app(&engine, dir.path()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
        assert!(content_type.starts_with("text/html"));
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("Ali Rezai"));
        assert!(html.contains("Number of Children"));
        assert_eq!(engine.launched(), 0);
    }
}
