pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers;
use crate::state::AppState;

/// Headroom for multipart framing and JSON escaping on top of the two text inputs.
const BODY_OVERHEAD_BYTES: usize = 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state
        .config
        .max_input_bytes
        .saturating_mul(2)
        .saturating_add(BODY_OVERHEAD_BYTES);

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/diagnostics", get(health::diagnostics_handler))
        // Analysis API
        .route("/api/v1/analyze", post(handlers::handle_analyze))
        .route(
            "/api/v1/analyze/upload",
            post(handlers::handle_analyze_upload),
        )
        .route("/api/v1/analyze/report", post(handlers::handle_report))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::engine::tests::{MockModel, VALID_RESPONSE};
    use crate::analysis::engine::AnalysisEngine;
    use crate::analysis::heuristic::HeuristicScorer;
    use crate::config::test_config;
    use crate::llm_client::{CompletionModel, LlmError};
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    const BOUNDARY: &str = "X-ANALYSER-BOUNDARY";

    fn heuristic_app() -> Router {
        let state = AppState {
            engine: Arc::new(AnalysisEngine::new(None, HeuristicScorer::default())),
            config: test_config(None),
        };
        build_router(state)
    }

    fn remote_app(model: Arc<MockModel>) -> Router {
        let model: Arc<dyn CompletionModel> = model;
        let state = AppState {
            engine: Arc::new(AnalysisEngine::new(Some(model), HeuristicScorer::default())),
            config: test_config(Some("sk-proj-abcdefghijklmnopqrstuvwxyz0123456789")),
        };
        build_router(state)
    }

    fn json_request(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn multipart_request(file_name: &str, file_type: &str, resume: &str, jd: &str) -> Request<Body> {
        let body = format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"resume\"; filename=\"{file_name}\"\r\n\
             Content-Type: {file_type}\r\n\r\n\
             {resume}\r\n\
             --{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"job_description\"\r\n\r\n\
             {jd}\r\n\
             --{BOUNDARY}--\r\n"
        );
        Request::builder()
            .method("POST")
            .uri("/api/v1/analyze/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = heuristic_app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_diagnostics_without_key() {
        let response = heuristic_app()
            .oneshot(
                Request::get("/api/v1/diagnostics")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["configured"], false);
        assert_eq!(body["credential"]["valid"], false);
        assert_eq!(body["masked_key"], "Not set");
        assert!(body["model"].is_null());
    }

    #[tokio::test]
    async fn test_diagnostics_masks_configured_key() {
        let response = remote_app(MockModel::replying(VALID_RESPONSE))
            .oneshot(
                Request::get("/api/v1/diagnostics")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["configured"], true);
        assert_eq!(body["credential"]["valid"], true);
        assert_eq!(body["masked_key"], "sk-proj...6789");
        assert_eq!(body["model"], "mock-model");
    }

    #[tokio::test]
    async fn test_analyze_heuristic_path() {
        let response = heuristic_app()
            .oneshot(json_request(
                "/api/v1/analyze",
                json!({
                    "resume_text": "JavaScript, React, Node.js",
                    "job_description": "React, TypeScript, Node.js, AWS"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["method"], "heuristic");
        assert_eq!(body["analysis"]["foundKeywords"], json!(["react", "node"]));
        let score = body["analysis"]["matchScore"].as_u64().unwrap();
        assert!((20..=85).contains(&score));
        assert!(body["analysis_id"].is_string());
    }

    #[tokio::test]
    async fn test_analyze_remote_path() {
        let response = remote_app(MockModel::replying(VALID_RESPONSE))
            .oneshot(json_request(
                "/api/v1/analyze",
                json!({"resume_text": "resume", "job_description": "job"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["method"], "remote");
        assert_eq!(body["analysis"]["matchScore"], 68);
        assert_eq!(body["analysis"]["atsScore"], 74);
    }

    #[tokio::test]
    async fn test_analyze_rejects_blank_resume() {
        let response = heuristic_app()
            .oneshot(json_request(
                "/api/v1/analyze",
                json!({"resume_text": "  ", "job_description": "job"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_rate_limit_maps_to_503_with_retry_after() {
        let app = remote_app(MockModel::failing(LlmError::RateLimited {
            message: "slow down".into(),
        }));
        let response = app
            .oneshot(json_request(
                "/api/v1/analyze",
                json!({"resume_text": "resume", "job_description": "job"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.headers()[header::RETRY_AFTER], "30");
        assert_eq!(body_json(response).await["error"]["code"], "RETRY_LATER");
    }

    #[tokio::test]
    async fn test_forbidden_maps_to_502() {
        let app = remote_app(MockModel::failing(LlmError::Forbidden {
            message: "model_not_found".into(),
        }));
        let response = app
            .oneshot(json_request(
                "/api/v1/analyze",
                json!({"resume_text": "resume", "job_description": "job"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            body_json(response).await["error"]["code"],
            "CONFIGURATION_ERROR"
        );
    }

    #[tokio::test]
    async fn test_upload_plain_text_resume() {
        let response = heuristic_app()
            .oneshot(multipart_request(
                "cv.txt",
                "text/plain",
                "Senior engineer with Python and Docker",
                "Senior Python developer, Docker, Kubernetes",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["method"], "heuristic");
        let found = body["analysis"]["foundKeywords"].as_array().unwrap();
        assert!(found.contains(&json!("python")));
        assert!(found.contains(&json!("docker")));
    }

    #[tokio::test]
    async fn test_upload_rejects_pdf() {
        let response = heuristic_app()
            .oneshot(multipart_request(
                "cv.pdf",
                "application/pdf",
                "%PDF-1.4",
                "job",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[tokio::test]
    async fn test_upload_over_body_cap_is_payload_too_large() {
        let mut config = test_config(None);
        config.max_input_bytes = 1024;
        let app = build_router(AppState {
            engine: Arc::new(AnalysisEngine::new(None, HeuristicScorer::default())),
            config,
        });

        // well past 2 * 1 KB + 1 MiB of body headroom
        let resume = "x".repeat(3 * 1024 * 1024);
        let response = app
            .oneshot(multipart_request("cv.txt", "text/plain", &resume, "job"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body_json(response).await["error"]["code"], "PAYLOAD_TOO_LARGE");
    }

    #[tokio::test]
    async fn test_upload_between_limit_and_cap_is_payload_too_large() {
        let mut config = test_config(None);
        config.max_input_bytes = 1024;
        let app = build_router(AppState {
            engine: Arc::new(AnalysisEngine::new(None, HeuristicScorer::default())),
            config,
        });

        let resume = "x".repeat(4096);
        let response = app
            .oneshot(multipart_request("cv.txt", "text/plain", &resume, "job"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_report_download() {
        let analysis = serde_json::to_value(crate::analysis::models::AnalysisResult::placeholder())
            .unwrap();
        let response = heuristic_app()
            .oneshot(json_request("/api/v1/analyze/report", analysis))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let disposition = response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.starts_with("attachment; filename=\"resume-analysis-"));
        assert!(disposition.ends_with(".txt\""));

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.contains("65% (Moderate match)"));
    }

    #[tokio::test]
    async fn test_report_rejects_out_of_range_score() {
        let mut analysis =
            serde_json::to_value(crate::analysis::models::AnalysisResult::placeholder()).unwrap();
        analysis["matchScore"] = json!(150);
        let response = heuristic_app()
            .oneshot(json_request("/api/v1/analyze/report", analysis))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
