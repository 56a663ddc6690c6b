pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::analysis::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Text analyses
        .route("/api/enhance-bullet", post(handlers::handle_enhance_bullet))
        .route("/api/jd-match", post(handlers::handle_jd_match))
        .route("/api/ats-score", post(handlers::handle_ats_score))
        // File analyses
        .route("/api/jd-match-file", post(handlers::handle_jd_match_file))
        .route("/api/ats-check-file", post(handlers::handle_ats_check_file))
        .route("/api/parse-resume", post(handlers::handle_parse_resume))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
        response::Response,
    };
    use reqwest::Client;
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use wiremock::{
        matchers::{method, path},
        Mock, MockServer, ResponseTemplate,
    };

    use super::*;
    use crate::analysis::ingest::FileIngestor;
    use crate::analysis::orchestrator::{FileAnalyzer, PollSettings};
    use crate::analysis::text::stub::StubCompletion;
    use crate::assistants::fake::FakeProvider;
    use crate::assistants::RunStatus;

    fn test_state(llm: Arc<StubCompletion>, provider: Arc<FakeProvider>) -> AppState {
        let analyzer = FileAnalyzer::new(
            provider,
            FileIngestor::new(Client::new()),
            "gpt-test".to_string(),
            PollSettings {
                interval: Duration::from_millis(1),
                timeout: Duration::from_secs(5),
            },
        );
        AppState {
            llm,
            analyzer: Arc::new(analyzer),
        }
    }

    fn app_with(llm: StubCompletion, provider: FakeProvider) -> Router {
        build_router(test_state(Arc::new(llm), Arc::new(provider)))
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn serve_pdf() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/uploads/cv.pdf"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "application/pdf")
                    .set_body_bytes(b"%PDF-1.7".to_vec()),
            )
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn test_health_is_ok() {
        let app = app_with(StubCompletion::replying(""), FakeProvider::default());
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_enhance_bullet_returns_result() {
        let app = app_with(
            StubCompletion::replying("Engineered backend services, improving throughput by 30%."),
            FakeProvider::default(),
        );

        let response = app
            .oneshot(post_json(
                "/api/enhance-bullet",
                json!({"text": "Worked on backend stuff"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({"result": "Engineered backend services, improving throughput by 30%."})
        );
    }

    #[tokio::test]
    async fn test_enhance_bullet_requires_text() {
        let app = app_with(StubCompletion::replying("x"), FakeProvider::default());
        let response = app
            .oneshot(post_json("/api/enhance-bullet", json!({"text": "   "})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await, json!({"error": "Text is required"}));
    }

    #[tokio::test]
    async fn test_enhance_bullet_provider_failure_is_500() {
        let app = app_with(StubCompletion::failing("model overloaded"), FakeProvider::default());
        let response = app
            .oneshot(post_json("/api/enhance-bullet", json!({"text": "Did things"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Failed to enhance bullet");
        assert!(body["details"].as_str().unwrap().contains("model overloaded"));
    }

    #[tokio::test]
    async fn test_ats_score_accepts_empty_resume() {
        let llm = Arc::new(StubCompletion::replying(r#"{"score": 20, "improvements": []}"#));
        let app = build_router(test_state(llm.clone(), Arc::new(FakeProvider::default())));

        let response = app
            .oneshot(post_json("/api/ats-score", json!({})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["score"], 20);
        let prompt = &llm.prompts()[0];
        assert!(!prompt.contains("undefined"));
        assert!(!prompt.contains("null"));
    }

    #[tokio::test]
    async fn test_jd_match_requires_job_description_and_resume() {
        let app = app_with(StubCompletion::replying("{}"), FakeProvider::default());
        let response = app
            .oneshot(post_json("/api/jd-match", json!({"jobDescription": "Rust dev"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({"error": "Job description and resume are required"})
        );
    }

    #[tokio::test]
    async fn test_jd_match_returns_structured_result() {
        let app = app_with(
            StubCompletion::replying(r#"{"matchScore": 71, "missingSkills": ["Kafka"]}"#),
            FakeProvider::default(),
        );
        let response = app
            .oneshot(post_json(
                "/api/jd-match",
                json!({
                    "style": "elaborative",
                    "jobDescription": "Backend engineer, Kafka",
                    "resume": {"skills": [{"domain": "Backend", "languages": ["Rust"]}]}
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["missingSkills"], json!(["Kafka"]));
    }

    #[tokio::test]
    async fn test_jd_match_file_requires_file_url() {
        let app = app_with(StubCompletion::replying("{}"), FakeProvider::default());
        let response = app
            .oneshot(post_json(
                "/api/jd-match-file",
                json!({"jobDescription": "Rust dev"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({"error": "File URL and Job Description are required"})
        );
    }

    #[tokio::test]
    async fn test_jd_match_file_returns_bare_result() {
        let server = serve_pdf().await;
        let app = app_with(
            StubCompletion::replying(""),
            FakeProvider::replying(r#"{"matchScore": 90, "summary": "Great fit"}"#),
        );

        let response = app
            .oneshot(post_json(
                "/api/jd-match-file",
                json!({
                    "fileUrl": format!("{}/uploads/cv.pdf", server.uri()),
                    "jobDescription": "Rust dev"
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({"matchScore": 90, "summary": "Great fit"})
        );
    }

    #[tokio::test]
    async fn test_ats_check_file_wraps_result_in_envelope() {
        let server = serve_pdf().await;
        let app = app_with(
            StubCompletion::replying(""),
            FakeProvider::replying(r#"{"score": 77}"#),
        );

        let response = app
            .oneshot(post_json(
                "/api/ats-check-file",
                json!({"fileUrl": format!("{}/uploads/cv.pdf", server.uri())}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({"success": true, "data": {"score": 77}})
        );
    }

    #[tokio::test]
    async fn test_parse_resume_run_failure_is_500_and_cleans_up() {
        let server = serve_pdf().await;
        let provider = Arc::new(
            FakeProvider::replying(r#"{"name": "Ada"}"#).with_statuses(vec![RunStatus::Failed]),
        );
        let app = build_router(test_state(
            Arc::new(StubCompletion::replying("")),
            provider.clone(),
        ));

        let response = app
            .oneshot(post_json(
                "/api/parse-resume",
                json!({"fileUrl": format!("{}/uploads/cv.pdf", server.uri())}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({
                "error": "Failed to parse resume",
                "details": "Failed to parse resume: analysis run ended with status 'failed'"
            })
        );
        assert_eq!(provider.count("delete_agent:agent-1"), 1);
        assert_eq!(provider.count("delete_index:index-1"), 1);
        assert_eq!(provider.count("delete_file:file-1"), 1);
    }

    #[tokio::test]
    async fn test_parse_resume_requires_file_url() {
        let app = app_with(StubCompletion::replying(""), FakeProvider::default());
        let response = app
            .oneshot(post_json("/api/parse-resume", json!({})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await, json!({"error": "File URL is required"}));
    }

    #[tokio::test]
    async fn test_non_post_methods_are_rejected() {
        for uri in ["/api/enhance-bullet", "/api/parse-resume", "/api/ats-check-file"] {
            let app = app_with(StubCompletion::replying(""), FakeProvider::default());
            let response = app
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED, "{uri}");
        }
    }

    fn post_raw(uri: &str, body: &'static str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_ats_score_empty_body_is_empty_resume() {
        let llm = Arc::new(StubCompletion::replying(r#"{"score": 10}"#));
        let app = build_router(test_state(llm.clone(), Arc::new(FakeProvider::default())));

        let response = app.oneshot(post_raw("/api/ats-score", "")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["score"], 10);
        assert!(llm.prompts()[0].contains("Skills: \n"));
    }

    #[tokio::test]
    async fn test_missing_body_and_content_type_is_400_json() {
        let app = app_with(StubCompletion::replying(""), FakeProvider::default());
        let response = app
            .oneshot(post_raw("/api/parse-resume", ""))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await, json!({"error": "File URL is required"}));
    }

    #[tokio::test]
    async fn test_invalid_json_body_is_400_json() {
        let app = app_with(StubCompletion::replying(""), FakeProvider::default());
        let response = app
            .oneshot(post_raw("/api/enhance-bullet", "{not json"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().starts_with("Invalid JSON body"));
    }
}
