pub mod health;
pub mod usage;

use axum::{
    routing::{get, post},
    Router,
};

use crate::generation::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // JD generation
        .route("/jdgen/", post(handlers::handle_generate_jd))
        .route("/jdgen/:id", get(handlers::handle_get_generation))
        // Usage analytics
        .route("/usage/", get(usage::handle_get_usage))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::{Config, DEFAULT_MODEL, DEFAULT_SOURCE_TAG};
    use crate::llm_client::{Inference, InferenceError};
    use crate::models::generation::GenerationStatus;
    use crate::storage::{GenerationStore, InMemoryStore};

    /// Provider stand-in: either answers with fixed text or fails with a status.
    struct ScriptedInference(Result<&'static str, u16>);

    #[async_trait]
    impl Inference for ScriptedInference {
        async fn complete(
            &self,
            _prompt: &str,
            _max_tokens: u32,
            _temperature: f32,
            _system_prompt: Option<&str>,
        ) -> Result<String, InferenceError> {
            match self.0 {
                Ok(text) => Ok(text.to_string()),
                Err(status) => Err(InferenceError::Provider {
                    status,
                    body: r#"{"error":"overloaded"}"#.to_string(),
                }),
            }
        }
    }

    fn test_config(api_token: Option<&str>) -> Config {
        Config {
            database_url: None,
            inference_api_url: "http://127.0.0.1:9/v1/chat/completions".to_string(),
            inference_api_key: "sk-test".to_string(),
            inference_model: DEFAULT_MODEL.to_string(),
            inference_timeout_secs: 30,
            api_token: api_token.map(str::to_string),
            source_tag: DEFAULT_SOURCE_TAG.to_string(),
            port: 0,
            rust_log: "info".to_string(),
        }
    }

    fn app_with(
        reply: Result<&'static str, u16>,
        api_token: Option<&str>,
    ) -> (Router, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new());
        let state = AppState {
            store: store.clone(),
            inference: Arc::new(ScriptedInference(reply)),
            config: test_config(api_token),
        };
        (build_router(state), store)
    }

    fn post_jdgen(body: impl Into<Body>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/jdgen/")
            .header("content-type", "application/json")
            .body(body.into())
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn sample_request() -> Value {
        json!({
            "payload": {
                "company": {"name": "Presear Softwares"},
                "role": "Senior Backend Engineer",
                "skills": ["Rust", "Postgres"]
            },
            "word_count": 500,
            "tone": "Professional",
            "title": "Senior Backend Engineer",
            "language": "English"
        })
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _) = app_with(Ok("unused"), None);
        let response = app.oneshot(get_request("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_generate_returns_jd_and_counts_usage() {
        let (app, store) = app_with(Ok("Senior Backend Engineer\n\nSummary: ..."), None);

        let response = app
            .clone()
            .oneshot(post_jdgen(sample_request().to_string()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["jd_text"], "Senior Backend Engineer\n\nSummary: ...");
        assert_eq!(body["word_count"], 500);
        assert_eq!(body["source"], DEFAULT_SOURCE_TAG);
        assert!(body["generated_at"].as_str().unwrap().contains('T'));

        let request_id: uuid::Uuid = body["request_id"].as_str().unwrap().parse().unwrap();
        let row = store.get_generation(request_id).await.unwrap().unwrap();
        assert_eq!(row.status(), Ok(GenerationStatus::Complete));
        assert_eq!(row.title, "Senior Backend Engineer");

        let usage = app.oneshot(get_request("/usage/")).await.unwrap();
        assert_eq!(usage.status(), StatusCode::OK);
        assert_eq!(json_body(usage).await, json!({"id": 1, "request_count": 1}));
    }

    #[tokio::test]
    async fn test_small_word_count_is_400_without_record() {
        let (app, store) = app_with(Ok("unused"), None);
        let body = json!({"payload": {"role": "SRE"}, "word_count": 49});

        let response = app.oneshot(post_jdgen(body.to_string())).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"]["code"], "VALIDATION_ERROR");
        assert!(store.generations().await.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_json_and_missing_payload_are_400() {
        let (app, store) = app_with(Ok("unused"), None);

        let malformed = app.clone().oneshot(post_jdgen("{not json")).await.unwrap();
        assert_eq!(malformed.status(), StatusCode::BAD_REQUEST);

        let wrong_type = app
            .clone()
            .oneshot(post_jdgen(json!({"payload": {}, "word_count": "many"}).to_string()))
            .await
            .unwrap();
        assert_eq!(wrong_type.status(), StatusCode::BAD_REQUEST);

        let missing = app
            .oneshot(post_jdgen(json!({"word_count": 300}).to_string()))
            .await
            .unwrap();
        assert_eq!(missing.status(), StatusCode::BAD_REQUEST);

        assert!(store.generations().await.is_empty());
    }

    #[tokio::test]
    async fn test_provider_failure_is_500_and_recorded() {
        let (app, store) = app_with(Err(503), None);

        let response = app
            .clone()
            .oneshot(post_jdgen(sample_request().to_string()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = json_body(response).await;
        assert_eq!(body["detail"], "Failed to generate JD");
        assert!(body["error"].as_str().unwrap().contains("503"));

        let rows = store.generations().await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].status(), Ok(GenerationStatus::Failed));
        assert!(!rows[0].error.as_deref().unwrap_or_default().is_empty());

        let usage = app.oneshot(get_request("/usage/")).await.unwrap();
        assert_eq!(usage.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_usage_is_404_before_first_success_and_stable_between_reads() {
        let (app, _) = app_with(Ok("JD"), None);

        let before = app.clone().oneshot(get_request("/usage/")).await.unwrap();
        assert_eq!(before.status(), StatusCode::NOT_FOUND);

        app.clone()
            .oneshot(post_jdgen(sample_request().to_string()))
            .await
            .unwrap();

        let first = json_body(app.clone().oneshot(get_request("/usage/")).await.unwrap()).await;
        let second = json_body(app.oneshot(get_request("/usage/")).await.unwrap()).await;
        assert_eq!(first, second);
        assert_eq!(first["request_count"], 1);
    }

    #[tokio::test]
    async fn test_concurrent_generations_increment_usage_by_two() {
        let (app, _) = app_with(Ok("JD"), None);

        let (a, b) = tokio::join!(
            app.clone().oneshot(post_jdgen(sample_request().to_string())),
            app.clone().oneshot(post_jdgen(sample_request().to_string())),
        );
        assert_eq!(a.unwrap().status(), StatusCode::OK);
        assert_eq!(b.unwrap().status(), StatusCode::OK);

        let usage = json_body(app.oneshot(get_request("/usage/")).await.unwrap()).await;
        assert_eq!(usage["request_count"], 2);
    }

    #[tokio::test]
    async fn test_token_required_when_configured() {
        let (app, store) = app_with(Ok("JD"), Some("s3cret"));

        let anonymous = app
            .clone()
            .oneshot(post_jdgen(sample_request().to_string()))
            .await
            .unwrap();
        assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

        let mut wrong = post_jdgen(sample_request().to_string());
        wrong
            .headers_mut()
            .insert("authorization", "Bearer nope".parse().unwrap());
        assert_eq!(
            app.clone().oneshot(wrong).await.unwrap().status(),
            StatusCode::UNAUTHORIZED
        );
        assert!(store.generations().await.is_empty());

        let mut authorized = post_jdgen(sample_request().to_string());
        authorized
            .headers_mut()
            .insert("authorization", "Bearer s3cret".parse().unwrap());
        assert_eq!(
            app.oneshot(authorized).await.unwrap().status(),
            StatusCode::OK
        );
    }

    #[tokio::test]
    async fn test_get_generation_by_id() {
        let (app, _) = app_with(Ok("JD body"), None);

        let created = json_body(
            app.clone()
                .oneshot(post_jdgen(sample_request().to_string()))
                .await
                .unwrap(),
        )
        .await;
        let id = created["request_id"].as_str().unwrap();

        let response = app.clone().oneshot(get_request(&format!("/jdgen/{id}"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let row = json_body(response).await;
        assert_eq!(row["status"], "complete");
        assert_eq!(row["output_text"], "JD body");
        assert_eq!(row["input_json"]["role"], "Senior Backend Engineer");

        let missing = app
            .oneshot(get_request(&format!("/jdgen/{}", uuid::Uuid::new_v4())))
            .await
            .unwrap();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }
}
