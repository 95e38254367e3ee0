pub mod guidelines;
pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
    Router,
};

use crate::context::handlers as context_handlers;
use crate::extraction::handlers as extraction_handlers;
use crate::generation::handlers as generation_handlers;
use crate::state::AppState;

/// Largest accepted request body, uploads included.
pub const MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Guidelines
        .route(
            "/api/guidelines",
            get(guidelines::handle_list_guidelines).post(guidelines::handle_create_guideline),
        )
        .route(
            "/api/guidelines/:id",
            patch(guidelines::handle_update_guideline),
        )
        .route(
            "/api/guidelines/:id/context",
            get(context_handlers::handle_guideline_context),
        )
        .route(
            "/api/guidelines/extract",
            post(extraction_handlers::handle_extract),
        )
        .route(
            "/api/guidelines/upload",
            post(extraction_handlers::handle_upload),
        )
        // Content
        .route(
            "/api/content",
            get(generation_handlers::handle_list_content)
                .post(generation_handlers::handle_create_content),
        )
        .route(
            "/api/content/generate",
            post(generation_handlers::handle_generate),
        )
        .route(
            "/api/content/:id",
            patch(generation_handlers::handle_update_content),
        )
        .route(
            "/api/content/:id/context",
            get(context_handlers::handle_content_history),
        )
        // Interaction history
        .route(
            "/api/context/history",
            get(context_handlers::handle_user_history),
        )
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::llm_client::fake::ScriptedGenerator;
    use crate::models::guideline::sample_guideline;
    use crate::storage::MemoryStore;

    const BOUNDARY: &str = "brandline-test-boundary";
    const SCENARIO: &str = "Our mission: To build trust. Our values: Integrity, Quality, Quality.";

    fn app_with(llm: Arc<ScriptedGenerator>) -> Router {
        build_router(AppState {
            store: Arc::new(MemoryStore::new()),
            llm,
            parse_retry_delay: Duration::ZERO,
        })
    }

    fn app() -> Router {
        app_with(Arc::new(ScriptedGenerator::new(Vec::new())))
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn multipart_request(
        uri: &str,
        file: Option<(&str, &str, &str)>,
        fields: &[(&str, &str)],
    ) -> Request<Body> {
        let mut body = String::new();
        for (name, value) in fields {
            body.push_str(&format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            ));
        }
        if let Some((file_name, content_type, text)) = file {
            body.push_str(&format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; \
                 filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n{text}\r\n"
            ));
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));

        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn guideline_body(user_id: i64) -> Value {
        let mut body = serde_json::to_value(sample_guideline()).unwrap();
        body["user_id"] = json!(user_id);
        body
    }

    async fn create_guideline(app: &Router, user_id: i64) -> i64 {
        let (status, body) = send(
            app,
            json_request("POST", "/api/guidelines", guideline_body(user_id)),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_i64().unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(&app(), get_request("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "brandline-api");
    }

    #[tokio::test]
    async fn test_create_and_list_guidelines() {
        let app = app();
        let id = create_guideline(&app, 1).await;
        create_guideline(&app, 2).await;

        let (status, body) = send(&app, get_request("/api/guidelines?user_id=1")).await;
        assert_eq!(status, StatusCode::OK);
        let list = body.as_array().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0]["id"], id);
        assert_eq!(list[0]["name"], "Acme Coffee");
    }

    #[tokio::test]
    async fn test_invalid_guideline_is_400() {
        let mut body = guideline_body(1);
        body["formality_scale"] = json!(9);
        let (status, body) = send(&app(), json_request("POST", "/api/guidelines", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_update_guideline_by_other_user_is_403() {
        let app = app();
        let id = create_guideline(&app, 1).await;
        let (status, body) = send(
            &app,
            json_request("PATCH", &format!("/api/guidelines/{id}"), guideline_body(2)),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["code"], "FORBIDDEN");
    }

    #[tokio::test]
    async fn test_missing_guideline_context_is_404() {
        let (status, body) = send(&app(), get_request("/api/guidelines/99/context?user_id=1")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_guideline_context_preview() {
        let app = app();
        let id = create_guideline(&app, 1).await;
        let (status, body) = send(
            &app,
            get_request(&format!("/api/guidelines/{id}/context?user_id=1")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["guidelines"]["id"], id);
        assert_eq!(body["performance"]["sentiment"], "low");
        assert_eq!(body["previous_content"], json!([]));
    }

    #[tokio::test]
    async fn test_extract_returns_heuristic_draft() {
        let request = multipart_request(
            "/api/guidelines/extract",
            Some(("guide.txt", "text/plain", SCENARIO)),
            &[],
        );
        let (status, body) = send(&app(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["confidence"], 38);
        assert_eq!(body["fields"]["brand_values"], json!(["Integrity", "Quality"]));
    }

    #[tokio::test]
    async fn test_extract_rejects_unsupported_type() {
        let request = multipart_request(
            "/api/guidelines/extract",
            Some(("logo.png", "image/png", "not really a png")),
            &[],
        );
        let (status, body) = send(&app(), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("unsupported file type"));
    }

    #[tokio::test]
    async fn test_extract_without_file_is_400() {
        let request = multipart_request("/api/guidelines/extract", None, &[("user_id", "1")]);
        let (status, _) = send(&app(), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_upload_creates_guideline_from_analysis() {
        let llm = Arc::new(ScriptedGenerator::new(vec![
            Ok("garbage".to_string()),
            Ok(r#"{"brandIdentity": {}, "voice": {"primary": "warm"}, "detectedTone": {}, "confidence": {}}"#.to_string()),
        ]));
        let app = app_with(llm.clone());

        let request = multipart_request(
            "/api/guidelines/upload",
            Some(("guide.md", "text/markdown", SCENARIO)),
            &[("document_type", "brand-guidelines"), ("user_id", "1")],
        );
        let (status, body) = send(&app, request).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(llm.calls(), 2);
        assert_eq!(body["guideline"]["name"], "Brand Guidelines");
        assert_eq!(body["guideline"]["voice"], "warm");
        assert_eq!(body["guideline"]["source_type"], "document");
        assert_eq!(body["guideline"]["core_values"], json!(["Integrity", "Quality"]));
        assert_eq!(body["analysis"]["confidence"]["overall"], 38.0);
        assert_eq!(body["draft"]["confidence"], 38);

        let (_, list) = send(&app, get_request("/api/guidelines?user_id=1")).await;
        assert_eq!(list.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_upload_requires_user_id() {
        let request = multipart_request(
            "/api/guidelines/upload",
            Some(("guide.txt", "text/plain", SCENARIO)),
            &[],
        );
        let (status, _) = send(&app(), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_upload_exhausting_retries_is_502() {
        let app = app();
        let request = multipart_request(
            "/api/guidelines/upload",
            Some(("guide.txt", "text/plain", SCENARIO)),
            &[("user_id", "1")],
        );
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["code"], "GENERATION_ERROR");
    }

    #[tokio::test]
    async fn test_create_content_survives_failed_analysis() {
        let app = app();
        let guideline_id = create_guideline(&app, 1).await;

        let (status, body) = send(
            &app,
            json_request(
                "POST",
                "/api/content",
                json!({
                    "user_id": 1,
                    "guideline_id": guideline_id,
                    "content": "Fresh roast drops Friday",
                    "platform": "twitter",
                    "status": "draft"
                }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["content"], "Fresh roast drops Friday");
        assert_eq!(body["engagement"], json!({}));
        assert_eq!(body["analysis"]["status"], "skipped");

        let (_, list) = send(&app, get_request("/api/content?user_id=1")).await;
        assert_eq!(list.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_create_content_for_unknown_guideline_is_404() {
        let (status, _) = send(
            &app(),
            json_request(
                "POST",
                "/api/content",
                json!({
                    "user_id": 1,
                    "guideline_id": 42,
                    "content": "hello",
                    "platform": "twitter",
                    "status": "draft"
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_update_content_engagement_and_history() {
        let app = app();
        let guideline_id = create_guideline(&app, 1).await;
        let (_, created) = send(
            &app,
            json_request(
                "POST",
                "/api/content",
                json!({
                    "user_id": 1,
                    "guideline_id": guideline_id,
                    "content": "Fresh roast drops Friday",
                    "platform": "instagram",
                    "status": "draft"
                }),
            ),
        )
        .await;
        let id = created["id"].as_i64().unwrap();

        let (status, body) = send(
            &app,
            json_request(
                "PATCH",
                &format!("/api/content/{id}"),
                json!({"user_id": 1, "status": "posted", "engagement": {"likes": 120}}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "posted");
        assert_eq!(body["engagement"]["likes"], 120);

        let (status, history) =
            send(&app, get_request(&format!("/api/content/{id}/context?user_id=1"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(history, json!([]));
    }

    #[tokio::test]
    async fn test_generate_requires_prompt() {
        let (status, body) = send(
            &app(),
            json_request(
                "POST",
                "/api/content/generate",
                json!({"user_id": 1, "platform": "twitter", "prompt": ""}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_generate_caption() {
        let llm = Arc::new(ScriptedGenerator::replying(
            r#"{"content": "Roast day!", "understanding": "u", "reasoning": "r", "improvements": []}"#,
        ));
        let (status, body) = send(
            &app_with(llm),
            json_request(
                "POST",
                "/api/content/generate",
                json!({"user_id": 1, "platform": "twitter", "prompt": "roast day"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["content"], "Roast day!");
        assert!(body.get("hashtags").is_none());
    }

    #[tokio::test]
    async fn test_user_history_lists_generation_interactions() {
        let llm = Arc::new(ScriptedGenerator::replying(
            r#"{"content": "Roast day!", "understanding": "u", "reasoning": "r", "improvements": []}"#,
        ));
        let app = app_with(llm);
        let id = create_guideline(&app, 1).await;
        let (status, _) = send(
            &app,
            json_request(
                "POST",
                "/api/content/generate",
                json!({"user_id": 1, "guideline_id": id, "platform": "instagram", "prompt": "roast day"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(&app, get_request("/api/context/history?user_id=1")).await;
        assert_eq!(status, StatusCode::OK);
        let history = body.as_array().unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0]["content_id"], -1);
        assert_eq!(history[0]["interaction_type"], "generation");

        let (_, body) = send(&app, get_request("/api/context/history?user_id=2")).await;
        assert_eq!(body, json!([]));
    }
}
