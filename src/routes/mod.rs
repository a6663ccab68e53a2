//! Router assembly: HTTP endpoints, WebSocket upgrade, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;
pub mod ws;

/// Build the application router with:
/// - WebSocket at `/ws`
/// - JSON API under `/api/...` (catalog, quiz, preview, sessions, analyzer)
/// - CORS (allow any origin/method/headers)
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // WebSocket
        .route("/ws", get(ws::ws_upgrade))
        // Catalog
        .route("/api/health", get(http::http_health))
        .route("/api/modules", get(http::http_list_modules))
        .route("/api/modules/:module_id", get(http::http_get_module))
        .route("/api/modules/:module_id/lessons/:lesson_id", get(http::http_get_lesson))
        .route("/api/modules/:module_id/lessons/:lesson_id/quiz", post(http::http_post_quiz))
        .route("/api/lessons", get(http::http_list_lessons))
        // Preview sandbox
        .route("/api/preview", post(http::http_post_preview))
        .route("/api/preview/document", post(http::http_post_preview_document))
        // Gamification
        .route("/api/badges", get(http::http_list_badges))
        .route("/api/levels", get(http::http_list_levels))
        .route("/api/sessions", post(http::http_create_session))
        .route("/api/sessions/:session_id", get(http::http_get_session).delete(http::http_delete_session))
        .route("/api/sessions/:session_id/xp", post(http::http_post_xp))
        .route("/api/sessions/:session_id/badges", post(http::http_post_badge))
        .route("/api/sessions/:session_id/complete", post(http::http_post_complete))
        // Playground
        .route("/api/analyze-code", post(http::http_post_analyze))
        // State + CORS + HTTP tracing
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::AppConfig;

    fn app() -> Router {
        build_router(Arc::new(AppState::from_config(AppConfig::default())))
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health() {
        let response = app().oneshot(get_req("/api/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!({ "ok": true }));
    }

    #[tokio::test]
    async fn lesson_lookup_and_404_body() {
        let response = app().oneshot(get_req("/api/modules/1/lessons/1")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let lesson = json_body(response).await;
        assert_eq!(lesson["id"], "1-1");
        assert!(!lesson["title"].as_str().unwrap().is_empty());

        let response = app().oneshot(get_req("/api/modules/99/lessons/99")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = json_body(response).await;
        assert_eq!(body["error"], "Lesson not found");
        assert!(body["availableLessons"].as_array().unwrap().iter().any(|id| id == "1-1"));
    }

    #[tokio::test]
    async fn module_detail_and_errors() {
        let response = app().oneshot(get_req("/api/modules/1")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["id"], "1");
        assert_eq!(body["totalCompletedLessons"], 0);
        assert!(body["duration"].as_str().unwrap().ends_with(" min"));
        assert_eq!(body["lessons"][0]["id"], 1);

        let response = app().oneshot(get_req("/api/modules/abc")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let response = app().oneshot(get_req("/api/modules/42")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn modules_are_listed_in_order() {
        let body = json_body(app().oneshot(get_req("/api/modules")).await.unwrap()).await;
        let ids: Vec<&str> = body.as_array().unwrap().iter().map(|m| m["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["1", "2", "3", "4"]);
    }

    #[tokio::test]
    async fn preview_endpoints() {
        let response = app()
            .oneshot(post_json("/api/preview", json!({ "code": "<h1>Hi</h1>", "language": "html" })))
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body["status"], "ready");
        assert!(body["document"].as_str().unwrap().contains("<h1>Hi</h1>"));
        assert!(body["embed"].as_str().unwrap().contains("sandbox=\"allow-scripts\""));

        let response = app()
            .oneshot(post_json("/api/preview", json!({ "code": "x", "language": "cobol" })))
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body["status"], "error");
        assert!(body["embed"].as_str().unwrap().contains("preview-error"));

        let response = app()
            .oneshot(post_json("/api/preview/document", json!({ "code": "  ", "language": "css" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app()
            .oneshot(post_json("/api/preview/document", json!({ "code": "p{}", "language": "css" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/html; charset=utf-8");
    }

    #[tokio::test]
    async fn session_flow() {
        let router = app();
        let response = router.clone().oneshot(post_json("/api/sessions", json!({}))).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = json_body(response).await;
        let id = created["sessionId"].as_str().unwrap().to_string();
        assert_eq!(created["progress"]["level"], 1);

        let uri = format!("/api/sessions/{}/xp", id);
        let body = json_body(router.clone().oneshot(post_json(&uri, json!({ "amount": 600 }))).await.unwrap()).await;
        assert_eq!(body["progress"]["xp"], 600);
        assert_eq!(body["progress"]["level"], 2);
        assert_eq!(body["progress"]["levelName"], "Apprentice");

        let uri = format!("/api/sessions/{}/badges", id);
        let body = json_body(router.clone().oneshot(post_json(&uri, json!({ "badgeId": "nope" }))).await.unwrap()).await;
        assert_eq!(body["events"][0]["type"], "unknown_badge");

        let delete = Request::builder()
            .method("DELETE")
            .uri(format!("/api/sessions/{}", id))
            .body(Body::empty())
            .unwrap();
        assert_eq!(router.clone().oneshot(delete).await.unwrap().status(), StatusCode::NO_CONTENT);
        let response = router.oneshot(get_req(&format!("/api/sessions/{}", id))).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn completing_an_unknown_lesson_awards_nothing() {
        let router = app();
        let created = json_body(router.clone().oneshot(post_json("/api/sessions", json!({}))).await.unwrap()).await;
        let id = created["sessionId"].as_str().unwrap().to_string();

        let uri = format!("/api/sessions/{}/complete", id);
        let response = router
            .clone()
            .oneshot(post_json(&uri, json!({ "moduleId": "99", "lessonId": "99" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = json_body(response).await;
        assert_eq!(body["error"], "Lesson not found");
        assert!(body["availableLessons"].as_array().is_some_and(|ids| !ids.is_empty()));

        let session = json_body(router.oneshot(get_req(&format!("/api/sessions/{}", id))).await.unwrap()).await;
        assert_eq!(session["progress"]["xp"], 0);
    }

    #[tokio::test]
    async fn quiz_and_analyzer() {
        let response = app()
            .oneshot(post_json("/api/modules/1/lessons/1/quiz", json!({ "answers": [null] })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["score"], 0);
        assert_eq!(body["verdict"], "keep_practicing");

        let response = app()
            .oneshot(post_json("/api/analyze-code", json!({ "code": "var x = 1;" })))
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body["score"], 92);
        assert_eq!(body["language"], "javascript");

        let response = app().oneshot(post_json("/api/analyze-code", json!({ "code": "" }))).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
