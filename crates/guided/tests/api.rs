//! Route-level tests for the guided API, driven through the router without
//! binding a socket.

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use guide_core::{GuideConfig, GuideSystem, KnowledgeBase};
use guided::server::{router, AppState};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::util::ServiceExt;

const DOC: &str = r#"## City Information
**City Name:** Mumbai

## Common Slang & Phrases
- **bhai** - brother/friend
- **cutting** - half cup of tea

## Local Food & Street Vendors
- **Morning:** Vada pav, poha
- **Evening:** Bhel puri, sev puri

## Transport Habits
### Local Trains
Fastest during peak but very crowded.

## Local Pricing Expectations
### Street Food
- Vada pav: ₹30
- Thali: ₹200

## Safety Notes
- **Late night:** Stick to main roads
"#;

fn app() -> Router {
    let guide = GuideSystem::from_knowledge(KnowledgeBase::parse(DOC), GuideConfig::default());
    router(Arc::new(AppState::new(guide)))
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn chat_returns_response_and_session() {
    let app = app();
    let response = app
        .oneshot(post_json("/v1/chat", json!({"message": "what does cutting mean?"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert!(body["session_id"].is_string());
    assert!(body["response"]["response_text"]
        .as_str()
        .unwrap()
        .contains("half cup of tea"));
    let score = body["response"]["confidence_score"]["overall_score"]
        .as_f64()
        .unwrap();
    assert!((0.0..=1.0).contains(&score));
}

#[tokio::test]
async fn sessions_keep_isolated_history() {
    let app = app();

    let first = body_json(
        app.clone()
            .oneshot(post_json("/v1/chat", json!({"message": "where should I eat"})))
            .await
            .unwrap(),
    )
    .await;
    let session_a = first["session_id"].as_str().unwrap().to_string();

    // Second turn on the same session, one turn on a fresh session
    app.clone()
        .oneshot(post_json(
            "/v1/chat",
            json!({"message": "what about trains", "session_id": session_a}),
        ))
        .await
        .unwrap();
    let second = body_json(
        app.clone()
            .oneshot(post_json("/v1/chat", json!({"message": "bhai scene kya hai"})))
            .await
            .unwrap(),
    )
    .await;
    let session_b = second["session_id"].as_str().unwrap().to_string();
    assert_ne!(session_a, session_b);

    let history_a = body_json(
        app.clone()
            .oneshot(get(&format!("/v1/history/{}", session_a)))
            .await
            .unwrap(),
    )
    .await;
    let history_b = body_json(
        app.clone()
            .oneshot(get(&format!("/v1/history/{}", session_b)))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(history_a.as_array().unwrap().len(), 2);
    assert_eq!(history_b.as_array().unwrap().len(), 1);
    assert_eq!(history_a[0]["query"], "where should I eat");

    // Clearing one session leaves the other intact
    let cleared = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/v1/history/{}/clear", session_a))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(cleared.status(), StatusCode::NO_CONTENT);

    let history_a = body_json(
        app.clone()
            .oneshot(get(&format!("/v1/history/{}", session_a)))
            .await
            .unwrap(),
    )
    .await;
    assert!(history_a.as_array().unwrap().is_empty());
    let history_b = body_json(
        app.oneshot(get(&format!("/v1/history/{}", session_b)))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(history_b.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn translate_route() {
    let app = app();
    let response = app
        .oneshot(post_json(
            "/v1/translate",
            json!({"text": "bhai, one cutting", "direction": "to_standard"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(
        body["translated_text"],
        "brother/friend, one half cup of tea"
    );
    assert_eq!(body["slang_words_found"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn recommendations_route_with_budget() {
    let app = app();
    let response = app
        .oneshot(get("/v1/recommendations/food?budget=low"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let rendered = body.to_string();
    assert!(rendered.contains("Vada pav"));
    assert!(!rendered.contains("Thali"));
}

#[tokio::test]
async fn recommendations_route_rejects_unknown_kind() {
    let app = app();
    let response = app
        .oneshot(get("/v1/recommendations/nightlife"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn status_route() {
    let app = app();
    let body = body_json(app.oneshot(get("/v1/status")).await.unwrap()).await;
    assert_eq!(body["city"], "Mumbai");
    assert_eq!(body["slang_terms"], 2);
    assert_eq!(body["active_sessions"], 0);
}

#[tokio::test]
async fn debug_route() {
    let app = app();
    let body = body_json(
        app.oneshot(post_json("/v1/debug", json!({"query": "where should I eat tonight"})))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(body["analysis"]["intent"], "food_recommendation");
    assert!(body["context_previews"].as_array().unwrap().len() <= 3);
    assert!(body["reasoning"]["response"].is_string());
}
