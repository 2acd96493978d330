//! API endpoint integration tests

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use tower::ServiceExt;

mod common;
use common::{build_test_router, FakeModel, FakeSynthesizer, TimeoutModel, FAKE_AUDIO};

fn chat_request(body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/chat")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let app = build_test_router(None, None);

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn ready_is_degraded_without_collaborators() {
    let app = build_test_router(None, None);

    let response = app
        .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = json_body(response).await;
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["checks"]["model"]["status"], "unavailable");
    assert_eq!(json["checks"]["synthesis"]["status"], "unavailable");
}

#[tokio::test]
async fn ready_is_ok_with_collaborators() {
    let app = build_test_router(
        Some(FakeModel::replying("ok")),
        Some(Arc::new(FakeSynthesizer { fail: false })),
    );

    let response = app
        .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn empty_message_is_rejected() {
    let app = build_test_router(
        Some(FakeModel::replying("unused")),
        Some(Arc::new(FakeSynthesizer { fail: false })),
    );

    let response = app
        .oneshot(chat_request(&serde_json::json!({ "message": "   " })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["error"]["code"], "bad_request");
}

#[tokio::test]
async fn chat_turn_returns_cleaned_text_and_fetchable_audio() {
    let app = build_test_router(
        Some(FakeModel::replying("**Analysis:** A straw man is...")),
        Some(Arc::new(FakeSynthesizer { fail: false })),
    );

    let response = app
        .clone()
        .oneshot(chat_request(&serde_json::json!({
            "message": "What is a straw man fallacy?"
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;

    assert_eq!(json["response"], "A straw man is...");
    assert!(!json["session_id"].as_str().unwrap().is_empty());

    let audio_url = json["audio_url"].as_str().unwrap();
    assert!(audio_url.starts_with("/audio/speech_"));
    assert!(audio_url.ends_with(".mp3"));

    let audio_response = app
        .oneshot(Request::builder().uri(audio_url).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(audio_response.status(), StatusCode::OK);
    assert_eq!(
        audio_response.headers()[header::CONTENT_TYPE],
        "audio/mpeg"
    );
    let bytes = axum::body::to_bytes(audio_response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], FAKE_AUDIO);
}

#[tokio::test]
async fn session_id_continues_the_same_conversation() {
    let model = FakeModel::replying("Noted.");
    let app = build_test_router(
        Some(model.clone()),
        Some(Arc::new(FakeSynthesizer { fail: false })),
    );

    let first = app
        .clone()
        .oneshot(chat_request(&serde_json::json!({ "message": "First turn" })))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    let first_json = json_body(first).await;
    let session_id = first_json["session_id"].as_str().unwrap().to_string();

    let second = app
        .oneshot(chat_request(&serde_json::json!({
            "message": "Second turn",
            "session_id": session_id,
        })))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::OK);
    let second_json = json_body(second).await;
    assert_eq!(second_json["session_id"].as_str().unwrap(), session_id);

    // Seed turns (2) + user = 3 on the first call; + assistant + user = 5 next
    let lens = model.seen_history_lens.lock().unwrap().clone();
    assert_eq!(lens, vec![3, 5]);
}

#[tokio::test]
async fn model_failure_degrades_to_spoken_error_text() {
    let app = build_test_router(
        Some(Arc::new(TimeoutModel)),
        Some(Arc::new(FakeSynthesizer { fail: false })),
    );

    let response = app
        .oneshot(chat_request(&serde_json::json!({ "message": "hello?" })))
        .await
        .unwrap();

    // The turn still succeeds; the error lives in the reply text
    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(
        json["response"],
        "An error occurred while processing your request: TimeoutError. Please try again."
    );
    assert!(json["audio_url"].as_str().unwrap().starts_with("/audio/"));
}

#[tokio::test]
async fn synthesis_failure_fails_the_turn() {
    let app = build_test_router(
        Some(FakeModel::replying("A fine reply.")),
        Some(Arc::new(FakeSynthesizer { fail: true })),
    );

    let response = app
        .oneshot(chat_request(&serde_json::json!({ "message": "speak up" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = json_body(response).await;
    assert_eq!(json["error"]["code"], "synthesis_failed");
}

#[tokio::test]
async fn chat_without_collaborators_is_unavailable() {
    let app = build_test_router(None, None);

    let response = app
        .oneshot(chat_request(&serde_json::json!({ "message": "anyone there?" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = json_body(response).await;
    assert_eq!(json["error"]["code"], "not_configured");
}

#[tokio::test]
async fn unknown_audio_artifact_is_not_found() {
    let app = build_test_router(None, None);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/audio/speech_0000000000000000.mp3")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = json_body(response).await;
    assert_eq!(json["error"]["code"], "not_found");
}
