mod common;

use std::sync::Arc;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use common::{PAGE, StubFetcher, StubLlm, pipeline};
use croscan_app::Pipeline;
use croscan_app::server::router;
use serde_json::Value;
use tower::ServiceExt;

async fn get(pipeline: Pipeline, uri: &str) -> (StatusCode, Value) {
    let response = router(Arc::new(pipeline))
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn analyze_wraps_reply_in_result() {
    let reply = r#"{"page_summary":"shop","elements":[]}"#;
    let (status, body) = get(
        pipeline(StubFetcher::Page(PAGE), StubLlm::Reply(reply)),
        "/analyze?url=https%3A%2F%2Fshop.test%2F",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!({ "result": reply }));
}

#[tokio::test]
async fn analyze_passes_cleaned_page_to_model() {
    let (status, body) = get(
        pipeline(StubFetcher::Page(PAGE), StubLlm::Echo),
        "/analyze?url=https://shop.test/",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], "<html><body><h1>Buy Now</h1></body></html>");
}

#[tokio::test]
async fn fetch_failure_is_a_client_error() {
    let (status, body) = get(
        pipeline(StubFetcher::NotFound, StubLlm::Echo),
        "/analyze?url=https://shop.test/gone",
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let detail = body["detail"].as_str().unwrap();
    assert!(detail.starts_with("Failed to fetch URL"), "{detail}");
}

#[tokio::test]
async fn inference_failure_is_a_server_error() {
    let (status, body) = get(
        pipeline(StubFetcher::Page(PAGE), StubLlm::Down),
        "/analyze?url=https://shop.test/",
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!body["detail"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn missing_url_is_rejected() {
    for uri in ["/analyze", "/analyze?url=", "/analyze?url=%20"] {
        let (status, body) = get(pipeline(StubFetcher::Page(PAGE), StubLlm::Echo), uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(body["detail"].as_str().unwrap().contains("url"), "{uri}");
    }
}

#[tokio::test]
async fn health_reports_model_and_reachability() {
    let (status, body) = get(pipeline(StubFetcher::Page(PAGE), StubLlm::Down), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["model"], "stub-model");
    assert_eq!(body["llm_reachable"], false);
}
