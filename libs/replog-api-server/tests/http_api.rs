//! Integration tests for the replication HTTP API.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use replog_engine::{NoDelay, Node};
use serde_json::{Value, json};
use tower::ServiceExt;

fn setup_test_app() -> (Router, Arc<Node>) {
    let node = Arc::new(Node::new(Arc::new(NoDelay)));
    (replog_api_server::router(node.clone()), node)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<String>) -> (StatusCode, Vec<u8>) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(b) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(b))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body.to_vec())
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Vec<u8>) {
    send(app, "POST", uri, Some(body.to_string())).await
}

async fn read_offsets(app: &Router, uri: &str) -> Vec<u64> {
    let (status, body) = send(app, "GET", uri, None).await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    json["records"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["offset"].as_u64().unwrap())
        .collect()
}

async fn sync(app: &Router, upper: u64) -> Vec<u64> {
    let (status, body) = post(app, "/internal/sync", json!({"offset": upper})).await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    json["offsets"]
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o.as_u64().unwrap())
        .collect()
}

#[tokio::test]
async fn test_health_is_empty_ok() {
    let (app, _node) = setup_test_app();
    let (status, body) = send(&app, "GET", "/internal/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_read_on_empty_log() {
    let (app, _node) = setup_test_app();
    let (status, body) = send(&app, "GET", "/internal/post", None).await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json, json!({"records": []}));
}

#[tokio::test]
async fn test_single_record_roundtrip_keeps_payload() {
    let (app, _node) = setup_test_app();

    let (status, body) = post(&app, "/internal/post", json!({"offset": 0, "value": "hello"})).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());

    let (_, body) = send(&app, "GET", "/internal/post", None).await;
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json, json!({"records": [{"offset": 0, "value": "hello"}]}));
}

#[tokio::test]
async fn test_out_of_order_batch_with_duplicate() {
    let (app, node) = setup_test_app();

    let (status, _) = post(
        &app,
        "/internal/post",
        json!({"records": [{"offset": 2}, {"offset": 0}, {"offset": 1}, {"offset": 0}]}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(read_offsets(&app, "/internal/post").await, vec![0, 1, 2]);
    assert_eq!(node.status().await.records, 3);
}

#[tokio::test]
async fn test_bare_list_is_accepted() {
    let (app, _node) = setup_test_app();
    let (status, _) = post(&app, "/internal/post", json!([{"offset": 1}, {"offset": 0}])).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(read_offsets(&app, "/").await, vec![0, 1]);
}

#[tokio::test]
async fn test_gap_withholds_records_and_sync_reports_it() {
    let (app, node) = setup_test_app();

    for offset in [0, 1, 3] {
        let (status, _) = post(&app, "/internal/post", json!({"offset": offset})).await;
        assert_eq!(status, StatusCode::OK);
    }

    assert_eq!(read_offsets(&app, "/internal/post").await, vec![0, 1]);
    assert_eq!(node.records().await.len(), 3);
    assert_eq!(sync(&app, 5).await, vec![2, 4, 5]);

    // Catch-up: resend the gap, the withheld record becomes visible.
    post(&app, "/internal/post", json!({"offset": 2})).await;
    assert_eq!(read_offsets(&app, "/internal/post").await, vec![0, 1, 2, 3]);
    assert_eq!(sync(&app, 5).await, vec![4, 5]);
}

#[tokio::test]
async fn test_sync_on_empty_log() {
    let (app, _node) = setup_test_app();
    assert_eq!(sync(&app, 2).await, vec![0, 1, 2]);
}

#[tokio::test]
async fn test_scalar_payloads_are_unsupported() {
    let (app, node) = setup_test_app();
    post(&app, "/internal/post", json!({"offset": 0})).await;

    for body in [json!(42), json!("a string"), json!(null), json!({"records": "nope"})] {
        let (status, resp) = post(&app, "/internal/post", body).await;
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert!(resp.is_empty());
    }
    assert_eq!(node.records().await.len(), 1);
}

#[tokio::test]
async fn test_non_json_body_is_unsupported() {
    let (app, node) = setup_test_app();
    let (status, _) = send(&app, "POST", "/internal/post", Some("offset=1".to_string())).await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert!(node.records().await.is_empty());
}

#[tokio::test]
async fn test_missing_offset_rejects_whole_batch() {
    let (app, node) = setup_test_app();

    let (status, body) = post(
        &app,
        "/internal/post",
        json!({"records": [{"offset": 0}, {"value": "lost"}, {"offset": 2}]}),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body.is_empty());
    assert!(node.records().await.is_empty());

    let (status, _) = post(&app, "/internal/post", json!({"offset": -3})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(node.records().await.is_empty());
}

#[tokio::test]
async fn test_invalid_sync_body() {
    let (app, _node) = setup_test_app();
    for body in [json!({}), json!({"offset": "5"}), json!(5)] {
        let (status, resp) = post(&app, "/internal/sync", body).await;
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert!(resp.is_empty());
    }
}

#[tokio::test]
async fn test_oversized_sync_bound_is_rejected() {
    let (app, node) = setup_test_app();
    post(&app, "/internal/post", json!({"offset": 0})).await;

    for upper in [u64::MAX, 10_000_000_000] {
        let (status, resp) = post(&app, "/internal/sync", json!({"offset": upper})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(resp.is_empty());
    }

    // Node keeps serving after the rejection.
    let (status, _) = send(&app, "GET", "/internal/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(sync(&app, 3).await, vec![1, 2, 3]);
    assert_eq!(read_offsets(&app, "/internal/post").await, vec![0]);
    assert_eq!(node.records().await.len(), 1);
}

#[tokio::test]
async fn test_sync_span_limit_is_configurable() {
    let node = Arc::new(Node::new(Arc::new(NoDelay)).with_max_sync_span(4));
    let app = replog_api_server::router(node);

    assert_eq!(sync(&app, 3).await, vec![0, 1, 2, 3]);
    let (status, _) = post(&app, "/internal/sync", json!({"offset": 4})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // The limit counts from the contiguous prefix, so it moves with it.
    post(&app, "/internal/post", json!([{"offset": 0}, {"offset": 1}])).await;
    assert_eq!(sync(&app, 5).await, vec![2, 3, 4, 5]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_appends_converge() {
    let (app, _node) = setup_test_app();

    let mut handles = Vec::new();
    for offset in (0..64u64).rev() {
        let app = app.clone();
        handles.push(tokio::spawn(async move {
            post(&app, "/internal/post", json!({"offset": offset, "value": offset})).await.0
        }));
    }
    for h in handles {
        assert_eq!(h.await.unwrap(), StatusCode::OK);
    }

    assert_eq!(read_offsets(&app, "/internal/post").await, (0..64).collect::<Vec<_>>());
    assert!(sync(&app, 63).await.is_empty());
}
