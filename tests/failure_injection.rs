//! Failure injection tests for the relay: unreachable, slow, and rejecting nodes.

use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};

use axum::http::StatusCode;

use sendmany_relay::http::ErrorBody;

mod common;

async fn post_transfers(url: &str) -> reqwest::Response {
    reqwest::Client::new()
        .post(format!("{}/send-transfers", url))
        .json(&common::transfers())
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_unreachable_node_is_internal_error() {
    let dead_port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let config = common::relay_config(&format!("http://127.0.0.1:{}", dead_port));
    let relay = common::start_relay(config).await;

    let res = post_transfers(&relay.url).await;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: ErrorBody = res.json().await.unwrap();
    assert_eq!(body.stage, "tick");
    assert!(body.error.starts_with("Ledger node unavailable"), "{}", body.error);
}

#[tokio::test]
async fn test_node_rejection_is_internal_error() {
    let node = common::start_mock_node(500).await;
    node.state.broadcast_status.store(400, Ordering::SeqCst);
    let relay = common::start_relay(common::relay_config(&node.url())).await;

    let res = post_transfers(&relay.url).await;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: ErrorBody = res.json().await.unwrap();
    assert_eq!(body.stage, "broadcast");
    assert!(body.error.contains("status 400"), "{}", body.error);
    assert_eq!(node.state.broadcasts().len(), 1);
}

#[tokio::test]
async fn test_slow_tick_query_hits_deadline() {
    let node = common::start_mock_node(1000).await;
    node.state.delay_ms.store(5_000, Ordering::SeqCst);

    let mut config = common::relay_config(&node.url());
    config.server.request_timeout_secs = 1;
    config.node.rpc_timeout_secs = 10;
    let relay = common::start_relay(config).await;

    let started = Instant::now();
    let res = post_transfers(&relay.url).await;
    assert!(started.elapsed() < Duration::from_secs(4));

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: ErrorBody = res.json().await.unwrap();
    assert_eq!(body.stage, "tick");
    assert!(body.error.contains("deadline exceeded"), "{}", body.error);
    assert!(node.state.broadcasts().is_empty());
}

#[tokio::test]
async fn test_shutdown_cancels_stuck_request() {
    let node = common::start_mock_node(1000).await;
    node.state.delay_ms.store(10_000, Ordering::SeqCst);

    let mut config = common::relay_config(&node.url());
    config.server.request_timeout_secs = 30;
    config.node.rpc_timeout_secs = 30;
    config.server.shutdown_timeout_secs = 1;
    let relay = common::start_relay(config).await;

    let url = relay.url.clone();
    let in_flight = tokio::spawn(async move { post_transfers(&url).await });

    // Let the request reach the node before shutting down.
    while node.state.tick_calls.load(Ordering::SeqCst) == 0 {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    relay.shutdown.trigger();

    let res = tokio::time::timeout(Duration::from_secs(5), in_flight)
        .await
        .expect("request should finish after the grace period")
        .unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: ErrorBody = res.json().await.unwrap();
    assert!(body.error.contains("request cancelled"), "{}", body.error);

    tokio::time::timeout(Duration::from_secs(5), relay.handle)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert!(node.state.broadcasts().is_empty());
}
