//! Shared utilities for integration tests: a programmable ledger node and a
//! relay wired to it, both on ephemeral ports.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU16, AtomicU32, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use sendmany_relay::blockchain::SeedPhrase;
use sendmany_relay::config::RelayConfig;
use sendmany_relay::lifecycle::startup::build_server;
use sendmany_relay::lifecycle::Shutdown;

pub const SEED: &str = "qxotemickgexwfmrdniukihtuhwmvotnuwtyzfrqmchrqoljndjnetv";
pub const IDENTITY: &str = "FDVORCTKJZVEBFYUXRVUHMPXLMADKSQKAOXLEXUASDGNXXGSXDIACIGHPYSF";
pub const ALICE: &str = "BZBQFLLBNCXEMGLOBHUVFTLUPLVCPQUASSILFABOFFBCADQSSUPNWLZBQEXK";
pub const BOB: &str = "DJZMUACQMTYFSEJEYLDBWIGELSFCBMBLPCMBBYFXJHLTGWKHTRRJXTDEHTFL";

/// Behaviour knobs and call records for the mock node.
pub struct NodeState {
    pub tick: AtomicU32,
    pub broadcast_status: AtomicU16,
    pub delay_ms: AtomicU64,
    pub tick_calls: AtomicUsize,
    pub broadcasts: Mutex<Vec<String>>,
}

impl NodeState {
    pub fn broadcasts(&self) -> Vec<String> {
        self.broadcasts.lock().unwrap().clone()
    }
}

pub struct MockNode {
    pub addr: SocketAddr,
    pub state: Arc<NodeState>,
}

impl MockNode {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

async fn tick_info(State(state): State<Arc<NodeState>>) -> Json<Value> {
    state.tick_calls.fetch_add(1, Ordering::SeqCst);
    let delay = state.delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }
    Json(json!({
        "tickInfo": {
            "tick": state.tick.load(Ordering::SeqCst),
            "duration": 1,
            "epoch": 150,
            "initialTick": 1
        }
    }))
}

async fn broadcast(
    State(state): State<Arc<NodeState>>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let encoded = body["encodedTransaction"].as_str().unwrap_or_default().to_string();
    state.broadcasts.lock().unwrap().push(encoded);

    let status = StatusCode::from_u16(state.broadcast_status.load(Ordering::SeqCst))
        .unwrap_or(StatusCode::OK);
    if status.is_success() {
        (status, Json(json!({"peersBroadcasted": 3, "encodedTransaction": body["encodedTransaction"]})))
    } else {
        (status, Json(json!({"code": 3, "message": "transaction rejected"})))
    }
}

/// Start a mock ledger node reporting `tick`.
pub async fn start_mock_node(tick: u32) -> MockNode {
    let state = Arc::new(NodeState {
        tick: AtomicU32::new(tick),
        broadcast_status: AtomicU16::new(200),
        delay_ms: AtomicU64::new(0),
        tick_calls: AtomicUsize::new(0),
        broadcasts: Mutex::new(Vec::new()),
    });

    let app = Router::new()
        .route("/v1/tick-info", get(tick_info))
        .route("/v1/broadcast-transaction", post(broadcast))
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockNode { addr, state }
}

/// A running relay and the handle to stop it.
pub struct Relay {
    pub url: String,
    pub shutdown: Shutdown,
    pub handle: JoinHandle<Result<(), std::io::Error>>,
}

pub fn relay_config(node_url: &str) -> RelayConfig {
    let mut config = RelayConfig::default();
    config.node.rpc_url = node_url.to_string();
    config.node.rpc_timeout_secs = 2;
    config.server.request_timeout_secs = 2;
    config.server.shutdown_timeout_secs = 1;
    config.wallet.source_identity = IDENTITY.to_string();
    config.wallet.seed = Some(SeedPhrase::new(SEED));
    config
}

/// Start a relay on an ephemeral port.
pub async fn start_relay(config: RelayConfig) -> Relay {
    let server = build_server(&config).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());

    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    let handle = tokio::spawn(server.run(listener, receiver));

    Relay {
        url,
        shutdown,
        handle,
    }
}

pub fn transfers() -> Value {
    json!([
        {"destination": ALICE, "amount": 100},
        {"destination": BOB, "amount": 250}
    ])
}
