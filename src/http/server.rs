//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, timeout, body limit)
//! - Decode transfer batches and hand them to the pipeline
//! - Bind server to listener and drain on shutdown

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, Request},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::blockchain::{NodeClient, SendManyPipeline, TransferInstruction, Wallet};
use crate::config::schema::ServerConfig;
use crate::http::request::{request_id, MakeRequestUuid};
use crate::http::response::decode_failure;
use crate::resilience::RequestContext;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<SendManyPipeline<NodeClient>>,
    pub wallet: Arc<Wallet>,
    /// Cancelled once the shutdown grace period runs out.
    pub shutdown: CancellationToken,
    pub request_timeout: Duration,
}

/// HTTP front end for the send-many pipeline.
pub struct RelayServer {
    router: Router,
    shutdown: CancellationToken,
    shutdown_grace: Duration,
}

impl RelayServer {
    /// Create a new server around a ready pipeline and wallet.
    pub fn new(config: &ServerConfig, pipeline: SendManyPipeline<NodeClient>, wallet: Wallet) -> Self {
        let shutdown = CancellationToken::new();
        let state = AppState {
            pipeline: Arc::new(pipeline),
            wallet: Arc::new(wallet),
            shutdown: shutdown.clone(),
            request_timeout: Duration::from_secs(config.request_timeout_secs),
        };

        Self {
            router: Self::build_router(config, state),
            shutdown,
            shutdown_grace: Duration::from_secs(config.shutdown_timeout_secs),
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServerConfig, state: AppState) -> Router {
        // The pipeline enforces its own deadline; the outer timeout only
        // catches a stuck handler.
        let outer_timeout = Duration::from_secs(config.request_timeout_secs.saturating_add(1));

        Router::new()
            .route("/send-transfers", post(send_transfers))
            .route("/health", get(health))
            .with_state(state)
            .layer(RequestBodyLimitLayer::new(config.max_body_bytes))
            .layer(TimeoutLayer::new(outer_timeout))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %req.method(),
                    path = %req.uri().path(),
                    request_id = %request_id(req.headers()),
                )
            }))
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    ///
    /// Requests still running after the grace period are cancelled.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let token = self.shutdown.clone();
        let grace = self.shutdown_grace;
        let signal = async move {
            let _ = shutdown.recv().await;
            tracing::info!(grace_secs = grace.as_secs(), "Draining in-flight requests");
            tokio::spawn(async move {
                tokio::time::sleep(grace).await;
                token.cancel();
            });
        };

        axum::serve(listener, self.router)
            .with_graceful_shutdown(signal)
            .await?;

        self.shutdown.cancel();
        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Decode a transfer batch, relay it, and return the node's acknowledgement.
async fn send_transfers(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<Vec<TransferInstruction>>, JsonRejection>,
) -> Response {
    let Json(instructions) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            tracing::warn!(request_id = %request_id(&headers), error = %rejection.body_text(), "Rejected request body");
            return decode_failure(rejection);
        }
    };

    let ctx = RequestContext::child_of(&state.shutdown).with_timeout(state.request_timeout);
    // Dropping the handler (client went away) cancels the context.
    let _guard = ctx.cancel_on_drop();

    tracing::debug!(
        request_id = %request_id(&headers),
        transfers = instructions.len(),
        "Relaying transfer batch"
    );

    match state.pipeline.send_many(&ctx, &state.wallet, &instructions).await {
        Ok(ack) => Json(ack).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
