//! Metrics collection and exposition.
//!
//! # Metrics
//! - `sendmany_requests_total` (counter): relayed batches by outcome
//! - `sendmany_stage_failures_total` (counter): failures by pipeline stage and kind
//! - `sendmany_pipeline_duration_seconds` (histogram): end-to-end pipeline latency
//! - `sendmany_transfers_per_batch` (histogram): batch sizes
//!
//! Recording is a no-op until [`init_metrics`] installs the Prometheus recorder.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::blockchain::types::PipelineError;

/// Install the Prometheus recorder and its scrape listener on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a completed pipeline run.
pub fn record_outcome(result: Result<(), &PipelineError>, start: Instant) {
    let outcome = match result {
        Ok(()) => "success",
        Err(e) => {
            ::metrics::counter!(
                "sendmany_stage_failures_total",
                "stage" => e.stage().as_str(),
                "kind" => e.kind()
            )
            .increment(1);
            e.kind()
        }
    };

    ::metrics::counter!("sendmany_requests_total", "outcome" => outcome).increment(1);
    ::metrics::histogram!("sendmany_pipeline_duration_seconds")
        .record(start.elapsed().as_secs_f64());
}

pub fn record_batch_size(transfers: usize) {
    ::metrics::histogram!("sendmany_transfers_per_batch").record(transfers as f64);
}
