//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Pipeline and HTTP gateway produce:
//!     → logging.rs (structured log events, request id in span)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON lines)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through all log events for a request
//! - Metrics are cheap and recorded whether or not an exporter is installed
//! - Seeds and key material never reach either sink

pub mod logging;
pub mod metrics;
