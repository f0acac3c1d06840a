//! Send-many relay library.

pub mod blockchain;
pub mod config;
pub mod crypto;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use blockchain::SendManyPipeline;
pub use config::schema::RelayConfig;
pub use http::RelayServer;
pub use lifecycle::Shutdown;
