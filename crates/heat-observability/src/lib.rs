//! Observability infrastructure for the heat service.
//!
//! This crate provides:
//! - `init_logging` - tracing subscriber setup (`LogConfig`, `LogFormat`)
//! - `RequestId` - Unique request identifier
//! - `MetricsCollector` / `RequestMetrics` - Per-request timing and outcome

mod logging;
mod metrics;
mod request;

pub use logging::*;
pub use metrics::*;
pub use request::*;
