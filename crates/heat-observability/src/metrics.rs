//! Per-request timing metrics.

use std::time::Instant;

use heat_core::{WorkloadError, WorkloadKind, WorkloadResult};
use crate::RequestId;

/// Metrics for a single request.
#[derive(Debug, Clone)]
pub struct RequestMetrics {
    /// Request ID for correlation.
    pub request_id: String,
    /// HTTP method.
    pub method: String,
    /// Route path (without query).
    pub route: String,
    /// Workload that ran, if any.
    pub workload: Option<String>,
    /// Time spent inside the workload, as reported by it (milliseconds).
    pub workload_ms: Option<u64>,
    /// Error message if the workload failed.
    pub error: Option<String>,
    /// HTTP status code.
    pub status_code: u16,
    /// Total request duration (microseconds).
    pub total_duration_us: u64,
}

/// Collector for request metrics.
#[derive(Debug)]
pub struct MetricsCollector {
    request_id: RequestId,
    method: String,
    route: String,
    start: Instant,
    workload: Option<WorkloadKind>,
    workload_ms: Option<u64>,
    error: Option<String>,
}

impl MetricsCollector {
    /// Create a new metrics collector.
    pub fn new(request_id: RequestId) -> Self {
        Self {
            request_id,
            method: String::new(),
            route: String::new(),
            start: Instant::now(),
            workload: None,
            workload_ms: None,
            error: None,
        }
    }

    /// Set HTTP method.
    pub fn set_method(&mut self, method: impl Into<String>) {
        self.method = method.into();
    }

    /// Set route path.
    pub fn set_route(&mut self, route: impl Into<String>) {
        self.route = route.into();
    }

    /// Record a completed workload.
    pub fn record_workload(&mut self, result: &WorkloadResult) {
        self.workload = Some(result.kind());
        self.workload_ms = Some(result.elapsed_ms());
    }

    /// Record a failed workload.
    pub fn record_failure(&mut self, kind: WorkloadKind, error: &WorkloadError) {
        self.workload = Some(kind);
        self.error = Some(error.to_string());
    }

    /// Get the request ID.
    pub fn request_id(&self) -> &RequestId {
        &self.request_id
    }

    /// Finalize and return the metrics.
    pub fn finalize(self, status_code: u16) -> RequestMetrics {
        RequestMetrics {
            request_id: self.request_id.to_string(),
            method: self.method,
            route: self.route,
            workload: self.workload.map(|k| k.name().to_string()),
            workload_ms: self.workload_ms,
            error: self.error,
            status_code,
            total_duration_us: self.start.elapsed().as_micros() as u64,
        }
    }
}

impl RequestMetrics {
    /// Format as a one-line human-readable summary.
    pub fn to_summary(&self) -> String {
        let mut line = format!(
            "{} {} -> {} in {}us",
            self.method, self.route, self.status_code, self.total_duration_us
        );

        if let (Some(workload), Some(ms)) = (&self.workload, self.workload_ms) {
            line.push_str(&format!(" [{} {}ms]", workload, ms));
        }
        if let Some(error) = &self.error {
            line.push_str(&format!(" error={}", error));
        }

        line
    }

    /// Emit this record through `tracing`, with the summary as the message
    /// and the correlation fields attached.
    pub fn emit(&self) {
        let summary = self.to_summary();

        if self.status_code >= 500 {
            tracing::warn!(
                request_id = %self.request_id,
                status = self.status_code,
                duration_us = self.total_duration_us,
                "{}",
                summary
            );
        } else {
            tracing::info!(
                request_id = %self.request_id,
                status = self.status_code,
                duration_us = self.total_duration_us,
                "{}",
                summary
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collector() -> MetricsCollector {
        let mut metrics = MetricsCollector::new(RequestId::from_string("req-1"));
        metrics.set_method("GET");
        metrics.set_route("/matmul");
        metrics
    }

    #[test]
    fn test_finalize_success() {
        let mut metrics = collector();
        metrics.record_workload(&WorkloadResult::Matmul { n: 50, ms: 4 });

        let record = metrics.finalize(200);

        assert_eq!(record.request_id, "req-1");
        assert_eq!(record.workload.as_deref(), Some("matmul"));
        assert_eq!(record.workload_ms, Some(4));
        assert_eq!(record.status_code, 200);
        assert!(record.error.is_none());
    }

    #[test]
    fn test_finalize_failure() {
        let mut metrics = collector();
        metrics.record_failure(
            WorkloadKind::Pbkdf2,
            &WorkloadError::UnsupportedDigest("md2".to_string()),
        );

        let record = metrics.finalize(500);

        assert_eq!(record.workload.as_deref(), Some("pbkdf2"));
        assert_eq!(record.error.as_deref(), Some("Digest method not supported: md2"));
        assert!(record.to_summary().contains("error="));
    }

    #[test]
    fn test_summary_without_workload() {
        let summary = collector().finalize(404).to_summary();

        assert!(summary.starts_with("GET /matmul -> 404 in "));
        assert!(!summary.contains('['));
        assert!(!summary.contains("error="));
    }

    #[test]
    fn test_summary_format() {
        let mut metrics = collector();
        metrics.record_workload(&WorkloadResult::Matmul { n: 50, ms: 4 });
        let summary = metrics.finalize(200).to_summary();

        assert!(summary.starts_with("GET /matmul -> 200 in "));
        assert!(summary.ends_with("[matmul 4ms]"));
    }
}
