//! Request handlers.

use heat_core::{parse_query, WorkloadKind, WorkloadRequest, WorkloadResult};
use heat_observability::MetricsCollector;
use http::{Request, Response, StatusCode};
use serde::Serialize;

use crate::{json_response, text_response, ExecutionMode, Route, ServerError, USAGE};

/// JSON body of a failed workload response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub op: String,
    pub error: String,
}

/// Run a workload according to the execution mode.
///
/// In both modes the workload runs to completion without yielding.
pub async fn run_workload(
    request: WorkloadRequest,
    mode: ExecutionMode,
) -> Result<WorkloadResult, ServerError> {
    match mode {
        ExecutionMode::Inline => Ok(request.run()?),
        ExecutionMode::Offload => Ok(tokio::task::spawn_blocking(move || request.run()).await??),
    }
}

/// Dispatch a parsed request to its route and build the response.
pub async fn handle_request(
    request: &Request<()>,
    mode: ExecutionMode,
    metrics: &mut MetricsCollector,
) -> Response<String> {
    let path = request.uri().path();

    match Route::resolve(request.method(), path) {
        Some(Route::Index) => text_response(StatusCode::OK, USAGE),
        Some(Route::Workload(kind)) => {
            let query = parse_query(request.uri().query().unwrap_or(""));
            handle_workload(kind, WorkloadRequest::from_query(kind, &query), mode, metrics).await
        }
        None => text_response(
            StatusCode::NOT_FOUND,
            format!("Cannot {} {}", request.method(), path),
        ),
    }
}

async fn handle_workload(
    kind: WorkloadKind,
    request: WorkloadRequest,
    mode: ExecutionMode,
    metrics: &mut MetricsCollector,
) -> Response<String> {
    tracing::debug!(request_id = %metrics.request_id(), op = %kind, ?request, "running workload");

    match run_workload(request, mode).await {
        Ok(result) => {
            metrics.record_workload(&result);
            json_response(StatusCode::OK, &result)
        }
        Err(e) => {
            match &e {
                ServerError::Workload(err) => metrics.record_failure(kind, err),
                other => tracing::error!(
                    request_id = %metrics.request_id(),
                    op = %kind,
                    error = %other,
                    "workload task failed"
                ),
            }
            json_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &ErrorBody {
                    op: kind.name().to_string(),
                    error: e.to_string(),
                },
            )
        }
    }
}
