use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::{error, info, info_span, Instrument};

/// Request-scoped logging: every request runs inside an `info_span` carrying
/// a fresh request id, and its outcome is logged with method, route, status
/// and latency.
pub async fn observability_middleware(
    matched_path: MatchedPath,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let route = matched_path.as_str().to_string();
    let start_time = Instant::now();

    let span = info_span!(
        "http_request",
        method = %method,
        uri = %uri,
        route = %route,
        request_id = %uuid::Uuid::now_v7(),
    );

    let response = next.run(request).instrument(span).await;

    let latency_ms = start_time.elapsed().as_millis();
    let status = response.status().as_u16();

    if status >= 500 {
        error!(method = %method, route = %route, status, latency_ms, "Request failed");
    } else {
        info!(method = %method, route = %route, status, latency_ms, "Request completed");
    }

    response
}
