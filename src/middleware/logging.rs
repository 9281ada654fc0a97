//! Request logging middleware.
//!
//! Logs every HTTP request with method, path, status code, and latency.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::{info, warn};

/// Logs at INFO for completed and auth-rejected requests, WARN for server errors.
/// Health checks are skipped. Headers are never logged, so bearer tokens
/// stay out of the logs.
pub async fn request_logging(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    // Skip logging for health checks to reduce noise
    if path == "/health" {
        return next.run(request).await;
    }

    let start = Instant::now();
    let response = next.run(request).await;
    let latency_ms = start.elapsed().as_millis() as u64;
    let status = response.status();

    match status {
        s if s.is_server_error() => warn!(
            method = %method,
            path = %path,
            status = s.as_u16(),
            latency_ms,
            "Request failed (5xx)"
        ),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => info!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            latency_ms,
            "Request rejected by auth"
        ),
        _ => info!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            latency_ms,
            "Request completed"
        ),
    }

    response
}
