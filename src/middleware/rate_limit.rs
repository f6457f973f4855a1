use axum::{
    body::Body,
    extract::{ConnectInfo, Request},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};

use crate::config::Config;
use crate::middleware::auth::AuthenticatedUser;

/// Type alias for the global governor layer (IP-based rate limiting)
pub type GlobalGovernorLayer = GovernorLayer<
    tower_governor::key_extractor::PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware<governor::clock::QuantaInstant>,
    Body,
>;

/// Create a GovernorLayer for global rate limiting (per IP address)
/// Applied before authentication so unauthenticated floods are also throttled.
pub fn create_global_governor(config: &Config) -> Option<GlobalGovernorLayer> {
    let per_minute = u64::from(config.rate_limit_per_minute.max(1));
    let governor_config = GovernorConfigBuilder::default()
        .per_millisecond((60_000 / per_minute).max(1))
        .burst_size(config.rate_limit_burst.max(1))
        .finish()?;

    Some(GovernorLayer::new(Arc::new(governor_config)))
}

/// Middleware to log every request with its outcome and latency
pub async fn log_request(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let started = Instant::now();

    let response = next.run(request).await;
    let status = response.status();
    let elapsed_ms = started.elapsed().as_millis() as u64;
    let user_id = response
        .extensions()
        .get::<AuthenticatedUser>()
        .map(|user| user.0.to_string());

    if status == StatusCode::TOO_MANY_REQUESTS {
        tracing::warn!(
            client_ip = %addr.ip(),
            method = %method,
            uri = %uri,
            status = %status,
            "RATE LIMITED - Request rejected due to too many requests"
        );
    } else if status.is_client_error() || status.is_server_error() {
        tracing::warn!(
            client_ip = %addr.ip(),
            method = %method,
            uri = %uri,
            status = status.as_u16(),
            response_time_ms = elapsed_ms,
            user_id = ?user_id,
            "Request failed"
        );
    } else {
        tracing::info!(
            client_ip = %addr.ip(),
            method = %method,
            uri = %uri,
            status = status.as_u16(),
            response_time_ms = elapsed_ms,
            user_id = ?user_id,
            "Request completed"
        );
    }

    response
}
