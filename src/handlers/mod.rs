mod health;
mod metrics;
mod submit_application;
mod submit_form;

pub use health::health_handler;
pub use metrics::metrics_handler;
pub use submit_application::submit_application_handler;
pub use submit_form::submit_form_handler;

use std::net::{IpAddr, SocketAddr};

use axum::http::HeaderMap;
use tracing::warn;

use crate::error::ApiError;
use crate::metrics::RATE_LIMITED_TOTAL;
use crate::state::{AppState, EndpointLimit};

// Client key for rate limiting: X-Forwarded-For first (reverse proxy),
// socket peer address otherwise
pub(crate) fn client_key(headers: &HeaderMap, addr: SocketAddr) -> String {
    if let Some(forwarded) = headers.get("x-forwarded-for")
        && let Ok(value) = forwarded.to_str()
        && let Some(first) = value.split(',').next()
        && let Ok(ip) = first.trim().parse::<IpAddr>()
    {
        return ip.to_string();
    }

    addr.ip().to_string()
}

// Shared allow/deny gate for both submission endpoints
pub(crate) fn enforce_rate_limit(
    state: &AppState,
    key: &str,
    limit: EndpointLimit,
) -> Result<(), ApiError> {
    if state.rate_limiter.check(key, limit.max_requests, limit.window) {
        return Ok(());
    }

    RATE_LIMITED_TOTAL.inc();
    warn!(ip = %key, "rate limit exceeded");
    Err(ApiError::RateLimited {
        retry_after: state.rate_limiter.reset_time(key),
    })
}
