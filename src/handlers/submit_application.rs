use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::Json;
use axum::extract::{ConnectInfo, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use tracing::{info, warn};

use crate::error::ApiError;
use crate::metrics::{BOTS_TRAPPED_TOTAL, REQUEST_LATENCY, REQUEST_TOTAL};
use crate::models::ApplicationForm;
use crate::state::AppState;

use super::{client_key, enforce_rate_limit};

// Full application handler: validate and update the candidate the token
// points at. Stricter limit than the lead form
pub async fn submit_application_handler(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(mut payload): Json<ApplicationForm>,
) -> Result<Response, ApiError> {
    REQUEST_TOTAL.inc();

    let key = client_key(&headers, addr);
    enforce_rate_limit(&state, &key, state.application_limit)?;

    // Bots get a fake success so they don't learn they were caught
    if payload.is_bot() {
        BOTS_TRAPPED_TOTAL.inc();
        warn!(ip = %key, "honeypot field filled, dropping application");
        return Ok(Json(serde_json::json!({
            "success": true,
            "message": "Application submitted successfully"
        }))
        .into_response());
    }

    payload.validate().map_err(ApiError::Validation)?;

    let start_time = Instant::now();
    let data = state.crm.update_candidate(&payload.token, &payload).await?;
    REQUEST_LATENCY.observe(start_time.elapsed().as_secs_f64());

    info!(ip = %key, "application accepted");

    let remaining = state
        .rate_limiter
        .remaining(&key, state.application_limit.max_requests);
    Ok(([("x-ratelimit-remaining", remaining.to_string())], Json(data)).into_response())
}
