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
use crate::models::LeadForm;
use crate::state::AppState;

use super::{client_key, enforce_rate_limit};

// Lead form handler: validate and forward as a new CRM candidate
pub async fn submit_form_handler(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(mut payload): Json<LeadForm>,
) -> Result<Response, ApiError> {
    REQUEST_TOTAL.inc();

    let key = client_key(&headers, addr);
    enforce_rate_limit(&state, &key, state.lead_form_limit)?;

    // Bots get a fake success so they don't learn they were caught
    if payload.is_bot() {
        BOTS_TRAPPED_TOTAL.inc();
        warn!(ip = %key, "honeypot field filled, dropping lead form");
        return Ok(Json(serde_json::json!({
            "success": true,
            "message": "Application received"
        }))
        .into_response());
    }

    payload.validate().map_err(ApiError::Validation)?;

    // CRM wants the submitter's address when the form didn't carry one
    if payload.user_ip.is_none() {
        payload.user_ip = Some(key.clone());
    }

    let start_time = Instant::now();
    let data = state.crm.create_lead(&payload).await?;
    REQUEST_LATENCY.observe(start_time.elapsed().as_secs_f64());

    info!(ip = %key, vacancy_id = payload.vacancy_id, "lead form accepted");

    let remaining = state
        .rate_limiter
        .remaining(&key, state.lead_form_limit.max_requests);
    Ok(([("x-ratelimit-remaining", remaining.to_string())], Json(data)).into_response())
}
