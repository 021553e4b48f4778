mod config;
mod crm;
mod error;
mod handlers;
mod metrics;
mod models;
mod rate_limit;
mod state;
mod validate;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::{get, post};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Args;
use crate::handlers::{
    health_handler, metrics_handler, submit_application_handler, submit_form_handler,
};
use crate::state::AppState;

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let state = Arc::new(AppState::new(&args));

    // Background sweep keeps the counter map bounded; allow/deny stays
    // correct even if it never runs
    let sweeper = state
        .rate_limiter
        .spawn_sweeper(Duration::from_secs(args.sweep_interval_secs));

    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/api/submit-form", post(submit_form_handler))
        .route("/api/submit-application", post(submit_application_handler))
        .with_state(state);

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!(
        version = env!("CARGO_PKG_VERSION"),
        port = args.port,
        crm_url = %args.crm_url,
        "lead gateway running"
    );
    info!(
        max = args.application_max,
        window_ms = args.application_window_ms,
        "application rate limit"
    );
    info!(
        max = args.lead_form_max,
        window_ms = args.lead_form_window_ms,
        "lead form rate limit"
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await
    .expect("server error");

    sweeper.abort();
}
