use std::time::Duration;

use crate::config::Args;
use crate::crm::CrmClient;
use crate::rate_limit::RateLimiter;

// Per-endpoint quota handed to the rate limiter on every check
#[derive(Clone, Copy)]
pub struct EndpointLimit {
    pub max_requests: u32,
    pub window: Duration,
}

// App's shared state
pub struct AppState {
    pub crm: CrmClient,
    pub rate_limiter: RateLimiter,
    pub application_limit: EndpointLimit,
    pub lead_form_limit: EndpointLimit,
}

impl AppState {
    pub fn new(args: &Args) -> Self {
        Self {
            crm: CrmClient::new(args.crm_url.clone(), args.crm_token.clone()),
            rate_limiter: RateLimiter::new(),
            application_limit: EndpointLimit {
                max_requests: args.application_max,
                window: Duration::from_millis(args.application_window_ms),
            },
            lead_form_limit: EndpointLimit {
                max_requests: args.lead_form_max,
                window: Duration::from_millis(args.lead_form_window_ms),
            },
        }
    }
}
