use lazy_static::lazy_static;
use prometheus::{Counter, Gauge, Histogram, register_counter, register_gauge, register_histogram};

lazy_static! {
    pub static ref REQUEST_TOTAL: Counter =
        register_counter!("gateway_requests_total", "Total number of submission requests").unwrap();
    pub static ref RATE_LIMITED_TOTAL: Counter = register_counter!(
        "gateway_rate_limited_total",
        "Requests rejected by the rate limiter"
    )
    .unwrap();
    pub static ref BOTS_TRAPPED_TOTAL: Counter = register_counter!(
        "gateway_bots_trapped_total",
        "Submissions dropped by the honeypot check"
    )
    .unwrap();
    pub static ref CRM_FORWARDED_TOTAL: Counter = register_counter!(
        "gateway_crm_forwarded_total",
        "Submissions successfully forwarded to the CRM"
    )
    .unwrap();
    pub static ref CRM_ERRORS_TOTAL: Counter = register_counter!(
        "gateway_crm_errors_total",
        "Failed CRM forwarding attempts"
    )
    .unwrap();
    pub static ref REQUEST_LATENCY: Histogram = register_histogram!(
        "gateway_request_latency_seconds",
        "Submission latency in seconds"
    )
    .unwrap();
    pub static ref RATE_LIMIT_KEYS: Gauge = register_gauge!(
        "gateway_rate_limit_keys",
        "Client keys currently tracked by the rate limiter"
    )
    .unwrap();
}
