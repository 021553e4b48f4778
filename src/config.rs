use clap::Parser;

// CLI argument structure; secrets and limits usually come in via env
#[derive(Parser, Debug, Clone)]
#[command(name = "lead-gateway")]
#[command(about = "Rate-limited submission gateway in front of the recruitment CRM")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, default_value_t = 8080)]
    pub port: u16,

    // CRM candidates endpoint
    #[arg(
        long,
        env = "CRM_API_URL",
        default_value = "https://transport.nexus-talent.eu/api/candidates"
    )]
    pub crm_url: String,

    // Bearer token for the CRM API
    #[arg(long, env = "CRM_TOKEN", hide_env_values = true)]
    pub crm_token: String,

    // Full application endpoint: max requests per window per IP
    #[arg(long, env = "RATE_LIMIT_APPLICATION_MAX", default_value_t = 3)]
    pub application_max: u32,

    // Full application endpoint: window length in milliseconds
    #[arg(long, env = "RATE_LIMIT_APPLICATION_WINDOW", default_value_t = 300_000)]
    pub application_window_ms: u64,

    // Lead form endpoint: max requests per window per IP
    #[arg(long, env = "RATE_LIMIT_LEAD_FORM_MAX", default_value_t = 5)]
    pub lead_form_max: u32,

    // Lead form endpoint: window length in milliseconds
    #[arg(long, env = "RATE_LIMIT_LEAD_FORM_WINDOW", default_value_t = 60_000)]
    pub lead_form_window_ms: u64,

    // How often expired rate limit records are swept out, in seconds
    #[arg(long, default_value_t = 300)]
    pub sweep_interval_secs: u64,

    // Log level when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
