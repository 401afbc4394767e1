use std::net::SocketAddr;

use clap::Args;

pub const DEFAULT_LOG_FILTER: &str = "dropout_risk=info,tower_http=info";

#[derive(Args, Debug, Clone)]
pub struct DatabaseArgs {
    /// Postgres connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: Option<String>,

    #[arg(long, env = "DATABASE_MAX_CONNECTIONS", default_value_t = 5)]
    pub max_connections: u32,
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    #[arg(long, env = "DROPOUT_RISK_BIND", default_value = "127.0.0.1:8000")]
    pub bind: SocketAddr,

    /// Keep records in process memory instead of Postgres
    #[arg(long)]
    pub in_memory: bool,
}

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .init();
}
