use clap::Parser;
use ctf_server::config::{ServerArgs, ServerConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // DATABASE_URL is required; clap exits with an error when it is missing.
    let args = ServerArgs::parse();

    ctf_server::run(ServerConfig::from(args)).await
}
