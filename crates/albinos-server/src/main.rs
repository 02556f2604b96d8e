//! UNIX-socket configuration service binary.

use albinos_server::config::Config;
use albinos_server::server;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Read config from the environment; see `config` for the variables.
    let config = Config::from_env()?;

    server::run(config).await?;
    Ok(())
}
