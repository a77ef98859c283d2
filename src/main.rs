use tracing::info;

use multiplesia_proxy::config::AppConfig;
use multiplesia_proxy::logger;
use multiplesia_proxy::server::AxumServer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logger::init_logger();

    let config = AppConfig::from_env();
    info!("MultiplesIA backend proxy v{}", env!("CARGO_PKG_VERSION"));
    info!("Environment: {}", config.environment.as_str());
    info!(
        "APIs configured: openrouter={} gemini={} deepseek={}",
        !config.openrouter_api_key.is_empty(),
        !config.gemini_api_key.is_empty(),
        !config.deepseek_api_key.is_empty()
    );
    if config.credential_set().is_empty() {
        info!("No provider keys configured; gated endpoints will reject every caller key");
    }

    let (server, handle) = AxumServer::start(config).await?;

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received, stopping server");
    server.stop();
    handle.await?;
    Ok(())
}
