use roster_ga::{api, bootstrap};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = bootstrap::Configuration::from_env()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_thread_ids(true)
        .init();

    let service = Arc::new(bootstrap::bootstrap(&config).build());
    let reaper = service.spawn_reaper(config.reap_interval);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(message = "Listening", addr = %config.bind_addr);

    axum::serve(listener, api::router(service))
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
        })
        .await?;

    reaper.abort();
    tracing::info!(message = "Shut down");

    Ok(())
}
