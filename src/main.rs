use anyhow::Context;
use kennelbook::bootstrap;
use kennelbook::config::Config;
use kennelbook::infrastructure::http::router::build_router;
use kennelbook::infrastructure::observability;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;

    let _guard = observability::init(&config)?;
    tracing::info!("Configuration loaded");

    let state = bootstrap::build_app_state(&config)
        .await
        .context("Failed to initialize storage")?;

    let app = build_router(state);

    let addr = config.server_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
