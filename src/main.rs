use storefront_api::{app, config::AppConfig, AppState};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, SESSION_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "storefront_api=info,tower_http=info".into()),
        )
        .init();

    let config = AppConfig::from_env();
    config.validate()?;
    tracing::info!("Starting Storefront API in {:?} mode", config.environment);

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::from_config(config).await?;

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Storefront API listening on http://{}", bind_addr);

    axum::serve(listener, app(state)).await?;
    Ok(())
}
