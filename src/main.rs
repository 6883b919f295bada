use anyhow::Result;
use solpay_gateway::{
    app,
    config::Config,
    db::Database,
    handlers::{AppState, HealthState},
    middleware::JwtKeys,
    services::*,
};
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    tracing::info!("Starting solpay-gateway v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {:?}", config.environment);

    // Initialize services
    let db = Database::connect(&config.database_url).await?;
    let cache = Arc::new(CacheService::new(&config.redis_url, config.balance_cache_ttl_secs).await);
    let ledger: Arc<dyn Ledger> = Arc::new(SolanaRpcClient::new(
        &config.solana_rpc_url,
        config.solana_rpc_fallback.as_deref(),
        config.rpc_timeout_secs,
    )?);
    let provider: Arc<dyn PaymentProvider> = Arc::new(CandyPayClient::new(&config.provider)?);

    let checkout = Arc::new(CheckoutService::new(
        db.transactions(),
        ledger.clone(),
        provider,
        Arc::new(PngQrRenderer::default()),
        cache.clone(),
    ));

    let app_state = AppState {
        db: db.clone(),
        jwt: Arc::new(JwtKeys::new(
            &config.jwt_secret,
            config.access_token_expire_minutes,
        )),
        checkout,
    };

    let health_state = HealthState {
        db,
        cache,
        ledger,
        started_at: Instant::now(),
    };

    let app = app::router(app_state, health_state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on http://{}", addr);
    tracing::info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for ctrl+c: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down gracefully...");
}
