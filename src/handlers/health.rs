use crate::{
    db::Database,
    models::{HealthStatus, Welcome},
    services::{CacheService, Ledger},
};
use axum::{extract::State, Json};
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;

#[derive(Clone)]
pub struct HealthState {
    pub db: Database,
    pub cache: Arc<CacheService>,
    pub ledger: Arc<dyn Ledger>,
    pub started_at: Instant,
}

pub async fn root() -> Json<Welcome> {
    Json(Welcome {
        message: "Welcome to solpay-gateway!".to_string(),
        description: "Solana Pay checkout and payment verification service".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn health_check(State(state): State<HealthState>) -> Json<HealthStatus> {
    let database_ok = state.db.ping().await;
    let redis_ok = state.cache.ping().await;
    let rpc_ok = state.ledger.ping().await;

    let status = if database_ok && rpc_ok {
        "healthy"
    } else if database_ok {
        "degraded"
    } else {
        "unhealthy"
    };

    Json(HealthStatus {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: database_ok,
        redis: redis_ok,
        solana_rpc: rpc_ok,
        uptime_seconds: state.started_at.elapsed().as_secs(),
        timestamp: Utc::now(),
    })
}
