use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};

use crate::handlers::*;

pub fn router(state: AppState, health: HealthState) -> Router {
    let api = Router::new()
        .route("/api/checkout/session", post(create_checkout_session))
        .route("/api/checkout/payment-url", post(create_payment_url))
        .route("/api/checkout/verify-payment", post(verify_payment))
        .route("/api/checkout/balance/:address", get(get_wallet_balance))
        .route(
            "/api/transactions",
            get(list_transactions).post(create_transaction),
        )
        .route("/api/transactions/:transaction_id", get(get_transaction))
        .with_state(state);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .with_state(health)
        .merge(api)
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()))
        .layer(CorsLayer::permissive())
}
