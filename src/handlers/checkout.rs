use crate::{
    db::Database,
    error::GatewayError,
    middleware::{CurrentUser, JwtKeys},
    models::{
        CheckoutSession, PaymentRequest, PaymentUrlResponse, PaymentVerificationRequest,
        PaymentVerificationResult, WalletBalance,
    },
    services::CheckoutService,
};
use axum::{extract::State, Json};
use serde_json::{Map, Value};
use std::sync::Arc;

use super::extract::{ApiJson, ApiPath};

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub jwt: Arc<JwtKeys>,
    pub checkout: Arc<CheckoutService>,
}

pub async fn create_checkout_session(
    State(state): State<AppState>,
    CurrentUser(username): CurrentUser,
    ApiJson(params): ApiJson<Map<String, Value>>,
) -> Result<Json<CheckoutSession>, GatewayError> {
    let session = state.checkout.create_session(&username, &params).await?;
    Ok(Json(session))
}

pub async fn create_payment_url(
    State(state): State<AppState>,
    CurrentUser(username): CurrentUser,
    ApiJson(request): ApiJson<PaymentRequest>,
) -> Result<Json<PaymentUrlResponse>, GatewayError> {
    let response = state.checkout.create_payment_url(&username, request).await?;
    Ok(Json(response))
}

/// Always 200 once the ledger was consulted; callers must read `verified`.
pub async fn verify_payment(
    State(state): State<AppState>,
    CurrentUser(username): CurrentUser,
    ApiJson(request): ApiJson<PaymentVerificationRequest>,
) -> Result<Json<PaymentVerificationResult>, GatewayError> {
    let result = state.checkout.verify_payment(&username, &request).await?;
    Ok(Json(result))
}

pub async fn get_wallet_balance(
    State(state): State<AppState>,
    CurrentUser(_username): CurrentUser,
    ApiPath(address): ApiPath<String>,
) -> Result<Json<WalletBalance>, GatewayError> {
    let balance = state.checkout.get_balance(&address).await?;
    Ok(Json(balance))
}
