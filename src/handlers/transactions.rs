use crate::{
    error::GatewayError,
    handlers::AppState,
    middleware::CurrentUser,
    models::{CreateTransactionRequest, Pagination, Transaction},
};
use axum::{extract::State, Json};

use super::extract::{ApiJson, ApiPath, ApiQuery};

pub async fn list_transactions(
    State(state): State<AppState>,
    CurrentUser(username): CurrentUser,
    ApiQuery(page): ApiQuery<Pagination>,
) -> Result<Json<Vec<Transaction>>, GatewayError> {
    let rows = state
        .db
        .transactions()
        .list(&username, page.skip, page.limit)
        .await?;
    Ok(Json(rows))
}

pub async fn get_transaction(
    State(state): State<AppState>,
    CurrentUser(username): CurrentUser,
    ApiPath(transaction_id): ApiPath<i64>,
) -> Result<Json<Transaction>, GatewayError> {
    let row = state.db.transactions().get(transaction_id, &username).await?;
    Ok(Json(row))
}

pub async fn create_transaction(
    State(state): State<AppState>,
    CurrentUser(username): CurrentUser,
    ApiJson(request): ApiJson<CreateTransactionRequest>,
) -> Result<Json<Transaction>, GatewayError> {
    if request.transaction_type.trim().is_empty() {
        return Err(GatewayError::Validation("transaction_type is required".to_string()));
    }

    let row = state
        .db
        .transactions()
        .append(&username, &request.transaction_type, request.transaction_details)
        .await?;
    Ok(Json(row))
}
