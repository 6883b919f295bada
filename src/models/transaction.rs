use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row of the append-only, per-user transaction log.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Transaction {
    pub transaction_id: i64,
    pub transaction_type: String,
    pub transaction_details: Option<String>,
    pub transaction_date: DateTime<Utc>,
    pub username: String,
}

/// Event types written by the checkout flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionKind {
    SessionCreated,
    PaymentUrlGenerated,
    PaymentVerified,
    PaymentFailed,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::SessionCreated => "session_created",
            TransactionKind::PaymentUrlGenerated => "payment_url_generated",
            TransactionKind::PaymentVerified => "payment_verified",
            TransactionKind::PaymentFailed => "payment_failed",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateTransactionRequest {
    pub transaction_type: String,
    pub transaction_details: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub skip: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_limit() -> u32 {
    100
}
