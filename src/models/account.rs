use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Account {
    pub username: String,
    pub email: String,
    pub fullname: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub wallet_key: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub fullname: String,
    pub password: String,
    pub wallet_key: Option<String>,
}
