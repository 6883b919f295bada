use chrono::Utc;
use sqlx::SqlitePool;

use crate::error::GatewayError;
use crate::models::Transaction;

pub const MAX_PAGE_SIZE: u32 = 1000;

/// Append-only, user-scoped event log.
#[derive(Clone)]
pub struct TransactionLog {
    pool: SqlitePool,
}

impl TransactionLog {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Writes one row stamped with the current UTC time. The owning account
    /// is checked inside the same statement.
    pub async fn append(
        &self,
        username: &str,
        transaction_type: &str,
        details: Option<String>,
    ) -> Result<Transaction, GatewayError> {
        let transaction_date = Utc::now();

        let result = sqlx::query(
            "INSERT INTO transactions (transaction_type, transaction_details, transaction_date, username)
             SELECT ?, ?, ?, username FROM accounts WHERE username = ?",
        )
        .bind(transaction_type)
        .bind(&details)
        .bind(transaction_date)
        .bind(username)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(GatewayError::NotFound(format!("Account not found: {}", username)));
        }

        let transaction = Transaction {
            transaction_id: result.last_insert_rowid(),
            transaction_type: transaction_type.to_string(),
            transaction_details: details,
            transaction_date,
            username: username.to_string(),
        };

        tracing::debug!(
            transaction_id = transaction.transaction_id,
            transaction_type = transaction_type,
            username = username,
            "Transaction appended"
        );

        Ok(transaction)
    }

    /// Caller's rows in insertion order.
    pub async fn list(
        &self,
        username: &str,
        skip: u32,
        limit: u32,
    ) -> Result<Vec<Transaction>, GatewayError> {
        let rows = sqlx::query_as::<_, Transaction>(
            "SELECT transaction_id, transaction_type, transaction_details, transaction_date, username
             FROM transactions
             WHERE username = ?
             ORDER BY transaction_id ASC
             LIMIT ? OFFSET ?",
        )
        .bind(username)
        .bind(i64::from(limit.min(MAX_PAGE_SIZE)))
        .bind(i64::from(skip))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Existence is checked before ownership: a missing id is 404 for
    /// everyone, another user's id is 403.
    pub async fn get(
        &self,
        transaction_id: i64,
        requesting_username: &str,
    ) -> Result<Transaction, GatewayError> {
        let transaction = sqlx::query_as::<_, Transaction>(
            "SELECT transaction_id, transaction_type, transaction_details, transaction_date, username
             FROM transactions WHERE transaction_id = ?",
        )
        .bind(transaction_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| GatewayError::NotFound("Transaction not found".to_string()))?;

        if transaction.username != requesting_username {
            tracing::warn!(
                transaction_id = transaction_id,
                requester = requesting_username,
                "Denied access to another user's transaction"
            );
            return Err(GatewayError::Forbidden(
                "Not authorized to view this transaction".to_string(),
            ));
        }

        Ok(transaction)
    }
}
