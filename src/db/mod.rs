pub mod accounts;
pub mod transactions;

pub use accounts::AccountStore;
pub use transactions::TransactionLog;

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS accounts (
        username      TEXT PRIMARY KEY NOT NULL,
        email         TEXT NOT NULL UNIQUE,
        fullname      TEXT NOT NULL,
        password_hash TEXT NOT NULL,
        wallet_key    TEXT,
        created_at    TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS transactions (
        transaction_id      INTEGER PRIMARY KEY AUTOINCREMENT,
        transaction_type    TEXT NOT NULL,
        transaction_details TEXT,
        transaction_date    TEXT NOT NULL,
        username            TEXT NOT NULL REFERENCES accounts(username)
    )",
    "CREATE INDEX IF NOT EXISTS idx_transactions_username ON transactions(username)",
];

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("Invalid DATABASE_URL: {}", database_url))?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .context("Failed to open database")?;

        let db = Self { pool };
        db.init_schema().await?;

        tracing::info!("Database ready at {}", database_url);
        Ok(db)
    }

    /// Private in-memory database. One connection, never recycled, so the
    /// data lives as long as the pool.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.init_schema().await?;
        Ok(db)
    }

    async fn init_schema(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .context("Failed to apply schema")?;
        }
        Ok(())
    }

    pub fn accounts(&self) -> AccountStore {
        AccountStore::new(self.pool.clone())
    }

    pub fn transactions(&self) -> TransactionLog {
        TransactionLog::new(self.pool.clone())
    }

    pub async fn ping(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}
