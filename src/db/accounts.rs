use argon2::{Argon2, PasswordHasher};
use chrono::Utc;
use password_hash::{rand_core::OsRng, SaltString};
use sqlx::SqlitePool;

use crate::error::GatewayError;
use crate::models::{Account, NewAccount};

#[derive(Clone)]
pub struct AccountStore {
    pool: SqlitePool,
}

impl AccountStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, new: NewAccount) -> Result<Account, GatewayError> {
        if self.get(&new.username).await?.is_some() {
            return Err(GatewayError::Validation("Username already registered".to_string()));
        }

        let email_taken: Option<(String,)> =
            sqlx::query_as("SELECT username FROM accounts WHERE email = ?")
                .bind(&new.email)
                .fetch_optional(&self.pool)
                .await?;
        if email_taken.is_some() {
            return Err(GatewayError::Validation("Email already registered".to_string()));
        }

        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(new.password.as_bytes(), &salt)
            .map_err(|e| GatewayError::InternalError(format!("Password hashing failed: {}", e)))?
            .to_string();

        let account = Account {
            username: new.username,
            email: new.email,
            fullname: new.fullname,
            password_hash,
            wallet_key: new.wallet_key,
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO accounts (username, email, fullname, password_hash, wallet_key, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&account.username)
        .bind(&account.email)
        .bind(&account.fullname)
        .bind(&account.password_hash)
        .bind(&account.wallet_key)
        .bind(account.created_at)
        .execute(&self.pool)
        .await?;

        tracing::info!("Account created: {}", account.username);
        Ok(account)
    }

    pub async fn get(&self, username: &str) -> Result<Option<Account>, GatewayError> {
        let account = sqlx::query_as::<_, Account>(
            "SELECT username, email, fullname, password_hash, wallet_key, created_at
             FROM accounts WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    pub async fn exists(&self, username: &str) -> Result<bool, GatewayError> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM accounts WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.is_some())
    }
}
