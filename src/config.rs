use anyhow::{bail, Context, Result};
use std::str::FromStr;

const DEV_JWT_SECRET: &str = "solpay-development-secret";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Testnet,
    Production,
}

impl FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "testnet" | "test" => Ok(Environment::Testnet),
            "production" | "prod" => Ok(Environment::Production),
            _ => bail!("Unknown environment: {}", s),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    pub host: String,
    pub port: u16,

    pub database_url: String,

    // Bearer tokens
    pub jwt_secret: String,
    pub access_token_expire_minutes: i64,

    // Solana RPC (ledger)
    pub solana_rpc_url: String,
    pub solana_rpc_fallback: Option<String>,
    pub rpc_timeout_secs: u64,

    // CandyPay (payment provider)
    pub provider: ProviderSettings,

    // Redis
    pub redis_url: String,
    pub balance_cache_ttl_secs: u64,
}

/// Credentials and endpoint for the payment-session provider.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub endpoint: String,
    pub private_api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let environment: Environment = std::env::var("ENVIRONMENT")
            .unwrap_or_else(|_| "development".to_string())
            .parse()?;

        let config = Self {
            environment,
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: Self::parse_var("PORT", "8000")?,

            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://solpay.db".to_string()),

            jwt_secret: std::env::var("JWT_SECRET").unwrap_or_else(|_| DEV_JWT_SECRET.to_string()),
            access_token_expire_minutes: Self::parse_var("ACCESS_TOKEN_EXPIRE_MINUTES", "30")?,

            solana_rpc_url: std::env::var("SOLANA_RPC_URL")
                .unwrap_or_else(|_| "https://api.mainnet-beta.solana.com".to_string()),
            solana_rpc_fallback: optional_var("SOLANA_RPC_FALLBACK"),
            rpc_timeout_secs: Self::parse_var("RPC_TIMEOUT_SECS", "5")?,

            provider: ProviderSettings {
                endpoint: std::env::var("CANDYPAY_ENDPOINT")
                    .unwrap_or_else(|_| "https://checkout-api.candypay.fun/api/v1".to_string()),
                private_api_key: optional_var("CANDYPAY_PRIVATE_API_KEY"),
                timeout_secs: Self::parse_var("PROVIDER_TIMEOUT_SECS", "8")?,
            },

            redis_url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            balance_cache_ttl_secs: Self::parse_var("BALANCE_CACHE_TTL_SECS", "10")?,
        };

        config.validate()?;
        Ok(config)
    }

    fn parse_var<T>(var: &str, default: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        std::env::var(var)
            .unwrap_or_else(|_| default.to_string())
            .parse()
            .with_context(|| format!("Invalid {}", var))
    }

    pub fn validate(&self) -> Result<()> {
        if !self.solana_rpc_url.starts_with("http") {
            bail!("SOLANA_RPC_URL must be HTTP(S) URL");
        }
        if let Some(fallback) = &self.solana_rpc_fallback {
            if !fallback.starts_with("http") {
                bail!("SOLANA_RPC_FALLBACK must be HTTP(S) URL");
            }
        }
        if !self.provider.endpoint.starts_with("http") {
            bail!("CANDYPAY_ENDPOINT must be HTTP(S) URL");
        }

        if self.rpc_timeout_secs == 0 || self.provider.timeout_secs == 0 {
            bail!("RPC_TIMEOUT_SECS and PROVIDER_TIMEOUT_SECS must be positive");
        }
        if self.access_token_expire_minutes <= 0 {
            bail!("ACCESS_TOKEN_EXPIRE_MINUTES must be positive");
        }

        if self.environment == Environment::Production && self.jwt_secret == DEV_JWT_SECRET {
            bail!("JWT_SECRET must be set in production");
        }

        if self.provider.private_api_key.is_none() {
            tracing::warn!("CANDYPAY_PRIVATE_API_KEY not set; checkout sessions are disabled");
        }

        tracing::info!(
            "Configuration validated for {:?} environment",
            self.environment
        );

        Ok(())
    }
}

fn optional_var(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Config {
        Config {
            environment: Environment::Development,
            host: "127.0.0.1".into(),
            port: 8000,
            database_url: "sqlite::memory:".into(),
            jwt_secret: DEV_JWT_SECRET.into(),
            access_token_expire_minutes: 30,
            solana_rpc_url: "https://api.devnet.solana.com".into(),
            solana_rpc_fallback: None,
            rpc_timeout_secs: 5,
            provider: ProviderSettings {
                endpoint: "https://checkout-api.candypay.fun/api/v1".into(),
                private_api_key: None,
                timeout_secs: 8,
            },
            redis_url: "redis://localhost:6379".into(),
            balance_cache_ttl_secs: 10,
        }
    }

    #[test]
    fn parses_environment_aliases() {
        assert_eq!("prod".parse::<Environment>().unwrap(), Environment::Production);
        assert_eq!("TEST".parse::<Environment>().unwrap(), Environment::Testnet);
        assert!("staging".parse::<Environment>().is_err());
    }

    #[test]
    fn development_accepts_default_secret() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn production_requires_real_secret() {
        let mut config = sample();
        config.environment = Environment::Production;
        assert!(config.validate().is_err());

        config.jwt_secret = "a-real-secret".into();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_non_http_rpc_and_zero_timeouts() {
        let mut config = sample();
        config.solana_rpc_url = "ws://localhost:8900".into();
        assert!(config.validate().is_err());

        let mut config = sample();
        config.rpc_timeout_secs = 0;
        assert!(config.validate().is_err());
    }
}
