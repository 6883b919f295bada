use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::time::Duration;
use thiserror::Error;

use crate::config::ProviderSettings;
use crate::models::CheckoutSession;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Payment provider API key not configured")]
    NotConfigured,

    #[error("Payment provider error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Payment provider returned an incomplete session: {0}")]
    InvalidResponse(String),
}

/// Opens hosted checkout sessions with an external payment processor.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    async fn create_session(&self, params: &Map<String, Value>)
        -> Result<CheckoutSession, ProviderError>;
}

pub struct CandyPayClient {
    endpoint: String,
    private_api_key: Option<String>,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct SessionResponse {
    session_id: Option<String>,
    order_id: Option<String>,
}

impl CandyPayClient {
    pub fn new(settings: &ProviderSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            endpoint: settings.endpoint.trim_end_matches('/').to_string(),
            private_api_key: settings.private_api_key.clone(),
            client,
        })
    }
}

#[async_trait]
impl PaymentProvider for CandyPayClient {
    async fn create_session(
        &self,
        params: &Map<String, Value>,
    ) -> Result<CheckoutSession, ProviderError> {
        let Some(api_key) = self.private_api_key.as_deref() else {
            return Err(ProviderError::NotConfigured);
        };

        let response: SessionResponse = self
            .client
            .post(format!("{}/session", self.endpoint))
            .bearer_auth(api_key)
            .json(params)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        match (response.session_id, response.order_id) {
            (Some(session_id), Some(order_id)) => {
                tracing::debug!("CandyPay session {} opened for order {}", session_id, order_id);
                Ok(CheckoutSession {
                    session_id,
                    order_id,
                })
            }
            (session_id, order_id) => Err(ProviderError::InvalidResponse(format!(
                "session_id={:?}, order_id={:?}",
                session_id, order_id
            ))),
        }
    }
}
