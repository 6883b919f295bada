#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{Map, Value};
use solpay_gateway::{
    app,
    db::Database,
    error::GatewayError,
    handlers::{AppState, HealthState},
    middleware::JwtKeys,
    models::{CheckoutSession, NewAccount, Transaction},
    services::{
        ledger::{Ledger, LedgerError, LedgerTransaction, SolTransfer},
        provider::{PaymentProvider, ProviderError},
        solana_pay::is_valid_signature,
        CacheService, CheckoutService, PngQrRenderer, QrRenderer,
    },
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tower::ServiceExt;

pub const MERCHANT: &str = "So11111111111111111111111111111111111111112";
pub const PAYER: &str = "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM";
pub const SIGNATURE: &str =
    "5VERv8NMvzbJMEkV8xnrLkEaWRtSz9CosKDYjCJjBRnbJLgp8uirBgmQpjKhoR4tjF3ZpRzrFmBV6UjKdiSZkQUW";

/// In-memory ledger keyed by signature and address.
#[derive(Default)]
pub struct FakeLedger {
    transactions: HashMap<String, LedgerTransaction>,
    balances: HashMap<String, u64>,
    unreachable: bool,
    checks_signatures: bool,
}

impl FakeLedger {
    pub fn with_transfer(mut self, signature: &str, destination: &str, lamports: u64) -> Self {
        self.transactions.insert(
            signature.to_string(),
            LedgerTransaction {
                signature: signature.to_string(),
                slot: 42,
                block_time: Some(1_700_000_000),
                fee: 5000,
                error: None,
                transfers: vec![SolTransfer {
                    source: PAYER.to_string(),
                    destination: destination.to_string(),
                    lamports,
                }],
            },
        );
        self
    }

    pub fn with_balance(mut self, address: &str, lamports: u64) -> Self {
        self.balances.insert(address.to_string(), lamports);
        self
    }

    /// Rejects malformed signatures the way the RPC client does.
    pub fn checking_signatures(mut self) -> Self {
        self.checks_signatures = true;
        self
    }

    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::default()
        }
    }

    fn outage(&self) -> LedgerError {
        LedgerError::Rpc {
            code: -32000,
            message: "node unavailable".to_string(),
        }
    }
}

#[async_trait]
impl Ledger for FakeLedger {
    async fn get_transaction(
        &self,
        signature: &str,
    ) -> Result<Option<LedgerTransaction>, LedgerError> {
        if self.unreachable {
            return Err(self.outage());
        }
        if self.checks_signatures && !is_valid_signature(signature) {
            return Err(LedgerError::InvalidSignature(signature.to_string()));
        }
        Ok(self.transactions.get(signature).cloned())
    }

    async fn get_balance(&self, address: &str) -> Result<Option<u64>, LedgerError> {
        if self.unreachable {
            return Err(self.outage());
        }
        Ok(self.balances.get(address).copied())
    }

    async fn ping(&self) -> bool {
        !self.unreachable
    }
}

/// Provider that either returns a fixed session or fails as unconfigured.
pub struct FakeProvider {
    session: Option<CheckoutSession>,
}

impl FakeProvider {
    pub fn opening(session_id: &str, order_id: &str) -> Self {
        Self {
            session: Some(CheckoutSession {
                session_id: session_id.to_string(),
                order_id: order_id.to_string(),
            }),
        }
    }

    pub fn unconfigured() -> Self {
        Self { session: None }
    }
}

#[async_trait]
impl PaymentProvider for FakeProvider {
    async fn create_session(
        &self,
        _params: &Map<String, Value>,
    ) -> Result<CheckoutSession, ProviderError> {
        self.session.clone().ok_or(ProviderError::NotConfigured)
    }
}

pub struct BrokenQrRenderer;

impl QrRenderer for BrokenQrRenderer {
    fn render_png(&self, _data: &str) -> Result<Vec<u8>, GatewayError> {
        Err(GatewayError::Render("encoder unavailable".to_string()))
    }
}

pub struct TestApp {
    pub router: Router,
    pub db: Database,
    pub jwt: Arc<JwtKeys>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with(
            FakeLedger::default(),
            FakeProvider::opening("cs_test", "ord_test"),
            Arc::new(PngQrRenderer::default()),
        )
        .await
    }

    pub async fn with_ledger(ledger: FakeLedger) -> Self {
        Self::with(
            ledger,
            FakeProvider::opening("cs_test", "ord_test"),
            Arc::new(PngQrRenderer::default()),
        )
        .await
    }

    pub async fn with(
        ledger: FakeLedger,
        provider: FakeProvider,
        qr: Arc<dyn QrRenderer>,
    ) -> Self {
        let db = Database::in_memory().await.unwrap();
        let cache = Arc::new(CacheService::memory_only(60));
        let ledger: Arc<dyn Ledger> = Arc::new(ledger);
        let jwt = Arc::new(JwtKeys::new("test-secret", 30));

        let checkout = Arc::new(CheckoutService::new(
            db.transactions(),
            ledger.clone(),
            Arc::new(provider),
            qr,
            cache.clone(),
        ));

        let state = AppState {
            db: db.clone(),
            jwt: jwt.clone(),
            checkout,
        };
        let health = HealthState {
            db: db.clone(),
            cache,
            ledger,
            started_at: Instant::now(),
        };

        Self {
            router: app::router(state, health),
            db,
            jwt,
        }
    }

    /// Creates an account and returns a bearer token for it.
    pub async fn login_as(&self, username: &str) -> String {
        self.db
            .accounts()
            .create(NewAccount {
                username: username.to_string(),
                email: format!("{}@example.com", username),
                fullname: username.to_string(),
                password: "password123".to_string(),
                wallet_key: None,
            })
            .await
            .unwrap();
        self.jwt.issue(username).unwrap()
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, Some(token), None).await
    }

    pub async fn log_of(&self, username: &str) -> Vec<Transaction> {
        self.db.transactions().list(username, 0, 1000).await.unwrap()
    }
}
