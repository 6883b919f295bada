use serde_json::{json, Map, Value};
use std::sync::Arc;

use crate::db::TransactionLog;
use crate::error::GatewayError;
use crate::models::{
    CheckoutSession, PaymentRequest, PaymentUrlResponse, PaymentVerificationRequest,
    PaymentVerificationResult, TransactionKind, WalletBalance,
};
use crate::services::{
    ledger::{Ledger, LedgerError, LedgerTransaction},
    provider::PaymentProvider,
    qr::QrRenderer,
    solana_pay::{self, PaymentLabels, PaymentRequestUri},
    CacheService,
};

/// Session creation, payment request URIs, and payment verification. Every
/// step is recorded in the caller's transaction log.
pub struct CheckoutService {
    log: TransactionLog,
    ledger: Arc<dyn Ledger>,
    provider: Arc<dyn PaymentProvider>,
    qr: Arc<dyn QrRenderer>,
    cache: Arc<CacheService>,
}

impl CheckoutService {
    pub fn new(
        log: TransactionLog,
        ledger: Arc<dyn Ledger>,
        provider: Arc<dyn PaymentProvider>,
        qr: Arc<dyn QrRenderer>,
        cache: Arc<CacheService>,
    ) -> Self {
        Self {
            log,
            ledger,
            provider,
            qr,
            cache,
        }
    }

    pub async fn create_session(
        &self,
        username: &str,
        params: &Map<String, Value>,
    ) -> Result<CheckoutSession, GatewayError> {
        let session = self.provider.create_session(params).await?;

        let details = json!({
            "session_id": session.session_id,
            "order_id": session.order_id,
        });
        self.log
            .append(
                username,
                TransactionKind::SessionCreated.as_str(),
                Some(details.to_string()),
            )
            .await?;

        tracing::info!(
            username = username,
            session_id = %session.session_id,
            order_id = %session.order_id,
            "Checkout session created"
        );

        Ok(session)
    }

    pub async fn create_payment_url(
        &self,
        username: &str,
        request: PaymentRequest,
    ) -> Result<PaymentUrlResponse, GatewayError> {
        let labels = PaymentLabels::new(request.label, request.message, request.memo);
        let payment = PaymentRequestUri::new(&request.recipient, request.amount, labels)?;
        let payment_url = payment.to_uri()?;

        let details = json!({
            "recipient": payment.recipient(),
            "amount": payment.amount(),
            "payment_url": payment_url,
        });
        self.log
            .append(
                username,
                TransactionKind::PaymentUrlGenerated.as_str(),
                Some(details.to_string()),
            )
            .await?;

        // The log row stays even if rendering fails; the URL itself was valid.
        let qr_code_url = self.qr.render_data_uri(&payment_url)?;

        tracing::info!(
            username = username,
            recipient = payment.recipient(),
            amount = payment.amount(),
            "Payment URL generated"
        );

        Ok(PaymentUrlResponse {
            payment_url,
            qr_code_url,
        })
    }

    /// Mismatches, lookup failures and unusable signatures are returned as
    /// `verified: false`, never as errors. Only a bad expected amount or a
    /// failed log write is an error.
    pub async fn verify_payment(
        &self,
        username: &str,
        request: &PaymentVerificationRequest,
    ) -> Result<PaymentVerificationResult, GatewayError> {
        validate_verification(request)?;

        let result = match self.lookup(&request.signature).await {
            Ok(Some(tx)) => solana_pay::reconcile(
                &tx,
                &request.expected_recipient,
                request.expected_amount,
            ),
            Ok(None) => PaymentVerificationResult::unresolved(
                &request.signature,
                "transaction not found".to_string(),
            ),
            Err(LedgerError::InvalidSignature(_)) => PaymentVerificationResult::unresolved(
                &request.signature,
                "invalid transaction signature".to_string(),
            ),
            Err(e) => {
                tracing::warn!("Ledger lookup for {} failed: {}", request.signature, e);
                PaymentVerificationResult::unresolved(
                    &request.signature,
                    format!("ledger lookup failed: {}", e),
                )
            }
        };

        let kind = if result.verified {
            TransactionKind::PaymentVerified
        } else {
            TransactionKind::PaymentFailed
        };
        self.log
            .append(username, kind.as_str(), Some(serde_json::to_string(&result)?))
            .await?;

        tracing::info!(
            username = username,
            signature = %request.signature,
            verified = result.verified,
            message = %result.message,
            "Payment verification completed"
        );

        Ok(result)
    }

    async fn lookup(&self, signature: &str) -> Result<Option<LedgerTransaction>, LedgerError> {
        if signature.trim().is_empty() {
            return Err(LedgerError::InvalidSignature(signature.to_string()));
        }
        self.ledger.get_transaction(signature).await
    }

    pub async fn get_balance(&self, address: &str) -> Result<WalletBalance, GatewayError> {
        if !solana_pay::is_valid_address(address) {
            return Err(GatewayError::Validation("Invalid wallet address".to_string()));
        }

        let lamports = match self.cache.balance(address).await {
            Some(cached) => cached,
            None => {
                let lamports = self.ledger.get_balance(address).await?.ok_or_else(|| {
                    GatewayError::NotFound("Could not retrieve balance for this address".to_string())
                })?;
                self.cache.store_balance(address, lamports).await;
                lamports
            }
        };

        Ok(WalletBalance {
            address: address.to_string(),
            balance: solana_pay::lamports_to_sol(lamports),
            currency: "SOL".to_string(),
        })
    }
}

/// Signature and recipient are compared against the ledger as given, so
/// only the amount can be rejected up front.
fn validate_verification(request: &PaymentVerificationRequest) -> Result<(), GatewayError> {
    if !request.expected_amount.is_finite() || request.expected_amount <= 0.0 {
        return Err(GatewayError::Validation(
            "Expected amount must be a positive number".to_string(),
        ));
    }
    Ok(())
}
