//! Solana Pay request URIs and on-chain payment reconciliation.
//!
//! Transfer request format: `solana:<recipient>?amount=<amount>&label=..&message=..&memo=..`
//! with every optional parameter left out when it has no value.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::GatewayError;
use crate::models::PaymentVerificationResult;
use crate::services::ledger::{LedgerTransaction, SolTransfer};

pub const LAMPORTS_PER_SOL: f64 = 1_000_000_000.0;

const PUBKEY_LEN: usize = 32;
const SIGNATURE_LEN: usize = 64;

fn decodes_to(value: &str, len: usize) -> bool {
    matches!(bs58::decode(value).into_vec(), Ok(bytes) if bytes.len() == len)
}

pub fn is_valid_address(address: &str) -> bool {
    decodes_to(address, PUBKEY_LEN)
}

pub fn is_valid_signature(signature: &str) -> bool {
    decodes_to(signature, SIGNATURE_LEN)
}

pub fn lamports_to_sol(lamports: u64) -> f64 {
    lamports as f64 / LAMPORTS_PER_SOL
}

/// Rounds to the nearest lamport; ledger amounts are integral.
pub fn sol_to_lamports(sol: f64) -> u64 {
    (sol * LAMPORTS_PER_SOL).round() as u64
}

/// Optional human-readable fields of a transfer request.
///
/// Empty strings are stored as absent so they can never reach the URI.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentLabels {
    label: Option<String>,
    message: Option<String>,
    memo: Option<String>,
}

impl PaymentLabels {
    pub fn new(label: Option<String>, message: Option<String>, memo: Option<String>) -> Self {
        Self {
            label: non_empty(label),
            message: non_empty(message),
            memo: non_empty(memo),
        }
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn memo(&self) -> Option<&str> {
        self.memo.as_deref()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// A validated Solana Pay transfer request.
#[derive(Debug, Clone)]
pub struct PaymentRequestUri {
    recipient: String,
    amount: f64,
    labels: PaymentLabels,
}

#[derive(Serialize)]
struct UriQuery<'a> {
    amount: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    memo: Option<&'a str>,
}

impl PaymentRequestUri {
    pub fn new(recipient: &str, amount: f64, labels: PaymentLabels) -> Result<Self, GatewayError> {
        if recipient.is_empty() || !is_valid_address(recipient) {
            return Err(GatewayError::Validation("Invalid recipient address".to_string()));
        }
        if !amount.is_finite() || amount <= 0.0 {
            return Err(GatewayError::Validation(
                "Amount must be a positive number".to_string(),
            ));
        }

        Ok(Self {
            recipient: recipient.to_string(),
            amount,
            labels,
        })
    }

    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn to_uri(&self) -> Result<String, GatewayError> {
        // f64 Display never uses exponent notation
        let amount = self.amount.to_string();
        let query = serde_urlencoded::to_string(UriQuery {
            amount: &amount,
            label: self.labels.label(),
            message: self.labels.message(),
            memo: self.labels.memo(),
        })
        .map_err(|e| GatewayError::InternalError(format!("URI encoding failed: {}", e)))?;

        Ok(format!("solana:{}?{}", self.recipient, query))
    }
}

/// Matches a confirmed ledger transaction against the expected payment.
pub fn reconcile(
    tx: &LedgerTransaction,
    expected_recipient: &str,
    expected_amount: f64,
) -> PaymentVerificationResult {
    let timestamp = tx
        .block_time
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .map(|t| t.to_rfc3339());

    let transfer: Option<&SolTransfer> = tx
        .transfers
        .iter()
        .find(|t| t.destination == expected_recipient)
        .or_else(|| tx.transfers.first());

    let observed = |message: String, verified: bool| {
        PaymentVerificationResult::new(
            verified,
            &tx.signature,
            transfer.map(|t| lamports_to_sol(t.lamports)),
            transfer.map(|t| t.destination.clone()),
            timestamp.clone(),
            message,
        )
    };

    if let Some(err) = &tx.error {
        return observed(format!("transaction failed on chain: {}", err), false);
    }

    let Some(transfer) = transfer else {
        return observed("no SOL transfer found in transaction".to_string(), false);
    };

    if transfer.destination != expected_recipient {
        return observed("recipient mismatch".to_string(), false);
    }

    if transfer.lamports != sol_to_lamports(expected_amount) {
        return observed("amount mismatch".to_string(), false);
    }

    observed("payment verified".to_string(), true)
}
