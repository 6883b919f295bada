use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub session_id: String,
    pub order_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentRequest {
    pub recipient: String,
    pub amount: f64,
    pub label: Option<String>,
    pub message: Option<String>,
    pub memo: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentUrlResponse {
    pub payment_url: String,
    pub qr_code_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentVerificationRequest {
    pub signature: String,
    pub expected_recipient: String,
    pub expected_amount: f64,
}

/// Outcome of one verification attempt. Returned to the caller and stored
/// verbatim in the audit row, whether or not the payment matched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentVerificationResult {
    pub verified: bool,
    pub signature: String,
    pub amount: Option<f64>,
    pub recipient: Option<String>,
    pub timestamp: Option<String>,
    pub message: String,
}

impl PaymentVerificationResult {
    pub fn new(
        verified: bool,
        signature: &str,
        amount: Option<f64>,
        recipient: Option<String>,
        timestamp: Option<String>,
        message: String,
    ) -> Self {
        Self {
            verified,
            signature: signature.to_string(),
            amount,
            recipient,
            timestamp,
            message,
        }
    }

    /// The ledger could not produce the transaction at all.
    pub fn unresolved(signature: &str, message: String) -> Self {
        Self::new(false, signature, None, None, None, message)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletBalance {
    pub address: String,
    pub balance: f64,
    pub currency: String,
}
