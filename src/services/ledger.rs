use anyhow::Result;
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;

use crate::services::solana_pay::{is_valid_address, is_valid_signature};

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("RPC transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },
}

/// A native SOL transfer observed in a confirmed transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolTransfer {
    pub source: String,
    pub destination: String,
    pub lamports: u64,
}

#[derive(Debug, Clone)]
pub struct LedgerTransaction {
    pub signature: String,
    pub slot: u64,
    pub block_time: Option<i64>,
    pub fee: u64,
    /// On-chain execution error, `None` when the transaction succeeded.
    pub error: Option<String>,
    pub transfers: Vec<SolTransfer>,
}

#[async_trait]
pub trait Ledger: Send + Sync {
    async fn get_transaction(&self, signature: &str)
        -> Result<Option<LedgerTransaction>, LedgerError>;

    /// Balance in lamports.
    async fn get_balance(&self, address: &str) -> Result<Option<u64>, LedgerError>;

    async fn ping(&self) -> bool;
}

/// JSON-RPC client for a Solana cluster, with an optional fallback endpoint.
pub struct SolanaRpcClient {
    primary: String,
    fallback: Option<String>,
    client: reqwest::Client,
}

impl SolanaRpcClient {
    pub fn new(rpc_url: &str, fallback_url: Option<&str>, timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        tracing::info!(
            "Solana RPC client configured (primary: {}, fallback: {})",
            rpc_url,
            fallback_url.is_some()
        );

        Ok(Self {
            primary: rpc_url.to_string(),
            fallback: fallback_url.map(str::to_string),
            client,
        })
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<Option<T>, LedgerError> {
        let result = self.call_endpoint(&self.primary, method, &params).await;

        if let (Err(LedgerError::Transport(e)), Some(fallback)) = (&result, &self.fallback) {
            tracing::warn!("Primary RPC failed ({}), trying fallback", e);
            return self.call_endpoint(fallback, method, &params).await;
        }

        result
    }

    async fn call_endpoint<T: DeserializeOwned>(
        &self,
        url: &str,
        method: &str,
        params: &Value,
    ) -> Result<Option<T>, LedgerError> {
        let request = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let response: RpcResponse<T> = self
            .client
            .post(url)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(error) = response.error {
            return Err(LedgerError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        Ok(response.result)
    }
}

#[async_trait]
impl Ledger for SolanaRpcClient {
    async fn get_transaction(
        &self,
        signature: &str,
    ) -> Result<Option<LedgerTransaction>, LedgerError> {
        if !is_valid_signature(signature) {
            return Err(LedgerError::InvalidSignature(signature.to_string()));
        }

        let params = json!([
            signature,
            {
                "encoding": "jsonParsed",
                "commitment": "confirmed",
                "maxSupportedTransactionVersion": 0
            }
        ]);

        let Some(tx) = self.call::<RpcTransaction>("getTransaction", params).await? else {
            tracing::debug!("Transaction {} not found", signature);
            return Ok(None);
        };

        Ok(Some(tx.into_ledger_transaction(signature)))
    }

    async fn get_balance(&self, address: &str) -> Result<Option<u64>, LedgerError> {
        if !is_valid_address(address) {
            return Err(LedgerError::InvalidAddress(address.to_string()));
        }

        let balance = self
            .call::<RpcBalance>("getBalance", json!([address, { "commitment": "confirmed" }]))
            .await?;

        Ok(balance.map(|b| b.value))
    }

    async fn ping(&self) -> bool {
        matches!(
            self.call::<String>("getHealth", json!([])).await,
            Ok(Some(status)) if status == "ok"
        )
    }
}

#[derive(Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorBody>,
}

#[derive(Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

#[derive(Deserialize)]
struct RpcBalance {
    value: u64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcTransaction {
    slot: u64,
    block_time: Option<i64>,
    meta: Option<RpcMeta>,
    transaction: RpcTransactionBody,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcMeta {
    err: Option<Value>,
    #[serde(default)]
    fee: u64,
    inner_instructions: Option<Vec<RpcInnerInstructions>>,
}

#[derive(Deserialize)]
struct RpcInnerInstructions {
    instructions: Vec<RpcInstruction>,
}

#[derive(Deserialize)]
struct RpcTransactionBody {
    message: RpcMessage,
}

#[derive(Deserialize)]
struct RpcMessage {
    instructions: Vec<RpcInstruction>,
}

#[derive(Deserialize)]
struct RpcInstruction {
    program: Option<String>,
    parsed: Option<Value>,
}

impl RpcInstruction {
    fn system_transfer(&self) -> Option<SolTransfer> {
        if self.program.as_deref() != Some("system") {
            return None;
        }

        let parsed = self.parsed.as_ref()?;
        match parsed.get("type")?.as_str()? {
            "transfer" | "transferWithSeed" => {}
            _ => return None,
        }

        serde_json::from_value(parsed.get("info")?.clone()).ok()
    }
}

impl RpcTransaction {
    fn into_ledger_transaction(self, signature: &str) -> LedgerTransaction {
        let (error, fee, inner) = match self.meta {
            Some(meta) => (
                meta.err.map(|e| e.to_string()),
                meta.fee,
                meta.inner_instructions.unwrap_or_default(),
            ),
            None => (None, 0, Vec::new()),
        };

        let transfers = self
            .transaction
            .message
            .instructions
            .iter()
            .chain(inner.iter().flat_map(|group| group.instructions.iter()))
            .filter_map(RpcInstruction::system_transfer)
            .collect();

        LedgerTransaction {
            signature: signature.to_string(),
            slot: self.slot,
            block_time: self.block_time,
            fee,
            error,
            transfers,
        }
    }
}
