//! JSON-RPC client for the router and base layers
//!
//! A thin wrapper over one `reqwest::Client`: every call is a single POST of a
//! JSON-RPC 2.0 envelope (id 1), with no retries and no backoff. Transport
//! failures propagate verbatim; a JSON-RPC `error` object maps to
//! `RouterError::Rpc`; a response without a `result` field maps to
//! `RouterError::MalformedResponse`. Anything smarter than that belongs to the
//! caller.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Deserialize;
use serde_json::{json, Value};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use std::str::FromStr;
use tracing::debug;

use crate::error::{Result, RouterError};
use crate::types::parse_signature;

/// JSON-RPC client bound to one endpoint
///
/// Cheap to clone; the underlying `reqwest::Client` is safe for concurrent
/// use, so one value can serve any number of in-flight calls.
#[derive(Debug, Clone)]
pub struct RouterClient {
    endpoint: String,
    http: reqwest::Client,
}

#[derive(Deserialize)]
struct TransactionRecord {
    meta: Option<TransactionMeta>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionMeta {
    #[serde(default)]
    log_messages: Option<Vec<String>>,
}

impl RouterClient {
    /// Create a client for `endpoint` with a fresh HTTP connection pool
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            http: reqwest::Client::new(),
        }
    }

    /// Create a client sharing an existing `reqwest::Client`
    pub fn with_http(endpoint: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            endpoint: endpoint.into(),
            http,
        }
    }

    /// The RPC endpoint this client talks to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Issue one JSON-RPC call and return the `result` field verbatim
    pub async fn request(&self, method: &str, params: Value) -> Result<Value> {
        self.request_at(&self.endpoint, method, params).await
    }

    async fn request_at(&self, url: &str, method: &str, params: Value) -> Result<Value> {
        let envelope = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        debug!(method = %method, url = %url, "RPC request");
        let response = self.http.post(url).json(&envelope).send().await?;
        let body: Value = response.json().await?;

        if let Some(error) = body.get("error") {
            let code = error.get("code").and_then(Value::as_i64).unwrap_or(0);
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown RPC error")
                .to_string();
            return Err(RouterError::Rpc { code, message });
        }

        match body.get("result") {
            Some(result) => Ok(result.clone()),
            None => Err(RouterError::MalformedResponse {
                method: method.to_string(),
                reason: "missing result field".to_string(),
            }),
        }
    }

    /// Submit serialized transaction bytes, returning the signature
    ///
    /// Uses base64 payload encoding. Preflight is skipped by default because
    /// the router simulates against delegated state itself.
    pub async fn send_raw_transaction(
        &self,
        wire_bytes: &[u8],
        skip_preflight: bool,
    ) -> Result<Signature> {
        let encoded = BASE64.encode(wire_bytes);
        let result = self
            .request(
                "sendTransaction",
                json!([encoded, { "skipPreflight": skip_preflight, "encoding": "base64" }]),
            )
            .await?;
        let text = result.as_str().ok_or_else(|| RouterError::MalformedResponse {
            method: "sendTransaction".to_string(),
            reason: "result is not a signature string".to_string(),
        })?;
        parse_signature(text)
    }

    /// Fetch the log lines a transaction emitted during execution
    ///
    /// Fails with `TransactionNotFound` when the record or its metadata is
    /// absent on this layer. Absent `logMessages` collapse to an empty list.
    pub async fn get_transaction_logs(&self, signature: &Signature) -> Result<Vec<String>> {
        let result = self
            .request(
                "getTransaction",
                json!([
                    signature.to_string(),
                    { "encoding": "json", "commitment": "confirmed", "maxSupportedTransactionVersion": 0 }
                ]),
            )
            .await?;

        if result.is_null() {
            return Err(RouterError::TransactionNotFound {
                signature: signature.to_string(),
            });
        }

        let record: TransactionRecord =
            serde_json::from_value(result).map_err(|e| RouterError::MalformedResponse {
                method: "getTransaction".to_string(),
                reason: e.to_string(),
            })?;
        let meta = record.meta.ok_or_else(|| RouterError::TransactionNotFound {
            signature: signature.to_string(),
        })?;
        Ok(meta.log_messages.unwrap_or_default())
    }

    /// Identity of the validator closest to this endpoint
    pub async fn get_closest_validator(&self) -> Result<Pubkey> {
        let result = self.request("getIdentity", json!([])).await?;
        let identity = result
            .get("identity")
            .and_then(Value::as_str)
            .ok_or_else(|| RouterError::MalformedResponse {
                method: "getIdentity".to_string(),
                reason: "missing identity field".to_string(),
            })?;
        Pubkey::from_str(identity).map_err(|e| RouterError::MalformedResponse {
            method: "getIdentity".to_string(),
            reason: format!("unparseable identity: {e}"),
        })
    }

    /// Whether `account` is currently delegated to the ephemeral layer
    ///
    /// The router exposes this as a dedicated path rather than a plain RPC
    /// method, so the envelope is posted to `<endpoint>/getDelegationStatus`.
    pub async fn get_delegation_status(&self, account: &Pubkey) -> Result<bool> {
        let url = format!("{}/getDelegationStatus", self.endpoint.trim_end_matches('/'));
        let result = self
            .request_at(&url, "getDelegationStatus", json!([account.to_string()]))
            .await?;
        result
            .get("isDelegated")
            .and_then(Value::as_bool)
            .ok_or_else(|| RouterError::MalformedResponse {
                method: "getDelegationStatus".to_string(),
                reason: "missing isDelegated field".to_string(),
            })
    }
}
