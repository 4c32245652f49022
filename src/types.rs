//! Shared wire types for the router transaction engine

use serde::{Deserialize, Serialize};
use solana_sdk::signature::Signature;

use crate::error::{Result, RouterError};

/// A blockhash scoped to a specific writable-account set
///
/// The router hands out blockhashes that are only consistent relative to the
/// accounts named in the fetch. The lease is valid until the layer's slot
/// height passes `last_valid_block_height`, so it must be obtained after the
/// transaction's final writable set is known and used before it expires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockhashLease {
    /// The scoped blockhash, base58 text form
    pub blockhash: String,
    /// Last block height at which this blockhash is accepted
    pub last_valid_block_height: u64,
}

/// Commitment level for transaction confirmation
///
/// Ordered by durability: `Processed < Confirmed < Finalized`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Commitment {
    Processed,
    Confirmed,
    Finalized,
}

impl Commitment {
    /// Whether a status at this level satisfies the `target` level
    ///
    /// `Finalized` satisfies every target.
    pub fn satisfies(self, target: Commitment) -> bool {
        self >= target
    }
}

/// Signature status as reported by `getSignatureStatuses`
///
/// Absent-from-network is modeled as `None` in the statuses array, not as a
/// value of this type. `err` is set at most once and is terminal;
/// `confirmation_status` only ever moves forward.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureStatus {
    /// Slot the transaction was processed in
    pub slot: u64,
    /// Confirmation count, `None` once rooted
    #[serde(default)]
    pub confirmations: Option<u64>,
    /// Terminal execution error, if the transaction failed
    #[serde(default)]
    pub err: Option<serde_json::Value>,
    /// Current commitment level, absent on very old statuses
    #[serde(default)]
    pub confirmation_status: Option<Commitment>,
}

impl SignatureStatus {
    /// Whether this status terminates a poll targeting `target`
    ///
    /// True when the confirmation level satisfies the target or the
    /// transaction failed on chain (an `err` is terminal either way).
    pub fn is_terminal_for(&self, target: Commitment) -> bool {
        if self.err.is_some() {
            return true;
        }
        self.confirmation_status
            .is_some_and(|level| level.satisfies(target))
    }
}

/// Slot context attached to RPC responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcContext {
    /// Slot at which the node answered
    pub slot: u64,
}

/// Outcome of a successful confirmation poll
#[derive(Debug, Clone)]
pub struct ConfirmationResult {
    /// Slot context from the final status query
    pub context: RpcContext,
    /// The observed terminal status (its `err` may be set)
    pub value: SignatureStatus,
}

/// Parse a base58 signature string, rejecting anything that is not 64 bytes
///
/// Validation happens before any network call: a malformed signature is an
/// `InvalidArguments` failure, never a query.
pub fn parse_signature(text: &str) -> Result<Signature> {
    let bytes = bs58::decode(text)
        .into_vec()
        .map_err(|e| RouterError::InvalidArguments(format!("invalid base58 signature: {e}")))?;
    let raw: [u8; 64] = bytes.as_slice().try_into().map_err(|_| {
        RouterError::InvalidArguments(format!(
            "signature must decode to 64 bytes, got {}",
            bytes.len()
        ))
    })?;
    Ok(Signature::from(raw))
}
