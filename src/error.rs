//! Error types for the router transaction engine
//!
//! One taxonomy for the whole crate, split along the boundaries that matter
//! to callers:
//! - caller misuse (`InvalidArguments`) is surfaced immediately, never retried
//! - transport failures propagate verbatim, no internal retry
//! - protocol errors carry enough context (method, marker, signature) to debug
//! - internal invariant violations indicate a bug, not a recoverable condition
//!
//! Timeouts and cancellations are deliberately absent here: they are terminal
//! poll outcomes (`PollOutcome`), not errors, except where a higher-level flow
//! (the commit correlator) has to fold them into its own failure.

use thiserror::Error;

/// Error type for all router engine operations
#[derive(Error, Debug)]
pub enum RouterError {
    /// Caller misuse: wrong signer shape, malformed signature string, etc.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// Network/HTTP failure talking to an RPC endpoint
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The RPC endpoint answered with a JSON-RPC error object
    #[error("RPC error {code}: {message}")]
    Rpc {
        /// JSON-RPC error code
        code: i64,
        /// JSON-RPC error message
        message: String,
    },

    /// The RPC response was well-formed JSON but not the shape we require
    #[error("Malformed response from {method}: {reason}")]
    MalformedResponse {
        /// RPC method that produced the response
        method: String,
        /// What was missing or unparseable
        reason: String,
    },

    /// A transaction record (or its metadata) is absent on the queried layer
    #[error("Transaction not found: {signature}")]
    TransactionNotFound {
        /// The signature that was looked up
        signature: String,
    },

    /// The ephemeral transaction's logs carry no schedule-commit marker
    #[error("No ScheduledCommitSent marker in logs of {signature}")]
    ScheduleCommitNotFound {
        /// The ephemeral-layer signature whose logs were scanned
        signature: String,
    },

    /// The schedule-commit transaction's logs carry no base-layer commit marker
    #[error("No base-layer commit marker in logs of {signature}")]
    CommitSignatureNotFound {
        /// The schedule-commit signature whose logs were scanned
        signature: String,
    },

    /// Polling a signature did not reach the target commitment in time
    #[error("Confirmation timed out for {signature}")]
    ConfirmationTimeout {
        /// The signature that never confirmed
        signature: String,
    },

    /// A cooperative cancellation fired while a higher-level flow was polling
    #[error("Cancelled: {reason}")]
    Cancelled {
        /// Caller-supplied cancellation reason
        reason: String,
    },

    /// The signing dependency failed to produce signatures
    #[error("Signing failed: {0}")]
    Signing(#[from] solana_sdk::signer::SignerError),

    /// Internal invariant violation: indicates a bug, never retried
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RouterError {
    /// Error category label for metrics and structured logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidArguments(_) => "arguments",
            Self::Transport(_) => "transport",
            Self::Rpc { .. } => "rpc",
            Self::MalformedResponse { .. } => "protocol",
            Self::TransactionNotFound { .. } => "not_found",
            Self::ScheduleCommitNotFound { .. } => "protocol",
            Self::CommitSignatureNotFound { .. } => "protocol",
            Self::ConfirmationTimeout { .. } => "timeout",
            Self::Cancelled { .. } => "cancelled",
            Self::Signing(_) => "signing",
            Self::Internal(_) => "internal",
        }
    }

    /// Whether this is the router's stale-lease rejection
    ///
    /// The sender re-enters its lease loop only on this rejection; everything
    /// else propagates.
    pub fn is_stale_blockhash(&self) -> bool {
        matches!(self, Self::Rpc { message, .. } if message.contains("Blockhash not found"))
    }
}

/// Convenience alias used throughout the crate
pub type Result<T> = std::result::Result<T, RouterError>;
