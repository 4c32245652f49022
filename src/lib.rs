//! Magic Router - transaction submission and cross-layer confirmation engine
//!
//! Prepares transactions with account-scoped blockhashes, submits them to an
//! ephemeral "router" layer, polls their confirmation, and correlates the
//! resulting schedule-commit/commit event pair across the ephemeral and base
//! layers.

pub mod accounts;
pub mod blockhash;
pub mod correlator;
pub mod error;
pub mod poller;
pub mod rpc;
pub mod sender;
pub mod transaction;
pub mod types;

pub use accounts::{writable_accounts, writable_accounts_from_message};
pub use blockhash::{fetch_scoped_blockhash, prepare_router_transaction};
pub use correlator::{
    extract_marker_signature, get_commitment_signature, COMMIT_SIGNATURE_MARKER,
    SCHEDULE_COMMIT_MARKER,
};
pub use error::{Result, RouterError};
pub use poller::{
    cancel_pair, confirm_router_transaction, poll_signature_status, signature_status, CancelHandle,
    CancelToken, PollConfig, PollOutcome, StatusBatch, StatusConfig, StatusSource,
};
pub use rpc::RouterClient;
pub use sender::{send_router_transaction, SendOptions};
pub use transaction::{
    DraftTransaction, NonceInfo, PreparedTransaction, RouterTransaction, SignedTransaction,
};
pub use types::{
    parse_signature, BlockhashLease, Commitment, ConfirmationResult, RpcContext, SignatureStatus,
};

// Re-export commonly used SDK types
pub use solana_sdk::{pubkey::Pubkey, signature::Signature};
