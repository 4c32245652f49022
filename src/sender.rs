//! Transaction submission
//!
//! `send_router_transaction` drives the full lease → sign → submit cycle for
//! legacy drafts, and plain submission for already-signed versioned
//! transactions. The only retry at this layer is the bounded stale-lease
//! cycle: when the router rejects a submission with "Blockhash not found",
//! the lease expired between fetch and submit, so a fresh lease scoped to the
//! current writable set is fetched and the cycle re-enters, up to
//! `max_blockhash_retries` attempts. Every other failure propagates on first
//! sight.

use solana_sdk::signature::{Keypair, Signature, Signer};
use tracing::{debug, warn};

use crate::blockhash::prepare_router_transaction;
use crate::error::{Result, RouterError};
use crate::rpc::RouterClient;
use crate::transaction::{DraftTransaction, RouterTransaction};

/// Submission options
#[derive(Debug, Clone, Copy)]
pub struct SendOptions {
    /// Skip preflight simulation on submit (the router's default posture)
    pub skip_preflight: bool,
    /// Attempts per stale-lease cycle before giving up
    pub max_blockhash_retries: u32,
}

impl Default for SendOptions {
    fn default() -> Self {
        Self {
            skip_preflight: true,
            max_blockhash_retries: 3,
        }
    }
}

/// Sign and submit a transaction, returning its signature
///
/// Signer shape is validated once at this boundary: a legacy draft requires
/// at least one signer (the first becomes the fee payer when the draft has
/// none); a versioned transaction arrives already signed, so supplying
/// signers for it is caller misuse.
pub async fn send_router_transaction(
    client: &RouterClient,
    transaction: RouterTransaction,
    signers: &[&Keypair],
    options: SendOptions,
) -> Result<Signature> {
    match transaction {
        RouterTransaction::Versioned(versioned) => {
            if !signers.is_empty() {
                return Err(RouterError::InvalidArguments(
                    "versioned transactions are signed before submission; no signers expected"
                        .to_string(),
                ));
            }
            let wire_bytes = bincode::serialize(&versioned).map_err(|e| {
                RouterError::Internal(format!("transaction serialization failed: {e}"))
            })?;
            client
                .send_raw_transaction(&wire_bytes, options.skip_preflight)
                .await
        }
        RouterTransaction::Legacy(draft) => {
            if signers.is_empty() {
                return Err(RouterError::InvalidArguments(
                    "legacy transactions require at least one signer".to_string(),
                ));
            }
            send_legacy(client, draft, signers, options).await
        }
    }
}

async fn send_legacy(
    client: &RouterClient,
    mut draft: DraftTransaction,
    signers: &[&Keypair],
    options: SendOptions,
) -> Result<Signature> {
    // Assign the fee payer before any lease fetch: it is part of the
    // writable set the lease is scoped to.
    if draft.fee_payer.is_none() {
        draft.fee_payer = Some(signers[0].pubkey());
    }

    // Durable-nonce drafts do not expire with block height: sign once, no
    // lease cycle.
    if draft.nonce_info.is_some() {
        let signed = draft.sign_with_nonce(signers)?;
        return client
            .send_raw_transaction(&signed.wire_bytes()?, options.skip_preflight)
            .await;
    }

    let max_attempts = options.max_blockhash_retries.max(1);
    let mut attempt = 0;
    loop {
        attempt += 1;
        let prepared = prepare_router_transaction(client, draft.clone()).await?;
        let lease_height = prepared.lease().last_valid_block_height;
        let signed = prepared.sign(signers)?;

        match client
            .send_raw_transaction(&signed.wire_bytes()?, options.skip_preflight)
            .await
        {
            Ok(signature) => {
                debug!(
                    signature = %signature,
                    attempt,
                    last_valid_block_height = lease_height,
                    "transaction submitted"
                );
                return Ok(signature);
            }
            Err(e) if e.is_stale_blockhash() && attempt < max_attempts => {
                warn!(
                    attempt,
                    max_attempts,
                    "lease expired before submission, refetching"
                );
            }
            Err(e) => return Err(e),
        }
    }
}
