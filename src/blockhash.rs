//! Account-scoped blockhash leases
//!
//! The router's `getBlockhashForAccounts` method hands out a blockhash that is
//! only valid relative to the state of the accounts named in the call. The
//! canonical parameter shape is one nested array argument:
//! `params: [[addr, ...]]`.

use serde_json::json;
use solana_sdk::pubkey::Pubkey;
use tracing::debug;

use crate::error::{Result, RouterError};
use crate::rpc::RouterClient;
use crate::transaction::{DraftTransaction, PreparedTransaction};
use crate::types::BlockhashLease;

/// Fetch a blockhash lease scoped to `writable_accounts`
///
/// One RPC call, no retries; failures propagate to the caller.
pub async fn fetch_scoped_blockhash(
    client: &RouterClient,
    writable_accounts: &[Pubkey],
) -> Result<BlockhashLease> {
    let addresses: Vec<String> = writable_accounts.iter().map(Pubkey::to_string).collect();
    let result = client
        .request("getBlockhashForAccounts", json!([addresses]))
        .await?;

    let lease: BlockhashLease =
        serde_json::from_value(result).map_err(|e| RouterError::MalformedResponse {
            method: "getBlockhashForAccounts".to_string(),
            reason: e.to_string(),
        })?;

    debug!(
        accounts = writable_accounts.len(),
        last_valid_block_height = lease.last_valid_block_height,
        "fetched scoped blockhash"
    );
    Ok(lease)
}

/// Stamp a draft with a lease scoped to its writable-account set
///
/// Resolves the draft's writable accounts, fetches a lease for exactly that
/// set, and returns the prepared value. Does not sign. Each call fetches a
/// fresh lease; callers must not assume the blockhash is stable across
/// repeated preparation.
pub async fn prepare_router_transaction(
    client: &RouterClient,
    draft: DraftTransaction,
) -> Result<PreparedTransaction> {
    let writable = draft.writable_accounts();
    let lease = fetch_scoped_blockhash(client, &writable).await?;
    Ok(PreparedTransaction::new(draft, lease))
}
