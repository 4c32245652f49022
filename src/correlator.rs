//! Cross-layer commit correlation
//!
//! The ephemeral layer and the base layer expose no native cross-reference
//! for a delegated transaction's settlement. The only linkage is textual: the
//! delegation program logs a schedule-commit signature on the ephemeral
//! layer, and that schedule transaction in turn logs the base-layer commit
//! signature. This module walks that chain by scanning log lines for two
//! pinned literal markers. Brittle by construction: any change to the log
//! text breaks correlation, which is why the markers are crate constants
//! covered by contract tests.

use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use tracing::debug;

use crate::blockhash::fetch_scoped_blockhash;
use crate::error::{Result, RouterError};
use crate::poller::{poll_signature_status, PollConfig, PollOutcome};
use crate::rpc::RouterClient;
use crate::types::parse_signature;

/// Log marker preceding the schedule-commit signature on the ephemeral layer
pub const SCHEDULE_COMMIT_MARKER: &str = "ScheduledCommitSent signature: ";

/// Log marker preceding the base-layer commit signature in the schedule
/// transaction's logs
pub const COMMIT_SIGNATURE_MARKER: &str = "ScheduledCommitSent signature[0]: ";

/// Extract the signature text following `marker` in a transaction's logs
///
/// Scans line by line; the first match wins. The signature is the
/// whitespace-delimited token immediately after the marker on the same line.
pub fn extract_marker_signature(logs: &[String], marker: &str) -> Option<String> {
    logs.iter().find_map(|line| {
        let start = line.find(marker)? + marker.len();
        line[start..]
            .split_whitespace()
            .next()
            .map(str::to_string)
    })
}

/// Resolve the base-layer commit signature for an ephemeral transaction
///
/// Strictly sequential:
/// 1. fetch the ephemeral transaction's logs,
/// 2. extract the schedule-commit signature (`ScheduleCommitNotFound` when no
///    line carries the marker),
/// 3. fetch a fresh lease scoped to the original transaction's writable set
///    and poll the schedule-commit signature to confirmation,
/// 4. fetch the schedule transaction's logs,
/// 5. extract the base-layer commit signature (`CommitSignatureNotFound`),
/// 6. return it — callers may confirm it on the base layer independently.
///
/// A poll timeout or cancellation inside step 3 folds into this flow's error:
/// there is no commit signature to return without a confirmed schedule.
pub async fn get_commitment_signature(
    client: &RouterClient,
    ephemeral_signature: &Signature,
    writable_accounts: &[Pubkey],
    poll: PollConfig,
) -> Result<Signature> {
    let logs = client.get_transaction_logs(ephemeral_signature).await?;
    let schedule_text = extract_marker_signature(&logs, SCHEDULE_COMMIT_MARKER).ok_or_else(|| {
        RouterError::ScheduleCommitNotFound {
            signature: ephemeral_signature.to_string(),
        }
    })?;
    let schedule_signature = parse_signature(&schedule_text)?;
    debug!(
        ephemeral = %ephemeral_signature,
        schedule = %schedule_signature,
        "found schedule-commit signature"
    );

    // A fresh lease for the original writable set bounds how long the
    // schedule transaction can stay pending before the poll gives up.
    let lease = fetch_scoped_blockhash(client, writable_accounts).await?;
    debug!(
        last_valid_block_height = lease.last_valid_block_height,
        "confirming schedule commit under fresh lease"
    );

    match poll_signature_status(client, &schedule_signature, poll).await? {
        PollOutcome::Confirmed(result) => {
            if let Some(err) = result.value.err {
                return Err(RouterError::Rpc {
                    code: 0,
                    message: format!("schedule commit failed on chain: {err}"),
                });
            }
        }
        PollOutcome::TimedOut { .. } => {
            return Err(RouterError::ConfirmationTimeout {
                signature: schedule_signature.to_string(),
            });
        }
        PollOutcome::Cancelled { reason } => {
            return Err(RouterError::Cancelled { reason });
        }
    }

    let schedule_logs = client.get_transaction_logs(&schedule_signature).await?;
    let commit_text = extract_marker_signature(&schedule_logs, COMMIT_SIGNATURE_MARKER)
        .ok_or_else(|| RouterError::CommitSignatureNotFound {
            signature: schedule_signature.to_string(),
        })?;
    let commit_signature = parse_signature(&commit_text)?;
    debug!(
        schedule = %schedule_signature,
        commit = %commit_signature,
        "found base-layer commit signature"
    );
    Ok(commit_signature)
}
