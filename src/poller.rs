//! Signature status polling
//!
//! A fixed-interval poll of `getSignatureStatuses` with a tick-bounded
//! timeout and cooperative cancellation. The poller depends on a
//! `StatusSource` capability, not on the transport, so its state machine is
//! unit-testable against a scripted status sequence.
//!
//! States: `Pending` → `Confirmed` | `TimedOut` | `Cancelled`, with transport
//! failures surfacing as `Err` immediately. The interval timer lives in the
//! call frame and is dropped on every exit path; no periodic work outlives a
//! poll.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use solana_sdk::signature::Signature;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::error::{Result, RouterError};
use crate::rpc::RouterClient;
use crate::types::{Commitment, ConfirmationResult, RpcContext, SignatureStatus};

/// Optional config for a status lookup
#[derive(Debug, Clone, Copy, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commitment: Option<Commitment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_context_slot: Option<u64>,
}

/// One batched status response: slot context plus one entry per requested
/// signature (`None` while the network has not seen it)
#[derive(Debug, Clone, Deserialize)]
pub struct StatusBatch {
    pub context: RpcContext,
    #[serde(rename = "value")]
    pub statuses: Vec<Option<SignatureStatus>>,
}

/// Capability the poller depends on: something that can answer a batched
/// signature status query
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn signature_statuses(
        &self,
        signatures: &[Signature],
        config: Option<&StatusConfig>,
    ) -> Result<StatusBatch>;
}

#[async_trait]
impl StatusSource for RouterClient {
    async fn signature_statuses(
        &self,
        signatures: &[Signature],
        config: Option<&StatusConfig>,
    ) -> Result<StatusBatch> {
        let sigs: Vec<String> = signatures.iter().map(Signature::to_string).collect();
        let params = match config {
            Some(config) => json!([sigs, config]),
            None => json!([sigs]),
        };
        let result = self.request("getSignatureStatuses", params).await?;
        serde_json::from_value(result).map_err(|e| RouterError::MalformedResponse {
            method: "getSignatureStatuses".to_string(),
            reason: e.to_string(),
        })
    }
}

/// Single-signature status lookup
///
/// Thin wrapper over the batched call that demands exactly one entry back;
/// any other count is an internal-invariant failure in the source.
pub async fn signature_status<S: StatusSource + ?Sized>(
    source: &S,
    signature: &Signature,
    config: Option<&StatusConfig>,
) -> Result<(RpcContext, Option<SignatureStatus>)> {
    let batch = source
        .signature_statuses(std::slice::from_ref(signature), config)
        .await?;
    if batch.statuses.len() != 1 {
        return Err(RouterError::Internal(format!(
            "requested one signature status, got {}",
            batch.statuses.len()
        )));
    }
    let mut statuses = batch.statuses;
    Ok((batch.context, statuses.remove(0)))
}

/// Create a linked cancellation handle/token pair
///
/// The handle side fires the cancellation with a reason; the token side is
/// held by a poll and checked once per tick. Cancellation is cooperative: a
/// signal fired mid-query takes effect at the next tick boundary.
pub fn cancel_pair() -> (CancelHandle, CancelToken) {
    let (tx, rx) = watch::channel(None);
    (CancelHandle { tx }, CancelToken { rx })
}

/// Fires a cancellation with a caller-supplied reason
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<Option<String>>,
}

impl CancelHandle {
    pub fn cancel(&self, reason: impl Into<String>) {
        let _ = self.tx.send(Some(reason.into()));
    }
}

/// Observes a cancellation; clonable so several polls can share one signal
#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: watch::Receiver<Option<String>>,
}

impl CancelToken {
    /// The cancellation reason, if the signal has fired
    pub fn fired(&self) -> Option<String> {
        self.rx.borrow().clone()
    }
}

/// Poll parameters
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Time between status queries
    pub interval: std::time::Duration,
    /// Total budget; the tick bound is `ceil(timeout / interval)`
    pub timeout: std::time::Duration,
    /// Target commitment level
    pub commitment: Commitment,
    /// Optional cooperative cancellation signal
    pub cancel: Option<CancelToken>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: std::time::Duration::from_secs(2),
            timeout: std::time::Duration::from_secs(30),
            commitment: Commitment::Confirmed,
            cancel: None,
        }
    }
}

/// Terminal poll outcome
///
/// Timeout and cancellation are outcomes callers must branch on, not errors;
/// only transport/query failures surface as `Err`.
#[derive(Debug)]
pub enum PollOutcome {
    /// The status reached the target level or failed terminally on chain
    /// (inspect `value.err`)
    Confirmed(ConfirmationResult),
    /// The signature stayed absent through the whole tick budget
    TimedOut {
        /// Number of ticks consumed, `ceil(timeout / interval)`
        ticks: u32,
    },
    /// The cancellation signal fired
    Cancelled {
        /// Caller-supplied reason
        reason: String,
    },
}

/// Poll a signature's status until a terminal outcome
///
/// On each tick: the cancellation signal is checked first (a signal fired
/// before the first tick means zero status queries are issued), then one
/// status query runs. A present status terminates the poll when its level
/// satisfies the target or it carries an on-chain error. The tick bound is
/// computed once up front.
pub async fn poll_signature_status<S: StatusSource + ?Sized>(
    source: &S,
    signature: &Signature,
    config: PollConfig,
) -> Result<PollOutcome> {
    let interval_ms = (config.interval.as_millis() as u64).max(1);
    let timeout_ms = config.timeout.as_millis() as u64;
    let max_ticks = (timeout_ms.div_ceil(interval_ms)).max(1) as u32;

    let status_config = StatusConfig {
        commitment: Some(config.commitment),
        min_context_slot: None,
    };

    // tokio::time::interval rejects a zero period
    let period = config.interval.max(std::time::Duration::from_millis(1));
    let mut timer = tokio::time::interval(period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

    for tick in 1..=max_ticks {
        timer.tick().await;

        if let Some(token) = &config.cancel {
            if let Some(reason) = token.fired() {
                debug!(signature = %signature, tick, reason = %reason, "poll cancelled");
                return Ok(PollOutcome::Cancelled { reason });
            }
        }

        let (context, status) = signature_status(source, signature, Some(&status_config)).await?;
        if let Some(status) = status {
            if status.is_terminal_for(config.commitment) {
                debug!(
                    signature = %signature,
                    tick,
                    slot = context.slot,
                    "poll reached terminal status"
                );
                return Ok(PollOutcome::Confirmed(ConfirmationResult {
                    context,
                    value: status,
                }));
            }
        }
    }

    debug!(signature = %signature, ticks = max_ticks, "poll timed out");
    Ok(PollOutcome::TimedOut { ticks: max_ticks })
}

/// Confirm a submitted transaction against the router
///
/// Convenience wrapper binding the poll to a live client as its status
/// source.
pub async fn confirm_router_transaction(
    client: &RouterClient,
    signature: &Signature,
    config: PollConfig,
) -> Result<PollOutcome> {
    poll_signature_status(client, signature, config).await
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedBatch(usize);

    #[async_trait]
    impl StatusSource for FixedBatch {
        async fn signature_statuses(
            &self,
            _signatures: &[Signature],
            _config: Option<&StatusConfig>,
        ) -> Result<StatusBatch> {
            Ok(StatusBatch {
                context: RpcContext { slot: 1 },
                statuses: vec![None; self.0],
            })
        }
    }

    #[tokio::test]
    async fn test_single_lookup_requires_exactly_one_entry() {
        let signature = Signature::from([3u8; 64]);

        let (_, status) = signature_status(&FixedBatch(1), &signature, None)
            .await
            .unwrap();
        assert!(status.is_none());

        let err = signature_status(&FixedBatch(2), &signature, None)
            .await
            .unwrap_err();
        assert!(matches!(err, RouterError::Internal(_)));

        let err = signature_status(&FixedBatch(0), &signature, None)
            .await
            .unwrap_err();
        assert!(matches!(err, RouterError::Internal(_)));
    }

    #[test]
    fn test_status_config_serializes_camel_case() {
        let config = StatusConfig {
            commitment: Some(Commitment::Confirmed),
            min_context_slot: Some(42),
        };
        assert_eq!(
            serde_json::to_value(config).unwrap(),
            json!({"commitment": "confirmed", "minContextSlot": 42})
        );

        let empty = StatusConfig::default();
        assert_eq!(serde_json::to_value(empty).unwrap(), json!({}));
    }

    #[test]
    fn test_cancel_pair_carries_reason() {
        let (handle, token) = cancel_pair();
        assert!(token.fired().is_none());
        handle.cancel("shutdown");
        assert_eq!(token.fired().as_deref(), Some("shutdown"));
    }
}
