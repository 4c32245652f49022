//! Type-state transaction pipeline
//!
//! The prepare → sign → submit flow is a progression of owned values rather
//! than in-place field mutation:
//!
//! ```text
//! DraftTransaction --prepare--> PreparedTransaction --sign--> SignedTransaction
//! ```
//!
//! `PreparedTransaction` records the writable set its lease was scoped to and
//! `sign` consumes it, so the set cannot drift between the lease fetch and
//! signing, and a transaction cannot be signed before a blockhash exists.
//! Whether a transaction is legacy or versioned is decided once, at the API
//! boundary, by the `RouterTransaction` variant.

use solana_sdk::hash::Hash;
use solana_sdk::instruction::Instruction;
use solana_sdk::message::Message;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature, Signer};
use solana_sdk::transaction::{Transaction, VersionedTransaction};
use std::str::FromStr;

use crate::accounts::writable_accounts;
use crate::error::{Result, RouterError};
use crate::types::BlockhashLease;

/// Durable-nonce mode marker
///
/// Nonce transactions do not expire with block height, so the sender signs
/// once with this hash and skips the lease loop entirely. The caller is
/// responsible for leading the instruction list with the matching
/// advance-nonce instruction.
#[derive(Debug, Clone, Copy)]
pub struct NonceInfo {
    /// The durable nonce value used in place of a recent blockhash
    pub nonce: Hash,
}

/// A transaction under construction: instructions plus optional fee payer
/// and nonce mode, no blockhash yet
#[derive(Debug, Clone, Default)]
pub struct DraftTransaction {
    /// Fee payer; always part of the writable set when present
    pub fee_payer: Option<Pubkey>,
    /// Ordered instruction list
    pub instructions: Vec<Instruction>,
    /// Durable-nonce mode, if any
    pub nonce_info: Option<NonceInfo>,
}

impl DraftTransaction {
    pub fn new(instructions: Vec<Instruction>) -> Self {
        Self {
            fee_payer: None,
            instructions,
            nonce_info: None,
        }
    }

    pub fn with_fee_payer(mut self, fee_payer: Pubkey) -> Self {
        self.fee_payer = Some(fee_payer);
        self
    }

    pub fn with_nonce_info(mut self, nonce_info: NonceInfo) -> Self {
        self.nonce_info = Some(nonce_info);
        self
    }

    /// Append one instruction
    pub fn add_instruction(&mut self, instruction: Instruction) {
        self.instructions.push(instruction);
    }

    /// The exact set of accounts this draft will write to
    pub fn writable_accounts(&self) -> Vec<Pubkey> {
        writable_accounts(self.fee_payer.as_ref(), &self.instructions)
    }

    /// Sign a durable-nonce draft, bypassing the lease step
    pub(crate) fn sign_with_nonce(self, signers: &[&Keypair]) -> Result<SignedTransaction> {
        let nonce = self.nonce_info.ok_or_else(|| {
            RouterError::Internal("sign_with_nonce called on a non-nonce draft".to_string())
        })?;
        seal(&self, signers, nonce.nonce, None)
    }
}

/// A draft with a scoped blockhash lease attached
///
/// Construction records the writable set the lease was fetched for; signing
/// consumes the value, so no account can be added or removed in between.
#[derive(Debug)]
pub struct PreparedTransaction {
    draft: DraftTransaction,
    lease: BlockhashLease,
    writable: Vec<Pubkey>,
}

impl PreparedTransaction {
    /// Attach a lease obtained out of band
    ///
    /// Prefer `prepare_router_transaction`, which fetches the lease scoped to
    /// exactly this draft's writable set; a mismatched lease will be rejected
    /// by the router at submission.
    pub fn new(draft: DraftTransaction, lease: BlockhashLease) -> Self {
        let writable = draft.writable_accounts();
        Self {
            draft,
            lease,
            writable,
        }
    }

    /// The lease this transaction will be signed under
    pub fn lease(&self) -> &BlockhashLease {
        &self.lease
    }

    /// The writable set the lease is scoped to
    pub fn writable_accounts(&self) -> &[Pubkey] {
        &self.writable
    }

    /// Recover the draft, discarding the lease (e.g. to re-prepare)
    pub fn into_draft(self) -> DraftTransaction {
        self.draft
    }

    /// Sign with all supplied key material, producing wire-ready bytes
    ///
    /// The fee payer must have been assigned before the lease was fetched;
    /// assigning one here would silently change the writable set the lease
    /// is scoped to.
    pub fn sign(self, signers: &[&Keypair]) -> Result<SignedTransaction> {
        if self.draft.fee_payer.is_none() {
            return Err(RouterError::InvalidArguments(
                "fee payer must be assigned before preparing, not at signing".to_string(),
            ));
        }
        let blockhash =
            Hash::from_str(&self.lease.blockhash).map_err(|e| RouterError::MalformedResponse {
                method: "getBlockhashForAccounts".to_string(),
                reason: format!("unparseable blockhash: {e}"),
            })?;
        seal(&self.draft, signers, blockhash, Some(self.lease))
    }
}

/// A fully signed transaction, immutable as wire bytes
#[derive(Debug)]
pub struct SignedTransaction {
    transaction: Transaction,
    lease: Option<BlockhashLease>,
}

impl SignedTransaction {
    /// The transaction's primary signature
    pub fn signature(&self) -> Signature {
        self.transaction.signatures[0]
    }

    /// The lease this transaction was signed under (`None` in nonce mode)
    pub fn lease(&self) -> Option<&BlockhashLease> {
        self.lease.as_ref()
    }

    /// Serialize to the wire format accepted by `sendTransaction`
    pub fn wire_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(&self.transaction)
            .map_err(|e| RouterError::Internal(format!("transaction serialization failed: {e}")))
    }

    /// Borrow the underlying SDK transaction
    pub fn transaction(&self) -> &Transaction {
        &self.transaction
    }
}

/// A transaction at the submission boundary, tagged legacy or versioned
///
/// Versioned transactions arrive already signed (their message layout is
/// opaque to this crate); legacy drafts go through the prepare/sign pipeline.
#[derive(Debug)]
pub enum RouterTransaction {
    Legacy(DraftTransaction),
    Versioned(VersionedTransaction),
}

fn seal(
    draft: &DraftTransaction,
    signers: &[&Keypair],
    blockhash: Hash,
    lease: Option<BlockhashLease>,
) -> Result<SignedTransaction> {
    let payer = draft
        .fee_payer
        .or_else(|| signers.first().map(|k| k.pubkey()))
        .ok_or_else(|| {
            RouterError::InvalidArguments("cannot sign without a fee payer or signers".to_string())
        })?;

    let message = Message::new(&draft.instructions, Some(&payer));
    let mut transaction = Transaction::new_unsigned(message);
    transaction.try_sign(&signers.to_vec(), blockhash)?;

    // The signing dependency must have produced every required signature;
    // anything else is a bug there, not a recoverable condition here.
    if transaction.signatures.is_empty()
        || transaction.signatures.iter().any(|s| *s == Signature::default())
    {
        return Err(RouterError::Internal(
            "signature absent after signing".to_string(),
        ));
    }

    Ok(SignedTransaction { transaction, lease })
}
