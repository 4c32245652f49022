//! Writable-account resolution
//!
//! The router scopes blockhash leases to the exact set of accounts a
//! transaction will mutate, so deriving that set correctly is load-bearing:
//! any drift between the set used for the lease fetch and the set actually
//! touched at signing invalidates the lease.
//!
//! Two equivalent computations exist, depending on which representation is at
//! hand: per-instruction account flags (pre-compile), or the compiled message
//! layout with readonly counts in the header. Both must agree on the same
//! logical transaction; `tests/accounts_equivalence_test.rs` pins that
//! property.

use solana_sdk::instruction::Instruction;
use solana_sdk::message::Message;
use solana_sdk::pubkey::Pubkey;

/// Writable accounts from per-instruction flags, insertion-order unique
///
/// The fee payer, when present, is always first: fee payers always pay and
/// therefore always write. Every other account is included iff at least one
/// instruction flags it writable (union semantics, duplicates collapse).
pub fn writable_accounts(fee_payer: Option<&Pubkey>, instructions: &[Instruction]) -> Vec<Pubkey> {
    let mut writable = Vec::new();

    if let Some(payer) = fee_payer {
        writable.push(*payer);
    }

    for instruction in instructions {
        for meta in &instruction.accounts {
            if meta.is_writable && !writable.contains(&meta.pubkey) {
                writable.push(meta.pubkey);
            }
        }
    }

    writable
}

/// Writable accounts from a compiled message's account layout
///
/// Compiled messages lay accounts out as `[signers][unsigned]`. Within the
/// signers, the last `num_readonly_signed_accounts` are readonly; within the
/// unsigned tail, the last `num_readonly_unsigned_accounts` are readonly.
/// Everything else is writable.
pub fn writable_accounts_from_message(message: &Message) -> Vec<Pubkey> {
    let header = &message.header;
    let keys = &message.account_keys;
    let num_signed = header.num_required_signatures as usize;
    let num_readonly_signed = header.num_readonly_signed_accounts as usize;
    let num_readonly_unsigned = header.num_readonly_unsigned_accounts as usize;

    keys.iter()
        .enumerate()
        .filter(|(index, _)| {
            if *index < num_signed {
                *index < num_signed.saturating_sub(num_readonly_signed)
            } else {
                *index < keys.len().saturating_sub(num_readonly_unsigned)
            }
        })
        .map(|(_, key)| *key)
        .collect()
}
