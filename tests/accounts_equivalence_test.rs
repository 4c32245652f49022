//! Writable-account resolver properties
//!
//! Pins the resolver contract: the per-instruction-flag computation and the
//! compiled-layout computation agree on every logical transaction, and
//! preparation never changes the writable set.

use magic_router::{writable_accounts, writable_accounts_from_message};
use proptest::prelude::*;
use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::message::Message;
use solana_sdk::pubkey::Pubkey;
use std::collections::BTreeSet;

#[test]
fn writable_set_example_scenario() {
    // Instructions (A writable), (B readonly), fee payer A: exactly ["A"]
    let a = Pubkey::new_unique();
    let b = Pubkey::new_unique();
    let program = Pubkey::new_unique();
    let instructions = vec![Instruction {
        program_id: program,
        accounts: vec![AccountMeta::new(a, true), AccountMeta::new_readonly(b, false)],
        data: vec![],
    }];

    assert_eq!(writable_accounts(Some(&a), &instructions), vec![a]);
}

#[test]
fn compiled_and_flag_views_agree_on_a_concrete_transaction() {
    let payer = Pubkey::new_unique();
    let writable = Pubkey::new_unique();
    let readonly = Pubkey::new_unique();
    let program = Pubkey::new_unique();
    let instructions = vec![Instruction {
        program_id: program,
        accounts: vec![
            AccountMeta::new(writable, false),
            AccountMeta::new_readonly(readonly, true),
        ],
        data: vec![1, 2, 3],
    }];

    let from_flags: BTreeSet<Pubkey> = writable_accounts(Some(&payer), &instructions)
        .into_iter()
        .collect();
    let message = Message::new(&instructions, Some(&payer));
    let from_layout: BTreeSet<Pubkey> = writable_accounts_from_message(&message)
        .into_iter()
        .collect();

    assert_eq!(from_flags, from_layout);
    assert!(from_flags.contains(&payer));
    assert!(from_flags.contains(&writable));
    assert!(!from_flags.contains(&readonly));
    assert!(!from_flags.contains(&program));
}

#[test]
fn preparation_does_not_change_the_writable_set() {
    use magic_router::{BlockhashLease, DraftTransaction, PreparedTransaction};

    let payer = Pubkey::new_unique();
    let dest = Pubkey::new_unique();
    let draft = DraftTransaction::new(vec![Instruction {
        program_id: solana_sdk::system_program::id(),
        accounts: vec![AccountMeta::new(payer, true), AccountMeta::new(dest, false)],
        data: vec![],
    }])
    .with_fee_payer(payer);

    let before = draft.writable_accounts();
    let prepared = PreparedTransaction::new(
        draft,
        BlockhashLease {
            blockhash: solana_sdk::hash::Hash::new_unique().to_string(),
            last_valid_block_height: 7,
        },
    );
    assert_eq!(prepared.writable_accounts(), before.as_slice());

    let after = prepared.into_draft().writable_accounts();
    assert_eq!(after, before);
}

/// One randomly shaped instruction: program index into the key pool plus
/// (account index, is_signer, is_writable) triples
type IxShape = (usize, Vec<(usize, bool, bool)>);

fn instruction_shapes() -> impl Strategy<Value = Vec<IxShape>> {
    prop::collection::vec(
        (
            0usize..8,
            prop::collection::vec((0usize..8, any::<bool>(), any::<bool>()), 1..6),
        ),
        1..5,
    )
}

proptest! {
    #[test]
    fn flag_and_layout_computations_always_agree(shapes in instruction_shapes()) {
        let pool: Vec<Pubkey> = (0..8).map(|_| Pubkey::new_unique()).collect();
        let payer = pool[0];

        let instructions: Vec<Instruction> = shapes
            .iter()
            .map(|(program, accounts)| Instruction {
                program_id: pool[*program],
                accounts: accounts
                    .iter()
                    .map(|(index, is_signer, is_writable)| AccountMeta {
                        pubkey: pool[*index],
                        is_signer: *is_signer,
                        is_writable: *is_writable,
                    })
                    .collect(),
                data: vec![],
            })
            .collect();

        let from_flags: BTreeSet<Pubkey> = writable_accounts(Some(&payer), &instructions)
            .into_iter()
            .collect();
        let message = Message::new(&instructions, Some(&payer));
        let from_layout: BTreeSet<Pubkey> = writable_accounts_from_message(&message)
            .into_iter()
            .collect();

        prop_assert_eq!(from_flags, from_layout);
    }

    #[test]
    fn fee_payer_is_always_in_the_writable_set(shapes in instruction_shapes()) {
        let pool: Vec<Pubkey> = (0..8).map(|_| Pubkey::new_unique()).collect();
        let payer = pool[0];

        let instructions: Vec<Instruction> = shapes
            .iter()
            .map(|(program, accounts)| Instruction {
                program_id: pool[*program],
                accounts: accounts
                    .iter()
                    .map(|(index, is_signer, is_writable)| AccountMeta {
                        pubkey: pool[*index],
                        is_signer: *is_signer,
                        is_writable: *is_writable,
                    })
                    .collect(),
                data: vec![],
            })
            .collect();

        let writable = writable_accounts(Some(&payer), &instructions);
        prop_assert_eq!(writable[0], payer);

        // insertion-order unique: no duplicates anywhere
        let unique: BTreeSet<&Pubkey> = writable.iter().collect();
        prop_assert_eq!(unique.len(), writable.len());
    }
}
