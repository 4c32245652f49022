//! Sender flows against a mock router endpoint
//!
//! Exercises the lease → sign → submit cycle end to end: happy path, the
//! bounded stale-lease retry giving up, and the nonce path skipping the lease
//! fetch entirely.

use magic_router::{
    send_router_transaction, DraftTransaction, NonceInfo, RouterClient, RouterTransaction,
    SendOptions,
};
use mockito::Matcher;
use serde_json::json;
use solana_sdk::hash::Hash;
use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature, Signer};

fn rpc_result(result: serde_json::Value) -> String {
    json!({ "jsonrpc": "2.0", "id": 1, "result": result }).to_string()
}

fn transfer_draft(payer: &Keypair) -> DraftTransaction {
    DraftTransaction::new(vec![Instruction {
        program_id: solana_sdk::system_program::id(),
        accounts: vec![
            AccountMeta::new(payer.pubkey(), true),
            AccountMeta::new(Pubkey::new_unique(), false),
        ],
        data: vec![2, 0, 0, 0],
    }])
}

fn blockhash_mock(server: &mut mockito::Server) -> mockito::Mock {
    server
        .mock("POST", "/")
        .match_body(Matcher::Regex("getBlockhashForAccounts".to_string()))
        .with_body(rpc_result(json!({
            "blockhash": Hash::new_unique().to_string(),
            "lastValidBlockHeight": 500,
        })))
}

#[tokio::test]
async fn sends_legacy_transaction_with_scoped_lease() {
    let mut server = mockito::Server::new_async().await;
    let payer = Keypair::new();
    let signature = Signature::from([4u8; 64]);

    let lease_mock = blockhash_mock(&mut server).expect(1).create_async().await;
    let send_mock = server
        .mock("POST", "/")
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex("sendTransaction".to_string()),
            Matcher::Regex("skipPreflight".to_string()),
        ]))
        .with_body(rpc_result(json!(signature.to_string())))
        .expect(1)
        .create_async()
        .await;

    let client = RouterClient::new(server.url());
    let returned = send_router_transaction(
        &client,
        RouterTransaction::Legacy(transfer_draft(&payer)),
        &[&payer],
        SendOptions::default(),
    )
    .await
    .unwrap();

    assert_eq!(returned, signature);
    lease_mock.assert_async().await;
    send_mock.assert_async().await;
}

#[tokio::test]
async fn stale_lease_retry_is_bounded() {
    let mut server = mockito::Server::new_async().await;
    let payer = Keypair::new();

    // Every lease the router hands out is already expired by submit time
    let lease_mock = blockhash_mock(&mut server).expect(3).create_async().await;
    let send_mock = server
        .mock("POST", "/")
        .match_body(Matcher::Regex("sendTransaction".to_string()))
        .with_body(
            json!({
                "jsonrpc": "2.0",
                "id": 1,
                "error": { "code": -32002, "message": "Blockhash not found" }
            })
            .to_string(),
        )
        .expect(3)
        .create_async()
        .await;

    let client = RouterClient::new(server.url());
    let err = send_router_transaction(
        &client,
        RouterTransaction::Legacy(transfer_draft(&payer)),
        &[&payer],
        SendOptions {
            skip_preflight: true,
            max_blockhash_retries: 3,
        },
    )
    .await
    .unwrap_err();

    assert!(err.is_stale_blockhash());
    lease_mock.assert_async().await;
    send_mock.assert_async().await;
}

#[tokio::test]
async fn nonce_transaction_skips_the_lease_fetch() {
    let mut server = mockito::Server::new_async().await;
    let payer = Keypair::new();
    let signature = Signature::from([13u8; 64]);

    let lease_mock = blockhash_mock(&mut server).expect(0).create_async().await;
    let send_mock = server
        .mock("POST", "/")
        .match_body(Matcher::Regex("sendTransaction".to_string()))
        .with_body(rpc_result(json!(signature.to_string())))
        .expect(1)
        .create_async()
        .await;

    let draft = transfer_draft(&payer).with_nonce_info(NonceInfo {
        nonce: Hash::new_unique(),
    });

    let client = RouterClient::new(server.url());
    let returned = send_router_transaction(
        &client,
        RouterTransaction::Legacy(draft),
        &[&payer],
        SendOptions::default(),
    )
    .await
    .unwrap();

    assert_eq!(returned, signature);
    lease_mock.assert_async().await;
    send_mock.assert_async().await;
}

#[tokio::test]
async fn non_blockhash_rejection_is_not_retried() {
    let mut server = mockito::Server::new_async().await;
    let payer = Keypair::new();

    let lease_mock = blockhash_mock(&mut server).expect(1).create_async().await;
    let send_mock = server
        .mock("POST", "/")
        .match_body(Matcher::Regex("sendTransaction".to_string()))
        .with_body(
            json!({
                "jsonrpc": "2.0",
                "id": 1,
                "error": { "code": -32003, "message": "Transaction signature verification failure" }
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let client = RouterClient::new(server.url());
    let err = send_router_transaction(
        &client,
        RouterTransaction::Legacy(transfer_draft(&payer)),
        &[&payer],
        SendOptions::default(),
    )
    .await
    .unwrap_err();

    assert!(!err.is_stale_blockhash());
    lease_mock.assert_async().await;
    send_mock.assert_async().await;
}
