//! Execution scenarios: retry, rotation, expiry regeneration, budgets.

use meridian_client::{
    Client, ClientError, ExecuteConfig, TopicMessageSubmitTransaction, TransactionResponse,
    TransportError, TransferTransaction,
};
use meridian_proto::{decode_body, decode_signed_transactions, OperationPayload, Status};
use meridian_test_helpers::{
    fast_node_backoff, seeded_keypair, test_client, test_endpoints, MockChannel, ScriptedReply,
    OPERATOR_ACCOUNT,
};
use meridian_types::{AccountId, TopicId, TransactionId};
use std::sync::Arc;
use std::time::Duration;

fn transfer() -> TransferTransaction {
    let mut tx = TransferTransaction::new();
    tx.add_transfer(OPERATOR_ACCOUNT, -10).unwrap();
    tx.add_transfer(AccountId::new(1001), 10).unwrap();
    tx
}

fn body_of(request: &[u8]) -> meridian_proto::TransactionBody {
    let cells = decode_signed_transactions(request).unwrap();
    assert_eq!(cells.len(), 1, "transmission carries exactly one cell");
    decode_body(&cells[0].body_bytes).unwrap()
}

#[tokio::test]
async fn single_attempt_success_returns_handle() {
    let channel = Arc::new(MockChannel::with_script([ScriptedReply::Respond(
        Status::Ok,
    )]));
    let client = test_client(channel.clone(), 3);

    let mut tx = transfer();
    let response: TransactionResponse = tx.execute(&client).await.unwrap();

    let invocations = channel.invocations();
    assert_eq!(invocations.len(), 1);
    assert_eq!(invocations[0].service, "CryptoService");
    assert_eq!(invocations[0].method, "cryptoTransfer");

    let body = body_of(&invocations[0].request);
    assert_eq!(response.transaction_id, body.transaction_id);
    assert_eq!(response.node_account_id, body.node_account_id);
    assert_eq!(
        *response.transaction_hash.as_bytes(),
        *meridian_types::Hash::from_bytes(&invocations[0].request).as_bytes()
    );
}

#[tokio::test]
async fn operator_signs_automatically() {
    let channel = Arc::new(MockChannel::with_script([ScriptedReply::Respond(
        Status::Ok,
    )]));
    let client = test_client(channel.clone(), 1);

    let mut tx = transfer();
    tx.execute(&client).await.unwrap();

    let request = &channel.invocations()[0].request;
    let cell = decode_signed_transactions(request).unwrap().remove(0);
    let operator_key = seeded_keypair(1).public_key();
    assert!(cell.signature_map.contains(&operator_key));

    let pair = &cell.signature_map.pairs[0];
    assert!(operator_key.verify(&cell.body_bytes, &pair.signature));
}

#[tokio::test]
async fn busy_node_rotates_to_next() {
    let channel = Arc::new(MockChannel::with_script([
        ScriptedReply::Respond(Status::Busy),
        ScriptedReply::Respond(Status::Ok),
    ]));
    let client = test_client(channel.clone(), 3);

    let mut tx = transfer();
    tx.execute(&client).await.unwrap();

    let invocations = channel.invocations();
    assert_eq!(invocations.len(), 2);
    assert_ne!(invocations[0].address, invocations[1].address);

    // Same identifier on both attempts; only the target node differs.
    let first = body_of(&invocations[0].request);
    let second = body_of(&invocations[1].request);
    assert_eq!(first.transaction_id, second.transaction_id);
    assert_ne!(first.node_account_id, second.node_account_id);
}

#[tokio::test]
async fn failing_nodes_each_tried_once_before_success() {
    let channel = Arc::new(MockChannel::with_script([
        ScriptedReply::Fail(TransportError::Unavailable("connection refused".into())),
        ScriptedReply::Fail(TransportError::StreamReset("rst".into())),
        ScriptedReply::Respond(Status::Ok),
    ]));
    let client = test_client(channel.clone(), 3);

    let mut tx = transfer();
    tx.execute(&client).await.unwrap();

    let addresses: Vec<String> = channel
        .invocations()
        .iter()
        .map(|i| i.address.clone())
        .collect();
    assert_eq!(addresses.len(), 3);
    // A and B each tried at most once before C succeeded.
    let mut unique = addresses.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), 3);
}

#[tokio::test]
async fn expired_identifier_regenerates_and_succeeds() {
    let channel = Arc::new(MockChannel::with_script([
        ScriptedReply::Respond(Status::TransactionExpired),
        ScriptedReply::Respond(Status::Ok),
    ]));
    let client = test_client(channel.clone(), 1);

    let mut tx = transfer();
    let response = tx.execute(&client).await.unwrap();

    let invocations = channel.invocations();
    assert_eq!(invocations.len(), 2);

    let first = body_of(&invocations[0].request);
    let second = body_of(&invocations[1].request);
    assert!(
        second.transaction_id.valid_start > first.transaction_id.valid_start,
        "regenerated identifier must be strictly newer"
    );
    assert_eq!(response.transaction_id, second.transaction_id);
}

#[tokio::test]
async fn expired_identifier_is_fatal_when_pinned() {
    let channel = Arc::new(MockChannel::with_script([ScriptedReply::Respond(
        Status::TransactionExpired,
    )]));
    let client = test_client(channel.clone(), 1);

    let mut tx = transfer();
    tx.set_transaction_id(TransactionId::generate(OPERATOR_ACCOUNT))
        .unwrap();

    match tx.execute(&client).await {
        Err(ClientError::Precheck { status, .. }) => {
            assert_eq!(status, Status::TransactionExpired);
        }
        other => panic!("expected fatal precheck, got {:?}", other),
    }
    assert_eq!(channel.invocation_count(), 1);
}

#[tokio::test]
async fn expired_identifier_is_fatal_when_regeneration_disabled() {
    let channel = Arc::new(MockChannel::with_script([ScriptedReply::Respond(
        Status::TransactionExpired,
    )]));
    let client = test_client(channel.clone(), 1);

    let mut tx = transfer();
    tx.set_regenerate_transaction_ids(false).unwrap();

    assert!(matches!(
        tx.execute(&client).await,
        Err(ClientError::Precheck {
            status: Status::TransactionExpired,
            ..
        })
    ));
}

#[tokio::test]
async fn fatal_precheck_does_not_retry() {
    let channel = Arc::new(MockChannel::with_script([ScriptedReply::Respond(
        Status::InvalidSignature,
    )]));
    let client = test_client(channel.clone(), 3);

    let mut tx = transfer();
    match tx.execute(&client).await {
        Err(ClientError::Precheck { status, node, .. }) => {
            assert_eq!(status, Status::InvalidSignature);
            assert_eq!(node, AccountId::new(3));
        }
        other => panic!("expected precheck error, got {:?}", other),
    }
    assert_eq!(channel.invocation_count(), 1);
}

#[tokio::test]
async fn non_retryable_transport_failure_is_fatal() {
    let channel = Arc::new(MockChannel::with_script([ScriptedReply::Fail(
        TransportError::Other("tls handshake".into()),
    )]));
    let client = test_client(channel.clone(), 3);

    let mut tx = transfer();
    assert!(matches!(
        tx.execute(&client).await,
        Err(ClientError::Transport(TransportError::Other(_)))
    ));
    assert_eq!(channel.invocation_count(), 1);
}

#[tokio::test]
async fn retry_budget_exhaustion_surfaces_last_error() {
    let channel = Arc::new(MockChannel::with_script([
        ScriptedReply::Respond(Status::Busy),
        ScriptedReply::Respond(Status::Busy),
    ]));
    let client = test_client(channel.clone(), 2).with_execute_config(ExecuteConfig {
        max_attempts: 2,
        min_backoff: Duration::from_millis(1),
        max_backoff: Duration::from_millis(2),
        total_timeout: None,
    });

    let mut tx = transfer();
    match tx.execute(&client).await {
        Err(ClientError::RetryBudgetExhausted { attempts, last }) => {
            assert_eq!(attempts, 2);
            assert!(matches!(
                *last,
                ClientError::Precheck {
                    status: Status::Busy,
                    ..
                }
            ));
        }
        other => panic!("expected exhausted budget, got {:?}", other),
    }
}

#[tokio::test]
async fn single_excluded_node_is_readmitted_after_backoff() {
    let channel = Arc::new(MockChannel::with_script([
        ScriptedReply::Respond(Status::Busy),
        ScriptedReply::Respond(Status::Ok),
    ]));
    let client = test_client(channel.clone(), 1);

    let mut tx = transfer();
    tx.execute(&client).await.unwrap();
    assert_eq!(channel.invocation_count(), 2);
}

#[tokio::test]
async fn total_timeout_stops_scheduling_attempts() {
    let channel = Arc::new(MockChannel::with_script([ScriptedReply::Respond(
        Status::Busy,
    )]));
    let client = Client::new(test_endpoints(1), channel.clone())
        .with_operator(OPERATOR_ACCOUNT, Arc::new(seeded_keypair(1)))
        .with_node_backoff(fast_node_backoff())
        .with_execute_config(ExecuteConfig {
            max_attempts: 10,
            min_backoff: Duration::from_millis(60),
            max_backoff: Duration::from_millis(60),
            total_timeout: None,
        });

    let mut tx = transfer();
    match tx.execute_with_timeout(&client, Duration::from_millis(20)).await {
        Err(ClientError::TimedOut { last, .. }) => {
            let last = last.expect("one attempt ran before the deadline");
            assert!(matches!(
                *last,
                ClientError::Precheck {
                    status: Status::Busy,
                    ..
                }
            ));
        }
        other => panic!("expected timeout, got {:?}", other),
    }
    assert_eq!(channel.invocation_count(), 1);
}

#[tokio::test]
async fn multi_chunk_execution_advances_the_cursor() {
    let channel = Arc::new(MockChannel::with_script([
        ScriptedReply::Respond(Status::Ok),
        ScriptedReply::Respond(Status::Ok),
    ]));
    let client = test_client(channel.clone(), 1);

    let mut tx = TopicMessageSubmitTransaction::new();
    tx.set_topic_id(TopicId::new(9)).unwrap();
    tx.set_message(vec![7u8; 8]).unwrap();
    tx.set_chunk_size(4).unwrap();

    let first = tx.execute(&client).await.unwrap();
    let second = tx.execute(&client).await.unwrap();
    assert_ne!(first.transaction_id, second.transaction_id);

    let invocations = channel.invocations();
    assert_eq!(invocations.len(), 2);
    for (index, invocation) in invocations.iter().enumerate() {
        let body = body_of(&invocation.request);
        match body.payload {
            OperationPayload::TopicMessageSubmit(p) => {
                let info = p.chunk_info.expect("chunk info present");
                assert_eq!(info.number, index as u32 + 1);
                assert_eq!(info.total, 2);
            }
            other => panic!("expected topic submit payload, got {:?}", other),
        }
    }
}

#[tokio::test]
async fn batch_executes_after_composition() {
    let channel = Arc::new(MockChannel::with_script([ScriptedReply::Respond(
        Status::Ok,
    )]));
    let client = test_client(channel.clone(), 1);

    let mut inner = transfer();
    inner.set_payer_account_id(OPERATOR_ACCOUNT).unwrap();
    inner.set_node_account_ids(vec![AccountId::new(3)]).unwrap();
    inner.sign(seeded_keypair(7)).await.unwrap();
    inner.freeze().await.unwrap();

    let mut batch = meridian_client::BatchTransaction::new();
    batch.add_inner(inner).unwrap();
    batch.execute(&client).await.unwrap();

    let invocations = channel.invocations();
    assert_eq!(invocations.len(), 1);
    assert_eq!(invocations[0].service, "UtilService");
    assert_eq!(invocations[0].method, "atomicBatch");
}
