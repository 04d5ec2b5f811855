//! Logical transaction bodies.
//!
//! A body is one (chunk, node) cell of a transaction: bodies sharing an
//! identifier are structurally identical except for `node_account_id`.

use meridian_types::{AccountId, PublicKey, Timestamp, TopicId, TransactionId};
use sbor::prelude::*;

/// The logical body serialized into every signed cell.
#[derive(Debug, Clone, PartialEq, Eq, BasicSbor)]
pub struct TransactionBody {
    /// Identifier of the row this cell belongs to.
    pub transaction_id: TransactionId,
    /// The node this cell targets. The only field that may differ between
    /// cells sharing a `transaction_id`.
    pub node_account_id: AccountId,
    /// Maximum fee the payer will accept, in tinybars.
    pub max_fee: u64,
    /// Validity window length, counted from the identifier's valid-start.
    pub valid_duration_seconds: u64,
    /// Free-form memo carried with the transaction.
    pub memo: String,
    /// When present, the transaction may only reach consensus inside an
    /// atomic batch signed by this key.
    pub batch_key: Option<PublicKey>,
    /// Caps on custom fees the payer will tolerate.
    pub custom_fee_limits: Vec<CustomFeeLimit>,
    /// Exactly one operation.
    pub payload: OperationPayload,
}

/// Cap on a custom fee charged to `account_id`.
#[derive(Debug, Clone, PartialEq, Eq, BasicSbor)]
pub struct CustomFeeLimit {
    pub account_id: AccountId,
    pub max_amount: u64,
}

/// The closed set of operations a body can carry.
#[derive(Debug, Clone, PartialEq, Eq, BasicSbor)]
pub enum OperationPayload {
    Transfer(TransferPayload),
    AccountCreate(AccountCreatePayload),
    TopicCreate(TopicCreatePayload),
    TopicMessageSubmit(TopicMessageSubmitPayload),
    NetworkFreeze(NetworkFreezePayload),
    Batch(BatchPayload),
}

/// Value movements; must net to zero at the node.
#[derive(Debug, Clone, Default, PartialEq, Eq, BasicSbor)]
pub struct TransferPayload {
    pub transfers: Vec<AccountAmount>,
}

/// A single debit (negative) or credit (positive).
#[derive(Debug, Clone, PartialEq, Eq, BasicSbor)]
pub struct AccountAmount {
    pub account_id: AccountId,
    pub amount: i64,
}

/// Create a new account controlled by `key`.
#[derive(Debug, Clone, Default, PartialEq, Eq, BasicSbor)]
pub struct AccountCreatePayload {
    pub key: Option<PublicKey>,
    pub initial_balance: u64,
    pub account_memo: String,
}

/// Create a message topic.
#[derive(Debug, Clone, Default, PartialEq, Eq, BasicSbor)]
pub struct TopicCreatePayload {
    pub admin_key: Option<PublicKey>,
    pub topic_memo: String,
}

/// Submit one chunk of a message to a topic.
///
/// Oversized messages are split into chunks, one body per chunk row;
/// `chunk_info` ties the rows together under the first row's identifier.
#[derive(Debug, Clone, PartialEq, Eq, BasicSbor)]
pub struct TopicMessageSubmitPayload {
    pub topic_id: TopicId,
    pub message: Vec<u8>,
    pub chunk_info: Option<ChunkInfo>,
}

/// Position of a chunk within its message.
#[derive(Debug, Clone, PartialEq, Eq, BasicSbor)]
pub struct ChunkInfo {
    /// Identifier of the first chunk row.
    pub initial_transaction_id: TransactionId,
    /// Total number of chunks.
    pub total: u32,
    /// 1-based index of this chunk.
    pub number: u32,
}

/// Administrative network freeze. Never valid inside a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, BasicSbor)]
pub struct NetworkFreezePayload {
    pub start_time: Option<Timestamp>,
}

/// An atomic batch: already-signed inner transactions, in submission order.
#[derive(Debug, Clone, Default, PartialEq, Eq, BasicSbor)]
pub struct BatchPayload {
    /// Each entry is an encoded [`SignedTransaction`](crate::SignedTransaction).
    pub signed_transactions: Vec<Vec<u8>>,
}
