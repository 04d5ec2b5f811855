//! Error taxonomy for the client engine.
//!
//! Four classes, with different handling:
//!
//! - **Usage errors** (immutable mutation, missing payer, bad chunk config):
//!   synchronous, never retried.
//! - **Precheck errors**: a node decoded the transaction and rejected it;
//!   carried as `{ node, status, transaction_id }`.
//! - **Transport errors**: no decodable response; retryable only for the
//!   unavailable/stream-reset class.
//! - **Decode errors**: malformed wire bytes, always fatal.

use crate::channel::TransportError;
use meridian_proto::{CodecError, OperationKind, Status};
use meridian_types::{AccountId, PublicKey, TransactionId};
use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by transaction construction and execution.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A setter was called after the transaction froze.
    #[error("Transaction is immutable; it has already been frozen")]
    Immutable,

    /// An operation that needs a frozen transaction ran on an open one.
    #[error("Transaction must be frozen first")]
    NotFrozen,

    /// No payer was set and the client has no operator to fall back to.
    #[error("No payer account: set one explicitly or freeze with a client that has an operator")]
    MissingPayerAccount,

    /// No node list was set and no client was supplied to populate one.
    #[error("No candidate nodes: set a node list or freeze with a client")]
    MissingNodeList,

    /// The transaction's node accounts are all absent from the client pool.
    #[error("None of the transaction's node accounts are present in the client's pool")]
    NoEligibleNodes,

    /// The payload needs more chunks than the configured maximum.
    #[error("Message of {message_len} bytes requires {required} chunks but only {max} are allowed")]
    TooManyChunks {
        message_len: usize,
        required: usize,
        max: usize,
    },

    /// Chunk size and chunk count must be positive.
    #[error("Chunk size and chunk count must be positive")]
    InvalidChunkConfig,

    /// A batch inner transaction is not frozen or carries no signature.
    #[error("Inner transaction must be frozen and signed before the batch freezes")]
    InnerNotReady,

    /// A batch or network-freeze transaction was offered as a batch inner.
    #[error("A batch cannot contain a {kind} transaction")]
    InvalidInnerTransaction { kind: OperationKind },

    /// `remove_signature` named a key that never signed.
    #[error("No signature from key {key} to remove")]
    SignatureNotFound { key: PublicKey },

    /// A node returned a non-retryable precheck status.
    #[error("Node {node} returned precheck status {status} for {transaction_id}")]
    Precheck {
        status: Status,
        node: AccountId,
        transaction_id: TransactionId,
    },

    /// The transport failed without a decodable response.
    #[error("Transport failure: {0}")]
    Transport(#[from] TransportError),

    /// Wire bytes failed to encode or decode.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Imported bytes decoded but do not form a consistent cell grid.
    #[error("Imported transaction bytes are inconsistent: {reason}")]
    MalformedImport { reason: String },

    /// Every attempt in the budget failed; the last error is attached.
    #[error("Retry budget of {attempts} attempts exhausted; last error: {last}")]
    RetryBudgetExhausted {
        attempts: usize,
        last: Box<ClientError>,
    },

    /// The caller-supplied total timeout elapsed between attempts.
    #[error("Execution timed out after {elapsed:?}")]
    TimedOut {
        elapsed: Duration,
        /// Last error observed before the deadline, when any attempt ran.
        last: Option<Box<ClientError>>,
    },
}
