//! Node precheck responses.

use sbor::prelude::*;
use std::fmt;

/// A node's immediate synchronous verdict on a submitted transaction.
///
/// This is the precheck outcome only; consensus-level results arrive through
/// receipts and records, which are outside the submission path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, BasicSbor)]
pub enum Status {
    /// The node accepted the transaction for consensus.
    Ok,
    /// The node is overloaded; try another node.
    Busy,
    /// The node could not classify the failure.
    Unknown,
    /// The platform accepted the connection but failed to create the
    /// transaction record.
    PlatformTransactionNotCreated,
    /// The platform is not active on this node.
    PlatformNotActive,
    /// The identifier's validity window has passed.
    TransactionExpired,
    /// An identical identifier has already been submitted.
    DuplicateTransaction,
    /// The declared max fee is below the required fee.
    InsufficientTransactionFee,
    /// The payer cannot cover the fee.
    InsufficientPayerBalance,
    /// A required signature is missing or invalid.
    InvalidSignature,
    /// The body could not be parsed.
    InvalidTransactionBody,
    /// The payer account does not exist.
    PayerAccountNotFound,
    /// The targeted topic does not exist.
    InvalidTopicId,
    /// The memo exceeds the permitted length.
    MemoTooLong,
    /// An inner transaction of a batch is not allowed there.
    InnerTransactionNotAllowed,
}

impl Status {
    /// String representation for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::Busy => "BUSY",
            Status::Unknown => "UNKNOWN",
            Status::PlatformTransactionNotCreated => "PLATFORM_TRANSACTION_NOT_CREATED",
            Status::PlatformNotActive => "PLATFORM_NOT_ACTIVE",
            Status::TransactionExpired => "TRANSACTION_EXPIRED",
            Status::DuplicateTransaction => "DUPLICATE_TRANSACTION",
            Status::InsufficientTransactionFee => "INSUFFICIENT_TX_FEE",
            Status::InsufficientPayerBalance => "INSUFFICIENT_PAYER_BALANCE",
            Status::InvalidSignature => "INVALID_SIGNATURE",
            Status::InvalidTransactionBody => "INVALID_TRANSACTION_BODY",
            Status::PayerAccountNotFound => "PAYER_ACCOUNT_NOT_FOUND",
            Status::InvalidTopicId => "INVALID_TOPIC_ID",
            Status::MemoTooLong => "MEMO_TOO_LONG",
            Status::InnerTransactionNotAllowed => "INNER_TRANSACTION_NOT_ALLOWED",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wire message carrying the precheck verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, BasicSbor)]
pub struct PrecheckResponse {
    pub status: Status,
    /// Required fee estimate, populated on fee-related rejections.
    pub cost: u64,
}

impl PrecheckResponse {
    /// Response with no cost estimate.
    pub fn of(status: Status) -> Self {
        Self { status, cost: 0 }
    }
}
