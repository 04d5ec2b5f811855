//! Operation kind registry.
//!
//! Kind resolution is a static match over the payload enum, populated
//! deterministically at compile time. There is no mutable global registry.

use crate::OperationPayload;
use std::fmt;

/// Discriminant of the payload oneof, used for dispatch and routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Transfer,
    AccountCreate,
    TopicCreate,
    TopicMessageSubmit,
    NetworkFreeze,
    Batch,
}

impl OperationKind {
    /// The kind of a payload.
    pub fn of(payload: &OperationPayload) -> Self {
        match payload {
            OperationPayload::Transfer(_) => OperationKind::Transfer,
            OperationPayload::AccountCreate(_) => OperationKind::AccountCreate,
            OperationPayload::TopicCreate(_) => OperationKind::TopicCreate,
            OperationPayload::TopicMessageSubmit(_) => OperationKind::TopicMessageSubmit,
            OperationPayload::NetworkFreeze(_) => OperationKind::NetworkFreeze,
            OperationPayload::Batch(_) => OperationKind::Batch,
        }
    }

    /// Whether payloads of this kind may be split across chunk rows.
    pub fn is_chunkable(&self) -> bool {
        matches!(self, OperationKind::TopicMessageSubmit)
    }

    /// RPC service handling this kind.
    pub fn service_name(&self) -> &'static str {
        match self {
            OperationKind::Transfer | OperationKind::AccountCreate => "CryptoService",
            OperationKind::TopicCreate | OperationKind::TopicMessageSubmit => "TopicService",
            OperationKind::NetworkFreeze => "FreezeService",
            OperationKind::Batch => "UtilService",
        }
    }

    /// RPC method handling this kind.
    pub fn method_name(&self) -> &'static str {
        match self {
            OperationKind::Transfer => "cryptoTransfer",
            OperationKind::AccountCreate => "createAccount",
            OperationKind::TopicCreate => "createTopic",
            OperationKind::TopicMessageSubmit => "submitMessage",
            OperationKind::NetworkFreeze => "freeze",
            OperationKind::Batch => "atomicBatch",
        }
    }

    /// String representation for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Transfer => "transfer",
            OperationKind::AccountCreate => "account_create",
            OperationKind::TopicCreate => "topic_create",
            OperationKind::TopicMessageSubmit => "topic_message_submit",
            OperationKind::NetworkFreeze => "network_freeze",
            OperationKind::Batch => "batch",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
