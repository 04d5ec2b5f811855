//! Topic message submission, the payload-bearing (chunkable) transaction.

use super::Transaction;
use crate::error::ClientError;
use meridian_proto::{OperationPayload, TopicMessageSubmitPayload};
use meridian_types::TopicId;
use std::ops::{Deref, DerefMut};

/// Submits a message to a topic.
///
/// Messages larger than the configured chunk size split into multiple chunk
/// rows at freeze time, one identifier per row, each row tagged with its
/// position via `chunk_info`. Chunk size, count cap and identifier spacing
/// come from the base transaction's chunk configuration.
#[derive(Debug)]
pub struct TopicMessageSubmitTransaction {
    tx: Transaction,
}

impl TopicMessageSubmitTransaction {
    pub fn new() -> Self {
        Self {
            tx: Transaction::new(OperationPayload::TopicMessageSubmit(
                TopicMessageSubmitPayload {
                    topic_id: TopicId::new(0),
                    message: Vec::new(),
                    chunk_info: None,
                },
            )),
        }
    }

    pub(crate) fn from_transaction(tx: Transaction) -> Self {
        Self { tx }
    }

    /// Set the target topic.
    pub fn set_topic_id(&mut self, topic_id: TopicId) -> Result<&mut Self, ClientError> {
        match self.tx.payload_mut()? {
            OperationPayload::TopicMessageSubmit(p) => p.topic_id = topic_id,
            _ => unreachable!("payload kind is fixed at construction"),
        }
        Ok(self)
    }

    /// Set the full message; chunking happens at freeze time.
    pub fn set_message(&mut self, message: impl Into<Vec<u8>>) -> Result<&mut Self, ClientError> {
        match self.tx.payload_mut()? {
            OperationPayload::TopicMessageSubmit(p) => p.message = message.into(),
            _ => unreachable!("payload kind is fixed at construction"),
        }
        Ok(self)
    }

    /// The full message.
    pub fn message(&self) -> &[u8] {
        match self.tx.payload() {
            OperationPayload::TopicMessageSubmit(p) => &p.message,
            _ => &[],
        }
    }

    /// The target topic.
    pub fn topic_id(&self) -> TopicId {
        match self.tx.payload() {
            OperationPayload::TopicMessageSubmit(p) => p.topic_id,
            _ => TopicId::new(0),
        }
    }
}

impl From<TopicMessageSubmitTransaction> for Transaction {
    fn from(wrapper: TopicMessageSubmitTransaction) -> Self {
        wrapper.tx
    }
}

impl Default for TopicMessageSubmitTransaction {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for TopicMessageSubmitTransaction {
    type Target = Transaction;

    fn deref(&self) -> &Transaction {
        &self.tx
    }
}

impl DerefMut for TopicMessageSubmitTransaction {
    fn deref_mut(&mut self) -> &mut Transaction {
        &mut self.tx
    }
}
