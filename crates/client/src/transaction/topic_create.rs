//! Topic creation transaction.

use super::Transaction;
use crate::error::ClientError;
use meridian_proto::{OperationPayload, TopicCreatePayload};
use meridian_types::PublicKey;
use std::ops::{Deref, DerefMut};

/// Creates a message topic.
#[derive(Debug)]
pub struct TopicCreateTransaction {
    tx: Transaction,
}

impl TopicCreateTransaction {
    pub fn new() -> Self {
        Self {
            tx: Transaction::new(OperationPayload::TopicCreate(TopicCreatePayload::default())),
        }
    }

    pub(crate) fn from_transaction(tx: Transaction) -> Self {
        Self { tx }
    }

    /// Set the key allowed to update or delete the topic.
    pub fn set_admin_key(&mut self, key: PublicKey) -> Result<&mut Self, ClientError> {
        match self.tx.payload_mut()? {
            OperationPayload::TopicCreate(p) => p.admin_key = Some(key),
            _ => unreachable!("payload kind is fixed at construction"),
        }
        Ok(self)
    }

    /// Set the memo stored on the topic.
    pub fn set_topic_memo(&mut self, memo: impl Into<String>) -> Result<&mut Self, ClientError> {
        match self.tx.payload_mut()? {
            OperationPayload::TopicCreate(p) => p.topic_memo = memo.into(),
            _ => unreachable!("payload kind is fixed at construction"),
        }
        Ok(self)
    }
}

impl From<TopicCreateTransaction> for Transaction {
    fn from(wrapper: TopicCreateTransaction) -> Self {
        wrapper.tx
    }
}

impl Default for TopicCreateTransaction {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for TopicCreateTransaction {
    type Target = Transaction;

    fn deref(&self) -> &Transaction {
        &self.tx
    }
}

impl DerefMut for TopicCreateTransaction {
    fn deref_mut(&mut self) -> &mut Transaction {
        &mut self.tx
    }
}
