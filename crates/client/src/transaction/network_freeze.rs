//! Administrative network freeze transaction.

use super::Transaction;
use crate::error::ClientError;
use meridian_proto::{NetworkFreezePayload, OperationPayload};
use meridian_types::Timestamp;
use std::ops::{Deref, DerefMut};

/// Schedules a network-wide freeze. Administrative: never valid inside a
/// batch.
#[derive(Debug)]
pub struct NetworkFreezeTransaction {
    tx: Transaction,
}

impl NetworkFreezeTransaction {
    pub fn new() -> Self {
        Self {
            tx: Transaction::new(OperationPayload::NetworkFreeze(
                NetworkFreezePayload::default(),
            )),
        }
    }

    pub(crate) fn from_transaction(tx: Transaction) -> Self {
        Self { tx }
    }

    /// Set when the freeze takes effect.
    pub fn set_start_time(&mut self, start_time: Timestamp) -> Result<&mut Self, ClientError> {
        match self.tx.payload_mut()? {
            OperationPayload::NetworkFreeze(p) => p.start_time = Some(start_time),
            _ => unreachable!("payload kind is fixed at construction"),
        }
        Ok(self)
    }
}

impl From<NetworkFreezeTransaction> for Transaction {
    fn from(wrapper: NetworkFreezeTransaction) -> Self {
        wrapper.tx
    }
}

impl Default for NetworkFreezeTransaction {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for NetworkFreezeTransaction {
    type Target = Transaction;

    fn deref(&self) -> &Transaction {
        &self.tx
    }
}

impl DerefMut for NetworkFreezeTransaction {
    fn deref_mut(&mut self) -> &mut Transaction {
        &mut self.tx
    }
}
