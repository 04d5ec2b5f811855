//! Value transfer transaction.

use super::Transaction;
use crate::error::ClientError;
use meridian_proto::{AccountAmount, OperationPayload, TransferPayload};
use meridian_types::AccountId;
use std::ops::{Deref, DerefMut};

/// Moves value between accounts. The movements must net to zero; the node
/// enforces that at precheck.
#[derive(Debug)]
pub struct TransferTransaction {
    tx: Transaction,
}

impl TransferTransaction {
    /// Empty transfer.
    pub fn new() -> Self {
        Self {
            tx: Transaction::new(OperationPayload::Transfer(TransferPayload::default())),
        }
    }

    pub(crate) fn from_transaction(tx: Transaction) -> Self {
        Self { tx }
    }

    /// Add a movement: negative `amount` debits, positive credits.
    pub fn add_transfer(
        &mut self,
        account_id: AccountId,
        amount: i64,
    ) -> Result<&mut Self, ClientError> {
        match self.tx.payload_mut()? {
            OperationPayload::Transfer(p) => p.transfers.push(AccountAmount { account_id, amount }),
            _ => unreachable!("payload kind is fixed at construction"),
        }
        Ok(self)
    }

    /// The movements added so far.
    pub fn transfers(&self) -> &[AccountAmount] {
        match self.tx.payload() {
            OperationPayload::Transfer(p) => &p.transfers,
            _ => &[],
        }
    }
}

impl From<TransferTransaction> for Transaction {
    fn from(wrapper: TransferTransaction) -> Self {
        wrapper.tx
    }
}

impl Default for TransferTransaction {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for TransferTransaction {
    type Target = Transaction;

    fn deref(&self) -> &Transaction {
        &self.tx
    }
}

impl DerefMut for TransferTransaction {
    fn deref_mut(&mut self) -> &mut Transaction {
        &mut self.tx
    }
}
