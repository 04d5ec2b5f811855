//! Generic "from bytes" entry point.

use super::{
    AccountCreateTransaction, BatchTransaction, NetworkFreezeTransaction, TopicCreateTransaction,
    TopicMessageSubmitTransaction, Transaction, TransferTransaction,
};
use crate::error::ClientError;
use meridian_proto::OperationKind;

/// A transaction of any kind, reconstructed from exported bytes.
///
/// Dispatch is the payload enum's static match; there is no runtime
/// registry to populate.
#[derive(Debug)]
pub enum AnyTransaction {
    Transfer(TransferTransaction),
    AccountCreate(AccountCreateTransaction),
    TopicCreate(TopicCreateTransaction),
    TopicMessageSubmit(TopicMessageSubmitTransaction),
    NetworkFreeze(NetworkFreezeTransaction),
    Batch(BatchTransaction),
}

impl AnyTransaction {
    /// Rebuild a frozen transaction from bytes produced by
    /// [`Transaction::to_bytes`], dispatching to the concrete type.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ClientError> {
        let tx = Transaction::from_encoded_cells(bytes)?;
        Ok(match tx.operation_kind() {
            OperationKind::Transfer => {
                AnyTransaction::Transfer(TransferTransaction::from_transaction(tx))
            }
            OperationKind::AccountCreate => {
                AnyTransaction::AccountCreate(AccountCreateTransaction::from_transaction(tx))
            }
            OperationKind::TopicCreate => {
                AnyTransaction::TopicCreate(TopicCreateTransaction::from_transaction(tx))
            }
            OperationKind::TopicMessageSubmit => AnyTransaction::TopicMessageSubmit(
                TopicMessageSubmitTransaction::from_transaction(tx),
            ),
            OperationKind::NetworkFreeze => {
                AnyTransaction::NetworkFreeze(NetworkFreezeTransaction::from_transaction(tx))
            }
            OperationKind::Batch => {
                AnyTransaction::Batch(BatchTransaction::from_transaction(tx))
            }
        })
    }

    /// Kind of the wrapped transaction.
    pub fn kind(&self) -> OperationKind {
        self.transaction().operation_kind()
    }

    /// The wrapped core transaction.
    pub fn transaction(&self) -> &Transaction {
        match self {
            AnyTransaction::Transfer(t) => t,
            AnyTransaction::AccountCreate(t) => t,
            AnyTransaction::TopicCreate(t) => t,
            AnyTransaction::TopicMessageSubmit(t) => t,
            AnyTransaction::NetworkFreeze(t) => t,
            AnyTransaction::Batch(t) => t,
        }
    }

    /// The wrapped core transaction, mutably.
    pub fn transaction_mut(&mut self) -> &mut Transaction {
        match self {
            AnyTransaction::Transfer(t) => t,
            AnyTransaction::AccountCreate(t) => t,
            AnyTransaction::TopicCreate(t) => t,
            AnyTransaction::TopicMessageSubmit(t) => t,
            AnyTransaction::NetworkFreeze(t) => t,
            AnyTransaction::Batch(t) => t,
        }
    }
}
