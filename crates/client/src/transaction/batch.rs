//! Atomic batch composition.

use super::Transaction;
use crate::client::Client;
use crate::error::ClientError;
use crate::execute::TransactionResponse;
use meridian_proto::{encode_signed_transaction, BatchPayload, OperationKind, OperationPayload};
use std::ops::{Deref, DerefMut};
use tracing::debug;

/// A transaction whose payload is an ordered sequence of already-signed
/// inner transactions, submitted atomically.
///
/// Inner transactions must be frozen and signed before the batch itself
/// freezes; a batch or a network freeze is never a valid inner.
#[derive(Debug)]
pub struct BatchTransaction {
    tx: Transaction,
    inner: Vec<Transaction>,
}

impl BatchTransaction {
    /// Empty batch.
    pub fn new() -> Self {
        Self {
            tx: Transaction::new(OperationPayload::Batch(BatchPayload::default())),
            inner: Vec::new(),
        }
    }

    pub(crate) fn from_transaction(tx: Transaction) -> Self {
        Self {
            tx,
            inner: Vec::new(),
        }
    }

    fn validate_inner(transaction: &Transaction) -> Result<(), ClientError> {
        match transaction.operation_kind() {
            kind @ (OperationKind::Batch | OperationKind::NetworkFreeze) => {
                Err(ClientError::InvalidInnerTransaction { kind })
            }
            _ => Ok(()),
        }
    }

    /// Append an inner transaction. Rejects batches and network freezes
    /// before any network call.
    pub fn add_inner(
        &mut self,
        transaction: impl Into<Transaction>,
    ) -> Result<&mut Self, ClientError> {
        self.tx.payload_mut()?;
        let transaction = transaction.into();
        Self::validate_inner(&transaction)?;
        self.inner.push(transaction);
        Ok(self)
    }

    /// Replace the inner transaction list.
    pub fn set_inner(
        &mut self,
        transactions: Vec<Transaction>,
    ) -> Result<&mut Self, ClientError> {
        self.tx.payload_mut()?;
        for transaction in &transactions {
            Self::validate_inner(transaction)?;
        }
        self.inner = transactions;
        Ok(self)
    }

    /// The inner transactions, in submission order.
    pub fn inner_transactions(&self) -> &[Transaction] {
        &self.inner
    }

    /// Compose the batch payload from the inner transactions' signed cells,
    /// then freeze. Each inner contributes its first node's cell.
    pub async fn freeze_with(
        &mut self,
        client: Option<&Client>,
    ) -> Result<&mut Self, ClientError> {
        if self.tx.is_frozen() {
            return Ok(self);
        }

        let mut signed_transactions = Vec::with_capacity(self.inner.len());
        for inner in &self.inner {
            if !inner.is_frozen() {
                return Err(ClientError::InnerNotReady);
            }
            let cell = inner.signed_cell(0, 0).await?;
            if cell.signature_map.is_empty() {
                return Err(ClientError::InnerNotReady);
            }
            signed_transactions.push(encode_signed_transaction(&cell)?);
        }
        debug!(inner = signed_transactions.len(), "Batch payload composed");

        match self.tx.payload_mut()? {
            OperationPayload::Batch(p) => p.signed_transactions = signed_transactions,
            _ => unreachable!("payload kind is fixed at construction"),
        }
        self.tx.freeze_with(client).await?;
        Ok(self)
    }

    /// Freeze without a client.
    pub async fn freeze(&mut self) -> Result<&mut Self, ClientError> {
        self.freeze_with(None).await
    }

    /// Execute the batch, composing and freezing it first when needed.
    pub async fn execute(&mut self, client: &Client) -> Result<TransactionResponse, ClientError> {
        if !self.tx.is_frozen() {
            self.freeze_with(Some(client)).await?;
        }
        self.tx.execute(client).await
    }
}

impl From<BatchTransaction> for Transaction {
    fn from(wrapper: BatchTransaction) -> Self {
        wrapper.tx
    }
}

impl Default for BatchTransaction {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for BatchTransaction {
    type Target = Transaction;

    fn deref(&self) -> &Transaction {
        &self.tx
    }
}

impl DerefMut for BatchTransaction {
    fn deref_mut(&mut self) -> &mut Transaction {
        &mut self.tx
    }
}
