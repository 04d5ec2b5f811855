//! Account creation transaction.

use super::Transaction;
use crate::error::ClientError;
use meridian_proto::{AccountCreatePayload, OperationPayload};
use meridian_types::PublicKey;
use std::ops::{Deref, DerefMut};

/// Creates a new account controlled by a key.
#[derive(Debug)]
pub struct AccountCreateTransaction {
    tx: Transaction,
}

impl AccountCreateTransaction {
    pub fn new() -> Self {
        Self {
            tx: Transaction::new(OperationPayload::AccountCreate(
                AccountCreatePayload::default(),
            )),
        }
    }

    pub(crate) fn from_transaction(tx: Transaction) -> Self {
        Self { tx }
    }

    /// Set the controlling key.
    pub fn set_key(&mut self, key: PublicKey) -> Result<&mut Self, ClientError> {
        match self.tx.payload_mut()? {
            OperationPayload::AccountCreate(p) => p.key = Some(key),
            _ => unreachable!("payload kind is fixed at construction"),
        }
        Ok(self)
    }

    /// Set the balance transferred into the new account.
    pub fn set_initial_balance(&mut self, balance: u64) -> Result<&mut Self, ClientError> {
        match self.tx.payload_mut()? {
            OperationPayload::AccountCreate(p) => p.initial_balance = balance,
            _ => unreachable!("payload kind is fixed at construction"),
        }
        Ok(self)
    }

    /// Set the memo stored on the account itself.
    pub fn set_account_memo(&mut self, memo: impl Into<String>) -> Result<&mut Self, ClientError> {
        match self.tx.payload_mut()? {
            OperationPayload::AccountCreate(p) => p.account_memo = memo.into(),
            _ => unreachable!("payload kind is fixed at construction"),
        }
        Ok(self)
    }
}

impl From<AccountCreateTransaction> for Transaction {
    fn from(wrapper: AccountCreateTransaction) -> Self {
        wrapper.tx
    }
}

impl Default for AccountCreateTransaction {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for AccountCreateTransaction {
    type Target = Transaction;

    fn deref(&self) -> &Transaction {
        &self.tx
    }
}

impl DerefMut for AccountCreateTransaction {
    fn deref_mut(&mut self) -> &mut Transaction {
        &mut self.tx
    }
}
