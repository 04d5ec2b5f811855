//! Transaction construction and execution engine for the Meridian network.
//!
//! This crate is the client side of the submission pipeline:
//!
//! - **Transaction lifecycle**: build a logical body, `freeze` it into an
//!   immutable grid of (chunk, node) cells, chunking oversized payloads
//! - **Signing registry**: `(public key, signer)` pairs applied eagerly at
//!   freeze time or lazily at serialization, without requiring signing
//!   material synchronously
//! - **Node health & selection**: round-robin over a shared pool with
//!   per-node failure backoff and readmission
//! - **Execution engine**: a status-driven retry state machine over the
//!   (identifier × node) grid, regenerating expired identifiers
//!
//! The wire codec lives in `meridian-proto`; the transport is abstracted
//! behind [`Channel`] and supplied by the caller.
//!
//! # Example
//!
//! ```ignore
//! let client = Client::new(endpoints, channel)
//!     .with_operator(payer, Arc::new(keypair));
//!
//! let mut tx = TransferTransaction::new();
//! tx.add_transfer(payer, -10)?;
//! tx.add_transfer(receiver, 10)?;
//! let response = tx.execute(&client).await?;
//! ```

mod channel;
mod client;
mod config;
mod error;
mod execute;
mod locked_list;
mod node_health;
mod signing;
mod transaction;

pub use channel::{Channel, TransportError};
pub use client::{Client, Operator};
pub use config::{ChunkConfig, ExecuteConfig, SigningMode};
pub use error::ClientError;
pub use execute::TransactionResponse;
pub use locked_list::{ListError, LockableList};
pub use node_health::{NodeBackoffConfig, NodePool, Selection};
pub use signing::Signer;
pub use transaction::{
    AccountCreateTransaction, AnyTransaction, BatchTransaction, NetworkFreezeTransaction,
    TopicCreateTransaction, TopicMessageSubmitTransaction, Transaction, TransferTransaction,
};
