//! Core types for the Meridian client engine.
//!
//! This crate provides the foundational types used throughout the client:
//!
//! - **Primitives**: Hash, Ed25519 keys and signatures
//! - **Identifiers**: AccountId, TopicId, TransactionId
//! - **Network**: NodeEndpoint
//!
//! # Design Philosophy
//!
//! This crate is self-contained with minimal dependencies. It does not depend
//! on any other workspace crates, making it the foundation layer.

mod crypto;
mod endpoint;
mod hash;
mod identifiers;
mod transaction_id;

pub use crypto::{KeyPair, PublicKey, Signature};
pub use endpoint::NodeEndpoint;
pub use hash::{Hash, HexError};
pub use identifiers::{AccountId, EntityIdParseError, TopicId};
pub use transaction_id::{Timestamp, TransactionId};
