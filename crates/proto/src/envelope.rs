//! Signed-transaction envelopes and the export/transmission wire forms.
//!
//! # Wire Format
//!
//! ```text
//! TransactionEnvelope { signed_transaction_bytes }      one cell
//! TransactionList { [TransactionEnvelope, ...] }        more than one cell
//! SignedTransaction { body_bytes, signature_map }       legacy flat form
//! ```
//!
//! Writers always emit the enveloped form, wrapped in [`TransactionList`]
//! when more than one (chunk, node) cell exists. Readers additionally accept
//! the legacy flat form, where the [`SignedTransaction`] fields sit at the
//! top level without the envelope, and normalize it.

use crate::{sbor_decode, sbor_encode, CodecError};
use meridian_types::{PublicKey, Signature};
use sbor::prelude::*;

/// One witness signature, keyed by the raw public key bytes.
#[derive(Debug, Clone, PartialEq, Eq, BasicSbor)]
pub struct SignaturePair {
    /// Raw bytes identifying the signing key. Full keys are stored; readers
    /// must treat this as a prefix and match accordingly.
    pub public_key_prefix: Vec<u8>,
    /// Signature over the cell's `body_bytes`.
    pub signature: Signature,
}

impl SignaturePair {
    /// Create a pair carrying the full key bytes.
    pub fn new(public_key: PublicKey, signature: Signature) -> Self {
        Self {
            public_key_prefix: public_key.as_bytes().to_vec(),
            signature,
        }
    }

    /// Whether this pair was produced by `public_key`.
    pub fn matches(&self, public_key: &PublicKey) -> bool {
        let key_bytes = public_key.as_bytes();
        !self.public_key_prefix.is_empty() && key_bytes.starts_with(&self.public_key_prefix)
    }
}

/// Ordered set of signatures over one cell, each key at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq, BasicSbor)]
pub struct SignatureMap {
    pub pairs: Vec<SignaturePair>,
}

impl SignatureMap {
    /// Empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a signature from `public_key` is present.
    pub fn contains(&self, public_key: &PublicKey) -> bool {
        self.pairs.iter().any(|pair| pair.matches(public_key))
    }

    /// Append a signature. Returns `false` (and changes nothing) when the
    /// key already has an entry.
    pub fn add(&mut self, public_key: PublicKey, signature: Signature) -> bool {
        if self.contains(&public_key) {
            return false;
        }
        self.pairs.push(SignaturePair::new(public_key, signature));
        true
    }

    /// Remove the signature from `public_key`. Returns `false` when no entry
    /// matched.
    pub fn remove(&mut self, public_key: &PublicKey) -> bool {
        let before = self.pairs.len();
        self.pairs.retain(|pair| !pair.matches(public_key));
        self.pairs.len() != before
    }

    /// Drop every signature.
    pub fn clear(&mut self) {
        self.pairs.clear();
    }

    /// Number of signatures.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether the map is empty.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// A serialized body plus its witness signatures: one (chunk, node) cell.
#[derive(Debug, Clone, PartialEq, Eq, BasicSbor)]
pub struct SignedTransaction {
    /// Encoded [`TransactionBody`](crate::TransactionBody). Kept as bytes so
    /// signatures stay valid regardless of codec evolution.
    pub body_bytes: Vec<u8>,
    /// Signatures over `body_bytes`.
    pub signature_map: SignatureMap,
}

/// The enveloped wire form: a nested, already-encoded [`SignedTransaction`].
#[derive(Debug, Clone, PartialEq, Eq, BasicSbor)]
pub struct TransactionEnvelope {
    pub signed_transaction_bytes: Vec<u8>,
}

/// List container for multi-cell transactions.
#[derive(Debug, Clone, Default, PartialEq, Eq, BasicSbor)]
pub struct TransactionList {
    pub transactions: Vec<TransactionEnvelope>,
}

/// Encode one cell (the inner encoding nested inside envelopes).
pub fn encode_signed_transaction(signed: &SignedTransaction) -> Result<Vec<u8>, CodecError> {
    sbor_encode(signed)
}

/// Decode one cell from its inner encoding.
pub fn decode_signed_transaction(bytes: &[u8]) -> Result<SignedTransaction, CodecError> {
    if bytes.is_empty() {
        return Err(CodecError::MessageTooShort);
    }
    sbor_decode(bytes)
}

/// Encode a single cell for transmission: always the enveloped form.
pub fn encode_for_transmission(signed: &SignedTransaction) -> Result<Vec<u8>, CodecError> {
    let envelope = TransactionEnvelope {
        signed_transaction_bytes: encode_signed_transaction(signed)?,
    };
    sbor_encode(&envelope)
}

/// Encode cells for export. One cell emits a bare envelope; more than one
/// emits the list container.
pub fn encode_signed_transactions(cells: &[SignedTransaction]) -> Result<Vec<u8>, CodecError> {
    if cells.len() == 1 {
        return encode_for_transmission(&cells[0]);
    }
    let mut transactions = Vec::with_capacity(cells.len());
    for signed in cells {
        transactions.push(TransactionEnvelope {
            signed_transaction_bytes: encode_signed_transaction(signed)?,
        });
    }
    sbor_encode(&TransactionList { transactions })
}

/// Decode exported bytes, accepting the list form, a bare envelope, or the
/// legacy flat form, and normalize to a cell sequence.
pub fn decode_signed_transactions(bytes: &[u8]) -> Result<Vec<SignedTransaction>, CodecError> {
    if bytes.is_empty() {
        return Err(CodecError::MessageTooShort);
    }

    if let Ok(list) = sbor::basic_decode::<TransactionList>(bytes) {
        let mut cells = Vec::with_capacity(list.transactions.len());
        for envelope in &list.transactions {
            cells.push(decode_signed_transaction(&envelope.signed_transaction_bytes)?);
        }
        return Ok(cells);
    }

    if let Ok(envelope) = sbor::basic_decode::<TransactionEnvelope>(bytes) {
        return Ok(vec![decode_signed_transaction(
            &envelope.signed_transaction_bytes,
        )?]);
    }

    // Legacy flat form: SignedTransaction fields without the envelope.
    let flat = sbor_decode::<SignedTransaction>(bytes)?;
    Ok(vec![flat])
}
