//! Wire messages and codec for the Meridian client engine.
//!
//! Everything a node reads or returns crosses this boundary as SBOR bytes:
//!
//! - [`TransactionBody`] — the logical body, one per (chunk, node) cell
//! - [`SignedTransaction`] — body bytes plus an ordered signature map
//! - [`TransactionEnvelope`] / [`TransactionList`] — the export/transmission
//!   forms, including legacy-form normalization on the read side
//! - [`PrecheckResponse`] — a node's immediate verdict on a submission
//!
//! The encode/decode entry points are thin wrappers over `sbor::basic_encode`
//! and `sbor::basic_decode`; message structure is carried entirely by the
//! derived codecs, so round-trips are byte-exact by construction.

mod body;
mod envelope;
mod registry;
mod response;

pub use body::{
    AccountAmount, AccountCreatePayload, BatchPayload, ChunkInfo, CustomFeeLimit,
    NetworkFreezePayload, OperationPayload, TopicCreatePayload, TopicMessageSubmitPayload,
    TransactionBody, TransferPayload,
};
pub use envelope::{
    decode_signed_transaction, decode_signed_transactions, encode_for_transmission,
    encode_signed_transaction, encode_signed_transactions, SignaturePair, SignatureMap,
    SignedTransaction, TransactionEnvelope, TransactionList,
};
pub use registry::OperationKind;
pub use response::{PrecheckResponse, Status};

use thiserror::Error;

/// Errors crossing the codec boundary.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Message too short")]
    MessageTooShort,

    #[error("SBOR decode error: {0}")]
    SborDecode(String),

    #[error("SBOR encode error: {0}")]
    SborEncode(String),
}

pub(crate) fn sbor_encode<T: sbor::BasicEncode>(value: &T) -> Result<Vec<u8>, CodecError> {
    sbor::basic_encode(value).map_err(|e| CodecError::SborEncode(format!("{:?}", e)))
}

pub(crate) fn sbor_decode<T: sbor::BasicDecode>(bytes: &[u8]) -> Result<T, CodecError> {
    sbor::basic_decode(bytes).map_err(|e| CodecError::SborDecode(format!("{:?}", e)))
}

/// Encode a logical transaction body.
pub fn encode_body(body: &TransactionBody) -> Result<Vec<u8>, CodecError> {
    sbor_encode(body)
}

/// Decode a logical transaction body.
pub fn decode_body(bytes: &[u8]) -> Result<TransactionBody, CodecError> {
    if bytes.is_empty() {
        return Err(CodecError::MessageTooShort);
    }
    sbor_decode(bytes)
}

/// Encode a precheck response (test fixtures and mock nodes use this).
pub fn encode_response(response: &PrecheckResponse) -> Result<Vec<u8>, CodecError> {
    sbor_encode(response)
}

/// Decode a node's precheck response.
pub fn decode_response(bytes: &[u8]) -> Result<PrecheckResponse, CodecError> {
    if bytes.is_empty() {
        return Err(CodecError::MessageTooShort);
    }
    sbor_decode(bytes)
}
