//! Unary-RPC transport abstraction.
//!
//! Defines the `Channel` interface the execution engine drives. Production
//! backends wrap an RPC stream or an HTTP-framed adaptor; the test-helpers
//! crate ships a scripted in-memory backend. The engine is agnostic: it hands
//! a channel the target address, a service/method pair, and request bytes,
//! and consumes either response bytes or a classified transport error.

use async_trait::async_trait;
use thiserror::Error;

/// Error returned when a transport invocation produced no decodable response.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The node could not be reached or refused the connection.
    #[error("Node unavailable: {0}")]
    Unavailable(String),

    /// The stream was reset mid-call.
    #[error("Stream reset: {0}")]
    StreamReset(String),

    /// The call timed out at the transport layer.
    #[error("Request timed out")]
    Timeout,

    /// Any other transport failure.
    #[error("Transport failure: {0}")]
    Other(String),
}

impl TransportError {
    /// Whether the failure class warrants retrying on another node.
    ///
    /// Only connectivity-shaped failures qualify; anything else is treated
    /// as fatal by the retry state machine.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            TransportError::Unavailable(_) | TransportError::StreamReset(_) | TransportError::Timeout
        )
    }
}

/// Unary transport: one request, one response, no streaming.
///
/// Implementations are shared across concurrently executing transactions and
/// must be `Send + Sync`. Retry logic and node selection live outside this
/// trait, in the execution engine.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Invoke `service`/`method` on the node at `address`.
    async fn invoke(
        &self,
        address: &str,
        service: &str,
        method: &str,
        request: Vec<u8>,
    ) -> Result<Vec<u8>, TransportError>;
}
