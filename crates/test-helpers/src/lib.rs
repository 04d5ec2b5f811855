//! Scripted transport and deterministic fixtures for client tests.
//!
//! The [`MockChannel`] replaces the network with a reply script consumed in
//! invocation order, while recording every invocation so tests can assert on
//! addresses, routing, and transmitted bytes. Fixtures are seeded, never
//! random, so scenarios replay identically.

use async_trait::async_trait;
use meridian_client::{
    Channel, Client, ExecuteConfig, NodeBackoffConfig, Signer, TransportError,
};
use meridian_proto::{encode_response, PrecheckResponse, Status};
use meridian_types::{AccountId, KeyPair, NodeEndpoint, PublicKey, Signature};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// One scripted reply, consumed per invocation in FIFO order.
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    /// Answer with a precheck status.
    Respond(Status),
    /// Answer with a precheck status and a cost estimate.
    RespondWithCost(Status, u64),
    /// Fail at the transport layer.
    Fail(TransportError),
}

/// A recorded invocation.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub address: String,
    pub service: String,
    pub method: String,
    pub request: Vec<u8>,
}

/// Transport backend driven by a reply script.
///
/// An exhausted script fails the call with a non-retryable transport error,
/// so a test that under-provisions replies fails loudly instead of looping.
#[derive(Default)]
pub struct MockChannel {
    script: Mutex<VecDeque<ScriptedReply>>,
    invocations: Mutex<Vec<Invocation>>,
}

impl MockChannel {
    /// Channel with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Channel pre-loaded with `replies`.
    pub fn with_script(replies: impl IntoIterator<Item = ScriptedReply>) -> Self {
        Self {
            script: Mutex::new(replies.into_iter().collect()),
            invocations: Mutex::new(Vec::new()),
        }
    }

    /// Append a reply to the script.
    pub fn push(&self, reply: ScriptedReply) {
        self.script.lock().push_back(reply);
    }

    /// Everything invoked so far, in order.
    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.lock().clone()
    }

    /// Number of invocations so far.
    pub fn invocation_count(&self) -> usize {
        self.invocations.lock().len()
    }
}

#[async_trait]
impl Channel for MockChannel {
    async fn invoke(
        &self,
        address: &str,
        service: &str,
        method: &str,
        request: Vec<u8>,
    ) -> Result<Vec<u8>, TransportError> {
        self.invocations.lock().push(Invocation {
            address: address.to_string(),
            service: service.to_string(),
            method: method.to_string(),
            request,
        });

        let reply = self.script.lock().pop_front();
        match reply {
            Some(ScriptedReply::Respond(status)) => encode_response(&PrecheckResponse::of(status))
                .map_err(|e| TransportError::Other(e.to_string())),
            Some(ScriptedReply::RespondWithCost(status, cost)) => {
                encode_response(&PrecheckResponse { status, cost })
                    .map_err(|e| TransportError::Other(e.to_string()))
            }
            Some(ScriptedReply::Fail(err)) => Err(err),
            None => Err(TransportError::Other("mock script exhausted".to_string())),
        }
    }
}

/// A signer that counts how many times it is invoked.
pub struct CountingSigner {
    keypair: KeyPair,
    calls: AtomicUsize,
}

impl CountingSigner {
    /// Signer over a seeded keypair.
    pub fn new(keypair: KeyPair) -> Self {
        Self {
            keypair,
            calls: AtomicUsize::new(0),
        }
    }

    /// How many times `sign` ran.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Signer for CountingSigner {
    fn public_key(&self) -> PublicKey {
        self.keypair.public_key()
    }

    async fn sign(&self, message: &[u8]) -> Signature {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.keypair.sign(message)
    }
}

/// Deterministic keypair for a one-byte seed.
pub fn seeded_keypair(seed: u8) -> KeyPair {
    KeyPair::from_seed(&[seed; 32])
}

/// The operator account used by [`test_client`].
pub const OPERATOR_ACCOUNT: AccountId = AccountId::new(2);

/// `count` endpoints with accounts `0.0.3`, `0.0.4`, ... and distinct
/// addresses.
pub fn test_endpoints(count: u64) -> Vec<NodeEndpoint> {
    (0..count)
        .map(|i| {
            NodeEndpoint::new(
                AccountId::new(3 + i),
                format!("10.0.0.{}:50211", i + 1),
            )
        })
        .collect()
}

/// Execution budget tuned for fast tests: millisecond backoffs.
pub fn fast_execute_config() -> ExecuteConfig {
    ExecuteConfig {
        max_attempts: 10,
        min_backoff: Duration::from_millis(1),
        max_backoff: Duration::from_millis(4),
        total_timeout: None,
    }
}

/// Node backoff bounds tuned for fast tests.
pub fn fast_node_backoff() -> NodeBackoffConfig {
    NodeBackoffConfig {
        min_backoff: Duration::from_millis(2),
        max_backoff: Duration::from_millis(8),
    }
}

/// A client over `node_count` test endpoints with the seeded operator and
/// fast retry budgets.
pub fn test_client(channel: Arc<MockChannel>, node_count: u64) -> Client {
    Client::new(test_endpoints(node_count), channel)
        .with_operator(OPERATOR_ACCOUNT, Arc::new(seeded_keypair(1)))
        .with_execute_config(fast_execute_config())
        .with_node_backoff(fast_node_backoff())
}
