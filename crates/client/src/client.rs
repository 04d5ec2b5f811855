//! Client handle: node pool, transport channel, operator, and defaults.

use crate::channel::Channel;
use crate::config::ExecuteConfig;
use crate::node_health::{NodeBackoffConfig, NodePool};
use crate::signing::Signer;
use meridian_types::{AccountId, NodeEndpoint};
use std::sync::Arc;

/// The identity a client signs and pays with by default.
#[derive(Clone)]
pub struct Operator {
    /// Account debited for fees when a transaction names no payer.
    pub account_id: AccountId,
    /// Auto-signing identity applied during execution.
    pub signer: Arc<dyn Signer>,
}

/// A handle to one network: a read-only endpoint pool with shared health
/// state, the transport channel, and per-client defaults.
///
/// Cheap to share by reference across concurrently executing transactions;
/// the pool serializes its own per-node updates.
pub struct Client {
    pool: NodePool,
    channel: Arc<dyn Channel>,
    operator: Option<Operator>,
    default_max_fee: Option<u64>,
    default_regenerate_transaction_ids: bool,
    execute_config: ExecuteConfig,
}

impl Client {
    /// Create a client over a fixed endpoint pool.
    pub fn new(endpoints: Vec<NodeEndpoint>, channel: Arc<dyn Channel>) -> Self {
        Self {
            pool: NodePool::new(endpoints, NodeBackoffConfig::default()),
            channel,
            operator: None,
            default_max_fee: None,
            default_regenerate_transaction_ids: true,
            execute_config: ExecuteConfig::default(),
        }
    }

    /// Set the operator identity.
    pub fn with_operator(mut self, account_id: AccountId, signer: Arc<dyn Signer>) -> Self {
        self.operator = Some(Operator { account_id, signer });
        self
    }

    /// Set the default max fee applied when a transaction names none.
    pub fn with_default_max_fee(mut self, max_fee: u64) -> Self {
        self.default_max_fee = Some(max_fee);
        self
    }

    /// Set whether expired identifiers regenerate by default.
    pub fn with_default_regenerate_transaction_ids(mut self, regenerate: bool) -> Self {
        self.default_regenerate_transaction_ids = regenerate;
        self
    }

    /// Replace the execution retry/timeout budget.
    pub fn with_execute_config(mut self, config: ExecuteConfig) -> Self {
        self.execute_config = config;
        self
    }

    /// Rebuild the pool with different node backoff bounds.
    pub fn with_node_backoff(mut self, config: NodeBackoffConfig) -> Self {
        self.pool = NodePool::new(self.pool.endpoints(), config);
        self
    }

    /// The shared node pool.
    pub fn pool(&self) -> &NodePool {
        &self.pool
    }

    /// The transport channel.
    pub fn channel(&self) -> &Arc<dyn Channel> {
        &self.channel
    }

    /// The operator, when one is configured.
    pub fn operator(&self) -> Option<&Operator> {
        self.operator.as_ref()
    }

    /// The operator's account, when one is configured.
    pub fn operator_account_id(&self) -> Option<AccountId> {
        self.operator.as_ref().map(|op| op.account_id)
    }

    /// Default max fee, when one is configured.
    pub fn default_max_fee(&self) -> Option<u64> {
        self.default_max_fee
    }

    /// Whether expired identifiers regenerate when the transaction leaves
    /// the choice to the client.
    pub fn default_regenerate_transaction_ids(&self) -> bool {
        self.default_regenerate_transaction_ids
    }

    /// The execution budget.
    pub fn execute_config(&self) -> &ExecuteConfig {
        &self.execute_config
    }

    /// Node accounts in pool order.
    pub fn node_account_ids(&self) -> Vec<AccountId> {
        self.pool.node_account_ids()
    }
}
