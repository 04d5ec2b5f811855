//! Per-node health bookkeeping and round-robin selection.
//!
//! The pool is shared mutable state across concurrently executing
//! transactions. Each node slot carries its own mutex, so updates are
//! serialized per node with no cross-node coordination; the round-robin
//! cursor is a single atomic.

use meridian_types::{AccountId, NodeEndpoint};
use parking_lot::Mutex;
use serde::Deserialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tracing::debug;

/// Default readmit backoff floor.
pub const DEFAULT_NODE_MIN_BACKOFF: Duration = Duration::from_millis(250);

/// Default readmit backoff ceiling.
pub const DEFAULT_NODE_MAX_BACKOFF: Duration = Duration::from_secs(8);

/// Backoff bounds for failing nodes.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeBackoffConfig {
    /// First readmit period after a failure.
    #[serde(default = "default_node_min_backoff")]
    pub min_backoff: Duration,

    /// Ceiling the readmit period doubles up to.
    #[serde(default = "default_node_max_backoff")]
    pub max_backoff: Duration,
}

fn default_node_min_backoff() -> Duration {
    DEFAULT_NODE_MIN_BACKOFF
}

fn default_node_max_backoff() -> Duration {
    DEFAULT_NODE_MAX_BACKOFF
}

impl Default for NodeBackoffConfig {
    fn default() -> Self {
        Self {
            min_backoff: DEFAULT_NODE_MIN_BACKOFF,
            max_backoff: DEFAULT_NODE_MAX_BACKOFF,
        }
    }
}

/// Health state of one node slot.
#[derive(Debug, Default)]
struct NodeHealth {
    /// Consecutive failures since the last success.
    failures: u32,
    /// Current readmit period; zero until the first failure.
    backoff: Duration,
    /// Earliest instant the node re-enters selection.
    readmit_at: Option<Instant>,
}

impl NodeHealth {
    fn is_usable(&self, now: Instant) -> bool {
        match self.readmit_at {
            Some(readmit) => now >= readmit,
            None => true,
        }
    }
}

struct NodeSlot {
    endpoint: NodeEndpoint,
    health: Mutex<NodeHealth>,
}

/// Outcome of a selection pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// A usable node, with its pool index.
    Node { index: usize, endpoint: NodeEndpoint },
    /// Every eligible node is backing off; retry after `retry_in`.
    AllExcluded { retry_in: Duration },
    /// No pool node matches the eligible account set.
    NoneEligible,
}

/// Read-only endpoint pool with per-node health and a round-robin cursor.
pub struct NodePool {
    slots: Vec<NodeSlot>,
    cursor: AtomicUsize,
    config: NodeBackoffConfig,
}

impl NodePool {
    /// Build a pool over a fixed endpoint list.
    pub fn new(endpoints: Vec<NodeEndpoint>, config: NodeBackoffConfig) -> Self {
        let slots = endpoints
            .into_iter()
            .map(|endpoint| NodeSlot {
                endpoint,
                health: Mutex::new(NodeHealth::default()),
            })
            .collect();
        Self {
            slots,
            cursor: AtomicUsize::new(0),
            config,
        }
    }

    /// Endpoints in pool order.
    pub fn endpoints(&self) -> Vec<NodeEndpoint> {
        self.slots.iter().map(|s| s.endpoint.clone()).collect()
    }

    /// Node accounts in pool order.
    pub fn node_account_ids(&self) -> Vec<AccountId> {
        self.slots.iter().map(|s| s.endpoint.account_id).collect()
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the pool is empty.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Pick the next round-robin node among `eligible` accounts whose
    /// readmit time has passed.
    pub fn select_among(&self, eligible: &[AccountId]) -> Selection {
        if self.slots.is_empty() {
            return Selection::NoneEligible;
        }

        let now = Instant::now();
        let start = self.cursor.load(Ordering::Relaxed);
        let mut earliest_readmit: Option<Instant> = None;
        let mut saw_eligible = false;

        for offset in 0..self.slots.len() {
            let index = (start + offset) % self.slots.len();
            let slot = &self.slots[index];
            if !eligible.contains(&slot.endpoint.account_id) {
                continue;
            }
            saw_eligible = true;

            let health = slot.health.lock();
            if health.is_usable(now) {
                drop(health);
                self.cursor.store(index + 1, Ordering::Relaxed);
                return Selection::Node {
                    index,
                    endpoint: slot.endpoint.clone(),
                };
            }
            if let Some(readmit) = health.readmit_at {
                earliest_readmit = Some(match earliest_readmit {
                    Some(current) => current.min(readmit),
                    None => readmit,
                });
            }
        }

        if !saw_eligible {
            return Selection::NoneEligible;
        }

        let retry_in = earliest_readmit
            .map(|readmit| readmit.saturating_duration_since(now))
            .unwrap_or_default();
        Selection::AllExcluded { retry_in }
    }

    /// Record a failed attempt: push the node to the back of selection with
    /// a doubled readmit period, up to the ceiling.
    pub fn record_failure(&self, index: usize) {
        let Some(slot) = self.slots.get(index) else {
            return;
        };
        let mut health = slot.health.lock();
        health.failures += 1;
        health.backoff = if health.backoff.is_zero() {
            self.config.min_backoff
        } else {
            (health.backoff * 2).min(self.config.max_backoff)
        };
        health.readmit_at = Some(Instant::now() + health.backoff);
        debug!(
            node = %slot.endpoint,
            failures = health.failures,
            backoff = ?health.backoff,
            "Node failed; backing off"
        );
    }

    /// Record a successful attempt: reset the node to the backoff floor.
    pub fn record_success(&self, index: usize) {
        let Some(slot) = self.slots.get(index) else {
            return;
        };
        let mut health = slot.health.lock();
        health.failures = 0;
        health.backoff = Duration::ZERO;
        health.readmit_at = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_pool(count: u64, config: NodeBackoffConfig) -> NodePool {
        let endpoints = (0..count)
            .map(|i| {
                NodeEndpoint::new(
                    AccountId::new(3 + i),
                    format!("10.0.0.{}:50211", i + 1),
                )
            })
            .collect();
        NodePool::new(endpoints, config)
    }

    fn accounts(pool: &NodePool) -> Vec<AccountId> {
        pool.node_account_ids()
    }

    fn expect_node(selection: Selection) -> (usize, NodeEndpoint) {
        match selection {
            Selection::Node { index, endpoint } => (index, endpoint),
            other => panic!("expected a node, got {:?}", other),
        }
    }

    #[test]
    fn test_round_robin_rotation() {
        let pool = make_pool(3, NodeBackoffConfig::default());
        let eligible = accounts(&pool);

        let (a, _) = expect_node(pool.select_among(&eligible));
        let (b, _) = expect_node(pool.select_among(&eligible));
        let (c, _) = expect_node(pool.select_among(&eligible));
        let (d, _) = expect_node(pool.select_among(&eligible));

        assert_eq!((a, b, c), (0, 1, 2));
        assert_eq!(d, 0);
    }

    #[test]
    fn test_failed_node_skipped_until_readmit() {
        let config = NodeBackoffConfig {
            min_backoff: Duration::from_millis(20),
            max_backoff: Duration::from_secs(1),
        };
        let pool = make_pool(2, config);
        let eligible = accounts(&pool);

        let (first, _) = expect_node(pool.select_among(&eligible));
        pool.record_failure(first);

        // Next selections avoid the failed node while it backs off.
        let (second, _) = expect_node(pool.select_among(&eligible));
        assert_ne!(second, first);
        let (third, _) = expect_node(pool.select_among(&eligible));
        assert_ne!(third, first);

        // After the readmit period it rejoins the rotation.
        std::thread::sleep(Duration::from_millis(25));
        let selected: Vec<usize> = (0..2)
            .map(|_| expect_node(pool.select_among(&eligible)).0)
            .collect();
        assert!(selected.contains(&first));
    }

    #[test]
    fn test_all_excluded_reports_earliest_readmit() {
        let config = NodeBackoffConfig {
            min_backoff: Duration::from_millis(50),
            max_backoff: Duration::from_secs(1),
        };
        let pool = make_pool(2, config);
        let eligible = accounts(&pool);

        pool.record_failure(0);
        pool.record_failure(1);

        match pool.select_among(&eligible) {
            Selection::AllExcluded { retry_in } => {
                assert!(retry_in <= Duration::from_millis(50));
            }
            other => panic!("expected AllExcluded, got {:?}", other),
        }
    }

    #[test]
    fn test_backoff_doubles_to_ceiling_and_resets() {
        let config = NodeBackoffConfig {
            min_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_millis(350),
        };
        let pool = make_pool(1, config);

        pool.record_failure(0);
        pool.record_failure(0);
        pool.record_failure(0);
        {
            let health = pool.slots[0].health.lock();
            assert_eq!(health.failures, 3);
            assert_eq!(health.backoff, Duration::from_millis(350));
        }

        pool.record_success(0);
        {
            let health = pool.slots[0].health.lock();
            assert_eq!(health.failures, 0);
            assert!(health.backoff.is_zero());
            assert!(health.readmit_at.is_none());
        }
    }

    #[test]
    fn test_none_eligible() {
        let pool = make_pool(2, NodeBackoffConfig::default());
        let foreign = vec![AccountId::new(999)];
        assert_eq!(pool.select_among(&foreign), Selection::NoneEligible);
    }

    #[test]
    fn test_selection_restricted_to_eligible_accounts() {
        let pool = make_pool(3, NodeBackoffConfig::default());
        let only_last = vec![AccountId::new(5)];

        let (index, endpoint) = expect_node(pool.select_among(&only_last));
        assert_eq!(index, 2);
        assert_eq!(endpoint.account_id, AccountId::new(5));
    }
}
