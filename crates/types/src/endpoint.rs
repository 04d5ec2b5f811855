//! Network node endpoints.

use crate::AccountId;
use std::fmt;

/// A candidate node in the submission pool.
///
/// Pairs the node's on-ledger account with its transport address. The pool a
/// client is configured with is read-only; per-node health bookkeeping lives
/// in the client crate, not here.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeEndpoint {
    /// The node's operator account, referenced by transaction bodies.
    pub account_id: AccountId,
    /// Transport address, e.g. `35.237.200.180:50211`.
    pub address: String,
}

impl NodeEndpoint {
    /// Create an endpoint.
    pub fn new(account_id: AccountId, address: impl Into<String>) -> Self {
        Self {
            account_id,
            address: address.into(),
        }
    }
}

impl fmt::Display for NodeEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.account_id, self.address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let endpoint = NodeEndpoint::new(AccountId::new(3), "10.0.0.1:50211");
        assert_eq!(endpoint.to_string(), "0.0.3@10.0.0.1:50211");
    }
}
