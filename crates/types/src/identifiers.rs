//! Ledger entity identifiers.
//!
//! Entities are addressed as `shard.realm.num` triples. The client only ever
//! creates these; resolution to on-ledger state is the node's concern.

use sbor::prelude::*;
use std::fmt;
use std::str::FromStr;

/// Error parsing a `shard.realm.num` identifier from a string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid entity id '{input}': expected the form shard.realm.num")]
pub struct EntityIdParseError {
    /// The rejected input.
    pub input: String,
}

fn parse_triple(s: &str) -> Result<(u64, u64, u64), EntityIdParseError> {
    let err = || EntityIdParseError {
        input: s.to_string(),
    };
    let mut parts = s.split('.');
    let shard = parts.next().and_then(|p| p.parse().ok()).ok_or_else(err)?;
    let realm = parts.next().and_then(|p| p.parse().ok()).ok_or_else(err)?;
    let num = parts.next().and_then(|p| p.parse().ok()).ok_or_else(err)?;
    if parts.next().is_some() {
        return Err(err());
    }
    Ok((shard, realm, num))
}

/// An account on the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, BasicSbor)]
pub struct AccountId {
    pub shard: u64,
    pub realm: u64,
    pub num: u64,
}

impl AccountId {
    /// Create an account id in shard 0, realm 0.
    pub const fn new(num: u64) -> Self {
        Self {
            shard: 0,
            realm: 0,
            num,
        }
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.shard, self.realm, self.num)
    }
}

impl FromStr for AccountId {
    type Err = EntityIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (shard, realm, num) = parse_triple(s)?;
        Ok(Self { shard, realm, num })
    }
}

/// A message topic on the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, BasicSbor)]
pub struct TopicId {
    pub shard: u64,
    pub realm: u64,
    pub num: u64,
}

impl TopicId {
    /// Create a topic id in shard 0, realm 0.
    pub const fn new(num: u64) -> Self {
        Self {
            shard: 0,
            realm: 0,
            num,
        }
    }
}

impl fmt::Display for TopicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.shard, self.realm, self.num)
    }
}

impl FromStr for TopicId {
    type Err = EntityIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (shard, realm, num) = parse_triple(s)?;
        Ok(Self { shard, realm, num })
    }
}
