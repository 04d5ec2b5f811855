//! Client engine configuration.

use serde::Deserialize;
use std::time::Duration;

/// Default attempt budget per `execute` call.
pub const DEFAULT_MAX_ATTEMPTS: usize = 10;

/// Default floor for inter-attempt backoff.
pub const DEFAULT_MIN_BACKOFF: Duration = Duration::from_millis(250);

/// Default ceiling for inter-attempt backoff.
pub const DEFAULT_MAX_BACKOFF: Duration = Duration::from_secs(8);

/// Default chunk size for payload-bearing transactions, in bytes.
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Default cap on the number of chunks.
pub const DEFAULT_MAX_CHUNKS: usize = 20;

/// Default valid-start spacing between consecutive chunk identifiers.
pub const DEFAULT_CHUNK_INTERVAL_NANOS: u64 = 1_000;

/// When signatures are computed.
///
/// Threaded explicitly through the transaction lifecycle; there is no
/// process-wide signing flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum SigningMode {
    /// Serialize and sign every (chunk, node) cell at freeze time.
    #[default]
    Eager,
    /// Record signers at registration; sign each cell lazily, once, the
    /// first time it is serialized for transmission or export.
    OnDemand,
}

/// Retry and timeout budget for one `execute` call.
#[derive(Debug, Clone, Deserialize)]
pub struct ExecuteConfig {
    /// Attempt budget, global to the call.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,

    /// Backoff floor between attempts.
    #[serde(default = "default_min_backoff")]
    pub min_backoff: Duration,

    /// Backoff ceiling; exponential growth stops here.
    #[serde(default = "default_max_backoff")]
    pub max_backoff: Duration,

    /// Total wall-clock budget, checked between attempts. `None` leaves only
    /// the attempt budget as the bound.
    #[serde(default)]
    pub total_timeout: Option<Duration>,
}

fn default_max_attempts() -> usize {
    DEFAULT_MAX_ATTEMPTS
}

fn default_min_backoff() -> Duration {
    DEFAULT_MIN_BACKOFF
}

fn default_max_backoff() -> Duration {
    DEFAULT_MAX_BACKOFF
}

impl Default for ExecuteConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            min_backoff: DEFAULT_MIN_BACKOFF,
            max_backoff: DEFAULT_MAX_BACKOFF,
            total_timeout: None,
        }
    }
}

/// Chunking parameters for payload-bearing transactions.
#[derive(Debug, Clone, Deserialize)]
pub struct ChunkConfig {
    /// Maximum payload bytes per chunk. Must be positive.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Maximum number of chunks; exceeding this fails before any network
    /// call.
    #[serde(default = "default_max_chunks")]
    pub max_chunks: usize,

    /// Valid-start offset between consecutive chunk identifiers.
    #[serde(default = "default_chunk_interval")]
    pub chunk_interval_nanos: u64,
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

fn default_max_chunks() -> usize {
    DEFAULT_MAX_CHUNKS
}

fn default_chunk_interval() -> u64 {
    DEFAULT_CHUNK_INTERVAL_NANOS
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_chunks: DEFAULT_MAX_CHUNKS,
            chunk_interval_nanos: DEFAULT_CHUNK_INTERVAL_NANOS,
        }
    }
}
