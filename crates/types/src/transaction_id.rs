//! Transaction identifiers with a monotonic valid-start clock.

use crate::AccountId;
use sbor::prelude::*;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Nanoseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, BasicSbor)]
#[sbor(transparent)]
pub struct Timestamp(u64);

/// Last valid-start issued by [`Timestamp::monotonic_now`]. Two identifiers
/// generated by the same process never share a valid-start, even when the
/// wall clock stalls or steps backwards.
static LAST_ISSUED_NANOS: AtomicU64 = AtomicU64::new(0);

impl Timestamp {
    /// Create a timestamp from raw nanoseconds since the Unix epoch.
    pub const fn from_nanos(nanos: u64) -> Self {
        Timestamp(nanos)
    }

    /// Nanoseconds since the Unix epoch.
    pub const fn nanos(&self) -> u64 {
        self.0
    }

    /// Whole seconds since the Unix epoch.
    pub const fn seconds(&self) -> u64 {
        self.0 / 1_000_000_000
    }

    /// Sub-second nanoseconds.
    pub const fn subsec_nanos(&self) -> u32 {
        (self.0 % 1_000_000_000) as u32
    }

    /// This timestamp shifted forward by `nanos`.
    pub const fn plus_nanos(&self, nanos: u64) -> Self {
        Timestamp(self.0 + nanos)
    }

    /// Current time, strictly greater than any previously returned value.
    pub fn monotonic_now() -> Self {
        let wall = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0);

        let mut last = LAST_ISSUED_NANOS.load(Ordering::Relaxed);
        loop {
            let candidate = wall.max(last + 1);
            match LAST_ISSUED_NANOS.compare_exchange_weak(
                last,
                candidate,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return Timestamp(candidate),
                Err(observed) => last = observed,
            }
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:09}", self.seconds(), self.subsec_nanos())
    }
}

/// Identifies one submission row of a transaction.
///
/// Immutable once created. Generated lazily at freeze time, or supplied
/// explicitly by the caller (which pins the identifier list).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, BasicSbor)]
pub struct TransactionId {
    /// Account paying for the transaction.
    pub payer: AccountId,
    /// Start of the validity window.
    pub valid_start: Timestamp,
    /// Whether this identifies the scheduled child of a schedule entry.
    pub scheduled: bool,
    /// Disambiguates children sharing a payer and valid-start.
    pub nonce: i32,
}

impl TransactionId {
    /// Generate a fresh identifier for `payer` with a monotonic valid-start.
    pub fn generate(payer: AccountId) -> Self {
        Self {
            payer,
            valid_start: Timestamp::monotonic_now(),
            scheduled: false,
            nonce: 0,
        }
    }

    /// Create an identifier with an explicit valid-start.
    pub fn with_valid_start(payer: AccountId, valid_start: Timestamp) -> Self {
        Self {
            payer,
            valid_start,
            scheduled: false,
            nonce: 0,
        }
    }

    /// This identifier with the valid-start shifted forward by `nanos`.
    pub fn offset_by(&self, nanos: u64) -> Self {
        Self {
            valid_start: self.valid_start.plus_nanos(nanos),
            ..*self
        }
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.payer, self.valid_start)?;
        if self.scheduled {
            write!(f, "?scheduled")?;
        }
        if self.nonce != 0 {
            write!(f, "/{}", self.nonce)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monotonic_now_strictly_increases() {
        let mut previous = Timestamp::monotonic_now();
        for _ in 0..1000 {
            let next = Timestamp::monotonic_now();
            assert!(next > previous);
            previous = next;
        }
    }

    #[test]
    fn test_monotonic_across_threads() {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                std::thread::spawn(|| {
                    (0..250)
                        .map(|_| Timestamp::monotonic_now())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut all: Vec<Timestamp> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        let before = all.len();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), before, "duplicate valid-start issued");
    }

    #[test]
    fn test_offset_by() {
        let id = TransactionId::with_valid_start(AccountId::new(2), Timestamp::from_nanos(100));
        let shifted = id.offset_by(50);
        assert_eq!(shifted.valid_start.nanos(), 150);
        assert_eq!(shifted.payer, id.payer);
    }

    #[test]
    fn test_display() {
        let id = TransactionId::with_valid_start(
            AccountId::new(2),
            Timestamp::from_nanos(1_500_000_000),
        );
        assert_eq!(id.to_string(), "0.0.2@1.500000000");
    }
}
