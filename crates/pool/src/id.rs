//! Pool identifiers.

use std::sync::atomic::{AtomicU64, Ordering};

/// Issues unique pool identifiers for one evaluation.
///
/// Identifiers start at 1 and are never reused, also under concurrent use.
#[derive(Debug)]
pub struct PoolIdGenerator {
    next: AtomicU64,
}

impl PoolIdGenerator {
    /// Creates a generator whose first identifier is 1.
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    /// Returns the next identifier.
    pub fn next_id(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }

    /// Returns how many identifiers have been issued.
    pub fn issued(&self) -> u64 {
        self.next.load(Ordering::Relaxed) - 1
    }
}

impl Default for PoolIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
