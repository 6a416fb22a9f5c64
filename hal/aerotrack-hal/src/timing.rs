//! Interrupt-written timestamp marker
//!
//! A single shared tick value written by an edge interrupt and read by the
//! superloop. Only last-value-wins is guaranteed: edges arriving between two
//! reads overwrite each other, nothing is queued.

use portable_atomic::{AtomicU32, Ordering};

/// Lock-free single-writer/single-reader timestamp
///
/// 32 bits is the natural word on every supported target, so each store and
/// load is indivisible and a reader never observes a torn value.
#[derive(Debug, Default)]
pub struct TimeMarker(AtomicU32);

impl TimeMarker {
    /// Create a marker holding zero
    pub const fn new() -> Self {
        Self(AtomicU32::new(0))
    }

    /// Record the tick count of an edge
    pub fn mark(&self, ticks: u32) {
        self.0.store(ticks, Ordering::Relaxed);
    }

    /// Tick count of the most recent edge
    pub fn get(&self) -> u32 {
        self.0.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_value_wins() {
        let marker = TimeMarker::new();
        assert_eq!(marker.get(), 0);
        marker.mark(1000);
        marker.mark(2000);
        assert_eq!(marker.get(), 2000);
    }
}
