//! Lane bookkeeping.
//!
//! Every in-flight request owns one lane, a column of the rail diagram. Lanes
//! are handed out lowest-index first and are never compacted: a freed lane is
//! reused by the next request, and the collection only grows when every lane
//! is busy. The rail is bounded by terminal width long before the linear scan
//! matters, so there is no cap on growth.

use tokio::time::Instant;
use tracing::{debug, trace};

/// An ordered, growable collection of lanes.
///
/// Each slot is either empty or holds the instant its owning request started.
#[derive(Clone, Debug, Default)]
pub struct Lanes {
    slots: Vec<Option<Instant>>,
}

impl Lanes {
    /// Creates `min` empty lanes up front.
    pub fn with_capacity(min: usize) -> Self {
        Self { slots: vec![None; min] }
    }

    /// Returns the smallest free lane index, appending a lane if all are taken.
    pub fn acquire(&mut self) -> usize {
        if let Some(index) = self.slots.iter().position(Option::is_none) {
            trace!(lane = index, "lane reused");
            return index;
        }

        self.slots.push(None);
        let index = self.slots.len() - 1;
        debug!(lanes = self.slots.len(), "lane collection grew");
        index
    }

    /// Marks `index` as owned by a request that started at `start`.
    pub fn occupy(&mut self, index: usize, start: Instant) {
        if let Some(slot) = self.slots.get_mut(index) {
            *slot = Some(start);
        }
    }

    /// Frees `index`; the next [`acquire`](Lanes::acquire) may return it.
    pub fn release(&mut self, index: usize) {
        if let Some(slot) = self.slots.get_mut(index) {
            *slot = None;
            trace!(lane = index, "lane released");
        }
    }

    /// Start instant of the request occupying `index`, if any.
    pub fn start(&self, index: usize) -> Option<Instant> {
        self.slots.get(index).copied().flatten()
    }

    pub fn len(&self) -> usize { self.slots.len() }
    pub fn is_empty(&self) -> bool { self.slots.is_empty() }

    /// Copy of the current lane state, taken so rendering never holds a lock.
    pub fn snapshot(&self) -> Vec<Option<Instant>> {
        self.slots.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_returns_smallest_free_index() {
        let mut lanes = Lanes::with_capacity(3);
        let now = Instant::now();

        for expected in 0..3 {
            let index = lanes.acquire();
            assert_eq!(index, expected);
            lanes.occupy(index, now);
        }
        assert_eq!(lanes.len(), 3);

        lanes.release(1);
        assert_eq!(lanes.acquire(), 1);
    }

    #[test]
    fn grows_by_one_per_overflow() {
        let mut lanes = Lanes::with_capacity(1);
        let now = Instant::now();

        let first = lanes.acquire();
        lanes.occupy(first, now);
        assert_eq!(lanes.len(), 1);

        let second = lanes.acquire();
        lanes.occupy(second, now);
        assert_eq!(second, 1);
        assert_eq!(lanes.len(), 2);

        let third = lanes.acquire();
        assert_eq!(third, 2);
        assert_eq!(lanes.len(), 3);
    }

    #[test]
    fn release_then_acquire_reuses_before_growing() {
        let mut lanes = Lanes::with_capacity(0);
        let now = Instant::now();

        let a = lanes.acquire();
        lanes.occupy(a, now);
        let b = lanes.acquire();
        lanes.occupy(b, now);

        lanes.release(a);
        assert_eq!(lanes.start(a), None);
        assert_eq!(lanes.acquire(), a);
        assert_eq!(lanes.len(), 2);
    }

    #[test]
    fn unoccupied_acquire_is_still_free() {
        let mut lanes = Lanes::with_capacity(2);
        assert_eq!(lanes.acquire(), 0);
        // Nothing occupied lane 0 yet.
        assert_eq!(lanes.acquire(), 0);
    }

    #[test]
    fn never_shrinks() {
        let mut lanes = Lanes::with_capacity(0);
        let now = Instant::now();
        for _ in 0..4 {
            let i = lanes.acquire();
            lanes.occupy(i, now);
        }
        for i in 0..4 {
            lanes.release(i);
        }
        assert_eq!(lanes.len(), 4);
        assert!(lanes.snapshot().iter().all(Option::is_none));
    }
}
