//! Per-venue writer locks
//!
//! Read-then-write on a venue aggregate loses updates if two writers
//! interleave. [`VenueLocks`] gives each venue a mutex so that, within one
//! process, at most one AddReview/RemoveReview runs per venue at a time.
//! Writers for different venues never contend.
//!
//! Entries are dropped once no writer holds or waits on them.

use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;
use tally_core::VenueId;

/// Lock table keyed by venue
#[derive(Debug, Default)]
pub struct VenueLocks {
    locks: DashMap<VenueId, Arc<Mutex<()>>>,
}

impl VenueLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` while holding the lock for `venue_id`
    pub fn with_lock<T>(&self, venue_id: &VenueId, f: impl FnOnce() -> T) -> T {
        let handle = self.handle(venue_id);
        let result = {
            let _guard = handle.lock();
            f()
        };
        drop(handle);
        self.locks
            .remove_if(venue_id, |_, lock| Arc::strong_count(lock) == 1);
        result
    }

    /// Number of venues with a live lock entry
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }

    fn handle(&self, venue_id: &VenueId) -> Arc<Mutex<()>> {
        self.locks
            .entry(venue_id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
