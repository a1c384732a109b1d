//! Store interfaces the consistency engine calls into
//!
//! - [`RecordStore`]: point lookups and filtered scans
//! - [`TransactionalStore`]: all-or-nothing commit of a [`WriteBatch`]
//!
//! Implementations own their retry and timeout policy; the engine never
//! retries a failed call.

use tally_core::{Review, ReviewId, StoreResult, Venue, VenueId};

use crate::batch::WriteBatch;
use crate::record::Versioned;

/// Point lookup and filtered scan over venues and reviews
pub trait RecordStore: Send + Sync {
    /// Look up a venue by id
    fn find_venue(&self, id: &VenueId) -> StoreResult<Option<Versioned<Venue>>>;

    /// Look up a review by id
    fn find_review(&self, id: &ReviewId) -> StoreResult<Option<Versioned<Review>>>;

    /// All reviews pointing at `venue_id`, oldest first
    fn reviews_for_venue(&self, venue_id: &VenueId) -> StoreResult<Vec<Review>>;

    /// All stored venues
    fn list_venues(&self) -> StoreResult<Vec<Venue>>;
}

/// Atomic multi-record writes
pub trait TransactionalStore: Send + Sync {
    /// Apply every operation in `batch` or none of them
    ///
    /// On success the effects become visible to readers as a unit and the
    /// commit version is returned. On failure nothing was written.
    fn commit(&self, batch: WriteBatch) -> StoreResult<u64>;
}

/// A store offering both reads and atomic writes
pub trait Store: RecordStore + TransactionalStore {}

impl<T: RecordStore + TransactionalStore + ?Sized> Store for T {}
