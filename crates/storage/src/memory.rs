//! In-memory record store
//!
//! Both collections live behind a single `RwLock`, so a commit holding the
//! write lock is observed by readers entirely or not at all.
//!
//! # Design
//!
//! - FxHashMap per collection: O(1) point lookups
//! - One global version counter: every commit gets the next version, and
//!   every record written by that commit is stamped with it
//! - Validation runs under the write lock before anything is applied

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tally_core::{Review, ReviewId, StoreResult, Venue, VenueId};

use crate::batch::{WriteBatch, WriteOp};
use crate::record::{Record, RecordKey, Versioned};
use crate::traits::{RecordStore, TransactionalStore};
use crate::validation::{validate_batch, VersionSource};

#[derive(Debug, Default)]
struct Tables {
    venues: FxHashMap<VenueId, Versioned<Venue>>,
    reviews: FxHashMap<ReviewId, Versioned<Review>>,
}

impl Tables {
    fn apply(&mut self, op: WriteOp, version: u64) {
        tracing::trace!(op = op.kind(), key = %op.key(), version, "Applying write");
        match op {
            WriteOp::Put { record, .. } | WriteOp::Update { record, .. } => match record {
                Record::Venue(v) => {
                    self.venues.insert(v.id.clone(), Versioned::new(v, version));
                }
                Record::Review(r) => {
                    self.reviews.insert(r.id, Versioned::new(r, version));
                }
            },
            WriteOp::Delete { key, .. } => match key {
                RecordKey::Venue(id) => {
                    self.venues.remove(&id);
                }
                RecordKey::Review(id) => {
                    self.reviews.remove(&id);
                }
            },
        }
    }
}

impl VersionSource for Tables {
    fn current_version(&self, key: &RecordKey) -> u64 {
        match key {
            RecordKey::Venue(id) => self.venues.get(id).map(|v| v.version),
            RecordKey::Review(id) => self.reviews.get(id).map(|r| r.version),
        }
        .unwrap_or(0)
    }
}

/// In-memory implementation of [`RecordStore`] and [`TransactionalStore`]
///
/// # Thread Safety
///
/// All operations are thread-safe. Reads share the lock; commits take it
/// exclusively for validation and apply.
///
/// # Example
///
/// ```
/// use tally_core::{AggregateBuilder, AuthorId, CategoryRatings, Review, VenueId};
/// use tally_storage::{MemoryStore, RecordStore, TransactionalStore, WriteBatch};
///
/// let review = Review::new(
///     VenueId::new("p1"),
///     "The Local",
///     AuthorId::new("u1"),
///     CategoryRatings::new(Some(4.0), None, None),
///     "",
/// );
/// let venue = AggregateBuilder::default().new_aggregate_from_review(&review);
///
/// let store = MemoryStore::new();
/// let version = store.commit(WriteBatch::new().put_new(venue).put_new(review))?;
/// assert_eq!(version, 1);
/// assert_eq!(store.find_venue(&VenueId::new("p1"))?.map(|v| v.version), Some(1));
/// # Ok::<(), tally_core::StoreError>(())
/// ```
pub struct MemoryStore {
    tables: RwLock<Tables>,
    /// Version of the last commit
    version: AtomicU64,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            version: AtomicU64::new(0),
        }
    }

    /// Version of the last successful commit (0 if none)
    #[inline]
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    /// Number of stored venues
    pub fn venue_count(&self) -> usize {
        self.tables.read().venues.len()
    }

    /// Number of stored reviews across all venues
    pub fn review_count(&self) -> usize {
        self.tables.read().reviews.len()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("version", &self.version())
            .field("venues", &self.venue_count())
            .field("reviews", &self.review_count())
            .finish()
    }
}

impl RecordStore for MemoryStore {
    fn find_venue(&self, id: &VenueId) -> StoreResult<Option<Versioned<Venue>>> {
        Ok(self.tables.read().venues.get(id).cloned())
    }

    fn find_review(&self, id: &ReviewId) -> StoreResult<Option<Versioned<Review>>> {
        Ok(self.tables.read().reviews.get(id).cloned())
    }

    fn reviews_for_venue(&self, venue_id: &VenueId) -> StoreResult<Vec<Review>> {
        let mut reviews: Vec<Review> = self
            .tables
            .read()
            .reviews
            .values()
            .filter(|r| &r.value.venue_id == venue_id)
            .map(|r| r.value.clone())
            .collect();
        reviews.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(reviews)
    }

    fn list_venues(&self) -> StoreResult<Vec<Venue>> {
        let mut venues: Vec<Venue> = self
            .tables
            .read()
            .venues
            .values()
            .map(|v| v.value.clone())
            .collect();
        venues.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(venues)
    }
}

impl TransactionalStore for MemoryStore {
    fn commit(&self, batch: WriteBatch) -> StoreResult<u64> {
        let mut tables = self.tables.write();

        let validation = validate_batch(&batch, &*tables);
        let conflicts = validation.conflict_count();
        if let Err(e) = validation.into_result() {
            tracing::debug!(error = %e, conflicts, ops = batch.len(), "Commit rejected");
            return Err(e);
        }

        let version = self.version.fetch_add(1, Ordering::AcqRel) + 1;
        let ops = batch.len();
        for op in batch.into_ops() {
            tables.apply(op, version);
        }

        tracing::trace!(version, ops, "Commit applied");
        Ok(version)
    }
}
