//! Shared helpers for the review lifecycle tests

use std::sync::atomic::{AtomicBool, Ordering};

use tally::{
    AuthorId, CategoryRatings, MemoryStore, RecordStore, Review, ReviewId, StoreError,
    StoreResult, Tally, TransactionalStore, Venue, VenueId, Versioned,
};
use tally_storage::WriteBatch;

/// Install a test subscriber once per process; later calls are no-ops
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

pub fn ratings(bloody: Option<f64>, burger: Option<f64>, beers: Option<f64>) -> CategoryRatings {
    CategoryRatings::new(bloody, burger, beers)
}

pub fn review_for(venue: &str, ratings: CategoryRatings) -> Review {
    Review::new(
        VenueId::new(venue),
        "The Local",
        AuthorId::new("tester"),
        ratings,
        "",
    )
}

/// Write records straight to the store, bypassing aggregate maintenance
pub fn seed(tally: &Tally, venue: Venue, reviews: Vec<Review>) {
    let batch = reviews
        .into_iter()
        .fold(WriteBatch::new().put(venue), |batch, r| batch.put(r));
    tally.store().commit(batch).unwrap();
}

/// In-memory store whose commits can be made to fail
#[derive(Default)]
pub struct FailingStore {
    pub inner: MemoryStore,
    pub fail_commits: AtomicBool,
}

impl FailingStore {
    pub fn set_failing(&self, failing: bool) {
        self.fail_commits.store(failing, Ordering::SeqCst);
    }
}

impl RecordStore for FailingStore {
    fn find_venue(&self, id: &VenueId) -> StoreResult<Option<Versioned<Venue>>> {
        self.inner.find_venue(id)
    }

    fn find_review(&self, id: &ReviewId) -> StoreResult<Option<Versioned<Review>>> {
        self.inner.find_review(id)
    }

    fn reviews_for_venue(&self, venue_id: &VenueId) -> StoreResult<Vec<Review>> {
        self.inner.reviews_for_venue(venue_id)
    }

    fn list_venues(&self) -> StoreResult<Vec<Venue>> {
        self.inner.list_venues()
    }
}

impl TransactionalStore for FailingStore {
    fn commit(&self, batch: WriteBatch) -> StoreResult<u64> {
        if self.fail_commits.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable {
                reason: "store offline".to_string(),
            });
        }
        self.inner.commit(batch)
    }
}
