//! Tally: venue rating aggregates that stay consistent with their reviews
//!
//! [`Tally`] wires a record store and a consistency coordinator together.
//! Every venue carries per-category average ratings, an overall rating and a
//! review count; adding or removing a review updates the venue and the
//! review collection in one atomic commit.
//!
//! # Example
//!
//! ```
//! use tally::{AuthorId, CategoryRatings, EngineConfig, Review, Tally, VenueId};
//!
//! let tally = Tally::open(EngineConfig::default())?;
//! let review = Review::new(
//!     VenueId::new("p1"),
//!     "The Local",
//!     AuthorId::new("u1"),
//!     CategoryRatings::new(Some(4.0), Some(3.0), None),
//!     "great brunch",
//! );
//! tally.add_review(review)?;
//!
//! let venue = tally.venue(&VenueId::new("p1"))?;
//! assert_eq!(venue.review_count, 1);
//! assert_eq!(venue.overall_rating, Some(3.5));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::sync::Arc;

use tally_engine::ConsistencyCoordinator;

mod types;

pub use types::*;

/// Review aggregation facade
///
/// Defaults to the in-memory store; any [`Store`] can be injected with
/// [`Tally::with_store`].
pub struct Tally<S: ?Sized = MemoryStore> {
    coordinator: ConsistencyCoordinator<S>,
}

impl Tally<MemoryStore> {
    /// Open an engine backed by a fresh in-memory store
    pub fn open(config: EngineConfig) -> Result<Self, ConfigError> {
        Self::with_store(Arc::new(MemoryStore::new()), config)
    }

    /// In-memory engine with default configuration
    pub fn in_memory() -> Self {
        Self {
            coordinator: ConsistencyCoordinator::new(
                Arc::new(MemoryStore::new()),
                EngineConfig::default(),
            ),
        }
    }
}

impl<S: Store + ?Sized> Tally<S> {
    /// Build an engine over an existing store
    pub fn with_store(store: Arc<S>, config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        tracing::debug!(
            averaging = ?config.averaging,
            serialize_writes = config.serialize_writes,
            conditional_writes = config.conditional_writes,
            "Opening tally engine"
        );
        Ok(Self {
            coordinator: ConsistencyCoordinator::new(store, config),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        self.coordinator.config()
    }

    pub fn store(&self) -> &Arc<S> {
        self.coordinator.store()
    }

    // ========================================================================
    // Writes
    // ========================================================================

    /// Validate and store a review, updating its venue's aggregate
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if a rating is out of range or the venue id is empty
    /// - `Store` if a read or the commit fails, including write conflicts
    pub fn add_review(&self, review: Review) -> TallyResult<CommitReceipt> {
        review.validate(self.config().max_rating)?;
        self.coordinator.add_review(review)
    }

    /// Delete a review, updating or deleting its venue
    pub fn remove_review(&self, review_id: &ReviewId) -> TallyResult<CommitReceipt> {
        self.coordinator.remove_review(review_id)
    }

    // ========================================================================
    // Reads
    // ========================================================================

    pub fn venue(&self, venue_id: &VenueId) -> TallyResult<Venue> {
        self.coordinator.venue(venue_id)
    }

    pub fn review(&self, review_id: &ReviewId) -> TallyResult<Review> {
        self.coordinator.review(review_id)
    }

    /// Reviews of a venue, oldest first
    pub fn reviews_for_venue(&self, venue_id: &VenueId) -> TallyResult<Vec<Review>> {
        self.coordinator.reviews_for_venue(venue_id)
    }

    /// Every stored venue, ordered by id
    pub fn list_venues(&self) -> TallyResult<Vec<Venue>> {
        Ok(self.store().list_venues()?)
    }

    // ========================================================================
    // Audit
    // ========================================================================

    pub fn audit_venue(&self, venue_id: &VenueId) -> TallyResult<AuditReport> {
        self.coordinator.audit_venue(venue_id)
    }

    pub fn audit_all(&self) -> TallyResult<Vec<AuditReport>> {
        self.coordinator.audit_all()
    }
}

impl<S: ?Sized> std::fmt::Debug for Tally<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tally")
            .field("coordinator", &self.coordinator)
            .finish()
    }
}
