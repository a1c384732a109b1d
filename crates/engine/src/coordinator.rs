//! Consistency coordinator
//!
//! Orchestrates the AddReview and RemoveReview workflows. Each operation is
//! at most two reads followed by one atomic commit that writes the venue
//! aggregate and the review together:
//!
//! | Operation    | Venue state      | Commit                          |
//! |--------------|------------------|---------------------------------|
//! | AddReview    | absent           | put venue, put review           |
//! | AddReview    | present          | update venue, put review        |
//! | RemoveReview | review_count > 1 | update venue, delete review     |
//! | RemoveReview | review_count = 1 | delete venue, delete review     |
//!
//! The store's atomic commit is the only consistency boundary. Two optional
//! guards close the read-then-write race: per-venue write serialization
//! within this process, and conditional writes validated by the store.
//! Neither retries; a conflict is reported to the caller.

use std::sync::Arc;

use tally_core::{
    AggregateBuilder, Review, ReviewId, TallyError, TallyResult, Venue, VenueId,
};
use tally_storage::{RecordKey, Store, Versioned, WriteBatch};

use crate::config::EngineConfig;
use crate::locks::VenueLocks;

/// How an AddReview call changes the venue, decided once per call
#[derive(Debug, Clone, PartialEq)]
pub enum AddPlan {
    /// First review for this place; the venue is created
    NewVenue { venue: Venue },
    /// The venue exists and its aggregate absorbs the review
    ExistingVenueUpdate { venue: Venue, read_version: u64 },
}

/// How a RemoveReview call changes the venue, decided once per call
#[derive(Debug, Clone, PartialEq)]
pub enum RemovePlan {
    /// Other reviews remain; the aggregate gives up the review
    UpdateVenue { venue: Venue, read_version: u64 },
    /// The removed review was the last one; the venue goes with it
    DeleteVenue { venue_id: VenueId, read_version: u64 },
}

/// What a committed operation did to the venue record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VenueChange {
    Created,
    Updated,
    Deleted,
}

/// Acknowledgement of a committed operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitReceipt {
    pub venue_id: VenueId,
    pub review_id: ReviewId,
    pub change: VenueChange,
    /// Store version assigned to the commit
    pub version: u64,
}

/// Keeps venue aggregates consistent with their reviews
///
/// The store handle is injected at construction; there is no global state.
pub struct ConsistencyCoordinator<S: ?Sized> {
    store: Arc<S>,
    builder: AggregateBuilder,
    locks: VenueLocks,
    config: EngineConfig,
}

impl<S: Store + ?Sized> ConsistencyCoordinator<S> {
    pub fn new(store: Arc<S>, config: EngineConfig) -> Self {
        Self {
            store,
            builder: AggregateBuilder::new(config.averaging),
            locks: VenueLocks::new(),
            config,
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub(crate) fn builder(&self) -> &AggregateBuilder {
        &self.builder
    }

    // ========================================================================
    // AddReview
    // ========================================================================

    /// Store `review` and fold it into its venue's aggregate
    ///
    /// The review is assumed to be validated already. Creates the venue if
    /// this is its first review.
    pub fn add_review(&self, review: Review) -> TallyResult<CommitReceipt> {
        let venue_id = review.venue_id.clone();
        self.guarded(&venue_id, || self.add_review_unguarded(review))
    }

    fn add_review_unguarded(&self, review: Review) -> TallyResult<CommitReceipt> {
        let plan = self.plan_addition(&review)?;
        let conditional = self.config.conditional_writes;
        let review_id = review.id;
        let venue_id = review.venue_id.clone();

        let (batch, change) = match plan {
            AddPlan::NewVenue { venue } => {
                tracing::debug!(venue_id = %venue_id, review_id = %review_id, "Adding first review, creating venue");
                let batch = if conditional {
                    WriteBatch::new().put_new(venue).put_new(review)
                } else {
                    WriteBatch::new().put(venue).put(review)
                };
                (batch, VenueChange::Created)
            }
            AddPlan::ExistingVenueUpdate {
                venue,
                read_version,
            } => {
                tracing::debug!(
                    venue_id = %venue_id,
                    review_id = %review_id,
                    review_count = venue.review_count,
                    "Adding review to existing venue"
                );
                let batch = if conditional {
                    WriteBatch::new()
                        .update(venue, Some(read_version))
                        .put_new(review)
                } else {
                    WriteBatch::new().update(venue, None).put(review)
                };
                (batch, VenueChange::Updated)
            }
        };

        let version = self.commit(batch, &venue_id)?;
        tracing::info!(venue_id = %venue_id, review_id = %review_id, version, "Review added");

        Ok(CommitReceipt {
            venue_id,
            review_id,
            change,
            version,
        })
    }

    /// Decide how `review` changes its venue, without writing anything
    pub fn plan_addition(&self, review: &Review) -> TallyResult<AddPlan> {
        match self.store.find_venue(&review.venue_id)? {
            None => Ok(AddPlan::NewVenue {
                venue: self.builder.new_aggregate_from_review(review),
            }),
            Some(current) => Ok(AddPlan::ExistingVenueUpdate {
                venue: self.builder.apply_review_addition(review, &current.value),
                read_version: current.version,
            }),
        }
    }

    // ========================================================================
    // RemoveReview
    // ========================================================================

    /// Delete a review and take it out of its venue's aggregate
    ///
    /// Deletes the venue too when the review was its last one.
    ///
    /// # Errors
    ///
    /// - `NotFound` if no review has this id
    /// - `ConsistencyViolation` if the review's venue does not exist
    /// - `Store` if a read or the commit fails
    pub fn remove_review(&self, review_id: &ReviewId) -> TallyResult<CommitReceipt> {
        let venue_id = self.fetch_review(review_id)?.value.venue_id;
        self.guarded(&venue_id, || self.remove_review_unguarded(review_id))
    }

    fn remove_review_unguarded(&self, review_id: &ReviewId) -> TallyResult<CommitReceipt> {
        let review = self.fetch_review(review_id)?;
        let review_version = review.version;
        let review = review.value;
        let venue_id = review.venue_id.clone();
        let conditional = self.config.conditional_writes;
        let expect = |version: u64| conditional.then_some(version);

        let plan = self.plan_removal(&review)?;
        let review_key = RecordKey::Review(review.id);

        let (batch, change) = match plan {
            RemovePlan::UpdateVenue {
                venue,
                read_version,
            } => {
                tracing::debug!(
                    venue_id = %venue_id,
                    review_id = %review_id,
                    review_count = venue.review_count,
                    "Removing review from venue"
                );
                let batch = WriteBatch::new()
                    .update(venue, expect(read_version))
                    .delete(review_key, expect(review_version));
                (batch, VenueChange::Updated)
            }
            RemovePlan::DeleteVenue {
                venue_id: doomed,
                read_version,
            } => {
                tracing::debug!(venue_id = %venue_id, review_id = %review_id, "Removing last review, deleting venue");
                let batch = WriteBatch::new()
                    .delete(RecordKey::Venue(doomed), expect(read_version))
                    .delete(review_key, expect(review_version));
                (batch, VenueChange::Deleted)
            }
        };

        let version = self.commit(batch, &venue_id)?;
        tracing::info!(venue_id = %venue_id, review_id = %review_id, version, "Review removed");

        Ok(CommitReceipt {
            venue_id,
            review_id: *review_id,
            change,
            version,
        })
    }

    /// Decide how removing `review` changes its venue, without writing anything
    pub fn plan_removal(&self, review: &Review) -> TallyResult<RemovePlan> {
        let Some(current) = self.store.find_venue(&review.venue_id)? else {
            let err = TallyError::consistency(format!(
                "review {} references missing venue {}",
                review.id, review.venue_id
            ));
            tracing::error!(
                venue_id = %review.venue_id,
                review_id = %review.id,
                error = %err,
                "Review points at a venue that does not exist"
            );
            return Err(err);
        };

        match current.value.review_count {
            0 => {
                let err = TallyError::consistency(format!(
                    "venue {} is stored with zero reviews",
                    review.venue_id
                ));
                tracing::error!(venue_id = %review.venue_id, error = %err, "Empty venue persisted");
                Err(err)
            }
            1 => Ok(RemovePlan::DeleteVenue {
                venue_id: current.value.id,
                read_version: current.version,
            }),
            _ => {
                let venue = self
                    .builder
                    .apply_review_removal(review, &current.value)
                    .map_err(|e| {
                        tracing::error!(venue_id = %review.venue_id, review_id = %review.id, error = %e, "Aggregate cannot absorb removal");
                        e
                    })?;
                Ok(RemovePlan::UpdateVenue {
                    venue,
                    read_version: current.version,
                })
            }
        }
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Current aggregate of a venue
    pub fn venue(&self, venue_id: &VenueId) -> TallyResult<Venue> {
        self.store
            .find_venue(venue_id)?
            .map(Versioned::into_value)
            .ok_or_else(|| TallyError::venue_not_found(venue_id.clone()))
    }

    /// A stored review
    pub fn review(&self, review_id: &ReviewId) -> TallyResult<Review> {
        Ok(self.fetch_review(review_id)?.value)
    }

    /// Reviews of a venue, oldest first
    pub fn reviews_for_venue(&self, venue_id: &VenueId) -> TallyResult<Vec<Review>> {
        Ok(self.store.reviews_for_venue(venue_id)?)
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn fetch_review(&self, review_id: &ReviewId) -> TallyResult<Versioned<Review>> {
        self.store
            .find_review(review_id)?
            .ok_or_else(|| TallyError::review_not_found(*review_id))
    }

    fn guarded<T>(&self, venue_id: &VenueId, f: impl FnOnce() -> TallyResult<T>) -> TallyResult<T> {
        if self.config.serialize_writes {
            self.locks.with_lock(venue_id, f)
        } else {
            f()
        }
    }

    fn commit(&self, batch: WriteBatch, venue_id: &VenueId) -> TallyResult<u64> {
        self.store.commit(batch).map_err(|e| {
            if e.is_conflict() {
                tracing::warn!(venue_id = %venue_id, error = %e, "Commit rejected by concurrent write");
            } else {
                tracing::warn!(venue_id = %venue_id, error = %e, "Commit failed");
            }
            TallyError::from(e)
        })
    }
}

impl<S: ?Sized> std::fmt::Debug for ConsistencyCoordinator<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsistencyCoordinator")
            .field("config", &self.config)
            .field("locked_venues", &self.locks.len())
            .finish()
    }
}
