//! Error types for the review aggregation engine
//!
//! Two layers:
//! - [`StoreError`]: failures reported by a record store or its atomic commit
//! - [`TallyError`]: the taxonomy surfaced to callers of AddReview/RemoveReview
//!
//! Every operation resolves to success or one classified `TallyError`; there
//! is no partial-success state.

use std::fmt;
use thiserror::Error;

use crate::types::{ReviewId, VenueId};

/// Reference to a stored entity, used in error messages
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntityRef {
    Venue(VenueId),
    Review(ReviewId),
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityRef::Venue(id) => write!(f, "venue:{}", id),
            EntityRef::Review(id) => write!(f, "review:{}", id),
        }
    }
}

impl From<VenueId> for EntityRef {
    fn from(id: VenueId) -> Self {
        EntityRef::Venue(id)
    }
}

impl From<ReviewId> for EntityRef {
    fn from(id: ReviewId) -> Self {
        EntityRef::Review(id)
    }
}

/// Failure of a store read or atomic commit
///
/// Versions follow the store convention that version 0 means "does not exist".
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// A conditional write found a different version than the one expected
    #[error("write conflict on {entity}: expected version {expected}, found {actual}")]
    Conflict {
        entity: EntityRef,
        expected: u64,
        actual: u64,
    },

    /// An update or delete targeted a record that does not exist
    #[error("{entity} missing at commit")]
    MissingRecord { entity: EntityRef },

    /// The store could not be reached or refused the request
    #[error("store unavailable: {reason}")]
    Unavailable { reason: String },

    /// The store did not answer within its deadline
    #[error("store operation timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },
}

impl StoreError {
    /// Whether this failure came from a rejected conditional write
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict { .. })
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Classified failure of an AddReview/RemoveReview operation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TallyError {
    /// The referenced review or venue does not exist
    #[error("{entity} not found")]
    NotFound { entity: EntityRef },

    /// Stored data violates an aggregate invariant; never repaired silently
    #[error("consistency violation: {reason}")]
    ConsistencyViolation { reason: String },

    /// A review failed input validation
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    /// The underlying read or atomic write failed
    #[error("store failure: {0}")]
    Store(#[from] StoreError),
}

impl TallyError {
    /// Shorthand for a missing venue
    pub fn venue_not_found(id: VenueId) -> Self {
        TallyError::NotFound {
            entity: EntityRef::Venue(id),
        }
    }

    /// Shorthand for a missing review
    pub fn review_not_found(id: ReviewId) -> Self {
        TallyError::NotFound {
            entity: EntityRef::Review(id),
        }
    }

    /// Shorthand for a consistency violation
    pub fn consistency(reason: impl Into<String>) -> Self {
        TallyError::ConsistencyViolation {
            reason: reason.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, TallyError::NotFound { .. })
    }

    /// Whether this failure is a store conflict from a conditional write
    pub fn is_conflict(&self) -> bool {
        matches!(self, TallyError::Store(e) if e.is_conflict())
    }
}

/// Result type for engine operations
pub type TallyResult<T> = Result<T, TallyError>;
