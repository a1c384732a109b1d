//! Stored record model
//!
//! The store holds exactly two collections, venues and reviews. A
//! [`RecordKey`] addresses one record in one collection; a [`Record`] is the
//! value written there.

use std::fmt;
use tally_core::{EntityRef, Review, ReviewId, Venue, VenueId};

/// Address of a record
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordKey {
    Venue(VenueId),
    Review(ReviewId),
}

impl RecordKey {
    /// Convert to the entity reference used in errors
    pub fn to_entity(&self) -> EntityRef {
        match self {
            RecordKey::Venue(id) => EntityRef::Venue(id.clone()),
            RecordKey::Review(id) => EntityRef::Review(*id),
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_entity())
    }
}

/// A record value destined for one of the collections
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Venue(Venue),
    Review(Review),
}

impl Record {
    /// Key this record is stored under
    pub fn key(&self) -> RecordKey {
        match self {
            Record::Venue(v) => RecordKey::Venue(v.id.clone()),
            Record::Review(r) => RecordKey::Review(r.id),
        }
    }
}

impl From<Venue> for Record {
    fn from(v: Venue) -> Self {
        Record::Venue(v)
    }
}

impl From<Review> for Record {
    fn from(r: Review) -> Self {
        Record::Review(r)
    }
}

/// A stored value together with the store version that last wrote it
///
/// Versions start at 1; version 0 is reserved for "does not exist".
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned<T> {
    pub value: T,
    pub version: u64,
}

impl<T> Versioned<T> {
    pub fn new(value: T, version: u64) -> Self {
        Self { value, version }
    }

    /// Discard the version
    pub fn into_value(self) -> T {
        self.value
    }
}
