//! Record types for the review aggregation engine
//!
//! This module defines the two persisted entities and their building blocks:
//! - Review: a single user's rating submission for a venue (immutable once stored)
//! - Venue: the place being reviewed, carrying the denormalized aggregate
//! - PerCategory: one slot per rating category (bloody, burger, beers)
//!
//! Absent ratings are `None`. A supplied rating of zero is `Some(0.0)` and is
//! never conflated with absence.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::average::average_ignoring_absent;
use crate::error::{TallyError, TallyResult};

// ============================================================================
// Identifiers
// ============================================================================

/// Identifier of a venue
///
/// Venues are keyed by the external place identifier supplied with the
/// first review, so this is an opaque string rather than a generated id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VenueId(String);

impl VenueId {
    /// Wrap an external place identifier
    pub fn new(id: impl Into<String>) -> Self {
        VenueId(id.into())
    }

    /// Borrow the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VenueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VenueId {
    fn from(s: &str) -> Self {
        VenueId::new(s)
    }
}

/// Identifier of a review, assigned by the system on creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReviewId(Uuid);

impl ReviewId {
    /// Generate a fresh random identifier
    pub fn new() -> Self {
        ReviewId(Uuid::new_v4())
    }
}

impl Default for ReviewId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ReviewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of the user who wrote a review
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthorId(String);

impl AuthorId {
    /// Wrap an external user identifier
    pub fn new(id: impl Into<String>) -> Self {
        AuthorId(id.into())
    }

    /// Borrow the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AuthorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Categories
// ============================================================================

/// A rating category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Bloody mary
    Bloody,
    /// Burger
    Burger,
    /// Beer selection
    Beers,
}

impl Category {
    /// Every category, in declaration order
    pub const ALL: [Category; 3] = [Category::Bloody, Category::Burger, Category::Beers];

    /// Field name used in records and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Bloody => "bloody",
            Category::Burger => "burger",
            Category::Beers => "beers",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One value per rating category
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PerCategory<T> {
    pub bloody: T,
    pub burger: T,
    pub beers: T,
}

impl<T: Copy> PerCategory<T> {
    /// Build from one value per category
    pub fn new(bloody: T, burger: T, beers: T) -> Self {
        Self {
            bloody,
            burger,
            beers,
        }
    }

    /// Get the value for a category
    pub fn get(&self, category: Category) -> T {
        match category {
            Category::Bloody => self.bloody,
            Category::Burger => self.burger,
            Category::Beers => self.beers,
        }
    }

    /// Set the value for a category
    pub fn set(&mut self, category: Category, value: T) {
        match category {
            Category::Bloody => self.bloody = value,
            Category::Burger => self.burger = value,
            Category::Beers => self.beers = value,
        }
    }

    /// Iterate over (category, value) pairs in category order
    pub fn iter(&self) -> impl Iterator<Item = (Category, T)> + '_ {
        Category::ALL.into_iter().map(move |c| (c, self.get(c)))
    }

    /// Build by evaluating `f` once per category
    pub fn from_fn(mut f: impl FnMut(Category) -> T) -> Self {
        Self {
            bloody: f(Category::Bloody),
            burger: f(Category::Burger),
            beers: f(Category::Beers),
        }
    }
}

/// Category ratings; `None` marks an absent rating
pub type CategoryRatings = PerCategory<Option<f64>>;

/// Number of surviving reviews that supplied each category
pub type CategorySamples = PerCategory<u32>;

impl CategoryRatings {
    /// Average of the present values, rounded; absent if none are present
    pub fn overall(&self) -> Option<f64> {
        average_ignoring_absent(self.iter().map(|(_, v)| v))
    }
}

// ============================================================================
// Review
// ============================================================================

/// A single user's rating submission for a venue
///
/// Immutable once persisted. An edit is modelled as remove + add.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: ReviewId,
    pub venue_id: VenueId,
    pub author_id: AuthorId,
    /// Denormalized copy of the venue name at submission time
    pub venue_name: String,
    pub ratings: CategoryRatings,
    pub note: String,
    pub created_at: DateTime<Utc>,
}

impl Review {
    /// Create a review with a fresh identifier and the current time
    pub fn new(
        venue_id: VenueId,
        venue_name: impl Into<String>,
        author_id: AuthorId,
        ratings: CategoryRatings,
        note: impl Into<String>,
    ) -> Self {
        Self {
            id: ReviewId::new(),
            venue_id,
            author_id,
            venue_name: venue_name.into(),
            ratings,
            note: note.into(),
            created_at: Utc::now(),
        }
    }

    /// Check every present rating is finite and within `0..=max_rating`
    pub fn validate(&self, max_rating: f64) -> TallyResult<()> {
        for (category, value) in self.ratings.iter() {
            if let Some(v) = value {
                if !v.is_finite() || v < 0.0 || v > max_rating {
                    return Err(TallyError::InvalidInput {
                        reason: format!(
                            "{} rating {} outside 0..={}",
                            category, v, max_rating
                        ),
                    });
                }
            }
        }
        if self.venue_id.as_str().is_empty() {
            return Err(TallyError::InvalidInput {
                reason: "venue id must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

// ============================================================================
// Venue
// ============================================================================

/// The place being reviewed, carrying the denormalized aggregate
///
/// # Invariants
///
/// - `overall_rating` is the rounded average of the present category averages
/// - `review_count` equals the number of stored reviews for this venue
/// - a venue with `review_count == 0` is never persisted
/// - `averages.get(c)` is present iff `samples.get(c) > 0`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StoredVenue")]
pub struct Venue {
    pub id: VenueId,
    pub name: String,
    /// Current per-category averages, two decimal places
    pub averages: CategoryRatings,
    /// Per-category count of surviving reviews that supplied a value
    pub samples: CategorySamples,
    pub overall_rating: Option<f64>,
    pub review_count: u32,
}

impl Venue {
    /// Build a venue from a known aggregate
    ///
    /// Assumes every one of the `review_count` reviews supplied each present
    /// category, which is the only assumption possible when importing an
    /// aggregate that has no per-category sample counts.
    pub fn with_aggregate(
        id: VenueId,
        name: impl Into<String>,
        averages: CategoryRatings,
        review_count: u32,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            averages,
            samples: assumed_samples(&averages, review_count),
            overall_rating: averages.overall(),
            review_count,
        }
    }

    /// Whether the overall rating matches the current category averages
    pub fn overall_is_consistent(&self) -> bool {
        self.overall_rating == self.averages.overall()
    }
}

/// Sample counts for an aggregate stored without them
fn assumed_samples(averages: &CategoryRatings, review_count: u32) -> CategorySamples {
    CategorySamples::from_fn(|c| if averages.get(c).is_some() { review_count } else { 0 })
}

/// Venue as read from storage
///
/// Records written before sample counts were tracked carry no `samples`;
/// those are filled in as if every review rated each present category.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredVenue {
    id: VenueId,
    #[serde(default)]
    name: String,
    averages: CategoryRatings,
    #[serde(default)]
    samples: Option<CategorySamples>,
    overall_rating: Option<f64>,
    review_count: u32,
}

impl From<StoredVenue> for Venue {
    fn from(stored: StoredVenue) -> Self {
        let samples = stored
            .samples
            .unwrap_or_else(|| assumed_samples(&stored.averages, stored.review_count));
        Venue {
            id: stored.id,
            name: stored.name,
            averages: stored.averages,
            samples,
            overall_rating: stored.overall_rating,
            review_count: stored.review_count,
        }
    }
}
