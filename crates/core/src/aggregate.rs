//! Venue aggregate construction
//!
//! [`AggregateBuilder`] turns a review into a brand-new venue aggregate, or
//! folds a review into / out of an existing one. Inputs are never mutated;
//! each call returns the superseding venue value.

use serde::{Deserialize, Serialize};

use crate::average::{
    add_value_to_average, add_value_weighted, remove_value_from_average, round_to_precision,
};
use crate::error::{TallyError, TallyResult};
use crate::types::{Category, CategoryRatings, CategorySamples, Review, Venue};

/// How a new rating is folded into an existing category average
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AveragingMode {
    /// The existing average counts as a single sample of weight one.
    ///
    /// Removal still weights by the venue's review count, so add and remove
    /// are only exact inverses while the venue has a single review.
    #[default]
    Pairwise,
    /// Both addition and removal weight by the category's sample count,
    /// giving a true running mean.
    CountWeighted,
}

/// Builds and updates venue aggregates
#[derive(Debug, Clone, Copy, Default)]
pub struct AggregateBuilder {
    mode: AveragingMode,
}

impl AggregateBuilder {
    pub fn new(mode: AveragingMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> AveragingMode {
        self.mode
    }

    /// Build the aggregate of a venue whose only review is `review`
    ///
    /// Each category average equals the review's value rounded to two
    /// decimals (absent stays absent) and the review count is one.
    pub fn new_aggregate_from_review(&self, review: &Review) -> Venue {
        let averages =
            CategoryRatings::from_fn(|c| review.ratings.get(c).map(round_to_precision));
        Venue {
            id: review.venue_id.clone(),
            name: review.venue_name.clone(),
            averages,
            samples: presence(&averages),
            overall_rating: averages.overall(),
            review_count: 1,
        }
    }

    /// Fold `review` into the aggregate of `venue`
    pub fn apply_review_addition(&self, review: &Review, venue: &Venue) -> Venue {
        let mut averages = CategoryRatings::default();
        let mut samples = venue.samples;

        for category in Category::ALL {
            let value = review.ratings.get(category);
            let current = venue.averages.get(category);
            let seen = venue.samples.get(category);

            let updated = match self.mode {
                AveragingMode::Pairwise => add_value_to_average(value, current),
                AveragingMode::CountWeighted => add_value_weighted(value, current, seen),
            };
            averages.set(category, updated);
            if value.is_some() {
                samples.set(category, seen + 1);
            }
        }

        Venue {
            id: venue.id.clone(),
            name: venue.name.clone(),
            averages,
            samples,
            overall_rating: averages.overall(),
            review_count: venue.review_count + 1,
        }
    }

    /// Take `review` back out of the aggregate of `venue`
    ///
    /// A category whose last rating is removed becomes absent.
    ///
    /// # Errors
    ///
    /// Returns `ConsistencyViolation` when `venue.review_count < 2` (the last
    /// review is removed by deleting the venue, not through this path) or when
    /// the review rates a category the venue has no average for.
    pub fn apply_review_removal(&self, review: &Review, venue: &Venue) -> TallyResult<Venue> {
        if venue.review_count < 2 {
            return Err(TallyError::consistency(format!(
                "cannot remove review {} from venue {} holding {} review(s)",
                review.id, venue.id, venue.review_count
            )));
        }

        let mut averages = venue.averages;
        let mut samples = venue.samples;

        for category in Category::ALL {
            let Some(value) = review.ratings.get(category) else {
                continue;
            };
            let seen = venue.samples.get(category);
            let Some(current) = venue.averages.get(category).filter(|_| seen > 0) else {
                return Err(TallyError::consistency(format!(
                    "review {} rates {} but venue {} has no {} average",
                    review.id, category, venue.id, category
                )));
            };

            if seen == 1 {
                averages.set(category, None);
            } else {
                let count = match self.mode {
                    AveragingMode::Pairwise => venue.review_count,
                    AveragingMode::CountWeighted => seen,
                };
                averages.set(
                    category,
                    Some(remove_value_from_average(Some(value), current, count)),
                );
            }
            samples.set(category, seen - 1);
        }

        Ok(Venue {
            id: venue.id.clone(),
            name: venue.name.clone(),
            averages,
            samples,
            overall_rating: averages.overall(),
            review_count: venue.review_count - 1,
        })
    }
}

fn presence(ratings: &CategoryRatings) -> CategorySamples {
    CategorySamples::from_fn(|c| u32::from(ratings.get(c).is_some()))
}
