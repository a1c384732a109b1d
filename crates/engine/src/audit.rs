//! Aggregate audit
//!
//! Recomputes what can be derived about a venue from its surviving reviews
//! and compares it with the stored aggregate. Drift is reported and logged,
//! never repaired.
//!
//! Checked for every venue:
//! - review count and per-category sample counts
//! - a category average is present iff some review rated that category
//! - overall rating matches the stored category averages
//!
//! Category averages themselves are only compared in count-weighted mode.
//! Pairwise averages depend on the order of past additions and removals, so
//! they cannot be rederived from the surviving reviews alone.

use tally_core::average::average_ignoring_absent;
use tally_core::{
    AveragingMode, Category, CategorySamples, Review, TallyError, TallyResult, Venue, VenueId,
};
use tally_storage::{Store, Versioned};

use crate::coordinator::ConsistencyCoordinator;

/// One mismatch between a stored aggregate and its reviews
#[derive(Debug, Clone, PartialEq)]
pub enum Drift {
    /// Reviews exist but the venue record does not
    MissingVenue { review_count: u32 },
    ReviewCount { stored: u32, actual: u32 },
    Samples {
        category: Category,
        stored: u32,
        actual: u32,
    },
    Average {
        category: Category,
        stored: Option<f64>,
        recomputed: Option<f64>,
    },
    OverallRating {
        stored: Option<f64>,
        recomputed: Option<f64>,
    },
}

/// Result of auditing one venue
#[derive(Debug, Clone, PartialEq)]
pub struct AuditReport {
    pub venue_id: VenueId,
    pub drift: Vec<Drift>,
}

impl AuditReport {
    pub fn is_consistent(&self) -> bool {
        self.drift.is_empty()
    }
}

impl<S: Store + ?Sized> ConsistencyCoordinator<S> {
    /// Compare a venue's stored aggregate with its reviews
    ///
    /// # Errors
    ///
    /// `NotFound` if neither the venue nor any review for it exists.
    pub fn audit_venue(&self, venue_id: &VenueId) -> TallyResult<AuditReport> {
        let stored = self.store().find_venue(venue_id)?.map(Versioned::into_value);
        let reviews = self.store().reviews_for_venue(venue_id)?;

        let drift = match stored {
            None if reviews.is_empty() => {
                return Err(TallyError::venue_not_found(venue_id.clone()));
            }
            None => vec![Drift::MissingVenue {
                review_count: reviews.len() as u32,
            }],
            Some(venue) => self.compare(&venue, &reviews),
        };

        let report = AuditReport {
            venue_id: venue_id.clone(),
            drift,
        };
        if !report.is_consistent() {
            tracing::warn!(
                venue_id = %venue_id,
                drift = ?report.drift,
                "Venue aggregate drifted from its reviews"
            );
        }
        Ok(report)
    }

    /// Audit every stored venue
    pub fn audit_all(&self) -> TallyResult<Vec<AuditReport>> {
        self.store()
            .list_venues()?
            .iter()
            .map(|venue| self.audit_venue(&venue.id))
            .collect()
    }

    fn compare(&self, venue: &Venue, reviews: &[Review]) -> Vec<Drift> {
        let mut drift = Vec::new();

        let actual_count = reviews.len() as u32;
        if venue.review_count != actual_count {
            drift.push(Drift::ReviewCount {
                stored: venue.review_count,
                actual: actual_count,
            });
        }

        let actual_samples = CategorySamples::from_fn(|c| {
            reviews
                .iter()
                .filter(|r| r.ratings.get(c).is_some())
                .count() as u32
        });

        for category in Category::ALL {
            let stored = venue.samples.get(category);
            let actual = actual_samples.get(category);
            if stored != actual {
                drift.push(Drift::Samples {
                    category,
                    stored,
                    actual,
                });
            }

            let stored_avg = venue.averages.get(category);
            let recomputed =
                average_ignoring_absent(reviews.iter().map(|r| r.ratings.get(category)));
            let presence_differs = stored_avg.is_some() != recomputed.is_some();
            let value_differs = self.builder().mode() == AveragingMode::CountWeighted
                && matches!((stored_avg, recomputed), (Some(a), Some(b))
                    if (a - b).abs() > self.config().audit_tolerance);
            if presence_differs || value_differs {
                drift.push(Drift::Average {
                    category,
                    stored: stored_avg,
                    recomputed,
                });
            }
        }

        let recomputed_overall = venue.averages.overall();
        if venue.overall_rating != recomputed_overall {
            drift.push(Drift::OverallRating {
                stored: venue.overall_rating,
                recomputed: recomputed_overall,
            });
        }

        drift
    }
}
