//! Worked examples of AddReview and RemoveReview

use crate::test_utils::*;
use tally::{AveragingMode, EngineConfig, Tally, Venue, VenueChange, VenueId};

// =============================================================================
// AddReview
// =============================================================================

#[test]
fn test_first_review_creates_venue() {
    init_tracing();
    let tally = Tally::in_memory();

    let r = review_for("p1", ratings(Some(5.0), Some(5.0), None));
    let receipt = tally.add_review(r.clone()).unwrap();
    assert_eq!(receipt.change, VenueChange::Created);
    assert_eq!(receipt.review_id, r.id);

    let venue = tally.venue(&VenueId::new("p1")).unwrap();
    assert_eq!(venue.review_count, 1);
    assert_eq!(venue.averages.bloody, Some(5.0));
    assert_eq!(venue.averages.burger, Some(5.0));
    assert_eq!(venue.averages.beers, None);
    assert_eq!(venue.overall_rating, Some(5.0));
    assert_eq!(venue.name, "The Local");

    assert_eq!(tally.review(&r.id).unwrap(), r);
}

#[test]
fn test_second_review_updates_pairwise_average() {
    init_tracing();
    let tally = Tally::in_memory();
    tally
        .add_review(review_for("p1", ratings(Some(2.0), Some(2.0), None)))
        .unwrap();

    let receipt = tally
        .add_review(review_for("p1", ratings(Some(1.0), Some(1.0), None)))
        .unwrap();
    assert_eq!(receipt.change, VenueChange::Updated);

    let venue = tally.venue(&VenueId::new("p1")).unwrap();
    assert_eq!(venue.averages.bloody, Some(1.5));
    assert_eq!(venue.averages.burger, Some(1.5));
    assert_eq!(venue.overall_rating, Some(1.5));
    assert_eq!(venue.review_count, 2);
}

#[test]
fn test_first_review_values_are_rounded() {
    let tally = Tally::in_memory();
    tally
        .add_review(review_for("p1", ratings(Some(3.333), Some(4.0), None)))
        .unwrap();

    let venue = tally.venue(&VenueId::new("p1")).unwrap();
    assert_eq!(venue.averages.bloody, Some(3.33));
    assert_eq!(venue.overall_rating, Some(3.67));
}

#[test]
fn test_new_category_starts_from_review_value() {
    let tally = Tally::in_memory();
    tally
        .add_review(review_for("p1", ratings(Some(4.0), None, None)))
        .unwrap();
    tally
        .add_review(review_for("p1", ratings(None, None, Some(2.0))))
        .unwrap();

    let venue = tally.venue(&VenueId::new("p1")).unwrap();
    assert_eq!(venue.averages.bloody, Some(4.0));
    assert_eq!(venue.averages.beers, Some(2.0));
    assert_eq!(venue.overall_rating, Some(3.0));
}

// =============================================================================
// RemoveReview
// =============================================================================

#[test]
fn test_remove_review_from_three_review_venue() {
    init_tracing();
    let tally = Tally::in_memory();
    let doomed = review_for("p1", ratings(Some(3.0), Some(2.0), None));
    let venue = Venue::with_aggregate(
        VenueId::new("p1"),
        "The Local",
        ratings(Some(2.0), Some(2.66), None),
        3,
    );
    seed(&tally, venue, vec![doomed.clone()]);

    let receipt = tally.remove_review(&doomed.id).unwrap();
    assert_eq!(receipt.change, VenueChange::Updated);

    let venue = tally.venue(&VenueId::new("p1")).unwrap();
    assert_eq!(venue.averages.bloody, Some(1.5));
    assert_eq!(venue.averages.burger, Some(2.99));
    assert_eq!(venue.overall_rating, Some(2.25));
    assert_eq!(venue.review_count, 2);
    assert!(tally.review(&doomed.id).unwrap_err().is_not_found());
}

#[test]
fn test_removing_only_review_deletes_venue() {
    init_tracing();
    let tally = Tally::in_memory();
    let only = review_for("p1", ratings(Some(4.0), None, Some(3.0)));
    tally.add_review(only.clone()).unwrap();

    let receipt = tally.remove_review(&only.id).unwrap();
    assert_eq!(receipt.change, VenueChange::Deleted);

    assert!(tally.venue(&VenueId::new("p1")).unwrap_err().is_not_found());
    assert!(tally.review(&only.id).unwrap_err().is_not_found());
    assert!(tally.list_venues().unwrap().is_empty());
    assert_eq!(tally.store().review_count(), 0);
}

#[test]
fn test_category_becomes_absent_with_its_last_rating() {
    let tally = Tally::in_memory();
    tally
        .add_review(review_for("p1", ratings(Some(4.0), None, None)))
        .unwrap();
    let beers = review_for("p1", ratings(Some(2.0), None, Some(5.0)));
    tally.add_review(beers.clone()).unwrap();

    tally.remove_review(&beers.id).unwrap();
    let venue = tally.venue(&VenueId::new("p1")).unwrap();
    assert_eq!(venue.averages.beers, None);
    assert_eq!(venue.samples.beers, 0);
    assert_eq!(venue.overall_rating, venue.averages.bloody);
}

// =============================================================================
// Absent versus zero
// =============================================================================

#[test]
fn test_absent_category_not_in_denominator() {
    let tally = Tally::in_memory();
    tally
        .add_review(review_for("p1", ratings(Some(4.0), None, None)))
        .unwrap();
    assert_eq!(
        tally.venue(&VenueId::new("p1")).unwrap().overall_rating,
        Some(4.0)
    );
}

#[test]
fn test_zero_category_counts_in_denominator() {
    let tally = Tally::in_memory();
    tally
        .add_review(review_for("p1", ratings(Some(4.0), Some(0.0), None)))
        .unwrap();
    let venue = tally.venue(&VenueId::new("p1")).unwrap();
    assert_eq!(venue.averages.burger, Some(0.0));
    assert_eq!(venue.overall_rating, Some(2.0));
}

#[test]
fn test_review_without_ratings_has_no_overall() {
    let tally = Tally::in_memory();
    tally
        .add_review(review_for("p1", ratings(None, None, None)))
        .unwrap();
    let venue = tally.venue(&VenueId::new("p1")).unwrap();
    assert_eq!(venue.review_count, 1);
    assert_eq!(venue.overall_rating, None);
}

// =============================================================================
// Count-weighted averaging
// =============================================================================

#[test]
fn test_count_weighted_tracks_true_mean() {
    let tally = Tally::open(EngineConfig::new().averaging(AveragingMode::CountWeighted)).unwrap();
    let mut ids = Vec::new();
    for v in [1.0, 2.0, 3.0, 5.0] {
        let r = review_for("p1", ratings(Some(v), None, None));
        ids.push(r.id);
        tally.add_review(r).unwrap();
    }
    assert_eq!(
        tally.venue(&VenueId::new("p1")).unwrap().averages.bloody,
        Some(2.75)
    );

    // drop the 5.0
    tally.remove_review(&ids[3]).unwrap();
    assert_eq!(
        tally.venue(&VenueId::new("p1")).unwrap().averages.bloody,
        Some(2.0)
    );
    assert!(tally
        .audit_venue(&VenueId::new("p1"))
        .unwrap()
        .is_consistent());
}

// =============================================================================
// Reads
// =============================================================================

#[test]
fn test_reviews_for_venue_lists_only_that_venue() {
    let tally = Tally::in_memory();
    let a = review_for("p1", ratings(Some(1.0), None, None));
    let b = review_for("p1", ratings(Some(2.0), None, None));
    tally.add_review(a.clone()).unwrap();
    tally.add_review(b.clone()).unwrap();
    tally
        .add_review(review_for("p2", ratings(Some(3.0), None, None)))
        .unwrap();

    let ids: Vec<_> = tally
        .reviews_for_venue(&VenueId::new("p1"))
        .unwrap()
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&a.id));
    assert!(ids.contains(&b.id));

    let venues: Vec<_> = tally
        .list_venues()
        .unwrap()
        .into_iter()
        .map(|v| v.id)
        .collect();
    assert_eq!(venues, vec![VenueId::new("p1"), VenueId::new("p2")]);
    assert!(tally.audit_all().unwrap().iter().all(|r| r.is_consistent()));
}
