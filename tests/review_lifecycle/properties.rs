//! Property tests over random review sequences

use proptest::prelude::*;
use proptest::sample::Index;

use crate::test_utils::*;
use tally::{AveragingMode, Category, CategoryRatings, EngineConfig, Tally, Venue, VenueId};

const TOLERANCE: f64 = 0.01 + 1e-9;

fn rating() -> impl Strategy<Value = Option<f64>> {
    proptest::option::of((0u32..=500).prop_map(|hundredths| hundredths as f64 / 100.0))
}

fn category_ratings() -> impl Strategy<Value = CategoryRatings> {
    (rating(), rating(), rating()).prop_map(|(bloody, burger, beers)| ratings(bloody, burger, beers))
}

fn mode() -> impl Strategy<Value = AveragingMode> {
    prop_oneof![Just(AveragingMode::Pairwise), Just(AveragingMode::CountWeighted)]
}

fn engine(mode: AveragingMode) -> Tally {
    Tally::open(EngineConfig::new().averaging(mode)).unwrap()
}

fn assert_close(before: &Venue, after: &Venue) {
    assert_eq!(before.review_count, after.review_count);
    assert_eq!(before.samples, after.samples);
    for category in Category::ALL {
        match (before.averages.get(category), after.averages.get(category)) {
            (Some(a), Some(b)) => assert!(
                (a - b).abs() <= TOLERANCE,
                "{} drifted from {} to {}",
                category,
                a,
                b
            ),
            (a, b) => assert_eq!(a, b, "{} presence changed", category),
        }
    }
    assert!(after.overall_is_consistent());
}

#[derive(Debug, Clone)]
enum Op {
    Add(CategoryRatings),
    Remove(Index),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => category_ratings().prop_map(Op::Add),
        1 => any::<Index>().prop_map(Op::Remove),
    ]
}

proptest! {
    #[test]
    fn prop_review_count_equals_additions(
        mode in mode(),
        reviews in proptest::collection::vec(category_ratings(), 1..40),
    ) {
        let tally = engine(mode);
        for (n, r) in reviews.iter().enumerate() {
            tally.add_review(review_for("p1", *r)).unwrap();
            let venue = tally.venue(&VenueId::new("p1")).unwrap();
            prop_assert_eq!(venue.review_count as usize, n + 1);
        }
    }

    #[test]
    fn prop_overall_consistent_after_every_operation(
        mode in mode(),
        ops in proptest::collection::vec(op(), 1..40),
    ) {
        let tally = engine(mode);
        let venue_id = VenueId::new("p1");
        let mut live = Vec::new();

        for op in ops {
            match op {
                Op::Add(r) => {
                    let review = review_for("p1", r);
                    live.push(review.id);
                    tally.add_review(review).unwrap();
                }
                Op::Remove(index) if !live.is_empty() => {
                    let id = live.remove(index.index(live.len()));
                    tally.remove_review(&id).unwrap();
                }
                Op::Remove(_) => continue,
            }

            match tally.venue(&venue_id) {
                Ok(venue) => {
                    prop_assert!(venue.overall_is_consistent());
                    prop_assert_eq!(venue.review_count as usize, live.len());
                    for category in Category::ALL {
                        prop_assert_eq!(
                            venue.averages.get(category).is_some(),
                            venue.samples.get(category) > 0
                        );
                    }
                }
                Err(e) => {
                    prop_assert!(e.is_not_found());
                    prop_assert!(live.is_empty());
                }
            }
        }
    }

    #[test]
    fn prop_add_then_remove_on_fresh_venue_deletes_it(
        mode in mode(),
        r in category_ratings(),
    ) {
        let tally = engine(mode);
        let review = review_for("p1", r);
        tally.add_review(review.clone()).unwrap();
        tally.remove_review(&review.id).unwrap();

        prop_assert!(tally.venue(&VenueId::new("p1")).unwrap_err().is_not_found());
        prop_assert!(tally.reviews_for_venue(&VenueId::new("p1")).unwrap().is_empty());
    }

    #[test]
    fn prop_pairwise_add_then_remove_restores_single_review_venue(
        existing in category_ratings(),
        added in category_ratings(),
    ) {
        let tally = engine(AveragingMode::Pairwise);
        tally.add_review(review_for("p1", existing)).unwrap();
        let before = tally.venue(&VenueId::new("p1")).unwrap();

        let review = review_for("p1", added);
        tally.add_review(review.clone()).unwrap();
        tally.remove_review(&review.id).unwrap();

        assert_close(&before, &tally.venue(&VenueId::new("p1")).unwrap());
    }

    #[test]
    fn prop_count_weighted_add_then_remove_restores_venue(
        existing in proptest::collection::vec(category_ratings(), 1..10),
        added in category_ratings(),
    ) {
        let tally = engine(AveragingMode::CountWeighted);
        for r in existing {
            tally.add_review(review_for("p1", r)).unwrap();
        }
        let before = tally.venue(&VenueId::new("p1")).unwrap();

        let review = review_for("p1", added);
        tally.add_review(review.clone()).unwrap();
        tally.remove_review(&review.id).unwrap();

        assert_close(&before, &tally.venue(&VenueId::new("p1")).unwrap());
    }
}
