//! Core types and arithmetic for the Tally review aggregation engine
//!
//! This crate is pure: no I/O, no locking. It defines:
//! - Data model: [`Review`], [`Venue`], [`Category`], [`PerCategory`]
//! - Error taxonomy: [`TallyError`], [`StoreError`]
//! - Average arithmetic: the [`average`] module
//! - Aggregate construction: [`AggregateBuilder`]

pub mod aggregate;
pub mod average;
pub mod error;
pub mod types;

pub use aggregate::{AggregateBuilder, AveragingMode};
pub use error::{EntityRef, StoreError, StoreResult, TallyError, TallyResult};
pub use types::{
    AuthorId, Category, CategoryRatings, CategorySamples, PerCategory, Review, ReviewId, Venue,
    VenueId,
};
