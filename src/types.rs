//! Public types for the Tally API.
//!
//! This module re-exports types from internal crates with a clean public interface.

// ============================================================================
// Data model
// ============================================================================

// Identifiers
pub use tally_core::{AuthorId, ReviewId, VenueId};

// Ratings
pub use tally_core::{Category, CategoryRatings, CategorySamples, PerCategory};

// Records
pub use tally_core::{Review, Venue};

// Averaging mode for configuration
pub use tally_core::AveragingMode;

// ============================================================================
// Errors
// ============================================================================

pub use tally_core::{EntityRef, StoreError, StoreResult, TallyError, TallyResult};
pub use tally_engine::ConfigError;

// ============================================================================
// Engine
// ============================================================================

pub use tally_engine::{AuditReport, CommitReceipt, Drift, EngineConfig, VenueChange};

// ============================================================================
// Storage
// ============================================================================

pub use tally_storage::{MemoryStore, RecordStore, Store, TransactionalStore, Versioned};
