//! Record storage for the Tally review aggregation engine
//!
//! Defines the interfaces the engine depends on and an in-memory backend:
//! - [`RecordStore`]: point lookups and scans over venues and reviews
//! - [`TransactionalStore`]: atomic commit of a [`WriteBatch`]
//! - [`MemoryStore`]: both, behind a single lock
//!
//! Conditional writes are validated at commit time by the [`validation`]
//! module; a rejected batch writes nothing.

pub mod batch;
pub mod memory;
pub mod record;
pub mod traits;
pub mod validation;

pub use batch::{WriteBatch, WriteOp};
pub use memory::MemoryStore;
pub use record::{Record, RecordKey, Versioned};
pub use traits::{RecordStore, Store, TransactionalStore};
pub use validation::{validate_batch, ConflictType, ValidationResult, VersionSource};
