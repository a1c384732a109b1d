//! Consistency engine for the Tally review aggregation service
//!
//! [`ConsistencyCoordinator`] runs the AddReview and RemoveReview workflows
//! against any [`Store`](tally_storage::Store), keeping each venue's
//! aggregate in step with its reviews through one atomic commit per
//! operation.

pub mod audit;
pub mod config;
pub mod coordinator;
pub mod locks;

pub use audit::{AuditReport, Drift};
pub use config::{ConfigError, EngineConfig};
pub use coordinator::{AddPlan, CommitReceipt, ConsistencyCoordinator, RemovePlan, VenueChange};
pub use locks::VenueLocks;
