//! Commit-time validation of conditional writes
//!
//! Before a batch is applied every operation is checked against the current
//! record versions:
//! - An expected version must equal the current version (0 = absent)
//! - Update and delete require the record to exist
//!
//! All conflicts are collected, but a single one is enough to reject the
//! whole batch. Nothing is written if validation fails.

use tally_core::StoreError;

use crate::batch::WriteBatch;
use crate::record::RecordKey;

/// Source of current record versions
pub trait VersionSource {
    /// Current version of `key`, or 0 if the record does not exist
    fn current_version(&self, key: &RecordKey) -> u64;
}

/// Types of conflicts that can occur during batch validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictType {
    /// Expected version doesn't match the current version
    VersionMismatch {
        /// The key with the conflict
        key: RecordKey,
        /// Version the writer expected
        expected_version: u64,
        /// Current version in the store at validation time
        current_version: u64,
    },

    /// Update or delete of a record that does not exist
    MissingRecord {
        /// The key that was not found
        key: RecordKey,
    },
}

impl ConflictType {
    /// Convert to the store error reported to callers
    pub fn into_error(self) -> StoreError {
        match self {
            ConflictType::VersionMismatch {
                key,
                expected_version,
                current_version,
            } => StoreError::Conflict {
                entity: key.to_entity(),
                expected: expected_version,
                actual: current_version,
            },
            ConflictType::MissingRecord { key } => StoreError::MissingRecord {
                entity: key.to_entity(),
            },
        }
    }
}

/// Result of batch validation
///
/// A batch commits only if no conflict was found.
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// All conflicts detected during validation
    pub conflicts: Vec<ConflictType>,
}

impl ValidationResult {
    /// Create a successful validation result (no conflicts)
    pub fn ok() -> Self {
        ValidationResult {
            conflicts: Vec::new(),
        }
    }

    /// Get the number of conflicts
    pub fn conflict_count(&self) -> usize {
        self.conflicts.len()
    }

    /// First conflict as a store error, if any
    pub fn into_result(self) -> Result<(), StoreError> {
        match self.conflicts.into_iter().next() {
            None => Ok(()),
            Some(conflict) => Err(conflict.into_error()),
        }
    }
}

/// Validate every operation in `batch` against `source`
pub fn validate_batch<S: VersionSource + ?Sized>(batch: &WriteBatch, source: &S) -> ValidationResult {
    let mut result = ValidationResult::ok();

    for op in batch.ops() {
        let key = op.key();
        let current_version = source.current_version(&key);

        if let Some(expected_version) = op.expected_version() {
            if expected_version != current_version {
                result.conflicts.push(ConflictType::VersionMismatch {
                    key,
                    expected_version,
                    current_version,
                });
                continue;
            }
        }

        if op.requires_existing() && current_version == 0 {
            result.conflicts.push(ConflictType::MissingRecord { key });
        }
    }

    result
}
