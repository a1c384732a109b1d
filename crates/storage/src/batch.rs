//! Write batches
//!
//! A [`WriteBatch`] is an ordered sequence of put/update/delete operations
//! that a [`TransactionalStore`](crate::TransactionalStore) applies as one
//! all-or-nothing unit.
//!
//! Every operation may carry an expected version. When present, the commit is
//! rejected unless the record's current version equals it (0 = must not
//! exist). Expectations are checked against the state before the batch, so a
//! batch should touch each key at most once.

use crate::record::{Record, RecordKey};

/// A single operation in a write batch
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    /// Write a record whether or not it exists
    Put {
        record: Record,
        expected_version: Option<u64>,
    },
    /// Overwrite a record that must already exist
    Update {
        record: Record,
        expected_version: Option<u64>,
    },
    /// Remove a record that must exist
    Delete {
        key: RecordKey,
        expected_version: Option<u64>,
    },
}

impl WriteOp {
    /// Key the operation targets
    pub fn key(&self) -> RecordKey {
        match self {
            WriteOp::Put { record, .. } | WriteOp::Update { record, .. } => record.key(),
            WriteOp::Delete { key, .. } => key.clone(),
        }
    }

    pub fn expected_version(&self) -> Option<u64> {
        match self {
            WriteOp::Put {
                expected_version, ..
            }
            | WriteOp::Update {
                expected_version, ..
            }
            | WriteOp::Delete {
                expected_version, ..
            } => *expected_version,
        }
    }

    /// Whether the target record must exist at commit time
    pub fn requires_existing(&self) -> bool {
        matches!(self, WriteOp::Update { .. } | WriteOp::Delete { .. })
    }

    /// Short name for logs
    pub fn kind(&self) -> &'static str {
        match self {
            WriteOp::Put { .. } => "put",
            WriteOp::Update { .. } => "update",
            WriteOp::Delete { .. } => "delete",
        }
    }
}

/// Ordered set of operations committed atomically
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a record unconditionally
    pub fn put(mut self, record: impl Into<Record>) -> Self {
        self.ops.push(WriteOp::Put {
            record: record.into(),
            expected_version: None,
        });
        self
    }

    /// Write a record that must not exist yet
    pub fn put_new(mut self, record: impl Into<Record>) -> Self {
        self.ops.push(WriteOp::Put {
            record: record.into(),
            expected_version: Some(0),
        });
        self
    }

    /// Overwrite an existing record
    pub fn update(mut self, record: impl Into<Record>, expected_version: Option<u64>) -> Self {
        self.ops.push(WriteOp::Update {
            record: record.into(),
            expected_version,
        });
        self
    }

    /// Remove an existing record
    pub fn delete(mut self, key: RecordKey, expected_version: Option<u64>) -> Self {
        self.ops.push(WriteOp::Delete {
            key,
            expected_version,
        });
        self
    }

    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<WriteOp> {
        self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}
