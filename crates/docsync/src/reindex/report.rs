//! Reindex requests and reports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request to rebuild the documents of some record kinds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReindexRequest {
    /// Record kinds to reindex (None = every registered kind).
    pub kinds: Option<Vec<String>>,
}

impl ReindexRequest {
    /// Creates a request for every registered kind.
    pub fn all() -> Self {
        Self::default()
    }

    /// Creates a request for specific kinds.
    pub fn for_kinds<I, S>(kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kinds: Some(kinds.into_iter().map(Into::into).collect()),
        }
    }
}

/// A record that could not be synchronized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReindexFailure {
    /// Primary key of the record.
    pub record_id: String,
    /// Error message.
    pub error: String,
}

/// Outcome of reindexing one record kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReindexReport {
    /// Unique job identifier.
    pub job_id: String,

    /// Record kind.
    pub kind: String,

    /// Target index.
    pub index: String,

    /// Number of records read from the store.
    pub scanned: u64,

    /// Number of records synchronized.
    pub succeeded: u64,

    /// Records that failed, in scan order.
    pub failures: Vec<ReindexFailure>,

    /// When the run started.
    pub started_at: DateTime<Utc>,

    /// When the run completed.
    pub completed_at: Option<DateTime<Utc>>,
}

impl ReindexReport {
    pub(crate) fn start(kind: impl Into<String>, index: impl Into<String>) -> Self {
        Self {
            job_id: Uuid::new_v4().to_string(),
            kind: kind.into(),
            index: index.into(),
            scanned: 0,
            succeeded: 0,
            failures: Vec::new(),
            started_at: Utc::now(),
            completed_at: None,
        }
    }

    pub(crate) fn finish(mut self) -> Self {
        self.completed_at = Some(Utc::now());
        self
    }

    /// Number of failed records.
    pub fn failed(&self) -> u64 {
        self.failures.len() as u64
    }

    /// Returns true if any record failed.
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Ids of the failed records.
    pub fn failed_ids(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.record_id.as_str()).collect()
    }

    /// Wall-clock duration of the run, if it completed.
    pub fn duration(&self) -> Option<chrono::Duration> {
        self.completed_at.map(|end| end - self.started_at)
    }
}
