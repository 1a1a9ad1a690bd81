/// Snapshot type stored in the history log.
use chrono::{DateTime, Utc};

/// An immutable snapshot of the tracked value plus its capture time.
///
/// The value is an owned clone, independent of the live state.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry<T> {
    value: T,
    timestamp: DateTime<Utc>,
}

impl<T> HistoryEntry<T> {
    /// Captures `value` stamped with the current wall-clock time.
    pub fn capture(value: T) -> Self {
        Self::with_timestamp(value, Utc::now())
    }

    pub fn with_timestamp(value: T, timestamp: DateTime<Utc>) -> Self {
        Self { value, timestamp }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    /// When the snapshot was committed to history.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn into_value(self) -> T {
        self.value
    }
}
