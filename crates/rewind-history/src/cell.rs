/// The primary state seam: the value being tracked and its change channel.
///
/// Every write carries an `Origin` tag that travels with the resulting
/// `Change` notification, so the tracker can tell its own navigation writes
/// apart from external edits without relying on delivery order.
use std::collections::VecDeque;

/// Identifier of a navigation write issued by a tracker.
///
/// Monotonic per tracker, starting at 1.
pub type WriteId = u64;

/// Who performed a write to the primary state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Any write not issued by the tracker (user edits, programmatic sets).
    External,
    /// A write issued by `HistoryTracker::jump_to` (undo/redo included).
    Navigation(WriteId),
}

/// A value-changed notification delivered through the cell's channel.
#[derive(Debug, Clone, PartialEq)]
pub struct Change<T> {
    /// The value after the write.
    pub value: T,
    /// The cell's write counter after the write.
    pub version: u64,
    pub origin: Origin,
}

impl<T> Change<T> {
    /// Builds an externally-originated notification.
    pub fn external(value: T, version: u64) -> Self {
        Self {
            value,
            version,
            origin: Origin::External,
        }
    }

    pub fn is_navigation(&self) -> bool {
        matches!(self.origin, Origin::Navigation(_))
    }
}

/// A mutable value with a change-notification channel.
///
/// Implementations must emit one `Change` per `write`, in write order, even
/// when the written value equals the previous one.
pub trait PrimaryState<T> {
    /// Returns a copy of the current value.
    fn read(&self) -> T;

    /// Replaces the current value and queues a notification tagged `origin`.
    fn write(&mut self, value: T, origin: Origin);

    /// Monotonic write counter; identifies the current value reference.
    fn version(&self) -> u64;

    /// Drains queued notifications, oldest first.
    fn take_changes(&mut self) -> Vec<Change<T>>;
}

/// In-memory primary state cell with a FIFO notification queue.
#[derive(Debug, Clone)]
pub struct StateCell<T> {
    value: T,
    version: u64,
    pending: VecDeque<Change<T>>,
}

impl<T: Clone> StateCell<T> {
    /// Creates a cell holding `value` at version 0 with no queued changes.
    pub fn new(value: T) -> Self {
        Self {
            value,
            version: 0,
            pending: VecDeque::new(),
        }
    }

    /// Borrows the current value.
    pub fn get(&self) -> &T {
        &self.value
    }

    /// External write.
    pub fn set(&mut self, value: T) {
        self.write(value, Origin::External);
    }

    /// Number of notifications not yet drained.
    pub fn pending_changes(&self) -> usize {
        self.pending.len()
    }
}

impl<T: Clone> PrimaryState<T> for StateCell<T> {
    fn read(&self) -> T {
        self.value.clone()
    }

    fn write(&mut self, value: T, origin: Origin) {
        self.version += 1;
        self.pending.push_back(Change {
            value: value.clone(),
            version: self.version,
            origin,
        });
        self.value = value;
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn take_changes(&mut self) -> Vec<Change<T>> {
        self.pending.drain(..).collect()
    }
}

impl<T: Clone + Default> Default for StateCell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_cell_has_no_changes() {
        let mut cell = StateCell::new(5);
        assert_eq!(*cell.get(), 5);
        assert_eq!(cell.version(), 0);
        assert!(cell.take_changes().is_empty());
    }

    #[test]
    fn test_set_queues_external_change() {
        let mut cell = StateCell::new(String::from("a"));
        cell.set(String::from("b"));

        assert_eq!(cell.get(), "b");
        assert_eq!(cell.read(), "b");
        let changes = cell.take_changes();
        assert_eq!(changes, vec![Change::external(String::from("b"), 1)]);
        assert_eq!(cell.pending_changes(), 0);
    }

    #[test]
    fn test_write_preserves_origin_and_order() {
        let mut cell = StateCell::new(0);
        cell.write(1, Origin::External);
        cell.write(2, Origin::Navigation(7));
        cell.write(3, Origin::External);

        let changes = cell.take_changes();
        let origins: Vec<Origin> = changes.iter().map(|c| c.origin).collect();
        assert_eq!(
            origins,
            vec![Origin::External, Origin::Navigation(7), Origin::External]
        );
        let versions: Vec<u64> = changes.iter().map(|c| c.version).collect();
        assert_eq!(versions, vec![1, 2, 3]);
        assert!(changes[1].is_navigation());
    }

    #[test]
    fn test_identical_write_still_notifies() {
        let mut cell = StateCell::new(1);
        cell.set(1);
        cell.set(1);
        assert_eq!(cell.pending_changes(), 2);
        assert_eq!(cell.version(), 2);
    }

    #[test]
    fn test_default_cell() {
        let cell: StateCell<Vec<u8>> = StateCell::default();
        assert!(cell.get().is_empty());
    }
}
