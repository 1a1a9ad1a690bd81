/// Core undo/redo tracker over a single primary state value.
///
/// The tracker consumes change notifications from a `PrimaryState`, records
/// each distinct value as a `HistoryEntry`, and navigates the log by writing
/// the selected snapshot back to the state. Navigation writes are tagged with
/// a `WriteId` so their own notifications are never recorded again.
use std::time::{Duration, Instant};

use anyhow::{bail, Result};

use crate::cell::{Change, Origin, PrimaryState, StateCell, WriteId};
use crate::config::TrackerConfig;
use crate::debounce::Debouncer;
use crate::entry::HistoryEntry;

/// Linear, capacity-bounded undo/redo history for one tracked value.
///
/// `T` is the tracked value; `Clone` is the snapshot contract and
/// `PartialEq` is the deduplication contract. `S` is the primary state cell,
/// owned by the tracker and reachable through `state()` / `state_mut()`.
pub struct HistoryTracker<T, S = StateCell<T>> {
    /// Primary state cell being tracked.
    state: S,
    /// History log, oldest first. Never longer than `config.capacity`.
    log: Vec<HistoryEntry<T>>,
    /// Index of the active entry; 0 when the log is empty.
    pointer: usize,
    config: TrackerConfig,
    /// Holds the latest notification while the debounce window is open.
    debouncer: Debouncer<Change<T>>,
    /// Last `WriteId` handed out. Ids at or below this were issued here.
    last_write_id: WriteId,
    /// Navigation write whose notification has not been seen yet.
    in_flight: Option<WriteId>,
}

impl<T, S> std::fmt::Debug for HistoryTracker<T, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryTracker")
            .field("len", &self.log.len())
            .field("pointer", &self.pointer)
            .field("config", &self.config)
            .field("pending", &self.debouncer.is_pending())
            .field("last_write_id", &self.last_write_id)
            .field("in_flight", &self.in_flight)
            .finish()
    }
}

impl<T: Clone + PartialEq> HistoryTracker<T, StateCell<T>> {
    /// Creates a tracker over a fresh in-memory `StateCell` holding `value`.
    pub fn with_value(value: T, config: TrackerConfig) -> Self {
        Self::new(StateCell::new(value), config)
    }
}

impl<T, S> HistoryTracker<T, S>
where
    T: Clone + PartialEq,
    S: PrimaryState<T>,
{
    /// Starts tracking `state`.
    ///
    /// The current value is delivered as the first observation, so with no
    /// debounce it becomes entry 0 immediately. Notifications already queued
    /// on the cell predate the tracker and are discarded.
    pub fn new(state: S, config: TrackerConfig) -> Self {
        Self::new_at(state, config, Instant::now())
    }

    /// Like `new`, with the mount observation scheduled at `now`.
    pub fn new_at(mut state: S, mut config: TrackerConfig, now: Instant) -> Self {
        config.sanitize();

        let stale = state.take_changes();
        if !stale.is_empty() {
            tracing::trace!("Discarding {} notification(s) queued before tracking", stale.len());
        }
        let initial = Change::external(state.read(), state.version());

        let mut tracker = Self {
            state,
            log: Vec::new(),
            pointer: 0,
            debouncer: Debouncer::new(config.debounce()),
            config,
            last_write_id: 0,
            in_flight: None,
        };
        tracker.notify_at(initial, now);
        tracker
    }

    // --- Notification intake ---

    /// Delivers one raw change notification, timestamped now.
    pub fn notify(&mut self, change: Change<T>) -> bool {
        self.notify_at(change, Instant::now())
    }

    /// Delivers one raw change notification received at `now`.
    ///
    /// Without debounce the change is observed synchronously. Otherwise it
    /// replaces any pending observation and restarts the quiet period.
    /// Returns whether an entry was recorded.
    pub fn notify_at(&mut self, change: Change<T>, now: Instant) -> bool {
        if self.config.debounce_ms == 0 {
            if let Some(stale) = self.debouncer.take() {
                self.settle(&stale);
            }
            return self.observe(change);
        }

        if let Some(replaced) = self.debouncer.schedule(change, now) {
            tracing::trace!("Debounced change v{} superseded", replaced.version);
            self.settle(&replaced);
        }
        false
    }

    /// Fires the pending observation if its quiet period has elapsed.
    pub fn poll(&mut self) -> bool {
        self.poll_at(Instant::now())
    }

    /// Fires the pending observation if its deadline is at or before `now`.
    pub fn poll_at(&mut self, now: Instant) -> bool {
        match self.debouncer.fire_due(now) {
            Some(change) => self.observe(change),
            None => false,
        }
    }

    /// Drains the cell's notification channel and polls the debouncer.
    ///
    /// This is the hook a host event loop calls after each turn.
    pub fn pump(&mut self) -> bool {
        self.pump_at(Instant::now())
    }

    /// Like `pump`, treating every drained notification as received at `now`.
    pub fn pump_at(&mut self, now: Instant) -> bool {
        let mut recorded = false;
        for change in self.state.take_changes() {
            recorded |= self.notify_at(change, now);
        }
        recorded | self.poll_at(now)
    }

    /// Commits the pending observation immediately, ignoring its deadline.
    pub fn flush(&mut self) -> bool {
        match self.debouncer.take() {
            Some(change) => self.observe(change),
            None => false,
        }
    }

    /// Drops the pending observation, if any.
    pub fn cancel_pending(&mut self) -> bool {
        match self.debouncer.take() {
            Some(change) => {
                self.settle(&change);
                true
            }
            None => false,
        }
    }

    /// Stops tracking and hands back the state cell.
    ///
    /// Any pending observation is cancelled, so nothing fires after disposal.
    pub fn dispose(mut self) -> S {
        if self.cancel_pending() {
            tracing::debug!("Cancelled pending history observation on dispose");
        }
        self.state
    }

    /// Decides whether `change` becomes a new history entry.
    ///
    /// Navigation writes issued by this tracker are swallowed. Values equal
    /// to the most recent entry are discarded. Anything else truncates the
    /// redo branch, is appended, and evicts the oldest entries over capacity.
    /// Returns whether an entry was recorded.
    pub fn observe(&mut self, change: Change<T>) -> bool {
        if self.is_own_navigation(&change) {
            self.settle(&change);
            tracing::trace!("Ignoring navigation write v{}", change.version);
            return false;
        }

        if self
            .log
            .last()
            .is_some_and(|last| *last.value() == change.value)
        {
            tracing::trace!("Change v{} matches latest entry, skipping", change.version);
            return false;
        }

        self.log.truncate(self.pointer + 1);
        self.log.push(HistoryEntry::capture(change.value));
        self.evict_overflow();
        self.pointer = self.log.len() - 1;

        tracing::debug!(
            "Recorded history entry {} (v{}, {} total)",
            self.pointer,
            change.version,
            self.log.len()
        );
        true
    }

    // --- Navigation ---

    /// Steps back one entry. Returns `false` if there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        if !self.can_undo() {
            return false;
        }
        self.jump_to(self.pointer - 1).is_ok()
    }

    /// Steps forward one entry. Returns `false` if there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        if !self.can_redo() {
            return false;
        }
        self.jump_to(self.pointer + 1).is_ok()
    }

    /// Writes entry `index` back to the primary state and points at it.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is outside the log. Nothing is changed
    /// in that case.
    pub fn jump_to(&mut self, index: usize) -> Result<()> {
        let Some(entry) = self.log.get(index) else {
            bail!(
                "History index {index} out of range (length {})",
                self.log.len()
            );
        };
        let value = entry.value().clone();

        self.last_write_id += 1;
        let id = self.last_write_id;
        self.in_flight = Some(id);
        self.pointer = index;
        self.state.write(value, Origin::Navigation(id));

        tracing::debug!("Jumped to history entry {index} (write #{id})");
        Ok(())
    }

    /// Clears the log. The live value is left untouched.
    pub fn reset(&mut self) {
        self.log.clear();
        self.pointer = 0;
        tracing::debug!("History reset");
    }

    pub fn can_undo(&self) -> bool {
        self.pointer > 0
    }

    pub fn can_redo(&self) -> bool {
        self.pointer + 1 < self.log.len()
    }

    // --- Configuration ---

    /// Changes the capacity (clamped to at least 1), evicting the oldest
    /// entries right away if the log no longer fits.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.config.capacity = capacity;
        self.config.sanitize();
        self.evict_overflow();
    }

    /// Changes the debounce window. A pending observation keeps its
    /// schedule time and is re-evaluated against the new window.
    pub fn set_debounce(&mut self, debounce: Duration) {
        self.config.debounce_ms = u64::try_from(debounce.as_millis()).unwrap_or(u64::MAX);
        self.debouncer.set_delay(self.config.debounce());
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    // --- Accessors ---

    /// Read-only view of the log, oldest first.
    pub fn history(&self) -> &[HistoryEntry<T>] {
        &self.log
    }

    pub fn pointer(&self) -> usize {
        self.pointer
    }

    /// The active entry, if any.
    pub fn current(&self) -> Option<&HistoryEntry<T>> {
        self.log.get(self.pointer)
    }

    pub fn len(&self) -> usize {
        self.log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    /// Mutable access to the state cell for external edits.
    ///
    /// Writes made here are only seen once their notifications are pumped.
    pub fn state_mut(&mut self) -> &mut S {
        &mut self.state
    }

    /// External write to the primary state.
    pub fn set(&mut self, value: T) {
        self.state.write(value, Origin::External);
    }

    /// Whether a debounced observation is waiting for its quiet period.
    pub fn has_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Whether a navigation write is still waiting for its notification.
    pub fn is_suppressing(&self) -> bool {
        self.in_flight.is_some()
    }

    // --- Internals ---

    fn is_own_navigation(&self, change: &Change<T>) -> bool {
        matches!(change.origin, Origin::Navigation(id) if id <= self.last_write_id)
    }

    /// Marks a delivered navigation notification as seen, whether it was
    /// observed or coalesced away.
    fn settle(&mut self, change: &Change<T>) {
        if let Origin::Navigation(id) = change.origin {
            if self.in_flight == Some(id) {
                self.in_flight = None;
            }
        }
    }

    /// Drops the oldest entries beyond capacity, shifting the pointer.
    fn evict_overflow(&mut self) {
        if self.log.len() <= self.config.capacity {
            return;
        }
        let excess = self.log.len() - self.config.capacity;
        self.log.drain(..excess);
        self.pointer = self.pointer.saturating_sub(excess);
        tracing::trace!("Evicted {excess} oldest history entries");
    }
}
