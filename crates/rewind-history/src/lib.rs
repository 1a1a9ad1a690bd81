/// Undo/redo history for a single tracked value.
///
/// Provides a `HistoryTracker` that watches a primary state cell for
/// changes, records deduplicated snapshots into a capacity-bounded log,
/// and navigates that log by writing old snapshots back to the cell.
/// Captures can optionally be coalesced with a debounce window.
pub mod cell;
pub mod config;
pub mod debounce;
pub mod entry;
pub mod tracker;

pub use cell::{Change, Origin, PrimaryState, StateCell, WriteId};
pub use config::TrackerConfig;
pub use debounce::Debouncer;
pub use entry::HistoryEntry;
pub use tracker::HistoryTracker;
