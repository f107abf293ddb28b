//! The host boundary.
//!
//! The engine consumes a [`Host`]: load/save calls, a native file
//! dialogue, a config read, and a stream of push events. Timestamps on
//! reload events come from a monotonic counter owned by the host, never
//! from wall-clock time, so the strict-greater staleness rule in the
//! pipeline is well defined.

mod fs;
mod watcher;

pub use fs::FsHost;
pub use watcher::FileWatcher;

use crate::config::HostConfig;
use crate::error::Result;

/// Events pushed from the host into the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// A document was opened or changed externally; the sole trigger for an
    /// external reload.
    FileOpened {
        /// Full document text.
        content: String,
        /// Monotonic revision from the host's counter.
        timestamp: u64,
    },
    /// The user requested an explicit save; triggers an immediate flush.
    FileSave,
}

/// The application hosting the engine.
pub trait Host {
    /// Return the full current document as markdown.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Load`](crate::error::Error::Load) with a
    /// human-readable cause when the content cannot be produced.
    fn load(&mut self) -> Result<String>;

    /// Persist the full document text.
    ///
    /// # Errors
    ///
    /// Returns a host I/O error; the caller keeps its in-memory state so no
    /// work is lost.
    fn save(&mut self, content: &str) -> Result<()>;

    /// Receive the debounced incremental update from the pipeline.
    ///
    /// # Errors
    ///
    /// Returns a host I/O error; the pipeline reschedules and retries.
    fn handle_update_content(&mut self, content: &str) -> Result<()>;

    /// Trigger a native file picker. The result arrives asynchronously as a
    /// [`HostEvent::FileOpened`] event, not a return value.
    ///
    /// # Errors
    ///
    /// Returns a host I/O error when the dialogue cannot be shown.
    fn open_file_dialogue(&mut self) -> Result<()>;

    /// Configuration for the presentation layer, read once at startup.
    fn get_config(&self) -> HostConfig;

    /// Next value of the host's monotonic revision counter.
    fn next_timestamp(&mut self) -> u64;

    /// Poll for a pushed event, if one is ready.
    fn poll_event(&mut self) -> Option<HostEvent>;
}
