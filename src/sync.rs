//! Synchronization pipeline between the in-memory document and the host.
//!
//! Local edits are buffered as pending edits and propagated to the host on
//! a trailing-edge debounce: every new edit cancels and rearms the timer,
//! so a burst of edits across any number of chunks coalesces into a single
//! update carrying the rejoined document. External reloads replace the
//! document wholesale and are rejected when their revision timestamp is not
//! strictly newer than the current one.

use std::collections::BTreeMap;

use crate::document::Document;
use crate::error::{Error, Result};
use crate::focus::FocusState;

/// Quiescence window before a pending edit is propagated to the host.
pub const FLUSH_QUIESCENCE_MS: u64 = 150;

/// An in-flight, not-yet-flushed edit to one chunk.
///
/// Lives only inside the debounce window; destroyed on flush or superseded
/// by a newer reload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEdit {
    /// Index of the edited chunk.
    pub index: usize,
    /// New raw markdown text for the chunk.
    pub text: String,
    /// Local time the edit was recorded, in milliseconds.
    pub at_ms: u64,
}

/// A cancelable trailing-edge timer.
///
/// Canceling and rearming on every new edit is the debounce mechanism
/// itself; time is passed in explicitly so expiry is deterministic.
#[derive(Debug, Clone)]
pub struct FlushDebouncer {
    delay_ms: u64,
    queued_at: Option<u64>,
}

impl FlushDebouncer {
    pub const fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            queued_at: None,
        }
    }

    /// Arm (or rearm) the timer at `now_ms`.
    pub const fn queue(&mut self, now_ms: u64) {
        self.queued_at = Some(now_ms);
    }

    /// Returns true once the quiescence window has elapsed, disarming the
    /// timer.
    pub fn take_ready(&mut self, now_ms: u64) -> bool {
        let Some(queued_at) = self.queued_at else {
            return false;
        };
        if now_ms.saturating_sub(queued_at) >= self.delay_ms {
            self.queued_at = None;
            true
        } else {
            false
        }
    }

    pub const fn cancel(&mut self) {
        self.queued_at = None;
    }

    pub const fn is_pending(&self) -> bool {
        self.queued_at.is_some()
    }
}

/// Buffers local edits and reconciles them with external reloads.
///
/// The pipeline is the sole owner of document mutation: every change goes
/// through [`local_edit`](Self::local_edit),
/// [`external_reload`](Self::external_reload), or one of the flush calls.
#[derive(Debug, Clone)]
pub struct SyncPipeline {
    debouncer: FlushDebouncer,
    pending: BTreeMap<usize, PendingEdit>,
}

impl SyncPipeline {
    /// A pipeline with the standard quiescence window.
    pub fn new() -> Self {
        Self::with_quiescence(FLUSH_QUIESCENCE_MS)
    }

    /// A pipeline with a custom quiescence window.
    pub const fn with_quiescence(delay_ms: u64) -> Self {
        Self {
            debouncer: FlushDebouncer::new(delay_ms),
            pending: BTreeMap::new(),
        }
    }

    /// Record a pending edit, replacing any prior pending edit for the same
    /// chunk, and rearm the debounce timer.
    pub fn local_edit(&mut self, index: usize, text: impl Into<String>, now_ms: u64) {
        self.pending.insert(
            index,
            PendingEdit {
                index,
                text: text.into(),
                at_ms: now_ms,
            },
        );
        self.debouncer.queue(now_ms);
        tracing::debug!(index, now_ms, "local edit recorded, flush debounced");
    }

    /// Whether any edit is waiting in the debounce window.
    pub fn has_pending_edits(&self) -> bool {
        !self.pending.is_empty()
    }

    /// The pending edit for a chunk, if one is buffered.
    pub fn pending_edit(&self, index: usize) -> Option<&PendingEdit> {
        self.pending.get(&index)
    }

    /// Whether the debounce timer is armed.
    pub const fn is_flush_scheduled(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Trailing-edge poll: once the quiescence window has elapsed, apply
    /// all pending edits to the document and return the rejoined text to
    /// propagate to the host.
    pub fn poll_flush(&mut self, document: &mut Document, now_ms: u64) -> Option<String> {
        if !self.debouncer.take_ready(now_ms) {
            return None;
        }
        Some(self.apply_pending(document))
    }

    /// Force immediate propagation, bypassing the debounce timer. Used on
    /// explicit save requests.
    pub fn flush_now(&mut self, document: &mut Document) -> String {
        self.debouncer.cancel();
        self.apply_pending(document)
    }

    /// Rearm the timer after a failed host propagation so the flush is
    /// retried on the next window.
    pub const fn reschedule(&mut self, now_ms: u64) {
        self.debouncer.queue(now_ms);
    }

    /// Apply an external reload.
    ///
    /// A reload whose timestamp is not strictly newer than the document's
    /// revision is rejected: the document, pending edits, and focus state
    /// are all left untouched. An accepted reload cancels any scheduled
    /// flush, discards the active chunk without flushing (the reload is
    /// authoritative), and rebuilds the document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StaleReload`] for a stale or out-of-order reload;
    /// callers log and ignore it rather than surfacing it to the user.
    pub fn external_reload(
        &mut self,
        document: &mut Document,
        focus: &mut FocusState,
        text: &str,
        timestamp: u64,
    ) -> Result<()> {
        let current = document.revision();
        if timestamp <= current {
            tracing::warn!(incoming = timestamp, current, "stale reload rejected");
            return Err(Error::StaleReload {
                incoming: timestamp,
                current,
            });
        }
        self.debouncer.cancel();
        self.pending.clear();
        focus.discard();
        *document = Document::from_text(text, timestamp);
        tracing::info!(
            revision = timestamp,
            chunks = document.len(),
            "external reload applied"
        );
        Ok(())
    }

    fn apply_pending(&mut self, document: &mut Document) -> String {
        for (_, edit) in std::mem::take(&mut self.pending) {
            if !document.set_chunk_text(edit.index, edit.text) {
                tracing::warn!(index = edit.index, "pending edit targets a missing chunk");
            }
        }
        document.to_text()
    }
}

impl Default for SyncPipeline {
    fn default() -> Self {
        Self::new()
    }
}
