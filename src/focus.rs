//! Focus state machine for chunked editing.
//!
//! At most one chunk is "active" (backed by a live structured tree)
//! while every other chunk is inert, represented only by its raw markdown
//! text. The active slot is owned here and keyed by chunk index; trees are
//! created on activation and flushed back to text on deactivation, so the
//! active tree and its chunk's raw text never diverge while inert.

use crate::codec::{self, Tree};
use crate::document::Document;
use crate::error::Result;

/// The one live editor slot: a chunk index and its structured tree.
#[derive(Debug, Clone)]
struct ActiveChunk {
    index: usize,
    tree: Tree,
}

/// Tracks which chunk, if any, currently holds a live tree.
#[derive(Debug, Clone, Default)]
pub struct FocusState {
    active: Option<ActiveChunk>,
}

impl FocusState {
    /// No chunk active; the document renders entirely as static text.
    pub const fn new() -> Self {
        Self { active: None }
    }

    /// Index of the active chunk, if any.
    pub fn active_index(&self) -> Option<usize> {
        self.active.as_ref().map(|active| active.index)
    }

    /// The live tree of the active chunk, if any.
    pub fn active_tree(&self) -> Option<&Tree> {
        self.active.as_ref().map(|active| &active.tree)
    }

    /// Whether the given chunk is the active one.
    pub fn is_active(&self, index: usize) -> bool {
        self.active_index() == Some(index)
    }

    /// Activate the clicked chunk, flushing any previously active chunk
    /// first. Clicking the already-active chunk or an out-of-range index
    /// changes nothing.
    ///
    /// # Errors
    ///
    /// Propagates a serialize failure from flushing the previous chunk; the
    /// previous chunk stays active and no state is lost.
    pub fn click(&mut self, document: &mut Document, index: usize) -> Result<()> {
        if index >= document.len() || self.is_active(index) {
            return Ok(());
        }
        self.flush(document)?;
        let text = document
            .chunk(index)
            .map(|chunk| chunk.text.clone())
            .unwrap_or_default();
        self.active = Some(ActiveChunk {
            index,
            tree: codec::deserialize(&text),
        });
        tracing::debug!(index, "chunk activated");
        Ok(())
    }

    /// Move focus to the next chunk. No-op at the end of the sequence or
    /// when nothing is active.
    ///
    /// # Errors
    ///
    /// Propagates a serialize failure from flushing the current chunk.
    pub fn focus_next(&mut self, document: &mut Document) -> Result<()> {
        let Some(index) = self.active_index() else {
            return Ok(());
        };
        if index + 1 >= document.len() {
            return Ok(());
        }
        self.click(document, index + 1)
    }

    /// Move focus to the previous chunk. No-op at the start of the
    /// sequence or when nothing is active.
    ///
    /// # Errors
    ///
    /// Propagates a serialize failure from flushing the current chunk.
    pub fn focus_prev(&mut self, document: &mut Document) -> Result<()> {
        let Some(index) = self.active_index() else {
            return Ok(());
        };
        let Some(prev) = index.checked_sub(1) else {
            return Ok(());
        };
        self.click(document, prev)
    }

    /// A click below all content activates the last chunk, so typing can
    /// continue at the end of the document.
    ///
    /// # Errors
    ///
    /// Propagates a serialize failure from flushing the current chunk.
    pub fn click_below(&mut self, document: &mut Document) -> Result<()> {
        match document.last_index() {
            Some(last) => self.click(document, last),
            None => Ok(()),
        }
    }

    /// Replace the active chunk's tree with the widget's current state.
    ///
    /// Returns false when no chunk is active.
    pub fn set_active_tree(&mut self, tree: Tree) -> bool {
        match &mut self.active {
            Some(active) => {
                active.tree = tree;
                true
            }
            None => false,
        }
    }

    /// Serialize the active tree back into its chunk's raw text and
    /// deactivate. Returns the flushed index, or `None` when nothing was
    /// active.
    ///
    /// # Errors
    ///
    /// Returns a serialize error without deactivating: the tree is kept
    /// live rather than dropped, so no content is lost.
    pub fn flush(&mut self, document: &mut Document) -> Result<Option<usize>> {
        let Some(active) = self.active.take() else {
            return Ok(None);
        };
        match codec::serialize(&active.tree) {
            Ok(text) => {
                let index = active.index;
                document.set_chunk_text(index, text);
                tracing::debug!(index, "chunk flushed and deactivated");
                Ok(Some(index))
            }
            Err(err) => {
                self.active = Some(active);
                Err(err)
            }
        }
    }

    /// Serialize the active tree into its chunk's raw text while keeping
    /// the chunk active. Used on explicit saves, where the full document
    /// must carry the live edit but focus should not move.
    ///
    /// # Errors
    ///
    /// Returns a serialize error; the tree stays live and the raw text is
    /// untouched.
    pub fn sync_active(&self, document: &mut Document) -> Result<()> {
        let Some(active) = &self.active else {
            return Ok(());
        };
        let text = codec::serialize(&active.tree)?;
        document.set_chunk_text(active.index, text);
        Ok(())
    }

    /// Drop the active chunk without flushing. Used when a reload replaces
    /// the document and the in-memory edit is intentionally discarded.
    pub fn discard(&mut self) {
        if let Some(active) = self.active.take() {
            tracing::debug!(index = active.index, "active chunk discarded without flush");
        }
    }
}
