//! The in-memory document: an ordered chunk sequence plus a revision.
//!
//! A document is owned by one editor session. It is replaced wholesale when
//! an external reload is accepted, never merged field-by-field, and the
//! revision timestamp records the most recently accepted load.

use crate::chunker::{self, Chunk};

/// The full editable content of one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    chunks: Vec<Chunk>,
    revision: u64,
}

impl Document {
    /// An empty document at revision zero.
    pub const fn empty() -> Self {
        Self {
            chunks: Vec::new(),
            revision: 0,
        }
    }

    /// Build a document from markdown text at the given revision.
    pub fn from_text(text: &str, revision: u64) -> Self {
        Self {
            chunks: chunker::split(text),
            revision,
        }
    }

    /// Revision of the most recently accepted external load.
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// The ordered chunk sequence.
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// A chunk by index.
    pub fn chunk(&self, index: usize) -> Option<&Chunk> {
        self.chunks.get(index)
    }

    /// Number of chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Whether the document has no chunks.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Index of the last chunk, if any.
    pub fn last_index(&self) -> Option<usize> {
        self.chunks.len().checked_sub(1)
    }

    /// Overwrite one chunk's raw markdown text.
    ///
    /// Returns false when the index is out of range.
    pub fn set_chunk_text(&mut self, index: usize, text: impl Into<String>) -> bool {
        match self.chunks.get_mut(index) {
            Some(chunk) => {
                chunk.text = text.into();
                true
            }
            None => false,
        }
    }

    /// Rejoin the chunk sequence into full document text.
    pub fn to_text(&self) -> String {
        chunker::join(&self.chunks)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::empty()
    }
}
