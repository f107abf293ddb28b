//! Splitting a document into block-level chunks.
//!
//! A chunk is one top-level block: a paragraph, a heading, a whole list, a
//! blockquote, a rule, or a passthrough fragment. Lists are never split
//! into items, because tight/loose formatting and nesting cannot be
//! reconstructed from independently edited fragments, so a multi-paragraph
//! list is a single chunk.

use comrak::{Arena, parse_document};

use crate::codec::comrak_options;

/// One independently focusable block of a document.
///
/// The raw markdown text is the canonical at-rest form; a structured tree
/// exists only while the chunk is active, and lives in the focus state
/// machine rather than here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Position in the document's ordered chunk sequence.
    pub index: usize,
    /// Raw markdown text of the block, without surrounding blank lines.
    pub text: String,
}

/// Split markdown text into an ordered sequence of chunks.
///
/// Splits strictly on block boundaries; the text of each chunk is the
/// verbatim source slice of its block. Empty input yields an empty
/// sequence.
pub fn split(source: &str) -> Vec<Chunk> {
    if source.trim().is_empty() {
        return Vec::new();
    }

    let arena = Arena::new();
    let options = comrak_options();
    let root = parse_document(&arena, source, &options);
    let lines: Vec<&str> = source.lines().collect();

    let mut chunks = Vec::new();
    for child in root.children() {
        let sourcepos = child.data.borrow().sourcepos;
        let start = sourcepos.start.line.saturating_sub(1);
        let end = sourcepos.end.line.min(lines.len());
        if start >= end {
            continue;
        }
        let text = lines[start..end].join("\n");
        chunks.push(Chunk {
            index: chunks.len(),
            text,
        });
    }
    chunks
}

/// Join a chunk sequence back into markdown text.
///
/// The left inverse of [`split`]: `join(split(t)) == t` for canonical `t`
/// (blocks separated by exactly one blank line).
pub fn join(chunks: &[Chunk]) -> String {
    let texts: Vec<&str> = chunks.iter().map(|chunk| chunk.text.as_str()).collect();
    texts.join("\n\n")
}
