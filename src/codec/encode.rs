//! Tree to markdown conversion.
//!
//! Output is canonical: `_..._` for italic, `**...**` for bold, `~~...~~`
//! for strike, `__...__` for underline, ATX headings, `-` bullets, and
//! tight lists with no blank line between sibling items. Passthrough nodes
//! are emitted verbatim.

use super::tree::{MarkSet, NodeId, NodeKind, Tree};
use crate::error::{Error, Result};

/// Serialize a document tree to canonical markdown.
///
/// # Errors
///
/// Returns [`Error::UnsupportedNode`] when the tree references a node type
/// outside the supported vocabulary (for example a code block or image
/// handed over by an editing widget). Content is never silently dropped.
pub fn serialize(tree: &Tree) -> Result<String> {
    let blocks = serialize_blocks(tree, tree.root())?;
    let texts: Vec<String> = blocks.into_iter().map(|block| block.text).collect();
    Ok(texts.join("\n\n"))
}

struct BlockText {
    text: String,
    is_list: bool,
}

fn serialize_blocks(tree: &Tree, parent: NodeId) -> Result<Vec<BlockText>> {
    tree.children(parent)
        .iter()
        .map(|&child| serialize_block(tree, child))
        .collect()
}

fn serialize_block(tree: &Tree, id: NodeId) -> Result<BlockText> {
    let text = match tree.kind(id) {
        NodeKind::Paragraph => inline_content(tree, id)?,
        NodeKind::Heading { level } => {
            let prefix = "#".repeat(usize::from(*level));
            format!("{prefix} {}", inline_content(tree, id)?)
        }
        NodeKind::Blockquote => {
            let inner_blocks = serialize_blocks(tree, id)?;
            let texts: Vec<String> = inner_blocks.into_iter().map(|block| block.text).collect();
            let inner = texts.join("\n\n");
            if inner.is_empty() {
                ">".to_string()
            } else {
                let quoted: Vec<String> = inner
                    .lines()
                    .map(|line| {
                        if line.is_empty() {
                            ">".to_string()
                        } else {
                            format!("> {line}")
                        }
                    })
                    .collect();
                quoted.join("\n")
            }
        }
        NodeKind::BulletList => return serialize_list(tree, id, None),
        NodeKind::OrderedList { start } => return serialize_list(tree, id, Some(*start)),
        // A list item outside a list renders as its bare content.
        NodeKind::ListItem => {
            let blocks = serialize_blocks(tree, id)?;
            let texts: Vec<String> = blocks.into_iter().map(|block| block.text).collect();
            texts.join("\n\n")
        }
        NodeKind::HorizontalRule => "---".to_string(),
        NodeKind::HardBreak => "\\".to_string(),
        NodeKind::Raw { literal } => literal.clone(),
        NodeKind::Text { .. } => inline_segment(tree, id)?,
        kind @ (NodeKind::Root | NodeKind::CodeBlock { .. } | NodeKind::Image { .. }) => {
            return Err(Error::UnsupportedNode { kind: kind.name() });
        }
    };
    Ok(BlockText {
        text,
        is_list: false,
    })
}

fn serialize_list(tree: &Tree, id: NodeId, start: Option<usize>) -> Result<BlockText> {
    let mut items = Vec::new();
    for (index, &child) in tree.children(id).iter().enumerate() {
        let marker = start.map_or_else(
            || "- ".to_string(),
            |start| format!("{}. ", start + index),
        );
        let indent = " ".repeat(marker.len());
        items.push(serialize_item(tree, child, &marker, &indent)?);
    }
    Ok(BlockText {
        text: items.join("\n"),
        is_list: true,
    })
}

fn serialize_item(tree: &Tree, id: NodeId, marker: &str, indent: &str) -> Result<String> {
    let blocks = if matches!(tree.kind(id), NodeKind::ListItem) {
        serialize_blocks(tree, id)?
    } else {
        vec![serialize_block(tree, id)?]
    };
    if blocks.is_empty() {
        return Ok(marker.trim_end().to_string());
    }

    // Blank line between sibling paragraphs inside an item; nested lists
    // attach tightly to the preceding block.
    let mut body_lines: Vec<String> = Vec::new();
    let mut prev_was_list = false;
    for (index, block) in blocks.iter().enumerate() {
        if index > 0 && !block.is_list && !prev_was_list {
            body_lines.push(String::new());
        }
        body_lines.extend(block.text.lines().map(ToString::to_string));
        prev_was_list = block.is_list;
    }

    let mut out = String::new();
    for (index, line) in body_lines.iter().enumerate() {
        if index > 0 {
            out.push('\n');
        }
        if index == 0 {
            out.push_str(marker);
            out.push_str(line);
        } else if !line.is_empty() {
            out.push_str(indent);
            out.push_str(line);
        }
    }
    Ok(out)
}

enum Segment {
    Run { literal: String, marks: MarkSet },
    HardBreak,
    Raw(String),
}

fn inline_content(tree: &Tree, parent: NodeId) -> Result<String> {
    let mut segments = Vec::new();
    collect_segments(tree, parent, &mut segments)?;

    let mut out = String::new();
    for segment in &segments {
        match segment {
            Segment::Run { literal, marks } => out.push_str(&wrap_marks(literal, marks)),
            Segment::HardBreak => out.push_str("\\\n"),
            Segment::Raw(literal) => out.push_str(literal),
        }
    }
    Ok(out)
}

/// Render a single inline node standing on its own.
fn inline_segment(tree: &Tree, id: NodeId) -> Result<String> {
    match tree.kind(id) {
        NodeKind::Text { literal, marks } => Ok(wrap_marks(literal, marks)),
        NodeKind::Raw { literal } => Ok(literal.clone()),
        NodeKind::HardBreak => Ok("\\".to_string()),
        kind => Err(Error::UnsupportedNode { kind: kind.name() }),
    }
}

fn collect_segments(tree: &Tree, parent: NodeId, segments: &mut Vec<Segment>) -> Result<()> {
    for &child in tree.children(parent) {
        match tree.kind(child) {
            NodeKind::Text { literal, marks } => {
                // Merge adjacent runs with identical marks so widget-built
                // trees don't emit doubled delimiters.
                let can_merge = matches!(
                    segments.last(),
                    Some(Segment::Run { marks: prev, .. }) if prev == marks
                );
                if can_merge {
                    if let Some(Segment::Run { literal: prev, .. }) = segments.last_mut() {
                        prev.push_str(literal);
                    }
                } else {
                    segments.push(Segment::Run {
                        literal: literal.clone(),
                        marks: marks.clone(),
                    });
                }
            }
            NodeKind::HardBreak => segments.push(Segment::HardBreak),
            NodeKind::Raw { literal } => segments.push(Segment::Raw(literal.clone())),
            kind @ (NodeKind::CodeBlock { .. } | NodeKind::Image { .. }) => {
                return Err(Error::UnsupportedNode { kind: kind.name() });
            }
            // Container kinds nested in inline position: flatten.
            _ => collect_segments(tree, child, segments)?,
        }
    }
    Ok(())
}

fn wrap_marks(text: &str, marks: &MarkSet) -> String {
    let mut out = text.to_string();
    if marks.italic {
        out = format!("_{out}_");
    }
    if marks.bold {
        out = format!("**{out}**");
    }
    if marks.underline {
        out = format!("__{out}__");
    }
    if marks.strike {
        out = format!("~~{out}~~");
    }
    if let Some(link) = &marks.link {
        let bare = !marks.bold && !marks.italic && !marks.strike && !marks.underline;
        out = if bare && link.title.is_none() && out == link.url {
            format!("<{}>", link.url)
        } else if let Some(title) = &link.title {
            format!("[{out}]({} \"{title}\")", link.url)
        } else {
            format!("[{out}]({})", link.url)
        };
    }
    out
}
