//! Markdown text to tree conversion, built on comrak.
//!
//! Any UTF-8 input is accepted. Fragments outside the supported vocabulary
//! (fenced code, inline HTML, tables parsed as text, ...) are retained as
//! opaque [`NodeKind::Raw`] nodes carrying the verbatim source slice, so an
//! untouched fragment reproduces byte-for-byte on serialize.

use comrak::nodes::{AstNode, ListType, NodeValue, Sourcepos};
use comrak::{Arena, Options, parse_document};

use super::tree::{LinkMark, MarkSet, NodeId, NodeKind, Tree};
use crate::error::Result;

/// Comrak options shared by the codec and the chunker.
///
/// Only the extensions backing the supported mark set are enabled; GFM
/// extras like tables and task lists stay off so their syntax flows through
/// the passthrough channel as plain blocks instead of typed nodes.
pub(crate) fn comrak_options() -> Options {
    let mut options = Options::default();
    options.extension.strikethrough = true;
    options.extension.underline = true;
    options
}

/// Convert markdown text into a document tree.
///
/// Never fails: unsupported syntax becomes passthrough nodes.
pub fn deserialize(source: &str) -> Tree {
    let arena = Arena::new();
    let options = comrak_options();
    let root = parse_document(&arena, source, &options);
    let lines: Vec<&str> = source.lines().collect();

    let mut tree = Tree::new();
    let tree_root = tree.root();
    for child in root.children() {
        decode_block(child, &mut tree, tree_root, &lines);
    }
    tree
}

/// Convert raw bytes into a document tree.
///
/// # Errors
///
/// Returns [`Error::Encoding`](crate::error::Error::Encoding) if the bytes
/// are not valid UTF-8; encoding failures are never silently coerced.
pub fn deserialize_bytes(bytes: &[u8]) -> Result<Tree> {
    let source = std::str::from_utf8(bytes)?;
    Ok(deserialize(source))
}

fn decode_block<'a>(node: &'a AstNode<'a>, tree: &mut Tree, parent: NodeId, lines: &[&str]) {
    let value = node.data.borrow().value.clone();
    match value {
        NodeValue::Paragraph => {
            let para = tree.push(parent, NodeKind::Paragraph);
            decode_inlines(node, tree, para, &MarkSet::plain());
        }

        NodeValue::Heading(heading) => {
            let block = tree.push(
                parent,
                NodeKind::Heading {
                    level: heading.level,
                },
            );
            decode_inlines(node, tree, block, &MarkSet::plain());
        }

        NodeValue::BlockQuote => {
            let quote = tree.push(parent, NodeKind::Blockquote);
            for child in node.children() {
                decode_block(child, tree, quote, lines);
            }
        }

        NodeValue::List(list) => {
            let kind = match list.list_type {
                ListType::Bullet => NodeKind::BulletList,
                ListType::Ordered => NodeKind::OrderedList { start: list.start },
            };
            let block = tree.push(parent, kind);
            for item in node.children() {
                if matches!(item.data.borrow().value, NodeValue::Item(_)) {
                    let item_node = tree.push(block, NodeKind::ListItem);
                    for child in item.children() {
                        decode_block(child, tree, item_node, lines);
                    }
                } else {
                    decode_block(item, tree, block, lines);
                }
            }
        }

        NodeValue::ThematicBreak => {
            tree.push(parent, NodeKind::HorizontalRule);
        }

        NodeValue::CodeBlock(ref code) if !code.fenced => {
            // Indented code: sourcepos columns point at the content, not the
            // indentation, so slice whole lines to keep the indent intact.
            let literal = slice_lines(lines, node.data.borrow().sourcepos, false);
            tree.push(parent, NodeKind::Raw { literal });
        }

        // Everything else (fenced code, HTML blocks, front matter, ...)
        // is outside the vocabulary: keep the source verbatim.
        _ => {
            let literal = slice_lines(lines, node.data.borrow().sourcepos, true);
            tree.push(parent, NodeKind::Raw { literal });
        }
    }
}

/// Extract the verbatim source of a block from its source position.
///
/// When `strip_prefix` is set, the container prefix (blockquote markers,
/// list indentation) up to the block's start column is dropped from every
/// line, so the passthrough text nests correctly when re-serialized inside
/// its container.
fn slice_lines(lines: &[&str], sourcepos: Sourcepos, strip_prefix: bool) -> String {
    let start = sourcepos.start.line.saturating_sub(1);
    let end = sourcepos.end.line.min(lines.len());
    let skip_cols = if strip_prefix {
        sourcepos.start.column.saturating_sub(1)
    } else {
        0
    };

    let mut out = String::new();
    for (i, line) in lines.iter().enumerate().take(end).skip(start) {
        if i > start {
            out.push('\n');
        }
        let offset = line
            .char_indices()
            .nth(skip_cols)
            .map_or(line.len(), |(byte, _)| byte);
        out.push_str(&line[offset..]);
    }
    out
}

fn decode_inlines<'a>(node: &'a AstNode<'a>, tree: &mut Tree, parent: NodeId, marks: &MarkSet) {
    for child in node.children() {
        let value = child.data.borrow().value.clone();
        match value {
            NodeValue::Text(text) => push_text(tree, parent, &text, marks),
            NodeValue::SoftBreak => push_text(tree, parent, "\n", marks),
            NodeValue::LineBreak => {
                tree.push(parent, NodeKind::HardBreak);
            }

            NodeValue::Emph => {
                let inner = MarkSet {
                    italic: true,
                    ..marks.clone()
                };
                decode_inlines(child, tree, parent, &inner);
            }
            NodeValue::Strong => {
                let inner = MarkSet {
                    bold: true,
                    ..marks.clone()
                };
                decode_inlines(child, tree, parent, &inner);
            }
            NodeValue::Strikethrough => {
                let inner = MarkSet {
                    strike: true,
                    ..marks.clone()
                };
                decode_inlines(child, tree, parent, &inner);
            }
            NodeValue::Underline => {
                let inner = MarkSet {
                    underline: true,
                    ..marks.clone()
                };
                decode_inlines(child, tree, parent, &inner);
            }

            NodeValue::Link(link) => {
                let inner = MarkSet {
                    link: Some(LinkMark {
                        url: link.url.clone(),
                        title: if link.title.is_empty() {
                            None
                        } else {
                            Some(link.title.clone())
                        },
                    }),
                    ..marks.clone()
                };
                decode_inlines(child, tree, parent, &inner);
            }

            NodeValue::Code(code) => {
                let fence = "`".repeat(code.num_backticks);
                tree.push(
                    parent,
                    NodeKind::Raw {
                        literal: format!("{fence}{}{fence}", code.literal),
                    },
                );
            }
            NodeValue::HtmlInline(html) => {
                tree.push(parent, NodeKind::Raw { literal: html });
            }
            NodeValue::Image(link) => {
                let alt = extract_text(child);
                let literal = if link.title.is_empty() {
                    format!("![{alt}]({})", link.url)
                } else {
                    format!("![{alt}]({} \"{}\")", link.url, link.title)
                };
                tree.push(parent, NodeKind::Raw { literal });
            }

            // Unknown inline containers: flatten their content with the
            // current marks rather than dropping it.
            _ => decode_inlines(child, tree, parent, marks),
        }
    }
}

/// Append a text run, merging into the previous run when marks match.
fn push_text(tree: &mut Tree, parent: NodeId, text: &str, marks: &MarkSet) {
    if text.is_empty() {
        return;
    }
    let mergeable = tree.children(parent).last().copied().filter(|&last| {
        matches!(tree.kind(last), NodeKind::Text { marks: existing, .. } if existing == marks)
    });
    if let Some(last) = mergeable {
        if let NodeKind::Text { literal, .. } = tree.kind_mut(last) {
            literal.push_str(text);
        }
        return;
    }
    tree.push(
        parent,
        NodeKind::Text {
            literal: text.to_string(),
            marks: marks.clone(),
        },
    );
}

/// Plain text content of an inline subtree (used for image alt text).
fn extract_text<'a>(node: &'a AstNode<'a>) -> String {
    let mut out = String::new();
    collect_text(node, &mut out);
    out
}

fn collect_text<'a>(node: &'a AstNode<'a>, out: &mut String) {
    match &node.data.borrow().value {
        NodeValue::Text(text) => out.push_str(text),
        NodeValue::Code(code) => out.push_str(&code.literal),
        NodeValue::SoftBreak | NodeValue::LineBreak => out.push(' '),
        _ => {}
    }
    for child in node.children() {
        collect_text(child, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_block(tree: &Tree) -> NodeId {
        tree.children(tree.root())[0]
    }

    #[test]
    fn test_paragraph_with_plain_text() {
        let tree = deserialize("Hello world.");
        let para = first_block(&tree);
        assert_eq!(tree.kind(para), &NodeKind::Paragraph);
        assert_eq!(tree.text_content(para), "Hello world.");
    }

    #[test]
    fn test_heading_level() {
        let tree = deserialize("## Section");
        assert_eq!(tree.kind(first_block(&tree)), &NodeKind::Heading { level: 2 });
    }

    #[test]
    fn test_emphasis_marks_are_flattened() {
        let tree = deserialize("a **bold _both_** tail");
        let para = first_block(&tree);
        let kinds: Vec<_> = tree
            .children(para)
            .iter()
            .map(|&id| tree.kind(id).clone())
            .collect();
        assert_eq!(kinds.len(), 4);
        assert!(
            matches!(&kinds[1], NodeKind::Text { literal, marks } if literal == "bold " && marks.bold && !marks.italic)
        );
        assert!(
            matches!(&kinds[2], NodeKind::Text { literal, marks } if literal == "both" && marks.bold && marks.italic)
        );
    }

    #[test]
    fn test_strike_and_underline_extensions() {
        let tree = deserialize("~~gone~~ and __under__");
        let para = first_block(&tree);
        let children = tree.children(para);
        assert!(
            matches!(tree.kind(children[0]), NodeKind::Text { marks, .. } if marks.strike)
        );
        assert!(
            matches!(tree.kind(*children.last().unwrap()), NodeKind::Text { marks, .. } if marks.underline)
        );
    }

    #[test]
    fn test_link_mark_carries_url() {
        let tree = deserialize("[home](https://example.com)");
        let para = first_block(&tree);
        let run = tree.children(para)[0];
        let NodeKind::Text { marks, .. } = tree.kind(run) else {
            panic!("expected text run");
        };
        assert_eq!(
            marks.link.as_ref().map(|l| l.url.as_str()),
            Some("https://example.com")
        );
    }

    #[test]
    fn test_adjacent_runs_with_equal_marks_merge() {
        // Softbreak joins two text nodes with identical (plain) marks.
        let tree = deserialize("one\ntwo");
        let para = first_block(&tree);
        assert_eq!(tree.children(para).len(), 1);
        assert_eq!(tree.text_content(para), "one\ntwo");
    }

    #[test]
    fn test_fenced_code_is_raw_passthrough() {
        let source = "```rust\nlet x = 1;\n```";
        let tree = deserialize(source);
        assert_eq!(
            tree.kind(first_block(&tree)),
            &NodeKind::Raw {
                literal: source.to_string()
            }
        );
    }

    #[test]
    fn test_html_block_is_raw_passthrough() {
        let source = "<div class=\"x\">\nhi\n</div>";
        let tree = deserialize(source);
        assert_eq!(
            tree.kind(first_block(&tree)),
            &NodeKind::Raw {
                literal: source.to_string()
            }
        );
    }

    #[test]
    fn test_code_block_inside_blockquote_strips_quote_prefix() {
        let tree = deserialize("> ```\n> x\n> ```");
        let quote = first_block(&tree);
        assert_eq!(tree.kind(quote), &NodeKind::Blockquote);
        let inner = tree.children(quote)[0];
        assert_eq!(
            tree.kind(inner),
            &NodeKind::Raw {
                literal: "```\nx\n```".to_string()
            }
        );
    }

    #[test]
    fn test_loose_list_is_single_list_node() {
        let tree = deserialize("- a\n\n- b");
        let list = first_block(&tree);
        assert_eq!(tree.kind(list), &NodeKind::BulletList);
        assert_eq!(tree.children(list).len(), 2);
    }

    #[test]
    fn test_ordered_list_keeps_start() {
        let tree = deserialize("3. a\n4. b");
        assert_eq!(
            tree.kind(first_block(&tree)),
            &NodeKind::OrderedList { start: 3 }
        );
    }

    #[test]
    fn test_hard_break_node() {
        let tree = deserialize("a\\\nb");
        let para = first_block(&tree);
        let kinds: Vec<_> = tree
            .children(para)
            .iter()
            .map(|&id| tree.kind(id).clone())
            .collect();
        assert!(kinds.iter().any(|k| matches!(k, NodeKind::HardBreak)));
    }

    #[test]
    fn test_deserialize_bytes_rejects_invalid_utf8() {
        let err = deserialize_bytes(&[0xff, 0xfe, b'a']).unwrap_err();
        assert!(matches!(err, crate::error::Error::Encoding(_)));
    }

    #[test]
    fn test_deserialize_empty_input() {
        let tree = deserialize("");
        assert!(tree.is_empty());
    }
}
