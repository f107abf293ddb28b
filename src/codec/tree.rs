//! Arena-backed document tree.
//!
//! Nodes are addressed by index into a flat arena; parent links are stored
//! as indices rather than owning references, so the tree is freely cloneable
//! and comparable without reference-counting or interior mutability.

/// Index of a node in a [`Tree`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub(crate) const fn index(self) -> usize {
        self.0
    }
}

/// Inline formatting applied to a text run.
///
/// Marks are flattened onto text runs rather than nested as wrapper nodes,
/// so two runs with equal marks are interchangeable regardless of the
/// nesting order the source used.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MarkSet {
    pub bold: bool,
    pub italic: bool,
    pub strike: bool,
    pub underline: bool,
    /// Link destination and optional title, when the run is inside a link.
    pub link: Option<LinkMark>,
}

/// Destination of a link mark.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkMark {
    pub url: String,
    pub title: Option<String>,
}

impl MarkSet {
    /// A mark set with nothing applied.
    pub const fn plain() -> Self {
        Self {
            bold: false,
            italic: false,
            strike: false,
            underline: false,
            link: None,
        }
    }

    /// Whether no mark is applied.
    pub const fn is_plain(&self) -> bool {
        !self.bold && !self.italic && !self.strike && !self.underline && self.link.is_none()
    }
}

/// The kind of a tree node.
///
/// `Raw` is the passthrough channel: source fragments outside the supported
/// vocabulary are retained verbatim so an untouched fragment serializes back
/// byte-for-byte. `CodeBlock` and `Image` can only appear in trees built by
/// an editing widget; the serializer rejects them rather than dropping them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Root container. Exactly one per tree, at index 0.
    Root,
    Paragraph,
    Heading {
        level: u8,
    },
    BulletList,
    OrderedList {
        start: usize,
    },
    ListItem,
    Blockquote,
    HorizontalRule,
    /// Hard line break inside a paragraph or heading.
    HardBreak,
    /// A run of text with flattened inline marks.
    Text {
        literal: String,
        marks: MarkSet,
    },
    /// Verbatim source fragment outside the supported vocabulary.
    Raw {
        literal: String,
    },
    /// Fenced code block (widget-built trees only; not serializable).
    CodeBlock {
        info: String,
        literal: String,
    },
    /// Inline image (widget-built trees only; not serializable).
    Image {
        alt: String,
        url: String,
    },
}

impl NodeKind {
    /// Stable name used in diagnostics and [`UnsupportedNode`] errors.
    ///
    /// [`UnsupportedNode`]: crate::error::Error::UnsupportedNode
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::Paragraph => "paragraph",
            Self::Heading { .. } => "heading",
            Self::BulletList => "bullet_list",
            Self::OrderedList { .. } => "ordered_list",
            Self::ListItem => "list_item",
            Self::Blockquote => "blockquote",
            Self::HorizontalRule => "horizontal_rule",
            Self::HardBreak => "hard_break",
            Self::Text { .. } => "text",
            Self::Raw { .. } => "raw",
            Self::CodeBlock { .. } => "code_block",
            Self::Image { .. } => "image",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// An editable document tree stored in a flat arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    /// Create a tree containing only a root node.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                kind: NodeKind::Root,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// The root node id.
    pub const fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Append a new node under `parent` and return its id.
    pub fn push(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.index()].children.push(id);
        id
    }

    /// The kind of a node.
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    /// Mutable access to a node's kind, for in-place edits.
    pub fn kind_mut(&mut self, id: NodeId) -> &mut NodeKind {
        &mut self.nodes[id.index()].kind
    }

    /// The parent of a node, `None` for the root.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    /// Child ids of a node, in document order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.index()].children
    }

    /// Total number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree holds nothing beyond the root.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Concatenated text content of a subtree, marks and structure ignored.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match self.kind(id) {
            NodeKind::Text { literal, .. } | NodeKind::Raw { literal } => out.push_str(literal),
            NodeKind::HardBreak => out.push('\n'),
            _ => {}
        }
        for &child in self.children(id) {
            self.collect_text(child, out);
        }
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}
