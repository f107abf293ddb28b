//! Markdown text ⇄ structured tree conversion.
//!
//! The codec is a pair of pure transforms:
//! - [`deserialize`]: any UTF-8 markdown into an arena [`Tree`], with
//!   unsupported syntax preserved verbatim through the passthrough channel
//! - [`serialize`]: a tree back into canonical markdown
//!
//! Serialization is normalizing (one canonical marker per emphasis style,
//! tight lists), so `serialize ∘ deserialize` is a fixed point on canonical
//! input and converges to it in one pass for everything else.

mod decode;
mod encode;
mod tree;

pub use decode::{deserialize, deserialize_bytes};
pub use encode::serialize;
pub use tree::{LinkMark, MarkSet, NodeId, NodeKind, Tree};

pub(crate) use decode::comrak_options;
