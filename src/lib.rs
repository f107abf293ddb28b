// Only allow lints that are transitive-dependency noise we can't control.
#![allow(clippy::multiple_crate_versions)]

//! # marksync
//!
//! A markdown document synchronization engine for chunked editors.
//!
//! marksync keeps a linear markdown document and a structured, editable
//! view of it in lockstep:
//! - round-trip conversion between markdown text and a block tree
//! - block-level chunking so only the chunk under edit carries live state
//! - debounced propagation of local edits to a host application
//! - timestamp-guarded reconciliation of external reloads
//!
//! ## Architecture
//!
//! The session follows The Elm Architecture (TEA) pattern:
//! - **Model**: the complete session state
//! - **Message**: focus transitions, edits, and host events
//! - **Update**: pure state transitions
//! - **Session**: host side effects around the pure core
//!
//! ## Modules
//!
//! - [`codec`]: markdown text ⇄ structured tree conversion
//! - [`chunker`]: splitting a document into block-level chunks
//! - [`document`]: the chunk sequence and its revision
//! - [`focus`]: the single-active-chunk state machine
//! - [`sync`]: pending edits, debouncing, and reload reconciliation
//! - [`session`]: model/update wiring over a host
//! - [`host`]: the host boundary and a filesystem implementation
//! - [`config`]: host configuration

pub mod chunker;
pub mod codec;
pub mod config;
pub mod document;
pub mod error;
pub mod focus;
pub mod host;
pub mod session;
pub mod sync;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::chunker::Chunk;
    pub use crate::codec::{Tree, deserialize, serialize};
    pub use crate::document::Document;
    pub use crate::error::{Error, Result};
    pub use crate::host::{FsHost, Host, HostEvent};
    pub use crate::session::{Message, Model, Session, update};
}
