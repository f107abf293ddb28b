//! Engine error taxonomy.
//!
//! Codec and chunker errors are handled by their immediate caller and never
//! cross the host boundary unreported. Host I/O errors surface to the
//! presentation layer without touching in-memory document state.

use thiserror::Error;

/// A specialized `Result` type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// All error cases the engine can produce.
#[derive(Debug, Error)]
pub enum Error {
    /// Input bytes were not valid UTF-8.
    #[error("input is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    /// A tree handed to the serializer referenced a node type outside the
    /// supported vocabulary. Content is never silently dropped.
    #[error("cannot serialize unsupported node type `{kind}`")]
    UnsupportedNode {
        /// Name of the offending node type.
        kind: &'static str,
    },

    /// A reload carried a revision timestamp that is not newer than the
    /// document's current revision. Logged and ignored by the pipeline,
    /// never shown to the user.
    #[error("stale reload: incoming revision {incoming} is not newer than {current}")]
    StaleReload {
        /// Revision carried by the rejected reload.
        incoming: u64,
        /// Revision of the document at the time of rejection.
        current: u64,
    },

    /// The host failed to produce the document content.
    #[error("load failed: {cause}")]
    Load {
        /// Human-readable cause reported by the host.
        cause: String,
    },

    /// A host-side save or update call failed.
    #[error("host I/O failed: {0}")]
    HostIo(#[from] std::io::Error),

    /// A persisting operation was requested with no save location set.
    #[error("no save location set")]
    NoSavePath,
}

impl Error {
    /// Build a [`Error::Load`] from any displayable cause.
    pub fn load(cause: impl std::fmt::Display) -> Self {
        Self::Load {
            cause: cause.to_string(),
        }
    }
}
