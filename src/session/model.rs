//! Editor session state.

use crate::config::Theme;
use crate::document::Document;
use crate::focus::FocusState;
use crate::sync::SyncPipeline;

/// Whether the initial document load has completed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    /// Load in flight; the editor renders an empty/loading state.
    #[default]
    Loading,
    /// Document loaded and editable.
    Ready,
    /// Load failed; the message is shown as an error notice.
    Failed(String),
}

/// The complete session state.
///
/// All state lives here; the document is mutated only through the pipeline
/// and focus machine it owns.
#[derive(Debug, Clone, Default)]
pub struct Model {
    /// The chunked document under edit.
    pub document: Document,
    /// Which chunk, if any, holds the live tree.
    pub focus: FocusState,
    /// Pending edits and debounce state.
    pub pipeline: SyncPipeline,
    /// Presentation theme from the host config.
    pub theme: Theme,
    /// Initial load progress.
    pub load_state: LoadState,
    /// User-visible error notice, if any.
    pub notice: Option<String>,
}

impl Model {
    /// A fresh session model with an empty document.
    pub fn new(theme: Theme) -> Self {
        Self {
            theme,
            ..Self::default()
        }
    }

    pub(crate) fn set_notice(&mut self, notice: impl Into<String>) {
        self.notice = Some(notice.into());
    }
}
