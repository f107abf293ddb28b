//! Session messages and pure state transitions.

use super::model::{LoadState, Model};
use crate::codec;
use crate::error::Error;

/// All events the session reacts to: pointer and keyboard focus
/// transitions from the presentation layer, widget edits, and host pushes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    // Focus
    /// A chunk was clicked.
    ClickChunk(usize),
    /// A click landed below all content; focus moves to the last chunk.
    ClickBelowContent,
    /// Arrow-down out of the active chunk.
    FocusNext,
    /// Arrow-up out of the active chunk.
    FocusPrev,

    // Editing
    /// The active chunk's widget reported new markdown content.
    EditActive {
        /// New markdown text for the active chunk.
        text: String,
        /// Local time of the edit, in milliseconds.
        at_ms: u64,
    },

    // Host
    /// External reload: full replacement content with the host's revision.
    FileOpened { content: String, timestamp: u64 },
    /// Explicit save request; flushes immediately.
    FileSave,

    /// Clock tick driving the debounce window.
    Tick { now_ms: u64 },
}

/// Pure function that advances the model by one message.
///
/// Host side effects (update/save propagation) happen in the session, not
/// here.
pub fn update(mut model: Model, msg: Message) -> Model {
    match msg {
        Message::ClickChunk(index) => {
            if let Err(err) = model.focus.click(&mut model.document, index) {
                model.set_notice(err.to_string());
            }
        }
        Message::ClickBelowContent => {
            if let Err(err) = model.focus.click_below(&mut model.document) {
                model.set_notice(err.to_string());
            }
        }
        Message::FocusNext => {
            if let Err(err) = model.focus.focus_next(&mut model.document) {
                model.set_notice(err.to_string());
            }
        }
        Message::FocusPrev => {
            if let Err(err) = model.focus.focus_prev(&mut model.document) {
                model.set_notice(err.to_string());
            }
        }

        Message::EditActive { text, at_ms } => {
            if let Some(index) = model.focus.active_index() {
                model.focus.set_active_tree(codec::deserialize(&text));
                model.pipeline.local_edit(index, text, at_ms);
            } else {
                tracing::debug!("edit with no active chunk ignored");
            }
        }

        Message::FileOpened { content, timestamp } => {
            match model.pipeline.external_reload(
                &mut model.document,
                &mut model.focus,
                &content,
                timestamp,
            ) {
                Ok(()) => model.load_state = LoadState::Ready,
                // Stale reloads are logged by the pipeline and ignored here;
                // they are not a user-visible failure.
                Err(Error::StaleReload { .. }) => {}
                Err(err) => model.set_notice(err.to_string()),
            }
        }

        // FileSave/Tick: flush propagation is a host side effect, handled
        // by the session.
        Message::FileSave | Message::Tick { .. } => {}
    }
    model
}
