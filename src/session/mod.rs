//! The editor session: model, messages, and host wiring.
//!
//! State transitions are pure ([`update`]); the [`Session`] wrapper owns a
//! [`Host`] and performs the side effects a message implies: debounced
//! update propagation, explicit saves, and pumping host push events into
//! messages. Everything runs on one logical thread of control: events are
//! processed in arrival order and nothing here blocks.

mod model;
mod update;

pub use model::{LoadState, Model};
pub use update::{Message, update};

use crate::host::{Host, HostEvent};

/// One running editor session over a host.
pub struct Session<H: Host> {
    host: H,
    /// The session state. Read freely; mutate through [`handle`](Self::handle).
    pub model: Model,
}

impl<H: Host> Session<H> {
    /// Start a session: read the host config, perform the initial load, and
    /// build the document at the host's first revision.
    ///
    /// A failed load leaves an empty document with an error notice; the
    /// session stays usable and a later `file-opened` event recovers it.
    pub fn new(mut host: H) -> Self {
        let config = host.get_config();
        let mut model = Model::new(config.theme);

        match host.load() {
            Ok(text) => {
                let timestamp = host.next_timestamp();
                model.document = crate::document::Document::from_text(&text, timestamp);
                model.load_state = LoadState::Ready;
                tracing::info!(
                    revision = timestamp,
                    chunks = model.document.len(),
                    "initial load complete"
                );
            }
            Err(err) => {
                tracing::warn!(%err, "initial load failed");
                model.load_state = LoadState::Failed(err.to_string());
                model.set_notice(err.to_string());
            }
        }

        Self { host, model }
    }

    /// Apply a message: pure update first, then any host side effects.
    pub fn handle(&mut self, msg: Message) {
        let side = msg.clone();
        self.model = update(std::mem::take(&mut self.model), msg);
        self.apply_side_effects(&side);
    }

    /// Drain host push events, then advance the debounce clock.
    pub fn pump(&mut self, now_ms: u64) {
        while let Some(event) = self.host.poll_event() {
            match event {
                HostEvent::FileOpened { content, timestamp } => {
                    self.handle(Message::FileOpened { content, timestamp });
                }
                HostEvent::FileSave => self.handle(Message::FileSave),
            }
        }
        self.handle(Message::Tick { now_ms });
    }

    /// Replace the document with an empty one through the ordinary reload
    /// path, so teardown semantics match a file open.
    pub fn new_document(&mut self) {
        let timestamp = self.host.next_timestamp();
        self.handle(Message::FileOpened {
            content: String::new(),
            timestamp,
        });
    }

    /// Ask the host to show its file picker; the result arrives later as a
    /// `file-opened` event.
    pub fn open_file_dialogue(&mut self) {
        if let Err(err) = self.host.open_file_dialogue() {
            self.model.set_notice(err.to_string());
        }
    }

    /// The host behind this session.
    pub const fn host(&self) -> &H {
        &self.host
    }

    fn apply_side_effects(&mut self, msg: &Message) {
        match msg {
            Message::Tick { now_ms } => {
                let Some(text) = self
                    .model
                    .pipeline
                    .poll_flush(&mut self.model.document, *now_ms)
                else {
                    return;
                };
                if let Err(err) = self.host.handle_update_content(&text) {
                    // The document still holds the latest text; rearm so the
                    // propagation is retried on the next window.
                    tracing::warn!(%err, "update propagation failed, retrying");
                    self.model.pipeline.reschedule(*now_ms);
                    self.model.set_notice(err.to_string());
                }
            }

            Message::FileSave => {
                // Fold pending edits in first, then overwrite the active
                // chunk from its live tree so the save carries the canonical
                // form of the edit in progress. Focus does not move.
                let _ = self.model.pipeline.flush_now(&mut self.model.document);
                let sync_err = self
                    .model
                    .focus
                    .sync_active(&mut self.model.document)
                    .err();
                let text = self.model.document.to_text();
                match self.host.save(&text) {
                    Ok(()) => self.model.notice = sync_err.map(|err| err.to_string()),
                    Err(err) => {
                        tracing::warn!(%err, "save failed, edits kept");
                        self.model.set_notice(err.to_string());
                    }
                }
            }

            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HostConfig;
    use crate::error::{Error, Result};

    /// A scriptable host recording every call, for session tests.
    #[derive(Default)]
    struct MockHost {
        content: String,
        fail_load: bool,
        fail_updates: bool,
        updates: Vec<String>,
        saves: Vec<String>,
        events: Vec<HostEvent>,
        revision: u64,
    }

    impl MockHost {
        fn with_content(content: &str) -> Self {
            Self {
                content: content.to_string(),
                ..Self::default()
            }
        }
    }

    impl Host for MockHost {
        fn load(&mut self) -> Result<String> {
            if self.fail_load {
                return Err(Error::load("backend unavailable"));
            }
            Ok(self.content.clone())
        }

        fn save(&mut self, content: &str) -> Result<()> {
            self.saves.push(content.to_string());
            Ok(())
        }

        fn handle_update_content(&mut self, content: &str) -> Result<()> {
            if self.fail_updates {
                return Err(Error::HostIo(std::io::Error::other("pipe closed")));
            }
            self.updates.push(content.to_string());
            Ok(())
        }

        fn open_file_dialogue(&mut self) -> Result<()> {
            Ok(())
        }

        fn get_config(&self) -> HostConfig {
            HostConfig::default()
        }

        fn next_timestamp(&mut self) -> u64 {
            self.revision += 1;
            self.revision
        }

        fn poll_event(&mut self) -> Option<HostEvent> {
            if self.events.is_empty() {
                None
            } else {
                Some(self.events.remove(0))
            }
        }
    }

    #[test]
    fn test_session_loads_initial_document() {
        let session = Session::new(MockHost::with_content("# One\n\ntwo"));
        assert_eq!(session.model.load_state, LoadState::Ready);
        assert_eq!(session.model.document.len(), 2);
        assert_eq!(session.model.document.revision(), 1);
    }

    #[test]
    fn test_failed_load_leaves_empty_document_with_notice() {
        let mut host = MockHost::with_content("ignored");
        host.fail_load = true;
        let session = Session::new(host);

        assert!(matches!(session.model.load_state, LoadState::Failed(_)));
        assert!(session.model.document.is_empty());
        assert!(session.model.notice.as_deref().unwrap().contains("backend"));
    }

    #[test]
    fn test_debounced_edit_reaches_host_once() {
        let mut session = Session::new(MockHost::with_content("alpha\n\nbeta"));
        session.handle(Message::ClickChunk(0));
        session.handle(Message::EditActive {
            text: "alpha edited".to_string(),
            at_ms: 0,
        });
        session.handle(Message::EditActive {
            text: "alpha edited more".to_string(),
            at_ms: 100,
        });

        session.handle(Message::Tick { now_ms: 200 });
        assert!(session.host().updates.is_empty());

        session.handle(Message::Tick { now_ms: 250 });
        assert_eq!(
            session.host().updates,
            vec!["alpha edited more\n\nbeta".to_string()]
        );

        session.handle(Message::Tick { now_ms: 1_000 });
        assert_eq!(session.host().updates.len(), 1);
    }

    #[test]
    fn test_failed_update_keeps_edits_and_retries() {
        let mut host = MockHost::with_content("alpha\n\nbeta");
        host.fail_updates = true;
        let mut session = Session::new(host);

        session.handle(Message::ClickChunk(0));
        session.handle(Message::EditActive {
            text: "kept".to_string(),
            at_ms: 0,
        });
        session.handle(Message::Tick { now_ms: 200 });
        assert!(session.model.notice.is_some());
        assert_eq!(session.model.document.to_text(), "kept\n\nbeta");

        // The host recovers; the retry window delivers the content.
        session.host.fail_updates = false;
        session.handle(Message::Tick { now_ms: 400 });
        assert_eq!(session.host().updates, vec!["kept\n\nbeta".to_string()]);
    }

    #[test]
    fn test_file_save_event_flushes_live_edit_immediately() {
        let mut session = Session::new(MockHost::with_content("alpha\n\nbeta"));
        session.handle(Message::ClickChunk(1));
        session.handle(Message::EditActive {
            text: "beta *edited*".to_string(),
            at_ms: 0,
        });

        session.host.events.push(HostEvent::FileSave);
        session.pump(10);

        // The save bypassed the debounce window and carries the canonical
        // serialization of the live tree.
        assert_eq!(session.host().saves, vec!["alpha\n\nbeta _edited_".to_string()]);
        // Focus did not move.
        assert_eq!(session.model.focus.active_index(), Some(1));
    }

    #[test]
    fn test_pump_applies_file_opened_events_in_order() {
        let mut session = Session::new(MockHost::with_content("start"));
        session.host.events.push(HostEvent::FileOpened {
            content: "second".to_string(),
            timestamp: 2,
        });
        session.host.events.push(HostEvent::FileOpened {
            content: "third".to_string(),
            timestamp: 3,
        });
        session.pump(0);
        assert_eq!(session.model.document.to_text(), "third");
        assert_eq!(session.model.document.revision(), 3);
    }

    #[test]
    fn test_reload_wins_over_pending_flush() {
        let mut session = Session::new(MockHost::with_content("alpha\n\nbeta"));
        session.handle(Message::ClickChunk(0));
        session.handle(Message::EditActive {
            text: "doomed".to_string(),
            at_ms: 0,
        });

        session.host.events.push(HostEvent::FileOpened {
            content: "reloaded".to_string(),
            timestamp: 5,
        });
        session.pump(1_000);

        assert!(session.host().updates.is_empty());
        assert_eq!(session.model.document.to_text(), "reloaded");
    }

    #[test]
    fn test_new_document_goes_through_reload_path() {
        let mut session = Session::new(MockHost::with_content("old stuff"));
        session.handle(Message::ClickChunk(0));
        session.new_document();
        assert!(session.model.document.is_empty());
        assert_eq!(session.model.focus.active_index(), None);
        assert!(session.model.document.revision() > 1);
    }
}
