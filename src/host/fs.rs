//! Filesystem-backed host.
//!
//! Serves one markdown file: `load` reads it, `save` persists it,
//! `handle_update_content` keeps an in-memory mirror of the latest flushed
//! state, and a debounced watcher turns external modifications into
//! `file-opened` events carrying the host's monotonic revision counter.

use std::hash::{DefaultHasher, Hash, Hasher};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::{self, HostConfig};
use crate::error::{Error, Result};
use crate::host::{FileWatcher, Host, HostEvent};

/// Watcher debounce: one external save, one reload event.
const WATCH_DEBOUNCE: Duration = Duration::from_millis(200);

/// Starter content served when no file is open yet.
const WELCOME: &str = "# marksync\n\nOpen a markdown file to start editing, or start typing here.";

fn hash_text(text: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    hasher.finish()
}

/// A host backed by a single file on disk.
pub struct FsHost {
    path: Option<PathBuf>,
    watcher: Option<FileWatcher>,
    watch_enabled: bool,
    config: HostConfig,
    /// Latest content flushed by the pipeline.
    content: String,
    /// Hash of the last content this host wrote, used to swallow watcher
    /// echoes of our own saves.
    last_written: Option<u64>,
    revision: u64,
    queued: Vec<HostEvent>,
}

impl FsHost {
    /// A host with no backing file; `load` serves the welcome document.
    pub fn new(config: HostConfig) -> Self {
        Self {
            path: None,
            watcher: None,
            watch_enabled: false,
            config,
            content: WELCOME.to_string(),
            last_written: None,
            revision: 0,
            queued: Vec::new(),
        }
    }

    /// A host backed by `path`, loading config from the platform location.
    pub fn for_path(path: impl Into<PathBuf>) -> Self {
        let mut host = Self::new(config::load_config(&config::config_path()));
        host.path = Some(path.into());
        host
    }

    /// Enable or disable watching the backing file for external changes.
    pub fn with_watch(mut self, enabled: bool) -> Self {
        self.watch_enabled = enabled;
        self
    }

    /// Replace the config this host serves.
    pub const fn with_config(mut self, config: HostConfig) -> Self {
        self.config = config;
        self
    }

    /// The backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Point the host at a new backing file and queue a `file-opened` event
    /// for its content.
    ///
    /// # Errors
    ///
    /// Returns a load error when the file cannot be read.
    pub fn open_path(&mut self, path: PathBuf) -> Result<()> {
        let content = read_markdown(&path)?;
        self.path = Some(path);
        self.watcher = None;
        self.content.clone_from(&content);
        self.last_written = None;
        let timestamp = self.next_timestamp();
        self.queued.push(HostEvent::FileOpened { content, timestamp });
        Ok(())
    }

    fn ensure_watcher(&mut self) {
        if !self.watch_enabled || self.watcher.is_some() {
            return;
        }
        let Some(path) = &self.path else { return };
        match FileWatcher::new(path, WATCH_DEBOUNCE) {
            Ok(watcher) => self.watcher = Some(watcher),
            Err(err) => {
                self.watch_enabled = false;
                tracing::warn!(path = %path.display(), %err, "watch unavailable");
            }
        }
    }
}

fn read_markdown(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|err| Error::load(format!("{}: {err}", path.display())))
}

impl Host for FsHost {
    fn load(&mut self) -> Result<String> {
        let content = match &self.path {
            Some(path) => read_markdown(path)?,
            None => WELCOME.to_string(),
        };
        self.content.clone_from(&content);
        self.ensure_watcher();
        Ok(content)
    }

    fn save(&mut self, content: &str) -> Result<()> {
        let Some(path) = &self.path else {
            return Err(Error::NoSavePath);
        };
        std::fs::write(path, content)?;
        self.content = content.to_string();
        self.last_written = Some(hash_text(content));
        tracing::info!(path = %path.display(), bytes = content.len(), "document saved");
        Ok(())
    }

    fn handle_update_content(&mut self, content: &str) -> Result<()> {
        self.content = content.to_string();
        tracing::debug!(bytes = content.len(), "update received");
        Ok(())
    }

    fn open_file_dialogue(&mut self) -> Result<()> {
        let Some(picked) = rfd::FileDialog::new()
            .add_filter("markdown", &["md", "markdown"])
            .pick_file()
        else {
            // User cancelled; not an error and no event.
            return Ok(());
        };
        self.open_path(picked)
    }

    fn get_config(&self) -> HostConfig {
        self.config
    }

    fn next_timestamp(&mut self) -> u64 {
        self.revision += 1;
        self.revision
    }

    fn poll_event(&mut self) -> Option<HostEvent> {
        if !self.queued.is_empty() {
            return Some(self.queued.remove(0));
        }

        self.ensure_watcher();
        if self.watcher.as_mut().is_some_and(FileWatcher::take_change_ready) {
            let path = self.path.clone()?;
            match read_markdown(&path) {
                Ok(content) => {
                    if self.last_written == Some(hash_text(&content)) {
                        tracing::debug!("watcher echo of our own save, ignored");
                        return None;
                    }
                    let timestamp = self.next_timestamp();
                    return Some(HostEvent::FileOpened { content, timestamp });
                }
                Err(err) => {
                    tracing::warn!(%err, "reload read failed");
                }
            }
        }
        None
    }
}
