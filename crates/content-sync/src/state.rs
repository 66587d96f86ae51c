use tokio::sync::watch;

use crate::parser::{Asset, ConfigFile, Entry, ParseError};

/// The externally observable result of a sync pass.
///
/// All fields are committed together; `data_loaded` is true only on
/// snapshots produced by a completed pass.
#[derive(Debug, Clone, Default)]
pub struct ContentSnapshot {
    pub entries: Vec<Entry>,
    pub assets: Vec<Asset>,
    pub config_files: Vec<ConfigFile>,
    pub parse_errors: Vec<ParseError>,
    pub data_loaded: bool,
}

/// Process-wide published content state.
///
/// Backed by watch channels: each publish replaces the whole snapshot in
/// one step, so an observer that sees `data_loaded == true` is guaranteed
/// to see the entries/assets/config files/errors of the same pass —
/// never a mix of two passes. Readers subscribe or take point-in-time
/// clones; only the orchestrator writes.
#[derive(Debug)]
pub struct PublishedContent {
    content: watch::Sender<ContentSnapshot>,
    last_commit_published: watch::Sender<bool>,
}

impl Default for PublishedContent {
    fn default() -> Self {
        Self {
            content: watch::Sender::new(ContentSnapshot::default()),
            last_commit_published: watch::Sender::new(true),
        }
    }
}

impl PublishedContent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commit the result of a completed sync pass.
    pub fn publish(
        &self,
        entries: Vec<Entry>,
        assets: Vec<Asset>,
        config_files: Vec<ConfigFile>,
        parse_errors: Vec<ParseError>,
    ) {
        self.content.send_replace(ContentSnapshot {
            entries,
            assets,
            config_files,
            parse_errors,
            data_loaded: true,
        });
    }

    /// Commit an empty-but-loaded snapshot (the repository has no managed
    /// files).
    pub fn publish_empty(&self) {
        self.publish(Vec::new(), Vec::new(), Vec::new(), Vec::new());
    }

    /// Side-channel signal: whether the latest commit triggered a
    /// deployment.
    pub fn set_last_commit_published(&self, published: bool) {
        self.last_commit_published.send_replace(published);
    }

    pub fn subscribe(&self) -> watch::Receiver<ContentSnapshot> {
        self.content.subscribe()
    }

    pub fn subscribe_last_commit_published(&self) -> watch::Receiver<bool> {
        self.last_commit_published.subscribe()
    }

    /// Point-in-time clone of the current snapshot.
    pub fn snapshot(&self) -> ContentSnapshot {
        self.content.borrow().clone()
    }

    pub fn data_loaded(&self) -> bool {
        self.content.borrow().data_loaded
    }

    pub fn last_commit_published(&self) -> bool {
        *self.last_commit_published.borrow()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_unloaded_and_empty() {
        let state = PublishedContent::new();
        let snapshot = state.snapshot();

        assert!(!snapshot.data_loaded);
        assert!(snapshot.entries.is_empty());
        assert!(snapshot.assets.is_empty());
        assert!(snapshot.config_files.is_empty());
        assert!(snapshot.parse_errors.is_empty());
        assert!(state.last_commit_published());
    }

    #[test]
    fn publish_empty_marks_data_loaded() {
        let state = PublishedContent::new();
        state.publish_empty();

        let snapshot = state.snapshot();
        assert!(snapshot.data_loaded);
        assert!(snapshot.entries.is_empty());
    }

    #[tokio::test]
    async fn subscribers_observe_whole_snapshots() {
        let state = PublishedContent::new();
        let mut receiver = state.subscribe();

        state.publish(
            vec![Entry {
                path: "content/a.md".into(),
                name: "a.md".into(),
                fields: Default::default(),
                body: "body".into(),
                size: None,
                meta: Default::default(),
            }],
            Vec::new(),
            Vec::new(),
            Vec::new(),
        );

        receiver.changed().await.unwrap();
        let seen = receiver.borrow_and_update().clone();
        assert!(seen.data_loaded);
        assert_eq!(seen.entries.len(), 1);
    }

    #[test]
    fn last_commit_signal_is_independent() {
        let state = PublishedContent::new();
        state.set_last_commit_published(false);

        assert!(!state.last_commit_published());
        // Content snapshot untouched by the side channel.
        assert!(!state.data_loaded());
    }
}
