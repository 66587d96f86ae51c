use serde::{Deserialize, Serialize};

use crate::classify::FileKind;

/// Commit metadata attached to a file once its content has been retrieved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMeta {
    #[serde(default)]
    pub commit_author: Option<String>,
    #[serde(default)]
    pub commit_date: Option<String>,
}

/// The content tuple retrieved for a single file.
///
/// `text` is absent for binary assets; `size` is absent when the host
/// does not report one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileData {
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub meta: FileMeta,
}

/// Whether a file's content tuple has been retrieved yet.
///
/// A listing alone produces `Unfetched` items; the content fetch (or a
/// cache hit on an unchanged hash) moves them to `Fetched`.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchState {
    Unfetched,
    Fetched(FileData),
}

impl FetchState {
    pub fn data(&self) -> Option<&FileData> {
        match self {
            Self::Unfetched => None,
            Self::Fetched(data) => Some(data),
        }
    }
}

/// A single file in the repository listing.
#[derive(Debug, Clone, PartialEq)]
pub struct FileListItem {
    pub path: String,
    /// Basename derived from `path`.
    pub name: String,
    /// Stable content identifier (e.g. a Git blob hash).
    pub content_hash: String,
    /// Size as reported by the listing, when the host provides one.
    pub size: Option<u64>,
    pub kind: FileKind,
    pub content: FetchState,
}

impl FileListItem {
    pub fn new(path: impl Into<String>, content_hash: impl Into<String>, kind: FileKind) -> Self {
        let path = path.into();

        Self {
            name: basename(&path).to_owned(),
            path,
            content_hash: content_hash.into(),
            size: None,
            kind,
            content: FetchState::Unfetched,
        }
    }

    /// True if the content tuple still has to be retrieved.
    pub fn needs_fetch(&self) -> bool {
        matches!(self.content, FetchState::Unfetched)
    }

    pub fn data(&self) -> Option<&FileData> {
        self.content.data()
    }

    /// Combine this item with freshly fetched data for its path.
    ///
    /// Already-fetched items are returned unchanged, so the merge is
    /// idempotent; an unfetched item takes the fetched tuple when one is
    /// present. Pure: neither input is mutated.
    pub fn merged_with(&self, fetched: Option<&FileData>) -> Self {
        let mut merged = self.clone();

        if merged.needs_fetch()
            && let Some(data) = fetched
        {
            merged.size = merged.size.or(data.size);
            merged.content = FetchState::Fetched(data.clone());
        }

        merged
    }
}

/// A durable cache record for one file, keyed by path in the cache store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedFileEntry {
    pub content_hash: String,
    pub data: FileData,
}

/// Last path segment of a slash-separated repository path.
pub fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
