use std::collections::HashMap;
use std::sync::Arc;

use crate::file::{FileData, FileListItem};

/// Errors that can occur when talking to a remote repository host.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("{0}")]
    Other(String),
}

/// The latest commit on the synchronized branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub hash: String,
    pub message: String,
}

/// One file as reported by the remote listing: path, content hash, and
/// the size when the host includes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    pub path: String,
    pub content_hash: String,
    pub size: Option<u64>,
}

/// A remote repository host.
///
/// Implementations know how to resolve the default branch, read commit
/// metadata, list the tree, and retrieve file contents in bulk for a
/// particular hosting provider.
#[async_trait::async_trait]
pub trait RemoteRepository: Send + Sync {
    /// Human-readable label identifying this repository.
    fn label(&self) -> &str;

    /// Resolve the repository's default branch name.
    async fn resolve_default_branch(&self) -> Result<String, RemoteError>;

    /// Latest commit on the given branch.
    async fn fetch_last_commit(&self, branch: &str) -> Result<Commit, RemoteError>;

    /// Complete repository file listing at the given commit.
    async fn fetch_file_list(&self, last_hash: &str) -> Result<Vec<RemoteFile>, RemoteError>;

    /// Batch retrieval of content and metadata for exactly the given files,
    /// keyed by path.
    async fn fetch_file_contents(
        &self,
        files: &[FileListItem],
    ) -> Result<HashMap<String, FileData>, RemoteError>;
}

#[async_trait::async_trait]
impl<T: RemoteRepository + ?Sized> RemoteRepository for Arc<T> {
    fn label(&self) -> &str {
        (**self).label()
    }

    async fn resolve_default_branch(&self) -> Result<String, RemoteError> {
        (**self).resolve_default_branch().await
    }

    async fn fetch_last_commit(&self, branch: &str) -> Result<Commit, RemoteError> {
        (**self).fetch_last_commit(branch).await
    }

    async fn fetch_file_list(&self, last_hash: &str) -> Result<Vec<RemoteFile>, RemoteError> {
        (**self).fetch_file_list(last_hash).await
    }

    async fn fetch_file_contents(
        &self,
        files: &[FileListItem],
    ) -> Result<HashMap<String, FileData>, RemoteError> {
        (**self).fetch_file_contents(files).await
    }
}
