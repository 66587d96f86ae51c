use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::file::{CachedFileEntry, FileData, FileListItem, FileMeta};
use crate::remote::{Commit, RemoteError, RemoteFile, RemoteRepository};
use crate::store::{FileCache, MetadataStore, StoreError};

/// In-memory metadata store for testing.
#[derive(Debug, Default)]
pub struct InMemoryMetadataStore {
    values: Mutex<HashMap<String, String>>,
    writes: AtomicUsize,
}

impl InMemoryMetadataStore {
    /// Number of `set` calls observed.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl MetadataStore for InMemoryMetadataStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.lock().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.values
            .lock()
            .unwrap()
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// In-memory file cache for testing.
#[derive(Debug, Default)]
pub struct InMemoryFileCache {
    entries: Mutex<HashMap<String, CachedFileEntry>>,
    saves: AtomicUsize,
    deletes: AtomicUsize,
}

impl InMemoryFileCache {
    pub fn save_calls(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.entries.lock().unwrap().keys().cloned().collect();
        paths.sort();
        paths
    }
}

#[async_trait::async_trait]
impl FileCache for InMemoryFileCache {
    async fn entries(&self) -> Result<Vec<(String, CachedFileEntry)>, StoreError> {
        let mut entries: Vec<_> = self
            .entries
            .lock()
            .unwrap()
            .iter()
            .map(|(path, entry)| (path.clone(), entry.clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(entries)
    }

    async fn save_entries(&self, entries: &[(String, CachedFileEntry)]) -> Result<(), StoreError> {
        self.saves.fetch_add(1, Ordering::SeqCst);

        let mut map = self.entries.lock().unwrap();
        for (path, entry) in entries {
            map.insert(path.clone(), entry.clone());
        }
        Ok(())
    }

    async fn delete_entries(&self, paths: &[String]) -> Result<(), StoreError> {
        self.deletes.fetch_add(1, Ordering::SeqCst);

        let mut map = self.entries.lock().unwrap();
        for path in paths {
            map.remove(path);
        }
        Ok(())
    }
}

/// Scriptable remote repository for testing.
///
/// Content for listed files is synthesized deterministically unless set
/// explicitly; call counters let tests assert which remote operations ran.
#[derive(Debug)]
pub struct FakeRemote {
    default_branch: String,
    commit: Mutex<Commit>,
    listing: Mutex<Vec<RemoteFile>>,
    contents: Mutex<HashMap<String, FileData>>,
    branch_resolutions: AtomicUsize,
    file_list_calls: AtomicUsize,
    content_requests: Mutex<Vec<Vec<String>>>,
    fail_file_contents: AtomicBool,
}

impl FakeRemote {
    pub fn new(commit_hash: &str, commit_message: &str) -> Self {
        Self {
            default_branch: "main".to_owned(),
            commit: Mutex::new(Commit {
                hash: commit_hash.to_owned(),
                message: commit_message.to_owned(),
            }),
            listing: Mutex::new(Vec::new()),
            contents: Mutex::new(HashMap::new()),
            branch_resolutions: AtomicUsize::new(0),
            file_list_calls: AtomicUsize::new(0),
            content_requests: Mutex::new(Vec::new()),
            fail_file_contents: AtomicBool::new(false),
        }
    }

    pub fn set_commit(&self, hash: &str, message: &str) {
        *self.commit.lock().unwrap() = Commit {
            hash: hash.to_owned(),
            message: message.to_owned(),
        };
    }

    pub fn set_listing(&self, files: &[(&str, &str, u64)]) {
        *self.listing.lock().unwrap() = files
            .iter()
            .map(|(path, hash, size)| RemoteFile {
                path: (*path).to_owned(),
                content_hash: (*hash).to_owned(),
                size: Some(*size),
            })
            .collect();
    }

    pub fn set_content(&self, path: &str, text: &str) {
        self.contents.lock().unwrap().insert(
            path.to_owned(),
            FileData {
                size: Some(text.len() as u64),
                text: Some(text.to_owned()),
                meta: FileMeta::default(),
            },
        );
    }

    /// Make the next `fetch_file_contents` call fail with a network error.
    pub fn fail_file_contents(&self) {
        self.fail_file_contents.store(true, Ordering::SeqCst);
    }

    pub fn branch_resolutions(&self) -> usize {
        self.branch_resolutions.load(Ordering::SeqCst)
    }

    pub fn file_list_calls(&self) -> usize {
        self.file_list_calls.load(Ordering::SeqCst)
    }

    /// The path sets requested from `fetch_file_contents`, in call order.
    pub fn content_requests(&self) -> Vec<Vec<String>> {
        self.content_requests.lock().unwrap().clone()
    }

    fn synthesized(path: &str) -> FileData {
        let text = format!("body of {path}");

        FileData {
            size: Some(text.len() as u64),
            text: Some(text),
            meta: FileMeta {
                commit_author: Some("test".to_owned()),
                commit_date: None,
            },
        }
    }
}

#[async_trait::async_trait]
impl RemoteRepository for FakeRemote {
    fn label(&self) -> &str {
        "fake-remote"
    }

    async fn resolve_default_branch(&self) -> Result<String, RemoteError> {
        self.branch_resolutions.fetch_add(1, Ordering::SeqCst);
        Ok(self.default_branch.clone())
    }

    async fn fetch_last_commit(&self, _branch: &str) -> Result<Commit, RemoteError> {
        Ok(self.commit.lock().unwrap().clone())
    }

    async fn fetch_file_list(&self, _last_hash: &str) -> Result<Vec<RemoteFile>, RemoteError> {
        self.file_list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.listing.lock().unwrap().clone())
    }

    async fn fetch_file_contents(
        &self,
        files: &[FileListItem],
    ) -> Result<HashMap<String, FileData>, RemoteError> {
        self.content_requests
            .lock()
            .unwrap()
            .push(files.iter().map(|f| f.path.clone()).collect());

        if self.fail_file_contents.swap(false, Ordering::SeqCst) {
            return Err(RemoteError::Network("simulated outage".to_owned()));
        }

        let contents = self.contents.lock().unwrap();

        Ok(files
            .iter()
            .map(|file| {
                let data = contents
                    .get(&file.path)
                    .cloned()
                    .unwrap_or_else(|| Self::synthesized(&file.path));
                (file.path.clone(), data)
            })
            .collect())
    }
}
