use crate::classify::{FileClassifier, FileKind};
use crate::file::{CachedFileEntry, FetchState, FileListItem};
use crate::remote::RemoteFile;

/// The classified repository listing for one sync pass.
///
/// `files` holds every managed file; the entry/asset/config views are
/// filtered by each item's [`FileKind`], so a single item is never
/// duplicated across collections. Paths classified as [`FileKind::Other`]
/// are dropped at construction: they are never fetched and never cached.
#[derive(Debug, Clone, Default)]
pub struct FileList {
    pub files: Vec<FileListItem>,
}

impl FileList {
    /// Build a listing from a fresh remote file list.
    pub fn from_remote(files: Vec<RemoteFile>, classifier: &dyn FileClassifier) -> Self {
        let files = files
            .into_iter()
            .filter_map(|file| {
                let kind = classifier.classify(&file.path);
                if kind == FileKind::Other {
                    return None;
                }

                let mut item = FileListItem::new(file.path, file.content_hash, kind);
                item.size = file.size;
                Some(item)
            })
            .collect();

        Self { files }
    }

    /// Rebuild a listing from cached entries, no remote call involved.
    ///
    /// Cached entries carry their full content tuple, so every item starts
    /// out `Fetched`.
    pub fn from_cache(entries: &[(String, CachedFileEntry)], classifier: &dyn FileClassifier) -> Self {
        let files = entries
            .iter()
            .filter_map(|(path, entry)| {
                let kind = classifier.classify(path);
                if kind == FileKind::Other {
                    return None;
                }

                let mut item = FileListItem::new(path.clone(), entry.content_hash.clone(), kind);
                item.size = entry.data.size;
                item.content = FetchState::Fetched(entry.data.clone());
                Some(item)
            })
            .collect();

        Self { files }
    }

    pub fn entry_files(&self) -> impl Iterator<Item = &FileListItem> {
        self.of_kind(FileKind::Entry)
    }

    pub fn asset_files(&self) -> impl Iterator<Item = &FileListItem> {
        self.of_kind(FileKind::Asset)
    }

    pub fn config_files(&self) -> impl Iterator<Item = &FileListItem> {
        self.of_kind(FileKind::Config)
    }

    /// Number of files the sync pass has to process.
    pub fn processing_count(&self) -> usize {
        self.files.len()
    }

    fn of_kind(&self, kind: FileKind) -> impl Iterator<Item = &FileListItem> {
        self.files.iter().filter(move |f| f.kind == kind)
    }
}
