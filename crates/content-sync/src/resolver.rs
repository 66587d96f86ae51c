use crate::classify::FileClassifier;
use crate::file::CachedFileEntry;
use crate::list::FileList;
use crate::remote::RemoteRepository;
use crate::store::{MetadataStore, SyncMetadata};
use crate::sync::SyncError;

/// Resolve the repository listing for the given commit, from cache when
/// possible.
///
/// The cache-hit path requires the stored commit hash to match, the config
/// files to have been fetched at least once, and the file cache to be
/// non-empty. An empty cache forces a remote fetch even on a hash match:
/// the previous pass may have recorded metadata and then failed before
/// populating any content.
///
/// Only the cache-miss path rewrites the stored metadata.
pub async fn resolve_file_list(
    meta_store: &dyn MetadataStore,
    remote: &dyn RemoteRepository,
    classifier: &dyn FileClassifier,
    last_hash: &str,
    cached_entries: &[(String, CachedFileEntry)],
) -> Result<FileList, SyncError> {
    let metadata = SyncMetadata::load(meta_store).await?;

    let cache_usable = metadata.last_commit_hash.as_deref() == Some(last_hash)
        && metadata.config_fetched
        && !cached_entries.is_empty();

    if cache_usable {
        log::debug!("serving file list for {last_hash} from cache");
        return Ok(FileList::from_cache(cached_entries, classifier));
    }

    let files = remote.fetch_file_list(last_hash).await?;
    let list = FileList::from_remote(files, classifier);

    SyncMetadata::record(meta_store, last_hash).await?;

    Ok(list)
}
