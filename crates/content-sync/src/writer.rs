use std::collections::HashMap;
use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::file::{CachedFileEntry, FileData};
use crate::list::FileList;
use crate::store::FileCache;

/// Persist newly fetched file data and prune entries for paths that left
/// the repository.
///
/// Writes are best-effort: a failed save or prune is logged and never
/// fails the sync pass. The save is awaited; the prune runs as a spawned
/// background task whose handle is returned so callers can await it when
/// they care (tests do). Until the prune lands, stale rows may linger;
/// the hash check on the next pass makes that window harmless.
pub async fn update_cache(
    cache: Arc<dyn FileCache>,
    list: &FileList,
    cached_files: &HashMap<String, CachedFileEntry>,
    fetched_map: &HashMap<String, FileData>,
) -> Option<JoinHandle<()>> {
    let new_entries: Vec<(String, CachedFileEntry)> = list
        .files
        .iter()
        .filter_map(|item| {
            let data = fetched_map.get(&item.path)?;

            Some((
                item.path.clone(),
                CachedFileEntry {
                    content_hash: item.content_hash.clone(),
                    data: data.clone(),
                },
            ))
        })
        .collect();

    if !new_entries.is_empty()
        && let Err(error) = cache.save_entries(&new_entries).await
    {
        log::warn!("failed to save {} cache entries: {error}", new_entries.len());
    }

    let unused_paths: Vec<String> = cached_files
        .keys()
        .filter(|path| !list.files.iter().any(|item| &item.path == *path))
        .cloned()
        .collect();

    if unused_paths.is_empty() {
        return None;
    }

    Some(tokio::spawn(async move {
        if let Err(error) = cache.delete_entries(&unused_paths).await {
            log::warn!("failed to prune {} cache entries: {error}", unused_paths.len());
        }
    }))
}
