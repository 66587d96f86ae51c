use std::collections::HashMap;

use crate::file::{CachedFileEntry, FetchState};
use crate::list::FileList;

/// Merge cached content tuples into the current listing, in place.
///
/// A cached entry is usable only when its content hash equals the listed
/// file's hash; stale entries are ignored, leaving the item `Unfetched`
/// and therefore marked for the batch content fetch. Pure reconciliation,
/// no I/O.
pub fn restore_cached_data(list: &mut FileList, cached_files: &HashMap<String, CachedFileEntry>) {
    for item in &mut list.files {
        if !item.needs_fetch() {
            continue;
        }

        if let Some(entry) = cached_files.get(&item.path)
            && entry.content_hash == item.content_hash
        {
            item.size = item.size.or(entry.data.size);
            item.content = FetchState::Fetched(entry.data.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::PathRules;
    use crate::file::{FileData, FileMeta};
    use crate::remote::RemoteFile;

    fn listing(files: &[(&str, &str)]) -> FileList {
        FileList::from_remote(
            files
                .iter()
                .map(|(path, hash)| RemoteFile {
                    path: (*path).to_owned(),
                    content_hash: (*hash).to_owned(),
                    size: None,
                })
                .collect(),
            &PathRules::default(),
        )
    }

    fn cache(entries: &[(&str, &str, &str)]) -> HashMap<String, CachedFileEntry> {
        entries
            .iter()
            .map(|(path, hash, text)| {
                (
                    (*path).to_owned(),
                    CachedFileEntry {
                        content_hash: (*hash).to_owned(),
                        data: FileData {
                            size: Some(text.len() as u64),
                            text: Some((*text).to_owned()),
                            meta: FileMeta::default(),
                        },
                    },
                )
            })
            .collect()
    }

    #[test]
    fn matching_hash_restores_cached_data() {
        let mut list = listing(&[("content/a.md", "h1")]);
        restore_cached_data(&mut list, &cache(&[("content/a.md", "h1", "cached body")]));

        let item = &list.files[0];
        assert!(!item.needs_fetch());
        assert_eq!(item.data().unwrap().text.as_deref(), Some("cached body"));
        assert_eq!(item.size, Some(11));
    }

    #[test]
    fn stale_hash_leaves_item_unfetched() {
        let mut list = listing(&[("content/a.md", "h2")]);
        restore_cached_data(&mut list, &cache(&[("content/a.md", "h1", "old body")]));

        assert!(list.files[0].needs_fetch());
    }

    #[test]
    fn unknown_path_leaves_item_unfetched() {
        let mut list = listing(&[("content/new.md", "h1")]);
        restore_cached_data(&mut list, &cache(&[("content/other.md", "h1", "body")]));

        assert!(list.files[0].needs_fetch());
    }

    #[test]
    fn mixed_listing_restores_only_matches() {
        let mut list = listing(&[("content/a.md", "h1"), ("content/b.md", "h2")]);
        restore_cached_data(&mut list, &cache(&[("content/a.md", "h1", "body")]));

        assert!(!list.files[0].needs_fetch());
        assert!(list.files[1].needs_fetch());
    }
}
