use std::sync::Arc;

use content_sync::test_support::{FakeRemote, InMemoryFileCache, InMemoryMetadataStore};
use content_sync::store::LAST_COMMIT_HASH_KEY;
use content_sync::{
    FileCache, FrontMatterParser, MetadataStore, PathRules, PublishedContent, RepositoryInfo,
    SyncError, Synchronizer,
};

struct TestRig {
    remote: Arc<FakeRemote>,
    meta_store: Arc<InMemoryMetadataStore>,
    cache: Arc<InMemoryFileCache>,
    state: Arc<PublishedContent>,
    sync: Synchronizer,
}

fn rig_with_branch(hash: &str, message: &str, branch: Option<&str>) -> TestRig {
    let remote = Arc::new(FakeRemote::new(hash, message));
    let meta_store = Arc::new(InMemoryMetadataStore::default());
    let cache = Arc::new(InMemoryFileCache::default());
    let state = Arc::new(PublishedContent::new());

    let sync = Synchronizer::new(
        RepositoryInfo {
            namespace: "owner/repo".to_owned(),
            branch: branch.map(|b| b.to_owned()),
        },
        remote.clone(),
        meta_store.clone(),
        cache.clone(),
        Arc::new(PathRules::default()),
        Arc::new(FrontMatterParser),
        state.clone(),
    );

    TestRig {
        remote,
        meta_store,
        cache,
        state,
        sync,
    }
}

fn rig(hash: &str, message: &str) -> TestRig {
    rig_with_branch(hash, message, None)
}

#[tokio::test]
async fn first_sync_fetches_parses_and_publishes() {
    let mut rig = rig("abc123", "initial import");
    rig.remote.set_listing(&[
        ("content/posts/a.md", "h1", 64),
        ("static/img/logo.png", "h2", 2048),
        (".gitattributes", "h3", 16),
    ]);
    rig.remote
        .set_content("content/posts/a.md", "---\ntitle: First Post\n---\nHello.\n");

    let outcome = rig.sync.synchronize().await.unwrap();

    assert_eq!(outcome.commit_hash, "abc123");
    assert_eq!(outcome.entries, 1);
    assert_eq!(outcome.assets, 1);
    assert_eq!(outcome.config_files, 1);
    assert_eq!(outcome.fetched, 3);

    let snapshot = rig.state.snapshot();
    assert!(snapshot.data_loaded);
    assert_eq!(snapshot.entries[0].name, "a.md");
    assert_eq!(
        snapshot.entries[0]
            .fields
            .get("title")
            .and_then(|v| v.as_str()),
        Some("First Post")
    );
    assert_eq!(snapshot.assets[0].path, "static/img/logo.png");
    assert_eq!(snapshot.config_files[0].path, ".gitattributes");

    assert_eq!(
        rig.cache.paths(),
        vec![
            ".gitattributes".to_owned(),
            "content/posts/a.md".to_owned(),
            "static/img/logo.png".to_owned(),
        ]
    );
}

#[tokio::test]
async fn unchanged_commit_serves_everything_from_cache() {
    let mut rig = rig("abc123", "update");
    rig.remote.set_listing(&[("content/posts/a.md", "h1", 10)]);

    rig.sync.synchronize().await.unwrap();
    let outcome = rig.sync.synchronize().await.unwrap();

    // One listing fetch, one content batch: both from the first pass.
    assert_eq!(rig.remote.file_list_calls(), 1);
    assert_eq!(rig.remote.content_requests().len(), 1);
    assert_eq!(outcome.fetched, 0);
    assert_eq!(outcome.entries, 1);
    assert!(rig.state.snapshot().data_loaded);
}

#[tokio::test]
async fn advancing_commit_fetches_only_changed_files() {
    let mut rig = rig("abc123", "first");
    rig.remote.set_listing(&[("content/posts/a.md", "h1", 10)]);
    rig.remote
        .set_content("content/posts/a.md", "---\ntitle: A\n---\noriginal body\n");
    rig.sync.synchronize().await.unwrap();

    rig.remote.set_commit("def456", "add b");
    rig.remote.set_listing(&[
        ("content/posts/a.md", "h1", 10),
        ("content/posts/b.md", "h2", 20),
    ]);

    let outcome = rig.sync.synchronize().await.unwrap();

    // Only the new file was requested.
    let requests = rig.remote.content_requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1], vec!["content/posts/b.md".to_owned()]);
    assert_eq!(outcome.fetched, 1);

    // The unchanged entry kept its cached content byte for byte.
    let snapshot = rig.state.snapshot();
    let a = snapshot
        .entries
        .iter()
        .find(|e| e.path == "content/posts/a.md")
        .unwrap();
    assert_eq!(a.body, "original body\n");

    assert_eq!(
        rig.cache.paths(),
        vec![
            "content/posts/a.md".to_owned(),
            "content/posts/b.md".to_owned(),
        ]
    );
    assert_eq!(
        rig.meta_store
            .get(LAST_COMMIT_HASH_KEY)
            .await
            .unwrap()
            .as_deref(),
        Some("def456")
    );
}

#[tokio::test]
async fn removed_files_are_pruned_from_cache() {
    let mut rig = rig("abc123", "first");
    rig.remote.set_listing(&[
        ("content/posts/keep.md", "h1", 10),
        ("content/posts/old.md", "h2", 10),
    ]);
    rig.sync.synchronize().await.unwrap();
    assert_eq!(rig.cache.paths().len(), 2);

    rig.remote.set_commit("def456", "remove old post");
    rig.remote.set_listing(&[("content/posts/keep.md", "h1", 10)]);

    let outcome = rig.sync.synchronize().await.unwrap();
    outcome.prune.expect("prune task should run").await.unwrap();

    assert_eq!(rig.cache.paths(), vec!["content/posts/keep.md".to_owned()]);
}

#[tokio::test]
async fn empty_listing_publishes_empty_loaded_state() {
    let mut rig = rig("abc123", "empty tree");

    let outcome = rig.sync.synchronize().await.unwrap();

    let snapshot = rig.state.snapshot();
    assert!(snapshot.data_loaded);
    assert!(snapshot.entries.is_empty());
    assert!(snapshot.assets.is_empty());
    assert!(snapshot.config_files.is_empty());
    assert!(snapshot.parse_errors.is_empty());

    assert_eq!(outcome.fetched, 0);
    assert!(rig.remote.content_requests().is_empty());
}

#[tokio::test]
async fn failed_content_fetch_leaves_previous_publish_intact() {
    let mut rig = rig("abc123", "first");
    rig.remote.set_listing(&[("content/posts/a.md", "h1", 10)]);
    rig.remote
        .set_content("content/posts/a.md", "---\ntitle: A\n---\nstable\n");
    rig.sync.synchronize().await.unwrap();
    let before = rig.state.snapshot();

    rig.remote.set_commit("def456", "breaks");
    rig.remote.set_listing(&[
        ("content/posts/a.md", "h1", 10),
        ("content/posts/b.md", "h2", 10),
    ]);
    rig.remote.fail_file_contents();

    let result = rig.sync.synchronize().await;
    assert!(matches!(result, Err(SyncError::Remote(_))));

    let after = rig.state.snapshot();
    assert!(after.data_loaded);
    assert_eq!(after.entries.len(), before.entries.len());
    assert_eq!(after.entries[0].body, "stable\n");
}

#[tokio::test]
async fn parse_errors_are_collected_without_aborting() {
    let mut rig = rig("abc123", "first");
    rig.remote.set_listing(&[
        ("content/posts/good.md", "h1", 10),
        ("content/bad.yaml", "h2", 10),
    ]);
    rig.remote
        .set_content("content/posts/good.md", "---\ntitle: Good\n---\nFine.\n");
    rig.remote.set_content("content/bad.yaml", "title: [unclosed\n");

    let outcome = rig.sync.synchronize().await.unwrap();

    assert_eq!(outcome.entries, 1);
    assert_eq!(outcome.parse_errors, 1);

    let snapshot = rig.state.snapshot();
    assert!(snapshot.data_loaded);
    assert_eq!(snapshot.parse_errors[0].path, "content/bad.yaml");
}

#[tokio::test]
async fn default_branch_is_resolved_once_per_session() {
    let mut rig = rig("abc123", "first");
    rig.remote.set_listing(&[("content/posts/a.md", "h1", 10)]);

    rig.sync.synchronize().await.unwrap();
    rig.remote.set_commit("def456", "second");
    rig.sync.synchronize().await.unwrap();

    assert_eq!(rig.remote.branch_resolutions(), 1);
    assert_eq!(rig.sync.branch(), Some("main"));
}

#[tokio::test]
async fn configured_branch_skips_resolution() {
    let mut rig = rig_with_branch("abc123", "first", Some("develop"));
    rig.remote.set_listing(&[("content/posts/a.md", "h1", 10)]);

    rig.sync.synchronize().await.unwrap();

    assert_eq!(rig.remote.branch_resolutions(), 0);
    assert_eq!(rig.sync.branch(), Some("develop"));
}

#[tokio::test]
async fn skip_marker_commit_clears_published_signal() {
    let mut rig = rig("abc123", "[skip ci] editorial tweak");
    rig.sync.synchronize().await.unwrap();
    assert!(!rig.state.last_commit_published());

    rig.remote.set_commit("def456", "regular release");
    rig.sync.synchronize().await.unwrap();
    assert!(rig.state.last_commit_published());
}

#[tokio::test]
async fn emptied_cache_forces_listing_refetch_on_same_commit() {
    let mut rig = rig("abc123", "first");
    rig.remote.set_listing(&[("content/posts/a.md", "h1", 10)]);
    rig.sync.synchronize().await.unwrap();

    // Simulate a wiped cache with metadata left behind.
    let paths = rig.cache.paths();
    rig.cache.delete_entries(&paths).await.unwrap();

    rig.sync.synchronize().await.unwrap();

    assert_eq!(rig.remote.file_list_calls(), 2);
    assert_eq!(rig.cache.paths(), vec!["content/posts/a.md".to_owned()]);
}

#[tokio::test]
async fn subscribers_see_one_atomic_update_per_pass() {
    let mut rig = rig("abc123", "first");
    rig.remote.set_listing(&[("content/posts/a.md", "h1", 10)]);
    let mut receiver = rig.state.subscribe();

    rig.sync.synchronize().await.unwrap();

    receiver.changed().await.unwrap();
    let seen = receiver.borrow_and_update().clone();
    assert!(seen.data_loaded);
    assert_eq!(seen.entries.len(), 1);

    // No half-updated intermediate snapshot was left queued.
    assert!(!receiver.has_changed().unwrap());
}
