use std::collections::HashMap;
use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::classify::FileClassifier;
use crate::file::{CachedFileEntry, FileListItem};
use crate::parser::ContentParser;
use crate::reconcile::restore_cached_data;
use crate::remote::{RemoteError, RemoteRepository};
use crate::resolver::resolve_file_list;
use crate::state::PublishedContent;
use crate::store::{FileCache, MetadataStore, StoreError};
use crate::writer::update_cache;

/// Commit messages starting with this marker did not trigger a deployment.
pub const DEPLOY_SKIP_PREFIX: &str = "[skip ci]";

/// Identifies one synchronized repository.
#[derive(Debug, Clone)]
pub struct RepositoryInfo {
    /// Stable identifier scoping the durable stores.
    pub namespace: String,
    /// Configured branch; resolved lazily from the remote when absent.
    pub branch: Option<String>,
}

/// Errors that abort a sync pass.
///
/// Any of these leaves the published state at its previous value; the
/// caller owns retry policy and user-facing messaging.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("remote error: {0}")]
    Remote(#[from] RemoteError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Summary of one completed sync pass.
#[derive(Debug)]
pub struct SyncOutcome {
    pub commit_hash: String,
    pub entries: usize,
    pub assets: usize,
    pub config_files: usize,
    pub parse_errors: usize,
    /// Files whose content had to be fetched this pass.
    pub fetched: usize,
    /// Background cache prune, when one was spawned. Completion is not
    /// part of the pass; await it to observe the pruned cache.
    pub prune: Option<JoinHandle<()>>,
}

/// Coordinates one repository's sync passes.
///
/// Owns the collaborator seams and the session's resolved-branch cache.
/// `synchronize` takes `&mut self`, so passes on one session never
/// overlap; concurrent sessions against the same namespace race on the
/// stores and are not supported.
pub struct Synchronizer {
    repository: RepositoryInfo,
    remote: Arc<dyn RemoteRepository>,
    meta_store: Arc<dyn MetadataStore>,
    cache: Arc<dyn FileCache>,
    classifier: Arc<dyn FileClassifier>,
    parser: Arc<dyn ContentParser>,
    state: Arc<PublishedContent>,
    /// Set at most once per session, read thereafter.
    resolved_branch: Option<String>,
}

impl Synchronizer {
    pub fn new(
        repository: RepositoryInfo,
        remote: Arc<dyn RemoteRepository>,
        meta_store: Arc<dyn MetadataStore>,
        cache: Arc<dyn FileCache>,
        classifier: Arc<dyn FileClassifier>,
        parser: Arc<dyn ContentParser>,
        state: Arc<PublishedContent>,
    ) -> Self {
        let resolved_branch = repository.branch.clone();

        Self {
            repository,
            remote,
            meta_store,
            cache,
            classifier,
            parser,
            state,
            resolved_branch,
        }
    }

    pub fn repository(&self) -> &RepositoryInfo {
        &self.repository
    }

    /// The branch this session synchronizes, once known.
    pub fn branch(&self) -> Option<&str> {
        self.resolved_branch.as_deref()
    }

    pub fn published(&self) -> &Arc<PublishedContent> {
        &self.state
    }

    async fn branch_for_session(&mut self) -> Result<String, SyncError> {
        if let Some(branch) = &self.resolved_branch {
            return Ok(branch.clone());
        }

        let branch = self.remote.resolve_default_branch().await?;
        log::debug!("resolved default branch {branch} for {}", self.remote.label());
        self.resolved_branch = Some(branch.clone());

        Ok(branch)
    }

    /// Run one sync pass: resolve the commit, reconcile the listing
    /// against the cache, fetch what changed, parse, publish, persist.
    pub async fn synchronize(&mut self) -> Result<SyncOutcome, SyncError> {
        let branch = self.branch_for_session().await?;

        // The commit lookup is branch-scoped, so it must come after
        // resolution.
        let commit = self.remote.fetch_last_commit(&branch).await?;

        self.state
            .set_last_commit_published(!commit.message.starts_with(DEPLOY_SKIP_PREFIX));

        let cached_entries = self.cache.entries().await?;
        let mut list = resolve_file_list(
            self.meta_store.as_ref(),
            &self.remote,
            self.classifier.as_ref(),
            &commit.hash,
            &cached_entries,
        )
        .await?;

        if list.processing_count() == 0 {
            self.state.publish_empty();

            return Ok(SyncOutcome {
                commit_hash: commit.hash,
                entries: 0,
                assets: 0,
                config_files: 0,
                parse_errors: 0,
                fetched: 0,
                prune: None,
            });
        }

        let cached_files: HashMap<String, CachedFileEntry> = cached_entries.into_iter().collect();
        restore_cached_data(&mut list, &cached_files);

        let fetching_files: Vec<FileListItem> = list
            .files
            .iter()
            .filter(|file| file.needs_fetch())
            .cloned()
            .collect();

        let fetched_map = if fetching_files.is_empty() {
            HashMap::new()
        } else {
            log::debug!(
                "fetching {} of {} files for {}",
                fetching_files.len(),
                list.files.len(),
                self.repository.namespace
            );
            self.remote.fetch_file_contents(&fetching_files).await?
        };

        let merge = |file: &FileListItem| file.merged_with(fetched_map.get(&file.path));
        let entry_files: Vec<FileListItem> = list.entry_files().map(merge).collect();
        let asset_files: Vec<FileListItem> = list.asset_files().map(merge).collect();
        let config_files: Vec<FileListItem> = list.config_files().map(merge).collect();

        let (entries, parse_errors) = self.parser.parse_entries(&entry_files);
        let assets = self.parser.parse_assets(&asset_files);
        let configs = self.parser.parse_config_files(&config_files);

        let outcome = SyncOutcome {
            commit_hash: commit.hash,
            entries: entries.len(),
            assets: assets.len(),
            config_files: configs.len(),
            parse_errors: parse_errors.len(),
            fetched: fetching_files.len(),
            prune: None,
        };

        self.state.publish(entries, assets, configs, parse_errors);

        // Cache writes happen after publishing and never gate it.
        let prune = update_cache(self.cache.clone(), &list, &cached_files, &fetched_map).await;

        Ok(SyncOutcome { prune, ..outcome })
    }
}
