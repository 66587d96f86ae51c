use crate::file::CachedFileEntry;

/// Metadata key holding the commit hash of the last fully synced listing.
pub const LAST_COMMIT_HASH_KEY: &str = "last_commit_hash";

/// Metadata key marking that config files were fetched at least once.
pub const CONFIG_FETCHED_KEY: &str = "config_fetched";

/// Errors from the durable metadata store or file cache.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(String),

    #[error("migration error: {0}")]
    Migration(String),
}

/// Durable key/value store for per-repository sync metadata.
///
/// Implementations scope keys to one repository storage namespace.
#[async_trait::async_trait]
pub trait MetadataStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Durable path-keyed cache of file content tuples.
#[async_trait::async_trait]
pub trait FileCache: Send + Sync {
    /// All cached entries. No ordering guarantee.
    async fn entries(&self) -> Result<Vec<(String, CachedFileEntry)>, StoreError>;

    /// Insert or overwrite the given entries.
    async fn save_entries(&self, entries: &[(String, CachedFileEntry)]) -> Result<(), StoreError>;

    /// Remove the entries for the given paths.
    async fn delete_entries(&self, paths: &[String]) -> Result<(), StoreError>;
}

/// The per-repository sync bookkeeping persisted across restarts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncMetadata {
    pub last_commit_hash: Option<String>,
    pub config_fetched: bool,
}

impl SyncMetadata {
    /// Load the stored metadata, treating absent keys as defaults.
    pub async fn load(store: &dyn MetadataStore) -> Result<Self, StoreError> {
        let last_commit_hash = store.get(LAST_COMMIT_HASH_KEY).await?;
        let config_fetched = store
            .get(CONFIG_FETCHED_KEY)
            .await?
            .is_some_and(|value| value == "true");

        Ok(Self {
            last_commit_hash,
            config_fetched,
        })
    }

    /// Record a completed fresh listing fetch at the given commit.
    pub async fn record(store: &dyn MetadataStore, last_hash: &str) -> Result<(), StoreError> {
        store.set(LAST_COMMIT_HASH_KEY, last_hash).await?;
        store.set(CONFIG_FETCHED_KEY, "true").await
    }
}
