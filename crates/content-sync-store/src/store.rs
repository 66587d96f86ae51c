use std::path::Path;
use std::sync::Mutex;

use content_sync::{CachedFileEntry, FileCache, FileData, FileMeta, MetadataStore, StoreError};

use crate::schema;

/// A SQLite-backed store implementing both the metadata store and the
/// file cache, scoped to one repository namespace.
///
/// Rows for other namespaces in the same database are invisible through
/// this handle.
pub struct ContentStore {
    conn: Mutex<rusqlite::Connection>,
    namespace: String,
}

impl ContentStore {
    /// Open a store backed by a file on disk.
    pub fn open(path: &Path, namespace: impl Into<String>) -> Result<Self, StoreError> {
        let conn = rusqlite::Connection::open(path)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let mut store = Self {
            conn: Mutex::new(conn),
            namespace: namespace.into(),
        };
        store.migrate()?;
        Ok(store)
    }

    /// Open an in-memory store (for testing).
    pub fn open_in_memory(namespace: impl Into<String>) -> Result<Self, StoreError> {
        let conn = rusqlite::Connection::open_in_memory()
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let mut store = Self {
            conn: Mutex::new(conn),
            namespace: namespace.into(),
        };
        store.migrate()?;
        Ok(store)
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn migrate(&mut self) -> Result<(), StoreError> {
        let conn = self.conn.get_mut().unwrap();
        schema::migrations()
            .to_latest(conn)
            .map_err(|e| StoreError::Migration(e.to_string()))?;
        Ok(())
    }

    /// Number of cached file rows in this namespace.
    pub fn cached_file_count(&self) -> Result<u64, StoreError> {
        let conn = self.conn.lock().unwrap();

        conn.query_row(
            "SELECT COUNT(*) FROM file_cache WHERE namespace = ?1",
            [&self.namespace],
            |row| row.get::<_, i64>(0).map(|n| n as u64),
        )
        .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn row_to_entry(row: &rusqlite::Row) -> rusqlite::Result<(String, CachedFileEntry)> {
        let path: String = row.get(0)?;
        let content_hash: String = row.get(1)?;
        let size: Option<i64> = row.get(2)?;
        let text: Option<String> = row.get(3)?;
        let meta_json: String = row.get(4)?;

        let meta: FileMeta = serde_json::from_str(&meta_json).unwrap_or_default();

        Ok((
            path,
            CachedFileEntry {
                content_hash,
                data: FileData {
                    size: size.map(|s| s as u64),
                    text,
                    meta,
                },
            },
        ))
    }
}

#[async_trait::async_trait]
impl MetadataStore for ContentStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let conn = self.conn.lock().unwrap();

        match conn.query_row(
            "SELECT value FROM sync_meta WHERE namespace = ?1 AND key = ?2",
            rusqlite::params![&self.namespace, key],
            |row| row.get(0),
        ) {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(other) => Err(StoreError::Database(other.to_string())),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let conn = self.conn.lock().unwrap();

        conn.execute(
            "INSERT OR REPLACE INTO sync_meta (namespace, key, value) VALUES (?1, ?2, ?3)",
            rusqlite::params![&self.namespace, key, value],
        )
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }
}

#[async_trait::async_trait]
impl FileCache for ContentStore {
    async fn entries(&self) -> Result<Vec<(String, CachedFileEntry)>, StoreError> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn
            .prepare(
                "SELECT path, content_hash, size, text, meta_json
                 FROM file_cache
                 WHERE namespace = ?1",
            )
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let entries = stmt
            .query_map([&self.namespace], Self::row_to_entry)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .filter_map(|r| r.ok())
            .collect();

        Ok(entries)
    }

    async fn save_entries(&self, entries: &[(String, CachedFileEntry)]) -> Result<(), StoreError> {
        let mut conn = self.conn.lock().unwrap();

        let tx = conn
            .transaction()
            .map_err(|e| StoreError::Database(e.to_string()))?;

        for (path, entry) in entries {
            let meta_json = serde_json::to_string(&entry.data.meta)
                .map_err(|e| StoreError::Database(e.to_string()))?;

            tx.execute(
                "INSERT OR REPLACE INTO file_cache
                    (namespace, path, content_hash, size, text, meta_json)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    &self.namespace,
                    path,
                    entry.content_hash,
                    entry.data.size.map(|s| s as i64),
                    entry.data.text,
                    meta_json,
                ],
            )
            .map_err(|e| StoreError::Database(e.to_string()))?;
        }

        tx.commit().map_err(|e| StoreError::Database(e.to_string()))
    }

    async fn delete_entries(&self, paths: &[String]) -> Result<(), StoreError> {
        let mut conn = self.conn.lock().unwrap();

        let tx = conn
            .transaction()
            .map_err(|e| StoreError::Database(e.to_string()))?;

        for path in paths {
            tx.execute(
                "DELETE FROM file_cache WHERE namespace = ?1 AND path = ?2",
                rusqlite::params![&self.namespace, path],
            )
            .map_err(|e| StoreError::Database(e.to_string()))?;
        }

        tx.commit().map_err(|e| StoreError::Database(e.to_string()))
    }
}
