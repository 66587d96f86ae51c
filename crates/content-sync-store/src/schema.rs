use rusqlite_migration::{M, Migrations};

pub fn migrations() -> Migrations<'static> {
    Migrations::new(vec![M::up(
        "CREATE TABLE sync_meta (
            namespace  TEXT NOT NULL,
            key        TEXT NOT NULL,
            value      TEXT NOT NULL,
            PRIMARY KEY (namespace, key)
        );

        CREATE TABLE file_cache (
            namespace     TEXT NOT NULL,
            path          TEXT NOT NULL,
            content_hash  TEXT NOT NULL,
            size          INTEGER,
            text          TEXT,
            meta_json     TEXT NOT NULL DEFAULT '{}',
            PRIMARY KEY (namespace, path)
        );

        CREATE INDEX idx_file_cache_namespace ON file_cache(namespace);",
    )])
}
