pub mod classify;
pub mod file;
pub mod frontmatter;
pub mod list;
pub mod parser;
pub mod reconcile;
pub mod remote;
pub mod resolver;
pub mod state;
pub mod store;
pub mod sync;
pub mod writer;

pub use classify::{FileClassifier, FileKind, PathRules};
pub use file::{CachedFileEntry, FetchState, FileData, FileListItem, FileMeta};
pub use frontmatter::{Fields, FrontmatterError, ParsedDocument, parse as parse_frontmatter};
pub use list::FileList;
pub use parser::{Asset, AssetKind, ConfigFile, ContentParser, Entry, FrontMatterParser, ParseError};
pub use reconcile::restore_cached_data;
pub use remote::{Commit, RemoteError, RemoteFile, RemoteRepository};
pub use resolver::resolve_file_list;
pub use state::{ContentSnapshot, PublishedContent};
pub use store::{FileCache, MetadataStore, StoreError, SyncMetadata};
pub use sync::{DEPLOY_SKIP_PREFIX, RepositoryInfo, SyncError, SyncOutcome, Synchronizer};
pub use writer::update_cache;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
