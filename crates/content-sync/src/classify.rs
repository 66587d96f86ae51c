/// What role a repository file plays in the published content view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// A content entry (e.g. a Markdown document with front matter).
    Entry,
    /// A media file under one of the asset folders.
    Asset,
    /// A repository configuration file (e.g. `.gitattributes`).
    Config,
    /// Anything the sync engine does not manage.
    Other,
}

/// Decides the [`FileKind`] of a repository path.
///
/// Collection and media-folder definitions live outside this crate; this
/// seam lets the application plug its own rules in.
pub trait FileClassifier: Send + Sync {
    fn classify(&self, path: &str) -> FileKind;
}

/// Folder- and extension-based classification rules.
///
/// A path is an entry when it sits under one of `entry_dirs` and carries
/// one of `entry_extensions`; an asset when it sits under one of
/// `asset_dirs`; a config file when its full path matches `config_files`.
/// Paths with a hidden segment are never managed.
#[derive(Debug, Clone)]
pub struct PathRules {
    pub entry_dirs: Vec<String>,
    pub entry_extensions: Vec<String>,
    pub asset_dirs: Vec<String>,
    pub config_files: Vec<String>,
}

impl Default for PathRules {
    fn default() -> Self {
        Self {
            entry_dirs: vec!["content".into()],
            entry_extensions: vec!["md".into(), "markdown".into(), "yaml".into(), "yml".into(), "json".into()],
            asset_dirs: vec!["static".into(), "assets".into()],
            config_files: vec![".gitattributes".into(), ".gitignore".into(), ".gitkeep".into()],
        }
    }
}

impl PathRules {
    fn has_hidden_segment(path: &str) -> bool {
        path.split('/')
            .any(|segment| segment.starts_with('.') && segment.len() > 1)
    }

    fn under_any(path: &str, dirs: &[String]) -> bool {
        dirs.iter().any(|dir| {
            path.strip_prefix(dir.as_str())
                .is_some_and(|rest| rest.starts_with('/'))
        })
    }

    fn has_entry_extension(&self, path: &str) -> bool {
        path.rsplit('.')
            .next()
            .is_some_and(|ext| self.entry_extensions.iter().any(|e| e == ext))
    }
}

impl FileClassifier for PathRules {
    fn classify(&self, path: &str) -> FileKind {
        if self.config_files.iter().any(|c| c == path) {
            return FileKind::Config;
        }

        if Self::has_hidden_segment(path) {
            return FileKind::Other;
        }

        if Self::under_any(path, &self.entry_dirs) && self.has_entry_extension(path) {
            return FileKind::Entry;
        }

        if Self::under_any(path, &self.asset_dirs) {
            return FileKind::Asset;
        }

        FileKind::Other
    }
}
