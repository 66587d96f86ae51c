use std::fmt;

use crate::file::{FileListItem, FileMeta};
use crate::frontmatter::{self, Fields};

/// A parsed content entry.
#[derive(Debug, Clone, Default)]
pub struct Entry {
    pub path: String,
    pub name: String,
    pub fields: Fields,
    pub body: String,
    pub size: Option<u64>,
    pub meta: FileMeta,
}

/// Coarse media classification for assets, derived from the extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Image,
    Video,
    Audio,
    Document,
    Other,
}

impl AssetKind {
    pub fn from_path(path: &str) -> Self {
        let ext = path.rsplit('.').next().unwrap_or_default().to_lowercase();

        match ext.as_str() {
            "avif" | "gif" | "jpeg" | "jpg" | "png" | "svg" | "webp" => Self::Image,
            "mp4" | "mov" | "webm" => Self::Video,
            "mp3" | "ogg" | "wav" => Self::Audio,
            "pdf" | "doc" | "docx" => Self::Document,
            _ => Self::Other,
        }
    }
}

/// A repository asset (media file).
#[derive(Debug, Clone)]
pub struct Asset {
    pub path: String,
    pub name: String,
    pub size: Option<u64>,
    pub kind: AssetKind,
    pub meta: FileMeta,
}

/// A repository configuration file with its raw text.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub path: String,
    pub text: Option<String>,
}

/// A per-file parse failure. Non-fatal: collected and published alongside
/// the content that did parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub path: String,
    pub message: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Turns merged file list items into published content values.
///
/// Format knowledge (front matter dialects, asset metadata extraction)
/// lives behind this seam.
pub trait ContentParser: Send + Sync {
    /// Parse entry files. Files that fail to parse are reported in the
    /// error list and omitted from the entries.
    fn parse_entries(&self, files: &[FileListItem]) -> (Vec<Entry>, Vec<ParseError>);

    fn parse_assets(&self, files: &[FileListItem]) -> Vec<Asset>;

    fn parse_config_files(&self, files: &[FileListItem]) -> Vec<ConfigFile>;
}

/// Default parser: YAML front matter for Markdown entries, whole-document
/// mappings for YAML/JSON data files.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrontMatterParser;

impl FrontMatterParser {
    fn parse_entry(&self, file: &FileListItem) -> Result<Entry, ParseError> {
        let data = file.data().ok_or_else(|| ParseError {
            path: file.path.clone(),
            message: "content was not fetched".to_owned(),
        })?;

        let text = data.text.as_deref().ok_or_else(|| ParseError {
            path: file.path.clone(),
            message: "no text content".to_owned(),
        })?;

        let is_markdown = file.path.ends_with(".md") || file.path.ends_with(".markdown");

        let document = if is_markdown {
            frontmatter::parse(text)
        } else {
            frontmatter::parse_data_file(text)
        }
        .map_err(|e| ParseError {
            path: file.path.clone(),
            message: e.to_string(),
        })?;

        Ok(Entry {
            path: file.path.clone(),
            name: file.name.clone(),
            fields: document.fields,
            body: document.body,
            size: file.size.or(data.size),
            meta: data.meta.clone(),
        })
    }
}

impl ContentParser for FrontMatterParser {
    fn parse_entries(&self, files: &[FileListItem]) -> (Vec<Entry>, Vec<ParseError>) {
        let mut entries = Vec::with_capacity(files.len());
        let mut errors = Vec::new();

        for file in files {
            match self.parse_entry(file) {
                Ok(entry) => entries.push(entry),
                Err(error) => errors.push(error),
            }
        }

        (entries, errors)
    }

    fn parse_assets(&self, files: &[FileListItem]) -> Vec<Asset> {
        files
            .iter()
            .map(|file| Asset {
                path: file.path.clone(),
                name: file.name.clone(),
                size: file.size.or_else(|| file.data().and_then(|d| d.size)),
                kind: AssetKind::from_path(&file.path),
                meta: file.data().map(|d| d.meta.clone()).unwrap_or_default(),
            })
            .collect()
    }

    fn parse_config_files(&self, files: &[FileListItem]) -> Vec<ConfigFile> {
        files
            .iter()
            .map(|file| ConfigFile {
                path: file.path.clone(),
                text: file.data().and_then(|d| d.text.clone()),
            })
            .collect()
    }
}
