use std::collections::HashMap;

use base64::Engine;
use futures::StreamExt;

use content_sync::{
    Commit, FileData, FileListItem, FileMeta, RemoteError, RemoteFile, RemoteRepository,
};

use crate::blob::{BlobResponse, BranchResponse, RepoResponse};
use crate::tree::TreeResponse;

/// How many blob requests a batch content fetch keeps in flight.
const CONTENT_FETCH_CONCURRENCY: usize = 8;

/// Configuration for a GitHub-hosted repository.
#[derive(Debug, Clone)]
pub struct GitHubRemoteConfig {
    pub owner: String,
    pub repo: String,
    pub token: Option<String>,
    pub api_base_url: Option<String>,
}

/// [`RemoteRepository`] implementation backed by the GitHub REST API.
pub struct GitHubRemote {
    config: GitHubRemoteConfig,
    label: String,
    client: reqwest::Client,
}

impl GitHubRemote {
    pub fn new(config: GitHubRemoteConfig) -> Self {
        let label = format!("{}/{}", config.owner, config.repo);

        Self {
            config,
            label,
            client: reqwest::Client::new(),
        }
    }

    fn api_base(&self) -> &str {
        self.config
            .api_base_url
            .as_deref()
            .unwrap_or("https://api.github.com")
    }

    fn repo_url(&self, suffix: &str) -> String {
        format!(
            "{}/repos/{}/{}{}",
            self.api_base(),
            self.config.owner,
            self.config.repo,
            suffix,
        )
    }

    fn build_request(&self, url: &str) -> reqwest::RequestBuilder {
        let mut req = self.client.get(url).header("User-Agent", "content-sync");

        if let Some(token) = &self.config.token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }

        req
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, RemoteError> {
        let response = self
            .build_request(url)
            .send()
            .await
            .map_err(|e| RemoteError::Network(e.to_string()))?;

        if response.status().as_u16() == 404 {
            return Err(RemoteError::NotFound(url.to_owned()));
        }

        if !response.status().is_success() {
            return Err(RemoteError::Network(format!(
                "HTTP {}: {}",
                response.status(),
                response.text().await.unwrap_or_else(|_| "unknown".into())
            )));
        }

        response
            .json()
            .await
            .map_err(|e| RemoteError::Parse(e.to_string()))
    }

    /// Decode a base64 blob body; non-UTF-8 content (binary assets) yields
    /// `None` rather than an error.
    fn decode_content(blob: &BlobResponse) -> Result<Option<String>, RemoteError> {
        let Some(encoded) = blob.content.as_deref() else {
            return Ok(None);
        };

        if blob.encoding.as_deref() == Some("none") {
            // Blobs over the API size limit come back empty.
            return Ok(None);
        }

        // GitHub returns base64 with newlines embedded
        let cleaned: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(&cleaned)
            .map_err(|e| RemoteError::Parse(format!("base64 decode failed: {e}")))?;

        Ok(String::from_utf8(bytes).ok())
    }

    async fn fetch_blob(&self, file: &FileListItem) -> Result<(String, FileData), RemoteError> {
        let url = self.repo_url(&format!("/git/blobs/{}", file.content_hash));
        let blob: BlobResponse = self.get_json(&url).await?;
        let text = Self::decode_content(&blob)?;

        Ok((
            file.path.clone(),
            FileData {
                size: blob.size.or(file.size),
                text,
                meta: FileMeta::default(),
            },
        ))
    }
}

#[async_trait::async_trait]
impl RemoteRepository for GitHubRemote {
    fn label(&self) -> &str {
        &self.label
    }

    async fn resolve_default_branch(&self) -> Result<String, RemoteError> {
        let url = self.repo_url("");
        let repo: RepoResponse = self.get_json(&url).await?;

        Ok(repo.default_branch)
    }

    async fn fetch_last_commit(&self, branch: &str) -> Result<Commit, RemoteError> {
        let url = self.repo_url(&format!("/branches/{branch}"));
        let response: BranchResponse = self.get_json(&url).await?;

        Ok(Commit {
            hash: response.commit.sha,
            message: response.commit.commit.message,
        })
    }

    async fn fetch_file_list(&self, last_hash: &str) -> Result<Vec<RemoteFile>, RemoteError> {
        let url = self.repo_url(&format!("/git/trees/{last_hash}?recursive=1"));
        let response: TreeResponse = self.get_json(&url).await?;

        if response.truncated {
            log::warn!(
                "tree response for {} was truncated; listing may be incomplete",
                self.label
            );
        }

        Ok(response
            .tree
            .into_iter()
            .filter(|entry| entry.entry_type == "blob")
            .map(|entry| RemoteFile {
                path: entry.path,
                content_hash: entry.sha,
                size: entry.size,
            })
            .collect())
    }

    async fn fetch_file_contents(
        &self,
        files: &[FileListItem],
    ) -> Result<HashMap<String, FileData>, RemoteError> {
        let fetch_futures: Vec<_> = files.iter().map(|file| self.fetch_blob(file)).collect();
        let mut fetches =
            futures::stream::iter(fetch_futures).buffer_unordered(CONTENT_FETCH_CONCURRENCY);

        let mut contents = HashMap::with_capacity(files.len());

        while let Some(result) = fetches.next().await {
            let (path, data) = result?;
            contents.insert(path, data);
        }

        Ok(contents)
    }
}
