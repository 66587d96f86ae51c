use serde::Deserialize;

/// Response from GitHub's Git Blobs API.
/// `GET /repos/{owner}/{repo}/git/blobs/{sha}`
#[derive(Debug, Deserialize)]
pub struct BlobResponse {
    pub sha: String,
    #[serde(default)]
    pub size: Option<u64>,
    pub content: Option<String>,
    pub encoding: Option<String>,
}

/// Response from the repository endpoint.
/// `GET /repos/{owner}/{repo}`
#[derive(Debug, Deserialize)]
pub struct RepoResponse {
    pub default_branch: String,
}

/// Response from the branch endpoint.
/// `GET /repos/{owner}/{repo}/branches/{branch}`
#[derive(Debug, Deserialize)]
pub struct BranchResponse {
    pub commit: BranchCommit,
}

#[derive(Debug, Deserialize)]
pub struct BranchCommit {
    pub sha: String,
    pub commit: BranchCommitDetail,
}

#[derive(Debug, Deserialize)]
pub struct BranchCommitDetail {
    pub message: String,
}
