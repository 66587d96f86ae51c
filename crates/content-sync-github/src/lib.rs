pub mod blob;
pub mod remote;
pub mod tree;

pub use remote::{GitHubRemote, GitHubRemoteConfig};
