use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use content_sync::PathRules;

/// Top-level application configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub owner: String,
    pub repo: String,
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    /// Folders whose documents are treated as content entries.
    #[serde(default)]
    pub entry_dirs: Option<Vec<String>>,
    /// Folders whose files are treated as media assets.
    #[serde(default)]
    pub asset_dirs: Option<Vec<String>>,
}

impl AppConfig {
    /// Storage namespace scoping the durable stores.
    pub fn namespace(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    /// Classification rules, with configured folders overriding defaults.
    pub fn path_rules(&self) -> PathRules {
        let mut rules = PathRules::default();

        if let Some(dirs) = &self.entry_dirs {
            rules.entry_dirs = dirs.clone();
        }
        if let Some(dirs) = &self.asset_dirs {
            rules.asset_dirs = dirs.clone();
        }

        rules
    }
}

/// Config file path: `~/.config/content-sync/config.toml`
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("content-sync").join("config.toml"))
}

/// Cache database path: `~/.local/share/content-sync/<owner>-<repo>.db`
pub fn cache_db_path(config: &AppConfig) -> Option<PathBuf> {
    let file_name = format!("{}-{}.db", config.owner, config.repo);
    dirs::data_dir().map(|d| d.join("content-sync").join(file_name))
}

pub fn load_config() -> anyhow::Result<AppConfig> {
    let path = config_path().ok_or_else(|| anyhow::anyhow!("no config directory available"))?;

    let contents = std::fs::read_to_string(&path).map_err(|e| {
        anyhow::anyhow!(
            "failed to read config at {} ({e}); create it with at least `owner` and `repo`",
            path.display()
        )
    })?;

    toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("failed to parse config at {}: {e}", path.display()))
}
