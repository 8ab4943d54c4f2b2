use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// Document store under $HOME/.local/state/wordtally
    pub fn store_path() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            let state_dir = PathBuf::from(home)
                .join(".local")
                .join("state")
                .join("wordtally");
            Some(state_dir.join("documents.db"))
        } else {
            ProjectDirs::from("", "", "wordtally")
                .map(|proj_dirs| proj_dirs.data_local_dir().join("documents.db"))
        }
    }

    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "wordtally").map(|pd| pd.config_dir().join("config.json"))
    }
}
