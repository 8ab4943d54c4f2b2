use crate::app_dirs::AppDirs;
use crate::goal::{GoalConfig, GoalUnit, DEFAULT_GOAL_TARGET, DEFAULT_WRITING_PACE};
use crate::language::LanguageTag;
use crate::timer::DEFAULT_IDLE_TIMEOUT_SECS;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Seconds between flushes of a dirty document
pub const DEFAULT_AUTOSAVE_SECS: u64 = 5;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Language used until the store remembers one
    pub language: LanguageTag,
    /// Goal used until the store remembers one
    pub goal_target: i64,
    pub goal_unit: GoalUnit,
    /// Units per minute for time-to-goal estimates
    pub writing_pace: u32,
    pub autosave_secs: u64,
    pub idle_timeout_secs: Option<u64>,
    pub store_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language: LanguageTag::default(),
            goal_target: DEFAULT_GOAL_TARGET,
            goal_unit: GoalUnit::Words,
            writing_pace: DEFAULT_WRITING_PACE,
            autosave_secs: DEFAULT_AUTOSAVE_SECS,
            idle_timeout_secs: Some(DEFAULT_IDLE_TIMEOUT_SECS),
            store_path: None,
        }
    }
}

impl Config {
    pub fn default_goal(&self) -> GoalConfig {
        GoalConfig::new(self.goal_target, self.goal_unit)
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = AppDirs::config_path().unwrap_or_else(|| PathBuf::from("wordtally_config.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(_) => return Config::default(),
        };
        serde_json::from_slice::<Config>(&bytes).unwrap_or_else(|err| {
            log::warn!("Ignoring unreadable config {}: {err}", self.path.display());
            Config::default()
        })
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn roundtrip_default_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config::default();
        store.save(&cfg).unwrap();
        let loaded = store.load();
        assert_eq!(cfg, loaded);
    }

    #[test]
    fn save_and_load_custom_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config {
            language: LanguageTag::Ja,
            goal_target: 2000,
            goal_unit: GoalUnit::Chars,
            writing_pace: 35,
            autosave_secs: 10,
            idle_timeout_secs: None,
            store_path: Some(dir.path().join("docs.db")),
        };
        store.save(&cfg).unwrap();
        let loaded = store.load();
        assert_eq!(cfg, loaded);
        assert_eq!(loaded.default_goal(), GoalConfig::new(2000, GoalUnit::Chars));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("absent.json"));
        assert_eq!(store.load(), Config::default());
    }

    #[test]
    fn malformed_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(FileConfigStore::with_path(&path).load(), Config::default());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "language": "es", "writing_pace": 25 }"#).unwrap();
        let loaded = FileConfigStore::with_path(&path).load();
        assert_eq!(loaded.language, LanguageTag::Es);
        assert_eq!(loaded.writing_pace, 25);
        assert_eq!(loaded.goal_target, DEFAULT_GOAL_TARGET);
        assert_eq!(loaded.autosave_secs, DEFAULT_AUTOSAVE_SECS);
    }
}
