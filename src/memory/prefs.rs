use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::catalog::DEFAULT_MODEL;

/// User preferences persisted at `<state>/memory/user_preferences.json`.
/// Fields missing from the file fall back to defaults, so older files
/// keep loading after new fields appear.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UserPreferences {
    pub master_name: String,
    pub master_title: String,
    pub default_model: String,
    pub default_personality: String,
    pub auto_personality: bool,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            master_name: "Boss".into(),
            master_title: "Sir".into(),
            default_model: DEFAULT_MODEL.into(),
            default_personality: "standard".into(),
            auto_personality: true,
        }
    }
}

impl UserPreferences {
    /// Load preferences, falling back to defaults on a missing or
    /// unreadable file.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(prefs) => prefs,
                Err(e) => {
                    warn!("corrupt preferences at {}: {e}; using defaults", path.display());
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| anyhow::anyhow!("failed to create {}: {e}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .map_err(|e| anyhow::anyhow!("failed to write {}: {e}", path.display()))?;
        Ok(())
    }
}

pub fn preferences_path(memory_dir: &Path) -> PathBuf {
    memory_dir.join("user_preferences.json")
}

pub fn history_path(memory_dir: &Path) -> PathBuf {
    memory_dir.join("conversation_history.json")
}
