use serde::Deserialize;
use std::path::PathBuf;
use tracing::info;

use crate::catalog::{DEFAULT_MODEL, ModelCatalog, Provider};
use crate::personality;
use crate::secrets;

/// Top-level configuration loaded from TOML.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct JarvisConfig {
    pub assistant: AssistantConfig,
    pub chat: ChatConfig,
    pub memory: MemoryConfig,
    #[serde(default)]
    pub providers: ProviderKeys,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssistantConfig {
    #[serde(default = "default_master_name")]
    pub master_name: String,
    #[serde(default = "default_master_title")]
    pub master_title: String,
    #[serde(default = "default_model")]
    pub default_model: String,
    #[serde(default = "default_personality")]
    pub default_personality: String,
    #[serde(default = "default_auto_personality")]
    pub auto_personality: bool,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            master_name: default_master_name(),
            master_title: default_master_title(),
            default_model: default_model(),
            default_personality: default_personality(),
            auto_personality: default_auto_personality(),
        }
    }
}

fn default_master_name() -> String {
    "Boss".into()
}
fn default_master_title() -> String {
    "Sir".into()
}
fn default_model() -> String {
    DEFAULT_MODEL.into()
}
fn default_personality() -> String {
    "standard".into()
}
fn default_auto_personality() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    800
}
fn default_request_timeout() -> u64 {
    60
}

#[derive(Debug, Clone, Deserialize)]
pub struct MemoryConfig {
    /// Message count above which the history is compacted.
    #[serde(default = "default_max_history")]
    pub max_history: usize,
    /// Response cache capacity in entries.
    #[serde(default = "default_cache_size")]
    pub cache_size: usize,
    /// Age after which a rarely used cache entry expires.
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,
    /// Interactions between cleanup passes.
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval: u64,
    /// Prune the least-used entries before the cache fills.
    #[serde(default = "default_aggressive")]
    pub aggressive: bool,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            max_history: default_max_history(),
            cache_size: default_cache_size(),
            cache_ttl_secs: default_cache_ttl(),
            cleanup_interval: default_cleanup_interval(),
            aggressive: default_aggressive(),
        }
    }
}

fn default_max_history() -> usize {
    800
}
fn default_cache_size() -> usize {
    300
}
fn default_cache_ttl() -> u64 {
    3600
}
fn default_cleanup_interval() -> u64 {
    50
}
fn default_aggressive() -> bool {
    true
}

/// Per-provider API keys. Usually left empty in the file and resolved
/// from environment variables or the credential store at load time.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderKeys {
    pub openrouter: Option<String>,
    pub openai: Option<String>,
    pub google: Option<String>,
    pub deepseek: Option<String>,
}

impl ProviderKeys {
    pub fn get(&self, provider: Provider) -> Option<&str> {
        match provider {
            Provider::OpenRouter => self.openrouter.as_deref(),
            Provider::OpenAi => self.openai.as_deref(),
            Provider::Google => self.google.as_deref(),
            Provider::DeepSeek => self.deepseek.as_deref(),
        }
    }

    fn slot(&mut self, provider: Provider) -> &mut Option<String> {
        match provider {
            Provider::OpenRouter => &mut self.openrouter,
            Provider::OpenAi => &mut self.openai,
            Provider::Google => &mut self.google,
            Provider::DeepSeek => &mut self.deepseek,
        }
    }
}

/// Load configuration from file or use defaults.
///
/// Search order:
/// 1. `JARVISX_CONFIG` env var
/// 2. `~/.jarvisx/config.toml`
/// 3. Zero-config defaults (no file needed)
pub fn load() -> anyhow::Result<JarvisConfig> {
    let path = config_path();

    if path.exists() {
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
        let mut config: JarvisConfig = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("invalid config at {}: {e}", path.display()))?;

        resolve_api_keys(&mut config);
        validate(&config)?;

        info!("loaded config from {}", path.display());
        Ok(config)
    } else {
        info!("no config file found, using zero-config defaults");
        let mut config = JarvisConfig::default();
        resolve_api_keys(&mut config);
        Ok(config)
    }
}

pub fn config_path() -> PathBuf {
    if let Ok(path) = std::env::var("JARVISX_CONFIG") {
        return PathBuf::from(path);
    }
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
    PathBuf::from(home).join(".jarvisx").join("config.toml")
}

/// Fill unset API keys from environment variables, then the credential store.
fn resolve_api_keys(config: &mut JarvisConfig) {
    for provider in [
        Provider::OpenRouter,
        Provider::OpenAi,
        Provider::Google,
        Provider::DeepSeek,
    ] {
        let slot = config.providers.slot(provider);
        if slot.is_none() {
            *slot = std::env::var(provider.key_env_var())
                .ok()
                .filter(|v| !v.trim().is_empty())
                .or_else(|| secrets::load_api_key(provider.as_str()));
        }
    }
}

/// Validate the config and return clear error messages.
pub fn validate(config: &JarvisConfig) -> anyhow::Result<()> {
    if !personality::is_known_mode(&config.assistant.default_personality) {
        anyhow::bail!(
            "invalid default_personality '{}': must be one of {:?}",
            config.assistant.default_personality,
            personality::MODES
        );
    }

    let catalog = ModelCatalog::builtin();
    if !catalog.contains(&config.assistant.default_model) {
        anyhow::bail!(
            "unknown default_model '{}': run `jarvisx models` for the registry",
            config.assistant.default_model
        );
    }

    if config.chat.max_tokens == 0 {
        anyhow::bail!("chat.max_tokens must be > 0");
    }

    if config.memory.cache_size == 0 {
        anyhow::bail!("memory.cache_size must be > 0");
    }

    if config.memory.max_history == 0 {
        anyhow::bail!("memory.max_history must be > 0");
    }

    Ok(())
}
