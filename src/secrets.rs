use crate::fs_util::{set_secure_dir_permissions, set_secure_file_permissions, state_dir};
use std::path::{Path, PathBuf};

fn credentials_dir_for(state_dir: &Path) -> PathBuf {
    state_dir.join("credentials")
}

fn normalize_provider(provider: &str) -> anyhow::Result<String> {
    let provider = provider.trim().to_ascii_lowercase();
    match provider.as_str() {
        "openrouter" | "openai" | "google" | "deepseek" => Ok(provider),
        _ => anyhow::bail!("unsupported provider for key store: {provider}"),
    }
}

fn key_file_path_for(state_dir: &Path, provider: &str) -> anyhow::Result<PathBuf> {
    let provider = normalize_provider(provider)?;
    Ok(credentials_dir_for(state_dir).join(format!("{provider}.key")))
}

pub fn write_key_to(state_dir: &Path, provider: &str, api_key: &str) -> anyhow::Result<PathBuf> {
    let api_key = api_key.trim();
    if api_key.is_empty() {
        anyhow::bail!("API key cannot be empty");
    }

    let dir = credentials_dir_for(state_dir);
    std::fs::create_dir_all(&dir)
        .map_err(|e| anyhow::anyhow!("failed to create {}: {e}", dir.display()))?;
    set_secure_dir_permissions(&dir)?;

    let path = key_file_path_for(state_dir, provider)?;
    std::fs::write(&path, api_key)
        .map_err(|e| anyhow::anyhow!("failed to write {}: {e}", path.display()))?;
    set_secure_file_permissions(&path)?;
    Ok(path)
}

pub fn read_key_from(state_dir: &Path, provider: &str) -> Option<String> {
    let path = key_file_path_for(state_dir, provider).ok()?;
    let value = std::fs::read_to_string(path).ok()?;
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Store a provider API key in ~/.jarvisx/credentials/{provider}.key.
pub fn store_api_key(provider: &str, api_key: &str) -> anyhow::Result<PathBuf> {
    write_key_to(&state_dir(), provider, api_key)
}

/// Load a provider API key from ~/.jarvisx/credentials/{provider}.key.
pub fn load_api_key(provider: &str) -> Option<String> {
    read_key_from(&state_dir(), provider)
}

#[cfg(test)]
mod tests {
    use super::{read_key_from, write_key_to};
    use std::path::PathBuf;

    fn tmp_dir() -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("system clock before epoch")
            .as_nanos();
        let path = std::env::temp_dir().join(format!("jarvisx-secrets-test-{nanos}"));
        std::fs::create_dir_all(&path).expect("create temp dir");
        path
    }

    #[test]
    fn writes_and_reads_provider_key() {
        let dir = tmp_dir();
        let path = write_key_to(&dir, "openrouter", "sk-or-test").expect("write key");
        assert!(path.exists());
        let loaded = read_key_from(&dir, "openrouter");
        assert_eq!(loaded.as_deref(), Some("sk-or-test"));
        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn rejects_unknown_provider() {
        let dir = tmp_dir();
        let err = write_key_to(&dir, "bad/../../provider", "x").expect_err("should fail");
        assert!(err.to_string().contains("unsupported provider"));
        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn rejects_empty_key() {
        let dir = tmp_dir();
        let err = write_key_to(&dir, "deepseek", "   ").expect_err("should fail");
        assert!(err.to_string().contains("cannot be empty"));
        std::fs::remove_dir_all(dir).ok();
    }
}
