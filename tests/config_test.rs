use jarvisx::catalog::{DEFAULT_MODEL, Provider};
use jarvisx::config::{JarvisConfig, validate};

#[test]
fn defaults_match_the_documented_zero_config_setup() {
    let config = JarvisConfig::default();
    assert_eq!(config.assistant.master_name, "Boss");
    assert_eq!(config.assistant.master_title, "Sir");
    assert_eq!(config.assistant.default_model, DEFAULT_MODEL);
    assert_eq!(config.assistant.default_personality, "standard");
    assert!(config.assistant.auto_personality);
    assert_eq!(config.chat.temperature, 0.7);
    assert_eq!(config.chat.max_tokens, 800);
    assert_eq!(config.chat.request_timeout_secs, 60);
    assert_eq!(config.memory.max_history, 800);
    assert_eq!(config.memory.cache_size, 300);
    assert_eq!(config.memory.cache_ttl_secs, 3600);
    assert_eq!(config.memory.cleanup_interval, 50);
    assert!(config.memory.aggressive);
}

#[test]
fn partial_toml_fills_the_rest_with_defaults() {
    let config: JarvisConfig = toml::from_str(
        r#"
[assistant]
master_name = "Ada"

[chat]
max_tokens = 256
"#,
    )
    .expect("parse partial config");

    assert_eq!(config.assistant.master_name, "Ada");
    assert_eq!(config.assistant.master_title, "Sir");
    assert_eq!(config.chat.max_tokens, 256);
    assert_eq!(config.chat.temperature, 0.7);
    assert_eq!(config.memory.cache_size, 300);
}

#[test]
fn empty_toml_is_valid() {
    let config: JarvisConfig = toml::from_str("").expect("parse empty config");
    validate(&config).expect("defaults validate");
}

#[test]
fn malformed_toml_is_rejected() {
    assert!(toml::from_str::<JarvisConfig>("[assistant\nmaster_name=").is_err());
}

#[test]
fn provider_keys_parse_from_file() {
    let config: JarvisConfig = toml::from_str(
        r#"
[providers]
openrouter = "sk-or-abc"
google = "g-key"
"#,
    )
    .expect("parse keys");

    assert_eq!(config.providers.get(Provider::OpenRouter), Some("sk-or-abc"));
    assert_eq!(config.providers.get(Provider::Google), Some("g-key"));
    assert_eq!(config.providers.get(Provider::OpenAi), None);
}

#[test]
fn validation_rejects_unknown_personality() {
    let config: JarvisConfig = toml::from_str(
        r#"
[assistant]
default_personality = "berserk"
"#,
    )
    .expect("parse");
    let err = validate(&config).expect_err("should fail");
    assert!(err.to_string().contains("default_personality"));
}

#[test]
fn validation_rejects_unknown_model() {
    let config: JarvisConfig = toml::from_str(
        r#"
[assistant]
default_model = "gpt-99"
"#,
    )
    .expect("parse");
    let err = validate(&config).expect_err("should fail");
    assert!(err.to_string().contains("default_model"));
}

#[test]
fn validation_rejects_zero_limits() {
    let config: JarvisConfig = toml::from_str("[chat]\nmax_tokens = 0\n").expect("parse");
    assert!(validate(&config).is_err());

    let config: JarvisConfig = toml::from_str("[memory]\ncache_size = 0\n").expect("parse");
    assert!(validate(&config).is_err());

    let config: JarvisConfig = toml::from_str("[memory]\nmax_history = 0\n").expect("parse");
    assert!(validate(&config).is_err());
}
