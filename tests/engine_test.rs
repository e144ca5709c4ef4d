use std::path::PathBuf;

use tokio::sync::mpsc;

use jarvisx::catalog::DEFAULT_MODEL;
use jarvisx::config::JarvisConfig;
use jarvisx::engine::{Assistant, ChatError};
use jarvisx::memory::ResponseCache;
use jarvisx::types::ChatEvent;

fn tmp_dir() -> PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("system clock before epoch")
        .as_nanos();
    let path = std::env::temp_dir().join(format!("jarvisx-engine-test-{nanos}"));
    std::fs::create_dir_all(&path).expect("create temp dir");
    path
}

#[tokio::test]
async fn cached_replies_need_no_network_or_key() {
    let dir = tmp_dir();
    let mut assistant = Assistant::with_state_dir(JarvisConfig::default(), dir.clone());

    let hash = ResponseCache::query_hash(DEFAULT_MODEL, "standard", "hello there");
    assistant.cache.insert(hash, "Good day to you.");

    let (tx, mut rx) = mpsc::channel::<ChatEvent>(8);
    let reply = assistant
        .chat("hello there", tx)
        .await
        .expect("cached reply");
    assert_eq!(reply, "Good day to you.");

    let mut saw_text = false;
    let mut saw_done = false;
    while let Some(event) = rx.recv().await {
        match event {
            ChatEvent::Text(t) => {
                assert_eq!(t, "Good day to you.");
                saw_text = true;
            }
            ChatEvent::Done => saw_done = true,
            other => panic!("unexpected event {other:?}"),
        }
    }
    assert!(saw_text && saw_done);

    // The turn still lands in persistent history.
    assert_eq!(assistant.history.len(), 2);
    assert!(dir.join("memory").join("conversation_history.json").exists());

    std::fs::remove_dir_all(dir).ok();
}

#[tokio::test]
async fn missing_api_key_is_a_typed_error() {
    let dir = tmp_dir();
    let mut assistant = Assistant::with_state_dir(JarvisConfig::default(), dir.clone());

    let (tx, _rx) = mpsc::channel::<ChatEvent>(8);
    let err = assistant
        .chat("hello there", tx)
        .await
        .expect_err("no key configured");
    assert!(matches!(err, ChatError::MissingApiKey { .. }));
    assert!(err.to_string().contains("jarvisx key set"));

    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn unknown_model_is_rejected_without_changing_state() {
    let dir = tmp_dir();
    let mut assistant = Assistant::with_state_dir(JarvisConfig::default(), dir.clone());

    let before = assistant.current_model().to_string();
    let err = assistant.switch_model("gpt-99").expect_err("unknown model");
    assert!(matches!(err, ChatError::UnknownModel(_)));
    assert_eq!(assistant.current_model(), before);

    assistant.switch_model("gpt-4o-mini").expect("known model");
    assert_eq!(assistant.current_model(), "gpt-4o-mini");

    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn unknown_personality_is_rejected_without_changing_state() {
    let dir = tmp_dir();
    let mut assistant = Assistant::with_state_dir(JarvisConfig::default(), dir.clone());

    let err = assistant
        .switch_personality("unleashed")
        .expect_err("unknown mode");
    assert!(matches!(err, ChatError::UnknownPersonality(_)));
    assert_eq!(assistant.current_personality(), "standard");

    assistant.switch_personality("concise").expect("known mode");
    assert_eq!(assistant.current_personality(), "concise");

    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn preferences_survive_a_restart() {
    let dir = tmp_dir();

    {
        let mut assistant = Assistant::with_state_dir(JarvisConfig::default(), dir.clone());
        assistant.set_identity(Some("Ada".into()), Some("Ma'am".into()));
        assistant.switch_model("deepseek-chat").expect("switch");
        assistant.switch_personality("genius").expect("switch");
    }

    let assistant = Assistant::with_state_dir(JarvisConfig::default(), dir.clone());
    assert_eq!(assistant.identity(), ("Ada", "Ma'am"));
    assert_eq!(assistant.current_model(), "deepseek-chat");
    assert_eq!(assistant.current_personality(), "genius");

    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn auto_toggle_round_trips() {
    let dir = tmp_dir();
    let mut assistant = Assistant::with_state_dir(JarvisConfig::default(), dir.clone());

    assert!(assistant.auto_personality_enabled());
    assert!(!assistant.toggle_auto_personality());
    assert!(assistant.toggle_auto_personality());

    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn greeting_fires_once_per_session() {
    let dir = tmp_dir();
    let mut assistant = Assistant::with_state_dir(JarvisConfig::default(), dir.clone());

    let greeting = assistant.greeting().expect("first greeting");
    assert!(greeting.contains("Boss"));
    assert!(assistant.greeting().is_none());

    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn recent_context_and_search_render_history() {
    let dir = tmp_dir();
    let mut assistant = Assistant::with_state_dir(JarvisConfig::default(), dir.clone());

    assert_eq!(assistant.recent_context(3), "No recent conversation history.");

    assistant
        .history
        .push(jarvisx::types::ChatMessage::user("remind me about the launch"));
    assistant
        .history
        .push(jarvisx::types::ChatMessage::assistant("Noted, the launch."));

    let context = assistant.recent_context(3);
    assert!(context.contains("user: remind me about the launch"));
    assert!(context.contains("assistant: Noted, the launch."));

    let results = assistant.search_history("launch");
    assert!(results.starts_with("Found 2 matches"));
    assert!(assistant.search_history("zebra").contains("No matches"));

    std::fs::remove_dir_all(dir).ok();
}
