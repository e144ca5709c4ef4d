use chrono::{DateTime, Local, Timelike, Utc};
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::catalog::{ModelCatalog, Provider};
use crate::config::JarvisConfig;
use crate::fs_util;
use crate::memory::prefs::{history_path, preferences_path};
use crate::memory::{ConversationHistory, ResponseCache, UserPreferences};
use crate::personality;
use crate::providers::{self, ChatParams};
use crate::types::{ChatEvent, ChatMessage};

/// Typed failures surfaced to the REPL and CLI.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("unknown model '{0}'")]
    UnknownModel(String),
    #[error("unknown personality '{0}'")]
    UnknownPersonality(String),
    #[error("no API key for provider '{provider}'; set {env_var} or run `jarvisx key set {provider}`")]
    MissingApiKey {
        provider: Provider,
        env_var: &'static str,
    },
    #[error("provider error: {0}")]
    Provider(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error(transparent)]
    Io(#[from] anyhow::Error),
}

/// History window sizes forwarded to providers.
fn context_window(provider: Provider) -> usize {
    match provider {
        Provider::OpenAi => 15,
        _ => 10,
    }
}

/// The assistant core: model registry, personality state, conversation
/// memory, and the response cache, with chat turns streamed from the
/// selected provider.
pub struct Assistant {
    config: JarvisConfig,
    catalog: ModelCatalog,
    prefs: UserPreferences,
    prefs_path: PathBuf,
    pub history: ConversationHistory,
    pub cache: ResponseCache,
    model: String,
    mode: String,
    auto_personality: bool,
    last_interaction: Option<DateTime<Utc>>,
    session_started: bool,
}

impl Assistant {
    /// Build an assistant rooted at the default state directory.
    pub fn new(config: JarvisConfig) -> Self {
        Self::with_state_dir(config, fs_util::state_dir())
    }

    pub fn with_state_dir(config: JarvisConfig, state_dir: PathBuf) -> Self {
        let memory_dir = fs_util::memory_dir(&state_dir);
        let prefs_path = preferences_path(&memory_dir);

        // Saved preferences win over config for identity and session defaults.
        let prefs = if prefs_path.exists() {
            UserPreferences::load(&prefs_path)
        } else {
            UserPreferences {
                master_name: config.assistant.master_name.clone(),
                master_title: config.assistant.master_title.clone(),
                default_model: config.assistant.default_model.clone(),
                default_personality: config.assistant.default_personality.clone(),
                auto_personality: config.assistant.auto_personality,
            }
        };

        let catalog = ModelCatalog::builtin();
        let model = if catalog.contains(&prefs.default_model) {
            prefs.default_model.clone()
        } else {
            warn!(
                model = %prefs.default_model,
                "preferred model not in registry, falling back to config default"
            );
            config.assistant.default_model.clone()
        };
        let mode = if personality::is_known_mode(&prefs.default_personality) {
            prefs.default_personality.clone()
        } else {
            "standard".to_string()
        };

        let hist_path = history_path(&memory_dir);
        let last_interaction = std::fs::metadata(&hist_path)
            .and_then(|m| m.modified())
            .ok()
            .map(DateTime::<Utc>::from);
        let history = ConversationHistory::load(hist_path, config.memory.max_history);

        let cache = ResponseCache::with_policy(
            config.memory.cache_size,
            config.memory.aggressive,
            Duration::from_secs(config.memory.cache_ttl_secs),
            config.memory.cleanup_interval,
        );

        let auto_personality = prefs.auto_personality;
        Self {
            config,
            catalog,
            prefs,
            prefs_path,
            history,
            cache,
            model,
            mode,
            auto_personality,
            last_interaction,
            session_started: false,
        }
    }

    /// Run one chat turn, streaming events on `tx` and returning the
    /// complete reply. Cached replies skip the network entirely.
    pub async fn chat(
        &mut self,
        message: &str,
        tx: mpsc::Sender<ChatEvent>,
    ) -> Result<String, ChatError> {
        if self.auto_personality {
            let detected = personality::detect(message, &self.mode, true);
            if detected != self.mode {
                info!(from = %self.mode, to = %detected, "auto-switched personality");
                self.mode = detected;
            }
        }

        let hash = ResponseCache::query_hash(&self.model, &self.mode, message);
        if let Some(cached) = self.cache.get(hash) {
            let _ = tx.send(ChatEvent::Text(cached.clone())).await;
            let _ = tx.send(ChatEvent::Done).await;
            self.record_turn(message, &cached)?;
            self.cache.cleanup();
            return Ok(cached);
        }

        let spec = self
            .catalog
            .get(&self.model)
            .ok_or_else(|| ChatError::UnknownModel(self.model.clone()))?;
        let api_key = self
            .config
            .providers
            .get(spec.provider)
            .ok_or(ChatError::MissingApiKey {
                provider: spec.provider,
                env_var: spec.provider.key_env_var(),
            })?
            .to_string();

        let system_prompt = personality::system_prompt(
            &self.mode,
            &self.prefs.master_name,
            &self.prefs.master_title,
        );

        let mut context: Vec<ChatMessage> = self
            .history
            .recent(context_window(spec.provider))
            .to_vec();
        context.push(ChatMessage::user(message));

        let params = ChatParams {
            temperature: self.config.chat.temperature,
            max_tokens: self.config.chat.max_tokens,
            request_timeout: Duration::from_secs(self.config.chat.request_timeout_secs),
        };
        let provider = providers::for_model(spec, &api_key, params);

        let (inner_tx, mut inner_rx) = mpsc::channel::<ChatEvent>(32);
        let call = provider.chat_streaming(&context, system_prompt.as_deref(), inner_tx);

        // Drain concurrently with the call so a long reply never backs up
        // the channel.
        let drain = async {
            let mut text = String::new();
            let mut error = None;
            while let Some(event) = inner_rx.recv().await {
                match &event {
                    ChatEvent::Text(chunk) => text.push_str(chunk),
                    ChatEvent::Error(e) => error = Some(e.clone()),
                    _ => {}
                }
                let _ = tx.send(event).await;
            }
            (text, error)
        };

        let (call_result, (text, error)) = tokio::join!(call, drain);
        call_result.map_err(|e| ChatError::Transport(e.to_string()))?;
        if let Some(e) = error {
            return Err(ChatError::Provider(e));
        }

        self.record_turn(message, &text)?;
        self.cache.insert(hash, text.clone());
        self.cache.cleanup();
        Ok(text)
    }

    fn record_turn(&mut self, user: &str, assistant: &str) -> Result<(), ChatError> {
        self.history.push(ChatMessage::user(user));
        self.history.push(ChatMessage::assistant(assistant));
        self.history.save()?;
        self.last_interaction = Some(Utc::now());
        self.session_started = true;
        Ok(())
    }

    // --- model and personality state ---

    pub fn switch_model(&mut self, name: &str) -> Result<(), ChatError> {
        if !self.catalog.contains(name) {
            return Err(ChatError::UnknownModel(name.to_string()));
        }
        self.model = name.to_string();
        self.prefs.default_model = name.to_string();
        self.save_prefs();
        Ok(())
    }

    pub fn switch_personality(&mut self, mode: &str) -> Result<(), ChatError> {
        if !personality::is_known_mode(mode) {
            return Err(ChatError::UnknownPersonality(mode.to_string()));
        }
        self.mode = mode.to_string();
        self.prefs.default_personality = mode.to_string();
        self.save_prefs();
        Ok(())
    }

    pub fn toggle_auto_personality(&mut self) -> bool {
        self.auto_personality = !self.auto_personality;
        self.prefs.auto_personality = self.auto_personality;
        self.save_prefs();
        self.auto_personality
    }

    pub fn current_model(&self) -> &str {
        &self.model
    }

    pub fn current_personality(&self) -> &str {
        &self.mode
    }

    pub fn auto_personality_enabled(&self) -> bool {
        self.auto_personality
    }

    pub fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }

    // --- identity ---

    pub fn identity(&self) -> (&str, &str) {
        (&self.prefs.master_name, &self.prefs.master_title)
    }

    pub fn set_identity(&mut self, name: Option<String>, title: Option<String>) {
        if let Some(name) = name {
            self.prefs.master_name = name;
        }
        if let Some(title) = title {
            self.prefs.master_title = title;
        }
        self.save_prefs();
    }

    fn save_prefs(&self) {
        if let Err(e) = self.prefs.save(&self.prefs_path) {
            warn!("failed to save preferences: {e}");
        }
    }

    // --- session niceties ---

    /// One-time greeting keyed to the local clock and how long the
    /// assistant has been idle.
    pub fn greeting(&mut self) -> Option<String> {
        if self.session_started {
            return None;
        }
        self.session_started = true;

        let hour = Local::now().hour();
        let time_of_day = match hour {
            5..12 => "Good morning",
            12..18 => "Good afternoon",
            _ => "Good evening",
        };

        let mut greeting = format!("{time_of_day}, {}.", self.prefs.master_name);
        match self.last_interaction {
            Some(last) => {
                let days = (Utc::now() - last).num_days();
                if days > 7 {
                    greeting.push_str(&format!(
                        " It's been {days} days since our last interaction. Welcome back."
                    ));
                } else if days > 1 {
                    greeting.push_str(&format!(" I've been waiting for {days} days."));
                } else {
                    greeting.push_str(" Nice to see you again.");
                }
            }
            None => greeting.push_str(" How may I assist you today?"),
        }
        Some(greeting)
    }

    /// Render the last `turns` exchanges, contents trimmed for display.
    pub fn recent_context(&self, turns: usize) -> String {
        let recent = self.history.recent(turns * 2);
        if recent.is_empty() {
            return "No recent conversation history.".to_string();
        }
        recent
            .iter()
            .map(|m| {
                let content = if m.content.len() > 100 {
                    format!("{}...", truncate_at_boundary(&m.content, 100))
                } else {
                    m.content.clone()
                };
                format!("{}: {content}", m.role)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Render the memory overview shown by the `memory` command.
    pub fn insights(&self) -> String {
        let summary = self.history.summary();
        let mut out = format!(
            "History: {} messages ({} yours, {} mine), avg lengths {} / {} chars",
            summary.total_messages,
            summary.user_messages,
            summary.assistant_messages,
            summary.avg_user_length,
            summary.avg_assistant_length
        );
        if self.history.archived_chunks() > 0 {
            out.push_str(&format!(
                "\nArchived: {} older chunks",
                self.history.archived_chunks()
            ));
        }
        out.push_str(&format!(
            "\nCache: {} / {} responses",
            self.cache.len(),
            self.cache.capacity()
        ));
        out
    }

    /// Render history search results, capped at five matches.
    pub fn search_history(&self, query: &str) -> String {
        let matches = self.history.search(query);
        if matches.is_empty() {
            return format!("No matches found for '{query}' in conversation history.");
        }
        let rendered: Vec<String> = matches
            .iter()
            .take(5)
            .map(|(i, m)| {
                let content = if m.content.len() > 150 {
                    format!("{}...", truncate_at_boundary(&m.content, 150))
                } else {
                    m.content.clone()
                };
                format!("Message {} ({}): {content}", i + 1, m.role)
            })
            .collect();
        format!("Found {} matches:\n{}", matches.len(), rendered.join("\n"))
    }
}

/// Truncate without splitting a UTF-8 code point.
fn truncate_at_boundary(s: &str, limit: usize) -> &str {
    if s.len() <= limit {
        return s;
    }
    let mut end = limit;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
