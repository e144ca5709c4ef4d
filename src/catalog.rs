use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Upstream API family a model is served through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    OpenRouter,
    OpenAi,
    Google,
    DeepSeek,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenRouter => "openrouter",
            Provider::OpenAi => "openai",
            Provider::Google => "google",
            Provider::DeepSeek => "deepseek",
        }
    }

    /// Environment variable holding this provider's API key.
    pub fn key_env_var(&self) -> &'static str {
        match self {
            Provider::OpenRouter => "OPENROUTER_API_KEY",
            Provider::OpenAi => "OPENAI_API_KEY",
            Provider::Google => "GOOGLE_AI_API_KEY",
            Provider::DeepSeek => "DEEPSEEK_API_KEY",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry in the model registry.
#[derive(Debug, Clone)]
pub struct ModelSpec {
    pub name: &'static str,
    pub provider: Provider,
    pub model_id: &'static str,
    pub endpoint: &'static str,
    pub price: &'static str,
    pub specialty: Option<&'static str>,
}

const OPENROUTER_ENDPOINT: &str = "https://openrouter.ai/api/v1/chat/completions";
const OPENAI_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
const DEEPSEEK_ENDPOINT: &str = "https://api.deepseek.com/v1/chat/completions";

pub const DEFAULT_MODEL: &str = "deepseek-r1-distill-qwen-32b";

/// Built-in model registry. Names are stable identifiers used by config,
/// preferences, and the `model` command.
pub struct ModelCatalog {
    models: Vec<ModelSpec>,
}

impl Default for ModelCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ModelCatalog {
    pub fn builtin() -> Self {
        let models = vec![
            ModelSpec {
                name: "deepseek-r1",
                provider: Provider::OpenRouter,
                model_id: "deepseek/deepseek-r1",
                endpoint: OPENROUTER_ENDPOINT,
                price: "$0.55/M in, $2.19/M out",
                specialty: Some("advanced reasoning, mathematics, coding"),
            },
            ModelSpec {
                name: "deepseek-r1-distill-llama-70b",
                provider: Provider::OpenRouter,
                model_id: "deepseek/deepseek-r1-distill-llama-70b",
                endpoint: OPENROUTER_ENDPOINT,
                price: "$0.09/M in, $0.18/M out",
                specialty: Some("lightweight reasoning, faster responses"),
            },
            ModelSpec {
                name: "deepseek-r1-distill-qwen-32b",
                provider: Provider::OpenRouter,
                model_id: "deepseek/deepseek-r1-distill-qwen-32b",
                endpoint: OPENROUTER_ENDPOINT,
                price: "$0.09/M in, $0.18/M out",
                specialty: Some("fast reasoning, memory efficient"),
            },
            ModelSpec {
                name: "deepseek-v3",
                provider: Provider::OpenRouter,
                model_id: "deepseek/deepseek-v3",
                endpoint: OPENROUTER_ENDPOINT,
                price: "$0.27/M out",
                specialty: Some("very capable general model, cheap"),
            },
            ModelSpec {
                name: "gpt-4o",
                provider: Provider::OpenRouter,
                model_id: "openai/gpt-4o",
                endpoint: OPENROUTER_ENDPOINT,
                price: "$5/M out",
                specialty: None,
            },
            ModelSpec {
                name: "claude-3-haiku",
                provider: Provider::OpenRouter,
                model_id: "anthropic/claude-3-haiku",
                endpoint: OPENROUTER_ENDPOINT,
                price: "$2.50/M out",
                specialty: None,
            },
            ModelSpec {
                name: "gemini-pro-openrouter",
                provider: Provider::OpenRouter,
                model_id: "google/gemini-pro",
                endpoint: OPENROUTER_ENDPOINT,
                price: "$0.0125/M in",
                specialty: None,
            },
            ModelSpec {
                name: "gpt-3.5-turbo",
                provider: Provider::OpenAi,
                model_id: "gpt-3.5-turbo",
                endpoint: OPENAI_ENDPOINT,
                price: "$2/M out",
                specialty: None,
            },
            ModelSpec {
                name: "gpt-4o-mini",
                provider: Provider::OpenAi,
                model_id: "gpt-4o-mini",
                endpoint: OPENAI_ENDPOINT,
                price: "$0.15/M in",
                specialty: None,
            },
            ModelSpec {
                name: "gemini-1.5-pro",
                provider: Provider::Google,
                model_id: "gemini-1.5-pro",
                endpoint:
                    "https://generativelanguage.googleapis.com/v1/models/gemini-1.5-pro:generateContent",
                price: "free tier: 15 req/min",
                specialty: Some("free tier available"),
            },
            ModelSpec {
                name: "gemini-1.5-flash",
                provider: Provider::Google,
                model_id: "gemini-1.5-flash",
                endpoint:
                    "https://generativelanguage.googleapis.com/v1/models/gemini-1.5-flash:generateContent",
                price: "free tier: 15 req/min",
                specialty: Some("fast and efficient"),
            },
            ModelSpec {
                name: "deepseek-chat",
                provider: Provider::DeepSeek,
                model_id: "deepseek-chat",
                endpoint: DEEPSEEK_ENDPOINT,
                price: "free tier: 10M tokens/day",
                specialty: Some("generous free tier"),
            },
        ];
        Self { models }
    }

    pub fn get(&self, name: &str) -> Option<&ModelSpec> {
        self.models.iter().find(|m| m.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn all(&self) -> &[ModelSpec] {
        &self.models
    }

    /// Group model names by provider, in provider order.
    pub fn by_provider(&self) -> BTreeMap<Provider, Vec<&'static str>> {
        let mut grouped: BTreeMap<Provider, Vec<&'static str>> = BTreeMap::new();
        for m in &self.models {
            grouped.entry(m.provider).or_default().push(m.name);
        }
        grouped
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
