//! LLM provider backends. OpenRouter, OpenAI, and DeepSeek all speak the
//! OpenAI chat-completions dialect and stream over SSE; Google's
//! generateContent API is a single round trip.

mod google;
mod openai_compat;

pub use google::GoogleProvider;
pub use openai_compat::OpenAiCompatProvider;

use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::catalog::{ModelSpec, Provider};
use crate::types::{ChatEvent, ChatMessage};

/// Sampling and limit parameters shared by every backend.
#[derive(Debug, Clone, Copy)]
pub struct ChatParams {
    pub temperature: f32,
    pub max_tokens: u32,
    pub request_timeout: Duration,
}

/// Trait for LLM provider implementations.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Stream one completion. Text chunks, usage, and a final `Done` arrive
    /// on `tx`; API-level failures arrive as `ChatEvent::Error` rather than
    /// `Err` so the caller can render them in-band.
    async fn chat_streaming(
        &self,
        messages: &[ChatMessage],
        system_prompt: Option<&str>,
        tx: mpsc::Sender<ChatEvent>,
    ) -> anyhow::Result<()>;
}

/// Build a provider for a catalog entry.
pub fn for_model(
    spec: &ModelSpec,
    api_key: &str,
    params: ChatParams,
) -> Box<dyn LlmProvider> {
    match spec.provider {
        Provider::Google => Box::new(GoogleProvider::new(
            spec.endpoint.to_string(),
            api_key.to_string(),
            params,
        )),
        Provider::OpenRouter | Provider::OpenAi | Provider::DeepSeek => {
            Box::new(OpenAiCompatProvider::new(
                spec.endpoint.to_string(),
                spec.model_id.to_string(),
                api_key.to_string(),
                spec.provider,
                params,
            ))
        }
    }
}
