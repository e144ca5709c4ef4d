use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use tokio::sync::mpsc;
use tracing::debug;

use super::{ChatParams, LlmProvider};
use crate::catalog::Provider;
use crate::types::{ChatEvent, ChatMessage};

/// Backend for every endpoint speaking the OpenAI chat-completions dialect:
/// OpenRouter, OpenAI, and DeepSeek. OpenRouter gets its attribution headers
/// and the fallback route flag; the wire format is otherwise identical.
pub struct OpenAiCompatProvider {
    client: Client,
    endpoint: String,
    model_id: String,
    api_key: String,
    provider: Provider,
    params: ChatParams,
}

impl OpenAiCompatProvider {
    pub fn new(
        endpoint: String,
        model_id: String,
        api_key: String,
        provider: Provider,
        params: ChatParams,
    ) -> Self {
        Self {
            client: Client::new(),
            endpoint,
            model_id,
            api_key,
            provider,
            params,
        }
    }

    fn build_body(
        &self,
        messages: &[ChatMessage],
        system_prompt: Option<&str>,
    ) -> serde_json::Value {
        let mut all_messages = Vec::new();
        if let Some(system) = system_prompt {
            all_messages.push(serde_json::json!({
                "role": "system",
                "content": system,
            }));
        }
        all_messages.extend(messages.iter().map(ChatMessage::as_provider_message));

        let mut body = serde_json::json!({
            "model": self.model_id,
            "messages": all_messages,
            "temperature": self.params.temperature,
            "max_tokens": self.params.max_tokens,
            "stream": true,
            "stream_options": { "include_usage": true },
        });

        if self.provider == Provider::OpenRouter {
            body["route"] = serde_json::json!("fallback");
        }

        body
    }
}

#[async_trait]
impl LlmProvider for OpenAiCompatProvider {
    async fn chat_streaming(
        &self,
        messages: &[ChatMessage],
        system_prompt: Option<&str>,
        tx: mpsc::Sender<ChatEvent>,
    ) -> anyhow::Result<()> {
        let body = self.build_body(messages, system_prompt);

        let mut request = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .timeout(self.params.request_timeout);

        if self.provider == Provider::OpenRouter {
            request = request
                .header("HTTP-Referer", "https://jarvisx.ai")
                .header("X-Title", "JARVIS-X");
        }

        let response = request.json(&body).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            let _ = tx
                .send(ChatEvent::Error(format!("{status}: {text}")))
                .await;
            let _ = tx.send(ChatEvent::Done).await;
            return Ok(());
        }

        let mut stream = response.bytes_stream();
        let mut buffer = String::new();
        let mut input_tokens: u32 = 0;
        let mut output_tokens: u32 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            buffer.push_str(&String::from_utf8_lossy(&chunk));

            // Process complete SSE events
            while let Some(pos) = buffer.find("\n\n") {
                let event = buffer[..pos].to_string();
                buffer = buffer[pos + 2..].to_string();

                let Some(data) = event.strip_prefix("data: ") else {
                    continue;
                };

                if data == "[DONE]" {
                    let _ = tx
                        .send(ChatEvent::Usage {
                            input_tokens,
                            output_tokens,
                        })
                        .await;
                    let _ = tx.send(ChatEvent::Done).await;
                    return Ok(());
                }

                let parsed: serde_json::Value = match serde_json::from_str(data) {
                    Ok(v) => v,
                    Err(e) => {
                        debug!("skipping unparseable SSE data: {e}");
                        continue;
                    }
                };

                // Usage rides on the final chunk
                if let Some(usage) = parsed.get("usage") {
                    if let Some(it) = usage.get("prompt_tokens").and_then(|v| v.as_u64()) {
                        input_tokens = it as u32;
                    }
                    if let Some(ot) = usage.get("completion_tokens").and_then(|v| v.as_u64()) {
                        output_tokens = ot as u32;
                    }
                }

                if let Some(text) = parsed
                    .get("choices")
                    .and_then(|c| c.as_array())
                    .and_then(|c| c.first())
                    .and_then(|c| c.get("delta"))
                    .and_then(|d| d.get("content"))
                    .and_then(|t| t.as_str())
                {
                    let _ = tx.send(ChatEvent::Text(text.into())).await;
                }
            }
        }

        let _ = tx
            .send(ChatEvent::Usage {
                input_tokens,
                output_tokens,
            })
            .await;
        let _ = tx.send(ChatEvent::Done).await;
        Ok(())
    }
}
