use async_trait::async_trait;
use reqwest::Client;
use tokio::sync::mpsc;

use super::{ChatParams, LlmProvider};
use crate::types::{ChatEvent, ChatMessage, Role};

/// Backend for the Google AI `generateContent` API. Not an SSE endpoint:
/// one request, one JSON reply, emitted as a single text event.
///
/// Role mapping: assistant turns become `"model"`, and since the API has no
/// system role the system prompt is folded into the first user turn.
pub struct GoogleProvider {
    client: Client,
    endpoint: String,
    api_key: String,
    params: ChatParams,
}

impl GoogleProvider {
    pub fn new(endpoint: String, api_key: String, params: ChatParams) -> Self {
        Self {
            client: Client::new(),
            endpoint,
            api_key,
            params,
        }
    }

    fn build_body(
        &self,
        messages: &[ChatMessage],
        system_prompt: Option<&str>,
    ) -> serde_json::Value {
        let mut contents = Vec::new();
        let mut pending_system = system_prompt;

        for message in messages {
            let role = match message.role {
                Role::Assistant => "model",
                Role::User => "user",
                Role::System => continue,
            };

            let text = if role == "user" {
                match pending_system.take() {
                    Some(system) => format!("{system}\n\n{}", message.content),
                    None => message.content.clone(),
                }
            } else {
                message.content.clone()
            };

            contents.push(serde_json::json!({
                "role": role,
                "parts": [{ "text": text }],
            }));
        }

        serde_json::json!({
            "contents": contents,
            "generationConfig": {
                "temperature": self.params.temperature,
                "maxOutputTokens": self.params.max_tokens,
                "topP": 0.95,
            },
        })
    }

    fn extract_text(response: &serde_json::Value) -> Option<String> {
        let parts = response
            .get("candidates")?
            .as_array()?
            .first()?
            .get("content")?
            .get("parts")?
            .as_array()?;
        let text: String = parts
            .iter()
            .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
            .collect();
        if text.is_empty() { None } else { Some(text) }
    }
}

#[async_trait]
impl LlmProvider for GoogleProvider {
    async fn chat_streaming(
        &self,
        messages: &[ChatMessage],
        system_prompt: Option<&str>,
        tx: mpsc::Sender<ChatEvent>,
    ) -> anyhow::Result<()> {
        let body = self.build_body(messages, system_prompt);

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .header("content-type", "application/json")
            .timeout(self.params.request_timeout)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            let _ = tx
                .send(ChatEvent::Error(format!("{status}: {text}")))
                .await;
            let _ = tx.send(ChatEvent::Done).await;
            return Ok(());
        }

        let parsed: serde_json::Value = response.json().await?;

        let input_tokens = parsed
            .pointer("/usageMetadata/promptTokenCount")
            .and_then(|v| v.as_u64())
            .unwrap_or(0) as u32;
        let output_tokens = parsed
            .pointer("/usageMetadata/candidatesTokenCount")
            .and_then(|v| v.as_u64())
            .unwrap_or(0) as u32;

        match Self::extract_text(&parsed) {
            Some(text) => {
                let _ = tx.send(ChatEvent::Text(text)).await;
                let _ = tx
                    .send(ChatEvent::Usage {
                        input_tokens,
                        output_tokens,
                    })
                    .await;
            }
            None => {
                let _ = tx
                    .send(ChatEvent::Error("no candidates in response".into()))
                    .await;
            }
        }

        let _ = tx.send(ChatEvent::Done).await;
        Ok(())
    }
}
