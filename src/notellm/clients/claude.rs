//! Anthropic Claude client wrapper speaking the native Messages API.
//!
//! Function calls surface as `tool_use` content blocks and results travel
//! back as `tool_result` blocks tagged with the provider-assigned call id,
//! which this wrapper threads through [`FunctionCall::id`].

use async_trait::async_trait;
use log::error;
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::{json, Value};
use std::error::Error;

use crate::notellm::client_wrapper::{
    ChatItem, ClientWrapper, FunctionCall, ModelApiError, ModelResponse, Role,
};
use crate::notellm::clients::common::{build_http_client, post_json};
use crate::notellm::config::DEFAULT_MAX_OUTPUT_TOKENS;
use crate::notellm::tool_declarations::to_anthropic_declarations;
use crate::notellm::tool_protocol::ToolMetadata;

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";

pub struct ClaudeClient {
    http: reqwest::Client,
    api_key: String,
    pub model: String,
    base_url: String,
    max_output_tokens: u32,
}

/// Anthropic Claude models (nov.2025 snapshot).
pub enum Model {
    ClaudeSonnet46,
    ClaudeOpus46,
    ClaudeSonnet45,
    ClaudeHaiku45,
}

pub fn model_to_string(model: Model) -> String {
    match model {
        Model::ClaudeSonnet46 => "claude-sonnet-4-6".to_string(),
        Model::ClaudeOpus46 => "claude-opus-4-6".to_string(),
        Model::ClaudeSonnet45 => "claude-sonnet-4-5".to_string(),
        Model::ClaudeHaiku45 => "claude-haiku-4-5".to_string(),
    }
}

impl ClaudeClient {
    pub fn new_with_model_string(secret_key: &str, model_name: &str) -> Self {
        ClaudeClient {
            http: build_http_client(),
            api_key: secret_key.to_string(),
            model: model_name.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
        }
    }

    pub fn new_with_model_enum(secret_key: &str, model: Model) -> Self {
        Self::new_with_model_string(secret_key, &model_to_string(model))
    }

    pub fn new_with_base_url(secret_key: &str, model_name: &str, base_url: &str) -> Self {
        ClaudeClient {
            base_url: base_url.trim_end_matches('/').to_string(),
            ..Self::new_with_model_string(secret_key, model_name)
        }
    }

    /// Override the per-response output token cap.
    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = max_output_tokens;
        self
    }

    fn build_payload(
        &self,
        system_prompt: &str,
        history: &[ChatItem],
        tools: Option<&[ToolMetadata]>,
    ) -> Value {
        let messages: Vec<Value> = history.iter().map(item_to_message).collect();

        let mut payload = json!({
            "model": self.model,
            "max_tokens": self.max_output_tokens,
            "messages": messages,
        });

        if !system_prompt.is_empty() {
            payload["system"] = json!(system_prompt);
        }
        if let Some(tools) = tools {
            payload["tools"] = json!(to_anthropic_declarations(tools));
        }

        payload
    }
}

fn item_to_message(item: &ChatItem) -> Value {
    match item {
        ChatItem::Text { role, content } => {
            let role = match role {
                Role::Assistant => "assistant",
                Role::System | Role::User => "user",
            };
            json!({
                "role": role,
                "content": [{ "type": "text", "text": content }],
            })
        }
        ChatItem::FunctionCall(call) => json!({
            "role": "assistant",
            "content": [{
                "type": "tool_use",
                "id": call.id.clone().unwrap_or_else(|| format!("toolu_{}", call.name)),
                "name": call.name,
                "input": call.args,
            }],
        }),
        ChatItem::FunctionResponse {
            name,
            call_id,
            content,
        } => json!({
            "role": "user",
            "content": [{
                "type": "tool_result",
                "tool_use_id": call_id
                    .clone()
                    .unwrap_or_else(|| format!("toolu_{}", name)),
                "content": content,
            }],
        }),
    }
}

fn parse_response(raw: &Value) -> ModelResponse {
    let mut response = ModelResponse::default();

    if let Some(blocks) = raw.get("content").and_then(Value::as_array) {
        for block in blocks {
            match block.get("type").and_then(Value::as_str) {
                Some("text") => {
                    if let Some(text) = block.get("text").and_then(Value::as_str) {
                        response.text.push_str(text);
                    }
                }
                Some("tool_use") => {
                    response.function_calls.push(FunctionCall {
                        id: block
                            .get("id")
                            .and_then(Value::as_str)
                            .map(str::to_string),
                        name: block
                            .get("name")
                            .and_then(Value::as_str)
                            .unwrap_or_default()
                            .to_string(),
                        args: block.get("input").cloned().unwrap_or_else(|| json!({})),
                    });
                }
                _ => {}
            }
        }
    }

    response
}

#[async_trait]
impl ClientWrapper for ClaudeClient {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn send_message(
        &self,
        system_prompt: &str,
        history: &[ChatItem],
        tools: Option<&[ToolMetadata]>,
    ) -> Result<ModelResponse, Box<dyn Error + Send + Sync>> {
        let payload = self.build_payload(system_prompt, history, tools);

        let mut headers = HeaderMap::new();
        let mut key = HeaderValue::from_str(&self.api_key).map_err(|_| {
            Box::new(ModelApiError::new("API key contains invalid characters"))
                as Box<dyn Error + Send + Sync>
        })?;
        key.set_sensitive(true);
        headers.insert("x-api-key", key);
        headers.insert(
            "anthropic-version",
            HeaderValue::from_static(ANTHROPIC_VERSION),
        );

        let url = format!("{}/v1/messages", self.base_url);
        let raw = post_json(&self.http, &url, headers, &payload)
            .await
            .map_err(|err| {
                error!("ClaudeClient::send_message error: {}", err);
                err
            })?;

        Ok(parse_response(&raw))
    }
}
