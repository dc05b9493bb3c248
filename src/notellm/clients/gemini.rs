//! Google Gemini client wrapper speaking the native `generateContent` API.
//!
//! Unlike OpenAI-compatible surfaces, the native endpoint carries structured
//! `functionCall` / `functionResponse` parts, which is what the agent's tool
//! loop needs.
//!
//! # Example
//!
//! ```rust,no_run
//! use notellm::client_wrapper::{ChatItem, ClientWrapper, Role};
//! use notellm::clients::gemini::{GeminiClient, Model};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let key = std::env::var("GEMINI_API_KEY")?;
//!     let client = GeminiClient::new_with_model_enum(&key, Model::Gemini25Flash);
//!     let reply = client
//!         .send_message(
//!             "You are terse.",
//!             &[ChatItem::Text {
//!                 role: Role::User,
//!                 content: "Say hello.".into(),
//!             }],
//!             None,
//!         )
//!         .await?;
//!     println!("{}", reply.text);
//!     Ok(())
//! }
//! ```

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
use crate::notellm::tool_declarations::to_gemini_declarations;
use crate::notellm::tool_protocol::ToolMetadata;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    pub model: String,
    base_url: String,
    max_output_tokens: u32,
}

/// Gemini models known to support function calling (nov.2025 snapshot).
pub enum Model {
    Gemini25Pro,
    Gemini25Flash,
    Gemini25FlashLite,
    Gemini20Flash,
    Gemini20FlashLite,
}

pub fn model_to_string(model: Model) -> String {
    match model {
        Model::Gemini25Pro => "gemini-2.5-pro".to_string(),
        Model::Gemini25Flash => "gemini-2.5-flash".to_string(),
        Model::Gemini25FlashLite => "gemini-2.5-flash-lite".to_string(),
        Model::Gemini20Flash => "gemini-2.0-flash".to_string(),
        Model::Gemini20FlashLite => "gemini-2.0-flash-lite".to_string(),
    }
}

impl GeminiClient {
    pub fn new_with_model_string(secret_key: &str, model_name: &str) -> Self {
        GeminiClient {
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

    /// This function is used to create a GeminiClient with a custom base URL.
    /// The default base URL is "<https://generativelanguage.googleapis.com/v1beta>"
    pub fn new_with_base_url(secret_key: &str, model_name: &str, base_url: &str) -> Self {
        GeminiClient {
            base_url: base_url.trim_end_matches('/').to_string(),
            ..Self::new_with_model_string(secret_key, model_name)
        }
    }

    /// Override the per-response output token cap.
    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = max_output_tokens;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    fn build_payload(
        &self,
        system_prompt: &str,
        history: &[ChatItem],
        tools: Option<&[ToolMetadata]>,
    ) -> Value {
        let contents: Vec<Value> = history.iter().map(item_to_content).collect();

        let mut payload = json!({
            "contents": contents,
            "generationConfig": {
                "maxOutputTokens": self.max_output_tokens,
            },
        });

        if !system_prompt.is_empty() {
            payload["systemInstruction"] = json!({
                "parts": [{ "text": system_prompt }]
            });
        }

        if let Some(tools) = tools {
            payload["tools"] = json!([
                { "functionDeclarations": to_gemini_declarations(tools) }
            ]);
        }

        payload
    }
}

fn role_to_string(role: Role) -> &'static str {
    match role {
        Role::Assistant => "model",
        Role::System | Role::User => "user",
    }
}

fn item_to_content(item: &ChatItem) -> Value {
    match item {
        ChatItem::Text { role, content } => json!({
            "role": role_to_string(*role),
            "parts": [{ "text": content }],
        }),
        ChatItem::FunctionCall(call) => json!({
            "role": "model",
            "parts": [{
                "functionCall": { "name": call.name, "args": call.args }
            }],
        }),
        ChatItem::FunctionResponse { name, content, .. } => json!({
            "role": "user",
            "parts": [{
                "functionResponse": {
                    "name": name,
                    "response": { "result": content },
                }
            }],
        }),
    }
}

fn parse_response(raw: &Value) -> ModelResponse {
    let mut response = ModelResponse::default();

    let parts = raw
        .get("candidates")
        .and_then(|candidates| candidates.get(0))
        .and_then(|candidate| candidate.get("content"))
        .and_then(|content| content.get("parts"))
        .and_then(Value::as_array);

    if let Some(parts) = parts {
        for part in parts {
            if let Some(text) = part.get("text").and_then(Value::as_str) {
                response.text.push_str(text);
            }
            if let Some(call) = part.get("functionCall") {
                response.function_calls.push(FunctionCall {
                    id: None,
                    name: call
                        .get("name")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string(),
                    args: call.get("args").cloned().unwrap_or_else(|| json!({})),
                });
            }
        }
    }

    response
}

#[async_trait]
impl ClientWrapper for GeminiClient {
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
        headers.insert("x-goog-api-key", key);

        let raw = post_json(&self.http, &self.endpoint(), headers, &payload)
            .await
            .map_err(|err| {
                error!("GeminiClient::send_message error: {}", err);
                err
            })?;

        Ok(parse_response(&raw))
    }
}
